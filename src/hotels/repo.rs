use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::ops::Deref;

use crate::countries::dto::GetCountryDto;
use crate::countries::repo::Country;
use crate::hotels::dto::GetHotelDetailsDto;
use crate::repository::{Entity, FromEntity, GenericRepository, RepoError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hotel {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub country_id: i32,
}

#[async_trait]
impl Entity for Hotel {
    const NAME: &'static str = "Hotel";
    const TABLE: &'static str = "hotels";
    const COLUMNS: &'static str = "id, name, address, rating, country_id";

    fn key(&self) -> i32 {
        self.id
    }

    async fn insert(&self, db: &PgPool) -> sqlx::Result<Hotel> {
        sqlx::query_as::<_, Hotel>(
            r#"
            INSERT INTO hotels (name, address, rating, country_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, address, rating, country_id
            "#,
        )
        .bind(&self.name)
        .bind(&self.address)
        .bind(self.rating)
        .bind(self.country_id)
        .fetch_one(db)
        .await
    }

    async fn update_row(&self, db: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE hotels
            SET name = $2, address = $3, rating = $4, country_id = $5
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.address)
        .bind(self.rating)
        .bind(self.country_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Hotel CRUD plus the eager-loaded details query.
#[derive(Clone)]
pub struct HotelsRepository {
    inner: GenericRepository<Hotel>,
}

impl HotelsRepository {
    pub fn new(db: PgPool) -> Self {
        Self {
            inner: GenericRepository::new(db),
        }
    }

    /// Hotel with its country, already projected to the details shape.
    pub async fn get_details(&self, id: i32) -> Result<GetHotelDetailsDto, RepoError> {
        let hotel = self.inner.get(Some(id)).await?.ok_or(RepoError::NotFound {
            entity: Hotel::NAME,
            key: id.to_string(),
        })?;

        let country = sqlx::query_as::<_, Country>(
            r#"
            SELECT id, name, short_name
            FROM countries
            WHERE id = $1
            "#,
        )
        .bind(hotel.country_id)
        .fetch_one(self.inner.pool())
        .await?;

        Ok(GetHotelDetailsDto {
            id: hotel.id,
            name: hotel.name,
            address: hotel.address,
            rating: hotel.rating,
            country: GetCountryDto::from_entity(&country),
        })
    }
}

impl Deref for HotelsRepository {
    type Target = GenericRepository<Hotel>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
