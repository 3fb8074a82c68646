use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::ops::Deref;

use crate::countries::dto::GetCountryDetailsDto;
use crate::hotels::dto::GetHotelDto;
use crate::hotels::repo::Hotel;
use crate::repository::{Entity, FromEntity, GenericRepository, RepoError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Country {
    pub id: i32,
    pub name: String,
    pub short_name: Option<String>,
}

#[async_trait]
impl Entity for Country {
    const NAME: &'static str = "Country";
    const TABLE: &'static str = "countries";
    const COLUMNS: &'static str = "id, name, short_name";

    fn key(&self) -> i32 {
        self.id
    }

    async fn insert(&self, db: &PgPool) -> sqlx::Result<Country> {
        sqlx::query_as::<_, Country>(
            r#"
            INSERT INTO countries (name, short_name)
            VALUES ($1, $2)
            RETURNING id, name, short_name
            "#,
        )
        .bind(&self.name)
        .bind(&self.short_name)
        .fetch_one(db)
        .await
    }

    async fn update_row(&self, db: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE countries
            SET name = $2, short_name = $3
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.short_name)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Country CRUD plus the eager-loaded details query.
#[derive(Clone)]
pub struct CountriesRepository {
    inner: GenericRepository<Country>,
}

impl CountriesRepository {
    pub fn new(db: PgPool) -> Self {
        Self {
            inner: GenericRepository::new(db),
        }
    }

    /// Country with its hotel list, already projected to the details shape.
    pub async fn get_details(&self, id: i32) -> Result<GetCountryDetailsDto, RepoError> {
        let country = self
            .inner
            .get(Some(id))
            .await?
            .ok_or(RepoError::NotFound {
                entity: Country::NAME,
                key: id.to_string(),
            })?;

        let hotels = sqlx::query_as::<_, Hotel>(
            r#"
            SELECT id, name, address, rating, country_id
            FROM hotels
            WHERE country_id = $1
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(self.inner.pool())
        .await?;

        Ok(GetCountryDetailsDto {
            id: country.id,
            name: country.name,
            short_name: country.short_name,
            hotels: hotels.iter().map(GetHotelDto::from_entity).collect(),
        })
    }
}

impl Deref for CountriesRepository {
    type Target = GenericRepository<Country>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
