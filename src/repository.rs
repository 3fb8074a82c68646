use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use std::marker::PhantomData;
use thiserror::Error;
use tracing::debug;

use crate::pagination::{PagedResult, QueryParameters};

/// Failure raised by repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity} with id ({key}) was not found")]
    NotFound { entity: &'static str, key: String },

    /// A write touched zero rows after the entity had been fetched, which
    /// means another request deleted or replaced it in between.
    #[error("{entity} with id ({key}) was modified concurrently")]
    Conflict { entity: &'static str, key: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A row-backed domain object with a generated integer key.
///
/// `TABLE` and `COLUMNS` drive the shared SELECT/DELETE/COUNT statements;
/// `insert` and `update_row` are the per-entity SQL the generic layer cannot
/// write for you.
#[async_trait]
pub trait Entity: Sized + for<'r> FromRow<'r, PgRow> + Unpin + Send + Sync + 'static {
    /// Human-readable name used in error messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    fn key(&self) -> i32;

    /// Insert this entity (key ignored) and return the stored row with its
    /// generated key.
    async fn insert(&self, db: &PgPool) -> sqlx::Result<Self>;

    /// Full-row UPDATE by key; returns the number of rows affected.
    async fn update_row(&self, db: &PgPool) -> sqlx::Result<u64>;
}

/// Maps a Create-DTO into a fresh entity. The DTO carries no key.
pub trait IntoEntity<E> {
    fn into_entity(self) -> E;
}

/// Projects an entity into a response DTO.
pub trait FromEntity<E>: Sized {
    fn from_entity(entity: &E) -> Self;
}

/// Merges an Update-DTO onto a fetched entity. Only the fields the DTO shape
/// carries are written; the key is never touched.
pub trait MergeInto<E> {
    fn merge_into(self, entity: &mut E);
}

/// Uniform CRUD + paging over one entity type.
///
/// All list queries order by primary key ascending so paging is stable
/// across calls.
#[derive(Clone)]
pub struct GenericRepository<E> {
    db: PgPool,
    _entity: PhantomData<E>,
}

impl<E: Entity> GenericRepository<E> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    pub async fn add(&self, entity: E) -> Result<E, RepoError> {
        let stored = entity.insert(&self.db).await?;
        debug!(entity = E::NAME, key = stored.key(), "inserted");
        Ok(stored)
    }

    pub async fn add_mapped<S, R>(&self, source: S) -> Result<R, RepoError>
    where
        S: IntoEntity<E>,
        R: FromEntity<E>,
    {
        let stored = self.add(source.into_entity()).await?;
        Ok(R::from_entity(&stored))
    }

    /// `None` for a missing id or a missing row; never an error for absence.
    pub async fn get(&self, id: Option<i32>) -> Result<Option<E>, RepoError> {
        let Some(id) = id else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            E::COLUMNS,
            E::TABLE
        );
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    /// Like [`get`](Self::get) but absence is a `NotFound` error.
    pub async fn get_mapped<R: FromEntity<E>>(&self, id: i32) -> Result<R, RepoError> {
        let entity = self.get(Some(id)).await?.ok_or(RepoError::NotFound {
            entity: E::NAME,
            key: id.to_string(),
        })?;
        Ok(R::from_entity(&entity))
    }

    /// Full-table fetch; callers paging a large table should use
    /// [`get_all_paged`](Self::get_all_paged) instead.
    pub async fn get_all(&self) -> Result<Vec<E>, RepoError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", E::COLUMNS, E::TABLE);
        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(&self.db).await?;
        Ok(rows)
    }

    pub async fn get_all_mapped<R: FromEntity<E>>(&self) -> Result<Vec<R>, RepoError> {
        let rows = self.get_all().await?;
        Ok(rows.iter().map(R::from_entity).collect())
    }

    /// Counts the whole table first, then fetches the requested slice.
    /// The count and the slice are separate statements, so the total may be
    /// stale under concurrent writes.
    pub async fn get_all_paged<R: FromEntity<E>>(
        &self,
        params: &QueryParameters,
    ) -> Result<PagedResult<R>, RepoError> {
        let count_sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let total: i64 = sqlx::query_scalar(&count_sql).fetch_one(&self.db).await?;

        let sql = format!(
            "SELECT {} FROM {} ORDER BY id OFFSET $1 LIMIT $2",
            E::COLUMNS,
            E::TABLE
        );
        let rows = sqlx::query_as::<_, E>(&sql)
            .bind(i64::from(params.start_index))
            .bind(i64::from(params.page_size))
            .fetch_all(&self.db)
            .await?;

        let items = rows.iter().map(R::from_entity).collect();
        Ok(PagedResult::new(items, params, total))
    }

    /// Writes the caller's previously-fetched entity back in full. Zero rows
    /// affected surfaces as `Conflict`; the caller decides between 404 and
    /// 409 by re-checking existence.
    pub async fn update(&self, entity: E) -> Result<(), RepoError> {
        let key = entity.key();
        let affected = entity.update_row(&self.db).await?;
        if affected == 0 {
            return Err(RepoError::Conflict {
                entity: E::NAME,
                key: key.to_string(),
            });
        }
        debug!(entity = E::NAME, key, "updated");
        Ok(())
    }

    /// Fetch-merge-persist. Fields absent from the DTO shape keep their
    /// fetched values.
    pub async fn update_mapped<S: MergeInto<E>>(
        &self,
        id: i32,
        source: S,
    ) -> Result<(), RepoError> {
        let mut entity = self.get(Some(id)).await?.ok_or(RepoError::NotFound {
            entity: E::NAME,
            key: id.to_string(),
        })?;
        source.merge_into(&mut entity);
        self.update(entity).await
    }

    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        if self.get(Some(id)).await?.is_none() {
            return Err(RepoError::NotFound {
                entity: E::NAME,
                key: id.to_string(),
            });
        }
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        sqlx::query(&sql).bind(id).execute(&self.db).await?;
        debug!(entity = E::NAME, key = id, "deleted");
        Ok(())
    }

    pub async fn exists(&self, id: i32) -> Result<bool, RepoError> {
        Ok(self.get(Some(id)).await?.is_some())
    }
}
