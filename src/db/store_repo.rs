// src/db/store_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, db::traits::StoreDirectory, models::store::Store};

#[derive(Clone)]
pub struct StoreRepository {
    pool: PgPool,
}

impl StoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_stores<'e, E>(&self, executor: E) -> Result<Vec<Store>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stores = sqlx::query_as::<_, Store>("SELECT id, name FROM stores ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(stores)
    }
}

#[async_trait]
impl StoreDirectory for StoreRepository {
    async fn list_stores(&self) -> Result<Vec<Store>, AppError> {
        self.list_stores(&self.pool).await
    }
}
