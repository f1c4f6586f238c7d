// src/db/purchase_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::traits::PurchaseStore,
    models::purchase::{PageRequest, Purchase},
};

const PURCHASE_COLUMNS: &str = "id, customer_id, store_id, purchase_amount, cashback_percentage, \
     cashback_amount, purchase_date, description, is_active, created_at";

#[derive(Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insere a compra. Em conflito de id só o `is_active` muda: os valores
    /// financeiros de uma compra nunca são reescritos.
    pub async fn upsert<'e, E>(&self, executor: E, purchase: &Purchase) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO purchases ( \
                id, customer_id, store_id, purchase_amount, cashback_percentage, \
                cashback_amount, purchase_date, description, is_active, created_at \
             ) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (id) DO UPDATE SET is_active = EXCLUDED.is_active \
             RETURNING {PURCHASE_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Purchase>(&sql)
            .bind(purchase.id)
            .bind(purchase.customer_id)
            .bind(purchase.store_id)
            .bind(purchase.purchase_amount)
            .bind(purchase.cashback_percentage)
            .bind(purchase.cashback_amount)
            .bind(purchase.purchase_date)
            .bind(&purchase.description)
            .bind(purchase.is_active)
            .bind(purchase.created_at)
            .fetch_one(executor)
            .await?;
        Ok(saved)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1");
        let purchase = sqlx::query_as::<_, Purchase>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(purchase)
    }

    /// Trava a compra para que dois estornos simultâneos não descontem duas vezes.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1 FOR UPDATE");
        let purchase = sqlx::query_as::<_, Purchase>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(purchase)
    }

    pub async fn list_by_customer<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
    ) -> Result<Vec<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE customer_id = $1 AND is_active = TRUE \
             ORDER BY purchase_date DESC"
        );
        let purchases = sqlx::query_as::<_, Purchase>(&sql)
            .bind(customer_id)
            .fetch_all(executor)
            .await?;
        Ok(purchases)
    }

    pub async fn list_by_store<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE store_id = $1 AND is_active = TRUE \
               AND ($2::timestamptz IS NULL OR purchase_date >= $2) \
             ORDER BY purchase_date DESC"
        );
        let purchases = sqlx::query_as::<_, Purchase>(&sql)
            .bind(store_id)
            .bind(since)
            .fetch_all(executor)
            .await?;
        Ok(purchases)
    }

    pub async fn list_page_by_store<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        customer_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Vec<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE store_id = $1 AND is_active = TRUE \
               AND ($2::uuid IS NULL OR customer_id = $2) \
             ORDER BY purchase_date DESC \
             LIMIT $3 OFFSET $4"
        );
        let purchases = sqlx::query_as::<_, Purchase>(&sql)
            .bind(store_id)
            .bind(customer_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(executor)
            .await?;
        Ok(purchases)
    }

    pub async fn count_by_store<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        customer_id: Option<Uuid>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM purchases \
             WHERE store_id = $1 AND is_active = TRUE \
               AND ($2::uuid IS NULL OR customer_id = $2)",
        )
        .bind(store_id)
        .bind(customer_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}

#[async_trait]
impl PurchaseStore for PurchaseRepository {
    async fn save(&self, purchase: &Purchase) -> Result<Purchase, AppError> {
        self.upsert(&self.pool, purchase).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>, AppError> {
        self.find_by_id(&self.pool, id).await
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Purchase>, AppError> {
        self.list_by_customer(&self.pool, customer_id).await
    }

    async fn list_by_store(
        &self,
        store_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Purchase>, AppError> {
        self.list_by_store(&self.pool, store_id, since).await
    }

    async fn page_by_store(
        &self,
        store_id: Uuid,
        customer_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<Purchase>, i64), AppError> {
        let purchases = self
            .list_page_by_store(&self.pool, store_id, customer_id, page)
            .await?;
        let total = self.count_by_store(&self.pool, store_id, customer_id).await?;
        Ok((purchases, total))
    }
}
