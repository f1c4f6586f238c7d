// src/db/customer_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::traits::CustomerStore,
    models::customer::{Customer, NewCustomer},
};

const CUSTOMER_COLUMNS: &str = "id, store_id, name, phone_number, cashback_balance, is_active, created_at, updated_at";

// O repositório de clientes, responsável pela tabela 'customers'
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active_by_phone_and_store<'e, E>(
        &self,
        executor: E,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE phone_number = $1 AND store_id = $2 AND is_active = TRUE"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(phone)
            .bind(store_id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    /// Mesma busca, mas trava a linha até o fim da transação (SELECT ... FOR UPDATE).
    pub async fn find_active_by_phone_for_update<'e, E>(
        &self,
        executor: E,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE phone_number = $1 AND store_id = $2 AND is_active = TRUE \
             FOR UPDATE"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(phone)
            .bind(store_id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn find_by_phone_and_store<'e, E>(
        &self,
        executor: E,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone_number = $1 AND store_id = $2"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(phone)
            .bind(store_id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn find_active_by_name_and_store<'e, E>(
        &self,
        executor: E,
        name: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE name = $1 AND store_id = $2 AND is_active = TRUE \
             ORDER BY created_at DESC LIMIT 1"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(name)
            .bind(store_id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 FOR UPDATE");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn list_active_by_store<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE store_id = $1 AND is_active = TRUE \
             ORDER BY created_at DESC"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(store_id)
            .fetch_all(executor)
            .await?;
        Ok(customers)
    }

    pub async fn create<'e, E>(&self, executor: E, customer: &NewCustomer) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO customers (store_id, name, phone_number) \
             VALUES ($1, $2, $3) \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&sql)
            .bind(customer.store_id)
            .bind(customer.name.as_deref())
            .bind(&customer.phone_number)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // Converte violação de chave única (loja + telefone) num erro amigável
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::PhoneAlreadyRegistered;
                    }
                }
                e.into()
            })
    }

    pub async fn update<'e, E>(&self, executor: E, customer: &Customer) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE customers \
             SET name = $2, cashback_balance = $3, is_active = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&sql)
            .bind(customer.id)
            .bind(customer.name.as_deref())
            .bind(customer.cashback_balance)
            .bind(customer.is_active)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }
}

// Fora de transação, o contrato roda direto na pool.
#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn find_active_by_phone_and_store(
        &self,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        self.find_active_by_phone_and_store(&self.pool, phone, store_id).await
    }

    async fn find_by_phone_and_store(
        &self,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        self.find_by_phone_and_store(&self.pool, phone, store_id).await
    }

    async fn find_active_by_name_and_store(
        &self,
        name: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        self.find_active_by_name_and_store(&self.pool, name, store_id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        self.find_by_id(&self.pool, id).await
    }

    async fn list_active_by_store(&self, store_id: Uuid) -> Result<Vec<Customer>, AppError> {
        self.list_active_by_store(&self.pool, store_id).await
    }

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, AppError> {
        self.create(&self.pool, &customer).await
    }

    async fn save(&self, customer: &Customer) -> Result<Customer, AppError> {
        self.update(&self.pool, customer).await
    }
}
