// src/db/traits.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        customer::{Customer, NewCustomer},
        purchase::{PageRequest, Purchase},
        store::Store,
    },
};

/// Contrato do armazenamento de clientes consumido pelo ledger e pelos serviços.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_active_by_phone_and_store(
        &self,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError>;

    /// Inclui clientes desativados (usado para detectar telefone duplicado).
    async fn find_by_phone_and_store(
        &self,
        phone: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError>;

    async fn find_active_by_name_and_store(
        &self,
        name: &str,
        store_id: Uuid,
    ) -> Result<Option<Customer>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError>;

    /// Ativos, mais recentes primeiro.
    async fn list_active_by_store(&self, store_id: Uuid) -> Result<Vec<Customer>, AppError>;

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, AppError>;

    /// Grava nome, saldo e flag de ativo de um cliente existente.
    async fn save(&self, customer: &Customer) -> Result<Customer, AppError>;
}

/// Contrato do armazenamento de compras.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Insere a compra; se já existir, só a flag `is_active` é atualizada.
    async fn save(&self, purchase: &Purchase) -> Result<Purchase, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>, AppError>;

    /// Compras ativas do cliente, mais recentes primeiro.
    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Purchase>, AppError>;

    async fn list_by_store(
        &self,
        store_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Purchase>, AppError>;

    /// Uma página de compras ativas e o total sem paginação.
    async fn page_by_store(
        &self,
        store_id: Uuid,
        customer_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<Purchase>, i64), AppError>;
}

#[async_trait]
pub trait StoreDirectory: Send + Sync {
    async fn list_stores(&self) -> Result<Vec<Store>, AppError>;
}
