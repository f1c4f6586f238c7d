// src/services/store_service.rs

use std::sync::Arc;

use crate::{common::error::AppError, db::StoreDirectory, models::store::Store};

#[derive(Clone)]
pub struct StoreService {
    stores: Arc<dyn StoreDirectory>,
}

impl StoreService {
    pub fn new(stores: Arc<dyn StoreDirectory>) -> Self {
        Self { stores }
    }

    /// Lista pública (id + nome) para a página de consulta de saldo.
    pub async fn list_stores(&self) -> Result<Vec<Store>, AppError> {
        self.stores.list_stores().await
    }
}
