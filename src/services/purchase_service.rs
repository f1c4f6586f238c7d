// src/services/purchase_service.rs

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerStore, PurchaseStore},
    models::{
        customer::{normalize_phone, Customer},
        purchase::{
            CustomerHistory, CustomerStats, PageRequest, Purchase, PurchasePage, PurchaseSummary,
            StatsPeriod, StoreStats,
        },
    },
};

// Consultas de histórico e estatísticas. Nada aqui altera saldo.
#[derive(Clone)]
pub struct PurchaseService {
    customers: Arc<dyn CustomerStore>,
    purchases: Arc<dyn PurchaseStore>,
}

impl PurchaseService {
    pub fn new(customers: Arc<dyn CustomerStore>, purchases: Arc<dyn PurchaseStore>) -> Self {
        Self { customers, purchases }
    }

    pub async fn list_purchases(
        &self,
        store_id: Uuid,
        customer_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<PurchasePage, AppError> {
        let (purchases, total) = self.purchases.page_by_store(store_id, customer_id, page).await?;
        Ok(PurchasePage { purchases, total, page })
    }

    /// Histórico de um cliente, buscado pelo telefone ou, na falta dele, pelo nome.
    pub async fn customer_purchases(
        &self,
        store_id: Uuid,
        phone: Option<&str>,
        name: Option<&str>,
    ) -> Result<CustomerHistory, AppError> {
        let phone = phone.map(normalize_phone).filter(|p| !p.is_empty());
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let customer = match (phone, name) {
            (Some(phone), _) => self.customers.find_active_by_phone_and_store(&phone, store_id).await?,
            (None, Some(name)) => self.customers.find_active_by_name_and_store(name, store_id).await?,
            (None, None) => {
                return Err(AppError::InvalidInput(
                    "Informe o telefone ou o nome do cliente.".into(),
                ));
            }
        }
        .ok_or(AppError::CustomerNotFound)?;

        let purchases = self.active_purchases_of(&customer).await?;
        let summary = PurchaseSummary::from_purchases(&purchases);
        Ok(CustomerHistory { customer, purchases, summary })
    }

    pub async fn store_stats(&self, store_id: Uuid, period: StatsPeriod) -> Result<StoreStats, AppError> {
        let since = period.since(Utc::now());
        let purchases = self.purchases.list_by_store(store_id, since).await?;

        let summary = PurchaseSummary::from_purchases(&purchases);
        let unique_customers = purchases
            .iter()
            .map(|p| p.customer_id)
            .collect::<HashSet<_>>()
            .len();

        Ok(StoreStats {
            average_purchase: summary.average_purchase(),
            total_purchases: summary.total_purchases,
            total_cashback: summary.total_cashback,
            purchase_count: summary.purchase_count,
            unique_customers,
        })
    }

    pub async fn customer_stats(&self, store_id: Uuid, phone: Option<&str>) -> Result<CustomerStats, AppError> {
        let phone = phone
            .map(normalize_phone)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::InvalidInput("O telefone do cliente é obrigatório.".into()))?;

        let customer = self
            .customers
            .find_active_by_phone_and_store(&phone, store_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let purchases = self.active_purchases_of(&customer).await?;
        let summary = PurchaseSummary::from_purchases(&purchases);

        Ok(CustomerStats {
            average_purchase: summary.average_purchase(),
            total_purchases: summary.total_purchases,
            total_cashback: summary.total_cashback,
            purchase_count: summary.purchase_count,
            // Lista vem ordenada da mais recente para a mais antiga
            last_purchase_date: purchases.first().map(|p| p.purchase_date),
            customer_name: customer.name,
            customer_phone: customer.phone_number,
            current_cashback_balance: customer.cashback_balance,
        })
    }

    async fn active_purchases_of(&self, customer: &Customer) -> Result<Vec<Purchase>, AppError> {
        let purchases = self.purchases.list_by_customer(customer.id).await?;
        Ok(purchases
            .into_iter()
            .filter(|p| p.store_id == customer.store_id)
            .collect())
    }
}
