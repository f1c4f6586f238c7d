// src/models/purchase.rs

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::customer::Customer;

pub const DEFAULT_DESCRIPTION: &str = "regular purchase";

// ---
// Compra: registro imutável; só o `is_active` muda (soft delete)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub store_id: Uuid,

    #[schema(value_type = f64, example = 200.0)]
    pub purchase_amount: Decimal,

    // 0 a 100, não é fração
    #[schema(value_type = f64, example = 5.0)]
    pub cashback_percentage: Decimal,

    // purchase_amount * cashback_percentage / 100, fixado na criação
    #[schema(value_type = f64, example = 10.0)]
    pub cashback_amount: Decimal,

    pub purchase_date: DateTime<Utc>,

    #[schema(example = "regular purchase")]
    pub description: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Pedido de registro de compra, já validado pela camada HTTP.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub customer_phone: String,
    pub purchase_amount: Decimal,
    pub cashback_percentage: Decimal,
    // Informativo: o resgate é descontado mesmo com a flag desligada.
    pub use_existing_cashback: bool,
    pub cashback_to_use: Decimal,
    pub description: Option<String>,
}

/// Resultado do registro: a compra criada e o cliente com o saldo novo.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub purchase: Purchase,
    pub customer: Customer,
    pub cashback_added: Decimal,
    pub cashback_used: Decimal,
}

// ---
// Paginação
// ---
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

// ---
// Estatísticas
// ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Week,
    #[default]
    Month,
    Year,
    All,
}

impl StatsPeriod {
    /// Início da janela. `Week` são os últimos 7 dias; `Month` e `Year` começam
    /// no primeiro dia do mês/ano corrente (UTC).
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            StatsPeriod::Week => Some(now - Duration::days(7)),
            StatsPeriod::Month => Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single(),
            StatsPeriod::Year => Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0).single(),
            StatsPeriod::All => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    #[schema(value_type = f64)]
    pub total_purchases: Decimal,
    #[schema(value_type = f64)]
    pub total_cashback: Decimal,
    pub purchase_count: usize,
}

impl PurchaseSummary {
    pub fn from_purchases(purchases: &[Purchase]) -> Self {
        purchases.iter().fold(Self::default(), |mut acc, p| {
            acc.total_purchases += p.purchase_amount;
            acc.total_cashback += p.cashback_amount;
            acc.purchase_count += 1;
            acc
        })
    }

    pub fn average_purchase(&self) -> Decimal {
        if self.purchase_count == 0 {
            return Decimal::ZERO;
        }
        self.total_purchases / Decimal::from(self.purchase_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    #[schema(value_type = f64)]
    pub total_purchases: Decimal,
    #[schema(value_type = f64)]
    pub total_cashback: Decimal,
    pub purchase_count: usize,
    pub unique_customers: usize,
    #[schema(value_type = f64)]
    pub average_purchase: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    #[schema(value_type = f64)]
    pub total_purchases: Decimal,
    #[schema(value_type = f64)]
    pub total_cashback: Decimal,
    pub purchase_count: usize,
    #[schema(value_type = f64)]
    pub average_purchase: Decimal,
    pub last_purchase_date: Option<DateTime<Utc>>,
    pub customer_name: Option<String>,
    pub customer_phone: String,
    #[schema(value_type = f64)]
    pub current_cashback_balance: Decimal,
}

#[derive(Debug, Clone)]
pub struct PurchasePage {
    pub purchases: Vec<Purchase>,
    pub total: i64,
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct CustomerHistory {
    pub customer: Customer,
    pub purchases: Vec<Purchase>,
    pub summary: PurchaseSummary,
}

// --- Respostas ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPurchaseResponse {
    pub success: bool,
    pub message: String,
    pub purchase: Purchase,
    #[schema(value_type = f64)]
    pub updated_customer_balance: Decimal,
    #[schema(value_type = f64)]
    pub cashback_added: Decimal,
    #[schema(value_type = f64)]
    pub cashback_used: Decimal,
}

impl From<PurchaseReceipt> for RegisterPurchaseResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        Self {
            success: true,
            message: "Compra registrada com sucesso.".to_string(),
            updated_customer_balance: receipt.customer.cashback_balance,
            purchase: receipt.purchase,
            cashback_added: receipt.cashback_added,
            cashback_used: receipt.cashback_used,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseListResponse {
    pub success: bool,
    pub purchases: Vec<Purchase>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}

impl From<PurchasePage> for PurchaseListResponse {
    fn from(page: PurchasePage) -> Self {
        Self {
            success: true,
            total_pages: page.page.total_pages(page.total),
            current_page: page.page.page,
            total: page.total,
            purchases: page.purchases,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPurchasesResponse {
    pub success: bool,
    pub customer: Customer,
    pub purchases: Vec<Purchase>,
    pub summary: PurchaseSummary,
}

impl From<CustomerHistory> for CustomerPurchasesResponse {
    fn from(history: CustomerHistory) -> Self {
        Self {
            success: true,
            customer: history.customer,
            purchases: history.purchases,
            summary: history.summary,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatsResponse {
    pub success: bool,
    pub stats: StoreStats,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStatsResponse {
    pub success: bool,
    pub customer_stats: CustomerStats,
}
