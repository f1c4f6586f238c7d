// src/models/customer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Cliente (um telefone dentro de uma loja)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    pub store_id: Uuid,

    #[schema(example = "Maria da Silva")]
    pub name: Option<String>,

    // Sempre só dígitos (ver `normalize_phone`)
    #[schema(example = "5511999998888")]
    pub phone_number: String,

    // Nunca fica negativo; só o ledger mexe aqui.
    #[schema(value_type = f64, example = 42.5)]
    pub cashback_balance: Decimal,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn belongs_to(&self, store_id: Uuid) -> bool {
        self.store_id == store_id
    }
}

// Dados para cadastrar um cliente novo (saldo começa em zero)
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub store_id: Uuid,
    pub name: Option<String>,
    pub phone_number: String,
}

/// Forma canônica do telefone: remove tudo que não for dígito.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

// Consulta pública de saldo
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashbackBalance {
    pub store_id: Uuid,
    pub phone_number: String,
    #[schema(value_type = f64)]
    pub balance: Decimal,
    pub customer_name: Option<String>,
}

// --- Respostas ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub customer: Customer,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListResponse {
    pub success: bool,
    pub customers: Vec<Customer>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashbackBalanceResponse {
    pub success: bool,
    pub data: CashbackBalance,
}
