// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Cashback API", description = "Clientes, compras e saldo de cashback por loja"),
    paths(
        // --- Compras ---
        handlers::purchases::register_purchase,
        handlers::purchases::reverse_purchase,
        handlers::purchases::list_purchases,
        handlers::purchases::customer_purchases,
        handlers::purchases::store_stats,
        handlers::purchases::customer_stats,

        // --- Clientes ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::search_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Público ---
        handlers::customers::cashback_balance,
        handlers::stores::list_stores,
    ),
    components(
        schemas(
            // --- Models ---
            models::customer::Customer,
            models::customer::CashbackBalance,
            models::purchase::Purchase,
            models::purchase::PurchaseSummary,
            models::purchase::StoreStats,
            models::purchase::CustomerStats,
            models::store::Store,

            // --- Respostas ---
            models::customer::CustomerResponse,
            models::customer::CustomerListResponse,
            models::customer::CashbackBalanceResponse,
            models::purchase::RegisterPurchaseResponse,
            models::purchase::PurchaseListResponse,
            models::purchase::CustomerPurchasesResponse,
            models::purchase::StoreStatsResponse,
            models::purchase::CustomerStatsResponse,
            models::store::StoreListResponse,
            models::response::MessageResponse,

            // --- Payloads ---
            handlers::purchases::RegisterPurchasePayload,
            handlers::customers::CreateCustomerPayload,
            handlers::customers::UpdateCustomerPayload,
        )
    ),
    tags(
        (name = "Compras", description = "Registro, estorno e histórico de compras"),
        (name = "Clientes", description = "Cadastro de clientes da loja"),
        (name = "Público", description = "Consulta de saldo e lista de lojas, sem cabeçalho de loja")
    )
)]
pub struct ApiDoc;
