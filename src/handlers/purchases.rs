// src/handlers/purchases.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath, AppQuery},
        numeric::{lenient_bool, lenient_decimal},
    },
    config::AppState,
    middleware::store::StoreContext,
    models::{
        purchase::{
            CustomerPurchasesResponse, CustomerStatsResponse, PageRequest, PurchaseListResponse,
            PurchaseRequest, RegisterPurchaseResponse, StatsPeriod, StoreStatsResponse,
        },
        response::MessageResponse,
    },
};

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: RegisterPurchase
// ---
// Os campos numéricos aceitam número ou texto ("12.50").
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPurchasePayload {
    #[validate(length(min = 1, message = "O telefone do cliente é obrigatório."))]
    #[serde(default)]
    #[schema(example = "5511999998888")]
    pub customer_phone: String,

    #[validate(
        required(message = "O valor da compra é obrigatório."),
        custom(function = "validate_not_negative")
    )]
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = f64, example = 200.0)]
    pub purchase_amount: Option<Decimal>,

    // Ausente ou ilegível vale 0
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<f64>, example = 5.0)]
    pub cashback_percentage: Option<Decimal>,

    // Aceita true/false, "true"/"false" ou 1/0
    #[serde(default, deserialize_with = "lenient_bool")]
    #[schema(value_type = Option<bool>)]
    pub use_existing_cashback: Option<bool>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = Option<f64>, example = 0.0)]
    pub cashback_to_use: Option<Decimal>,

    // Nome antigo do campo de descrição, ainda aceito
    pub cashback_type: Option<String>,
    pub description: Option<String>,
}

impl RegisterPurchasePayload {
    fn into_request(self) -> PurchaseRequest {
        PurchaseRequest {
            customer_phone: self.customer_phone,
            purchase_amount: self.purchase_amount.unwrap_or_default(),
            cashback_percentage: self.cashback_percentage.unwrap_or_default(),
            use_existing_cashback: self.use_existing_cashback.unwrap_or(false),
            cashback_to_use: self.cashback_to_use.unwrap_or_default(),
            description: self.description.or(self.cashback_type),
        }
    }
}

// POST /api/purchases
#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Compras",
    request_body = RegisterPurchasePayload,
    responses(
        (status = 201, description = "Compra registrada e saldo atualizado", body = RegisterPurchaseResponse),
        (status = 400, description = "Dados inválidos ou saldo insuficiente"),
        (status = 404, description = "Cliente não encontrado nesta loja")
    ),
    params(
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn register_purchase(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppJson(payload): AppJson<RegisterPurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let receipt = app_state
        .ledger
        .register_purchase(store.0, payload.into_request())
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterPurchaseResponse::from(receipt))))
}

// DELETE /api/purchases/{id}
#[utoipa::path(
    delete,
    path = "/api/purchases/{id}",
    tag = "Compras",
    responses(
        (status = 200, description = "Compra estornada", body = MessageResponse),
        (status = 400, description = "O estorno deixaria o saldo negativo"),
        (status = 404, description = "Compra não encontrada ou já estornada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da compra"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn reverse_purchase(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppPath(purchase_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.ledger.reverse_purchase(store.0, purchase_id).await?;

    Ok(Json(MessageResponse::ok("Compra estornada com sucesso.")))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPurchasesQuery {
    /// Página (começa em 1)
    pub page: Option<i64>,
    /// Itens por página (máx. 100)
    pub limit: Option<i64>,
    pub customer_id: Option<Uuid>,
}

// GET /api/purchases
#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = "Compras",
    responses(
        (status = 200, description = "Compras ativas da loja, mais recentes primeiro", body = PurchaseListResponse)
    ),
    params(
        ListPurchasesQuery,
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppQuery(query): AppQuery<ListPurchasesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .purchase_service
        .list_purchases(store.0, query.customer_id, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(Json(PurchaseListResponse::from(page)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerPurchasesQuery {
    pub customer_phone: Option<String>,
    pub customer_name: Option<String>,
}

// GET /api/purchases/customer
#[utoipa::path(
    get,
    path = "/api/purchases/customer",
    tag = "Compras",
    responses(
        (status = 200, description = "Histórico do cliente com totais", body = CustomerPurchasesResponse),
        (status = 400, description = "Telefone e nome ausentes"),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        CustomerPurchasesQuery,
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn customer_purchases(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppQuery(query): AppQuery<CustomerPurchasesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state
        .purchase_service
        .customer_purchases(
            store.0,
            query.customer_phone.as_deref(),
            query.customer_name.as_deref(),
        )
        .await?;

    Ok(Json(CustomerPurchasesResponse::from(history)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// week | month | year | all (padrão: month)
    #[param(value_type = Option<String>)]
    pub period: Option<StatsPeriod>,
}

// GET /api/purchases/stats
#[utoipa::path(
    get,
    path = "/api/purchases/stats",
    tag = "Compras",
    responses(
        (status = 200, description = "Totais da loja no período", body = StoreStatsResponse)
    ),
    params(
        StatsQuery,
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn store_stats(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppQuery(query): AppQuery<StatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state
        .purchase_service
        .store_stats(store.0, query.period.unwrap_or_default())
        .await?;

    Ok(Json(StoreStatsResponse { success: true, stats }))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerStatsQuery {
    pub customer_phone: Option<String>,
}

// GET /api/purchases/customer-stats
#[utoipa::path(
    get,
    path = "/api/purchases/customer-stats",
    tag = "Compras",
    responses(
        (status = 200, description = "Totais do cliente", body = CustomerStatsResponse),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        CustomerStatsQuery,
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn customer_stats(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppQuery(query): AppQuery<CustomerStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let customer_stats = app_state
        .purchase_service
        .customer_stats(store.0, query.customer_phone.as_deref())
        .await?;

    Ok(Json(CustomerStatsResponse { success: true, customer_stats }))
}
