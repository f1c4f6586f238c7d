// src/handlers/customers.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath, AppQuery},
    },
    config::AppState,
    middleware::store::StoreContext,
    models::{
        customer::{CashbackBalanceResponse, CustomerListResponse, CustomerResponse},
        response::MessageResponse,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[schema(example = "Maria da Silva")]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "O número de telefone é obrigatório."))]
    #[serde(default)]
    #[schema(example = "(11) 99999-8888")]
    pub phone_number: String,
}

// Só o nome pode ser alterado
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    pub name: Option<String>,
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Clientes",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrado com saldo zero", body = CustomerResponse),
        (status = 400, description = "Dados inválidos ou telefone já cadastrado")
    ),
    params(
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppJson(payload): AppJson<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .customer_service
        .add_customer(store.0, payload.name.as_deref(), &payload.phone_number)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CustomerResponse {
            success: true,
            message: Some("Cliente cadastrado com sucesso.".to_string()),
            customer,
        }),
    ))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Clientes",
    responses(
        (status = 200, description = "Clientes ativos da loja", body = CustomerListResponse)
    ),
    params(
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    store: StoreContext,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.list_customers(store.0).await?;
    Ok(Json(CustomerListResponse { success: true, customers }))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchCustomerQuery {
    #[serde(default)]
    pub phone_number: String,
}

// GET /api/customers/search
#[utoipa::path(
    get,
    path = "/api/customers/search",
    tag = "Clientes",
    responses(
        (status = 200, description = "Cliente encontrado", body = CustomerResponse),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        SearchCustomerQuery,
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn search_customer(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppQuery(query): AppQuery<SearchCustomerQuery>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .search_by_phone(store.0, &query.phone_number)
        .await?;

    Ok(Json(CustomerResponse { success: true, message: None, customer }))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Clientes",
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = CustomerResponse),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppPath(customer_id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .rename_customer(store.0, customer_id, payload.name.as_deref())
        .await?;

    Ok(Json(CustomerResponse {
        success: true,
        message: Some("Cliente atualizado com sucesso.".to_string()),
        customer,
    }))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Clientes",
    responses(
        (status = 200, description = "Cliente desativado", body = MessageResponse),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    store: StoreContext,
    AppPath(customer_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .customer_service
        .deactivate_customer(store.0, customer_id)
        .await?;

    Ok(Json(MessageResponse::ok("Cliente removido com sucesso.")))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CashbackLookupQuery {
    pub store_id: Option<Uuid>,
    pub phone_number: Option<String>,
}

// GET /api/cashback (pública, sem x-store-id)
#[utoipa::path(
    get,
    path = "/api/cashback",
    tag = "Público",
    responses(
        (status = 200, description = "Saldo de cashback do cliente", body = CashbackBalanceResponse),
        (status = 400, description = "Loja ou telefone ausentes"),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(CashbackLookupQuery)
)]
pub async fn cashback_balance(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<CashbackLookupQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(store_id), Some(phone)) = (query.store_id, query.phone_number) else {
        return Err(AppError::InvalidInput(
            "Informe a loja e o número de telefone.".into(),
        ));
    };

    let data = app_state.customer_service.cashback_balance(store_id, &phone).await?;
    Ok(Json(CashbackBalanceResponse { success: true, data }))
}
