// src/common/error.rs

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Todos os erros do domínio e da infraestrutura num só lugar.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("O valor de cashback a usar é maior que o saldo disponível.")]
    InsufficientCashback,

    #[error("O estorno deixaria o saldo de cashback do cliente negativo.")]
    NegativeBalance,

    #[error("Este número de telefone já está cadastrado.")]
    PhoneAlreadyRegistered,

    #[error("Cliente não encontrado.")]
    CustomerNotFound,

    #[error("Compra não encontrada.")]
    PurchaseNotFound,

    #[error("O cabeçalho X-Store-ID é obrigatório.")]
    MissingStoreContext,

    #[error("Cabeçalho X-Store-ID inválido (não é um UUID).")]
    InvalidStoreContext,

    #[error("Corpo da requisição inválido: {}", .0.body_text())]
    InvalidJsonBody(#[from] JsonRejection),

    #[error("Parâmetros de consulta inválidos: {}", .0.body_text())]
    InvalidQuery(#[from] QueryRejection),

    #[error("Parâmetro de rota inválido: {}", .0.body_text())]
    InvalidPath(#[from] PathRejection),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` guarda o contexto de falhas que não são do domínio.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::InsufficientCashback
            | AppError::NegativeBalance
            | AppError::PhoneAlreadyRegistered
            | AppError::MissingStoreContext
            | AppError::InvalidStoreContext
            | AppError::InvalidJsonBody(_)
            | AppError::InvalidQuery(_)
            | AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::CustomerNotFound | AppError::PurchaseNotFound => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Atalho para um erro de validação preso a um único campo do payload.
    pub fn field(field: &'static str, code: &'static str, message: &str) -> Self {
        let mut error = validator::ValidationError::new(code);
        error.message = Some(message.to_string().into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "success": false,
                "message": "Um ou mais campos são inválidos.",
                "details": details,
            }));
            return (status, body).into_response();
        }

        let message = match &self {
            // O cliente recebe uma mensagem genérica; o detalhe fica no log.
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                tracing::error!("Erro Interno do Servidor: {:?}", self);
                "Ocorreu um erro inesperado.".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "success": false, "message": message }));
        (status, body).into_response()
    }
}
