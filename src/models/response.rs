// src/models/response.rs

use serde::Serialize;
use utoipa::ToSchema;

// Resposta mínima para operações sem corpo (ex: exclusões)
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}
