// src/routes.rs

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

pub fn app(app_state: AppState) -> Router {
    // Rotas da loja (exigem x-store-id, lido pelo extrator StoreContext)
    let purchase_routes = Router::new()
        .route(
            "/",
            get(handlers::purchases::list_purchases).post(handlers::purchases::register_purchase),
        )
        .route("/{id}", delete(handlers::purchases::reverse_purchase))
        .route("/customer", get(handlers::purchases::customer_purchases))
        .route("/stats", get(handlers::purchases::store_stats))
        .route("/customer-stats", get(handlers::purchases::customer_stats));

    let customer_routes = Router::new()
        .route(
            "/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route("/search", get(handlers::customers::search_customer))
        .route(
            "/{id}",
            put(handlers::customers::update_customer).delete(handlers::customers::delete_customer),
        );

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/cashback", get(handlers::customers::cashback_balance))
        .route("/api/stores", get(handlers::stores::list_stores))
        .nest("/api/purchases", purchase_routes)
        .nest("/api/customers", customer_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{db::memory::MemoryStore, services::LedgerService};

    fn test_app() -> (Arc<MemoryStore>, Router) {
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(LedgerService::new(store.clone(), store.clone()));
        let state = AppState::with_stores(ledger, store.clone(), store.clone(), store.clone());
        (store, app(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, store_id: Uuid, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-store-id", store_id.to_string())
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, store_id: Option<Uuid>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(id) = store_id {
            builder = builder.header("x-store-id", id.to_string());
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_, app) = test_app();
        let response = app.oneshot(get_request("/api/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn store_routes_require_store_header() {
        let (_, app) = test_app();
        let (status, body) = send(&app, get_request("/api/customers", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn purchase_flow_over_http() {
        let (store, app) = test_app();
        let store_id = store.add_store("Padaria").id;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/customers", store_id, json!({ "name": "Ana", "phoneNumber": "(11) 5555-0000" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["customer"]["phoneNumber"], json!("1155550000"));

        // 200 a 5% => 10 de cashback
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/purchases",
                store_id,
                json!({ "customerPhone": "1155550000", "purchaseAmount": "200", "cashbackPercentage": 5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["cashbackAdded"], json!(10.0));
        assert_eq!(body["updatedCustomerBalance"], json!(10.0));
        let purchase_id = body["purchase"]["id"].as_str().unwrap().to_string();

        // Resgate maior que o saldo
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/purchases",
                store_id,
                json!({ "customerPhone": "1155550000", "purchaseAmount": 10, "useExistingCashback": true, "cashbackToUse": 11 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        let (status, body) = send(
            &app,
            get_request(&format!("/api/cashback?storeId={store_id}&phoneNumber=1155550000"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["balance"], json!(10.0));

        let uri = format!("/api/purchases/{purchase_id}");
        let (status, _) = send(&app, json_request("DELETE", &uri, store_id, json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, json_request("DELETE", &uri, store_id, json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, get_request("/api/purchases/stats?period=all", Some(store_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["purchaseCount"], json!(0));
    }

    #[tokio::test]
    async fn validation_errors_carry_field_details() {
        let (store, app) = test_app();
        let store_id = store.add_store("Padaria").id;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/purchases", store_id, json!({ "customerPhone": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["purchase_amount"].is_array());
    }

    #[tokio::test]
    async fn malformed_requests_get_the_standard_error_body() {
        let (store, app) = test_app();
        let store_id = store.add_store("Padaria").id;

        // Tipo errado no JSON
        let (status, body) = send(
            &app,
            json_request("POST", "/api/purchases", store_id, json!({ "customerPhone": 111, "purchaseAmount": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].is_string());

        // JSON quebrado
        let request = Request::builder()
            .method("POST")
            .uri("/api/customers")
            .header("x-store-id", store_id.to_string())
            .header("content-type", "application/json")
            .body(Body::from("{\"phoneNumber\": "))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        // Query e rota inválidas
        let (status, body) = send(&app, get_request("/api/purchases/stats?period=decada", Some(store_id))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        let (status, body) = send(&app, json_request("DELETE", "/api/purchases/nao-e-uuid", store_id, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn textual_flag_is_accepted() {
        let (store, app) = test_app();
        let store_id = store.add_store("Padaria").id;
        store.add_customer(store_id, "111", dec!(20));

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/purchases",
                store_id,
                json!({ "customerPhone": "111", "purchaseAmount": 100, "useExistingCashback": "true", "cashbackToUse": 10 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["cashbackUsed"], json!(10.0));
        assert_eq!(body["updatedCustomerBalance"], json!(10.0));
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let (store, app) = test_app();
        let store_id = store.add_store("Padaria").id;
        store.add_customer(Uuid::new_v4(), "999", dec!(5));

        let (status, _) = send(
            &app,
            json_request("POST", "/api/purchases", store_id, json!({ "customerPhone": "999", "purchaseAmount": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stores_are_listed_publicly() {
        let (store, app) = test_app();
        store.add_store("Padaria");

        let (status, body) = send(&app, get_request("/api/stores", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stores"][0]["name"], json!("Padaria"));
    }
}
