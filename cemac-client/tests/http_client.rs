// cemac-client/tests/http_client.rs
// Client behaviour against an in-process API double

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use cemac_client::{
    AlertApi, AuthService, ClientConfig, ClientError, CredentialStorage, CustomerApi, CemacClient,
    SalesApi, SharedToken,
};
use serde_json::{Value, json};
use shared::models::{AlertPriority, AlertStatus};
use shared::request::PageQuery;
use tempfile::TempDir;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h == "Bearer secret-token")
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "papeleria" {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "token": "secret-token",
                "user": {"id": "u1", "email": body["email"], "name": "Caja", "role": "vendedor"}
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Credenciales inválidas"})),
        )
    }
}

async fn slow_login() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({}))
}

async fn sales(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Token inválido o expirado"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "sales": [{
                "id": "s1", "cliente": "Ana", "vendedor": "Caja",
                "products": [], "total": 208.8, "status": "completada",
                "createdAt": "2024-05-01T10:00:00Z"
            }],
            "total": 42
        })),
    )
}

async fn delete_customer(Path(id): Path<String>) -> StatusCode {
    if id == "c1" || id == "fs/c1?x" {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

fn alert_json(status: &str) -> Value {
    json!({
        "id": "a1", "type": "stock_bajo", "priority": "alta", "status": status,
        "productId": "p1", "productName": "Cuaderno", "stock": 3,
        "message": "Cuaderno: quedan 3 unidades",
        "createdAt": 1714557600000i64, "updatedAt": "2024-05-01T10:00:00Z"
    })
}

async fn list_alerts() -> Json<Value> {
    Json(json!({ "data": [alert_json("pendiente")] }))
}

async fn update_alert(Path(id): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if id != "a1" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Alerta no encontrada"})));
    }
    let status = body["status"].as_str().unwrap_or_default().to_string();
    (StatusCode::OK, Json(json!({ "success": true, "data": alert_json(&status) })))
}

async fn spawn_api() -> String {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/slow/auth/login", post(slow_login))
        .route("/sales", get(sales))
        .route("/customers/{id}", delete(delete_customer))
        .route("/alerts", get(list_alerts))
        .route("/alerts/{id}", put(update_alert));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_login_then_authorized_call() {
    let base = spawn_api().await;
    let temp = TempDir::new().unwrap();
    let token = SharedToken::default();
    let client = Arc::new(CemacClient::from_config(&ClientConfig::new(&base), token.clone()).unwrap());
    let auth = AuthService::new(
        client.clone(),
        CredentialStorage::new(temp.path(), "session.json"),
        token.clone(),
    );

    // No token yet: the API answers 401 with a message
    match client.list_sales(PageQuery::default()).await {
        Err(ClientError::Unauthorized(msg)) => assert_eq!(msg, "Token inválido o expirado"),
        other => panic!("expected 401, got {:?}", other),
    }

    let user = auth.login("caja@cemac.mx", "papeleria").await.unwrap();
    assert_eq!(user.email, "caja@cemac.mx");
    assert!(auth.is_authenticated());
    assert_eq!(auth.current_user().unwrap().name, "Caja");

    let page = client.list_sales(PageQuery::default()).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, Some(42));
    assert_eq!(page.items[0].total, 208.8);

    // A fresh service restores the stored session
    let restored_token = SharedToken::default();
    let restored = AuthService::new(
        client.clone(),
        CredentialStorage::new(temp.path(), "session.json"),
        restored_token.clone(),
    );
    assert_eq!(restored_token.get().as_deref(), Some("secret-token"));
    restored.invalidate();
    assert!(!restored.is_authenticated());
    assert!(restored.current_user().is_none());
}

#[tokio::test]
async fn test_bad_password_surfaces_message() {
    let base = spawn_api().await;
    let temp = TempDir::new().unwrap();
    let token = SharedToken::default();
    let client = Arc::new(CemacClient::from_config(&ClientConfig::new(&base), token.clone()).unwrap());
    let auth = AuthService::new(client, CredentialStorage::new(temp.path(), "session.json"), token);

    let err = auth.login("caja@cemac.mx", "wrong").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Unauthorized: Credenciales inválidas");
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn test_login_timeout_maps_to_timeout() {
    let base = spawn_api().await;
    let config = ClientConfig::new(&base)
        .with_auth_url(format!("{}/auth/slow", base))
        .with_login_timeout(Duration::from_millis(200));
    let temp = TempDir::new().unwrap();
    let token = SharedToken::default();
    let client = Arc::new(CemacClient::from_config(&config, token.clone()).unwrap());
    let auth = AuthService::new(client, CredentialStorage::new(temp.path(), "session.json"), token);

    let err = auth.login("caja@cemac.mx", "papeleria").await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)), "got {:?}", err);
    assert_eq!(err.status_code(), Some(408));
}

#[tokio::test]
async fn test_empty_body_and_not_found() {
    let base = spawn_api().await;
    let client = CemacClient::from_config(&ClientConfig::new(&base), SharedToken::default()).unwrap();

    client.delete_customer("c1").await.unwrap();
    // reserved characters stay inside the one path segment
    client.delete_customer("fs/c1?x").await.unwrap();
    let err = client.delete_customer("c2").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_alert_endpoints() {
    let base = spawn_api().await;
    let client = CemacClient::from_config(&ClientConfig::new(&base), SharedToken::default()).unwrap();

    let alerts = client.list_alerts().await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].priority, AlertPriority::Alta);
    assert!(alerts[0].created_at.to_datetime().is_some());

    let updated = client.update_alert_status("a1", AlertStatus::EnProceso).await.unwrap();
    assert_eq!(updated.status, AlertStatus::EnProceso);

    let err = client.update_alert_status("zz", AlertStatus::Resuelta).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}
