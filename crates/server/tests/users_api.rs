use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;

use server::routes::{self, ServerState};
use service::directory::repository::mock::MockDirectory;
use service::directory::repository::Directory;

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

fn build_app() -> (Router, Arc<MockDirectory>) {
    let mock = Arc::new(MockDirectory::default());
    let directory: Arc<dyn Directory> = mock.clone();
    let app = routes::build_router(cors(), ServerState { directory });
    (app, mock)
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn patient_body(email: &str) -> Value {
    json!({
        "profile": {
            "fullName": "Ana Ruiz",
            "email": email,
            "birthDate": "1975-04-02"
        },
        "metadata": {
            "dni": "12345678",
            "clinicalProfile": {"allergies": ["penicillin"]}
        }
    })
}

#[tokio::test]
async fn create_patient_returns_created_account() {
    let (mut app, mock) = build_app();

    let resp = app.call(post("/api/users/patients", &patient_body("ana@example.com"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = read_json(resp).await;
    assert_eq!(body["data"]["email"], "ana@example.com");
    let password = body["data"]["temporaryPassword"].as_str().unwrap();
    assert!(password.starts_with("Pausiva-"));

    let id: uuid::Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();
    assert!(mock.identity_exists(id));
    assert!(mock.user_row_exists(id));
}

#[tokio::test]
async fn create_patient_rejects_invalid_payloads() {
    let (mut app, _mock) = build_app();

    let mut body = patient_body("not-an-email");
    let resp = app.call(post("/api/users/patients", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    body = patient_body("ana@example.com");
    body["profile"]["birthDate"] = json!("02-04-1975");
    let resp = app.call(post("/api/users/patients", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    body = patient_body("ana@example.com");
    body["metadata"]["dni"] = json!("  ");
    let resp = app.call(post("/api/users/patients", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn explicit_password_is_honored() {
    let (mut app, _mock) = build_app();

    let mut body = patient_body("ana@example.com");
    body["credentials"] = json!({"password": "hunter2-secret"});
    let resp = app.call(post("/api/users/patients", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["temporaryPassword"], "hunter2-secret");
}

#[tokio::test]
async fn duplicate_email_maps_to_conflict() {
    let (mut app, _mock) = build_app();

    let body = patient_body("dup@example.com");
    let resp = app.call(post("/api/users/patients", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.call(post("/api/users/patients", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn patient_row_failure_tears_down_account() {
    let (mut app, mock) = build_app();
    mock.fail_insert_patient.store(true, Ordering::SeqCst);

    let resp = app.call(post("/api/users/patients", &patient_body("ana@example.com"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Provisioned identity and profile row were rolled back.
    assert_eq!(mock.identity_count(), 0);
    assert_eq!(mock.delete_user_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.delete_identity_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn create_doctor_and_duplicate_cmp_conflict() {
    let (mut app, mock) = build_app();

    let body = json!({
        "profile": {"fullName": "Dr. Sofía León", "email": "sofia@example.com"},
        "metadata": {"cmp": "C-7788", "specialty": "Ginecología"}
    });
    let resp = app.call(post("/api/users/doctors", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same CMP, different email: role-row insert conflicts, account is
    // torn down, caller sees 409.
    let body = json!({
        "profile": {"fullName": "Dr. Iris Paz", "email": "iris@example.com"},
        "metadata": {"cmp": "C-7788", "specialty": "Endocrinología"}
    });
    let resp = app.call(post("/api/users/doctors", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(mock.identity_count(), 1);
}

#[tokio::test]
async fn list_patients_shapes_and_filters() {
    let (mut app, _mock) = build_app();

    let resp = app.call(post("/api/users/patients", &patient_body("ana@example.com"))).await.unwrap();
    let created = read_json(resp).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let resp = app.call(get("/api/users/patients")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["meta"]["entity"], "patient");
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["meta"]["limit"], 50);
    assert_eq!(body["data"][0]["id"].as_str().unwrap(), id);
    assert_eq!(body["data"][0]["type"], "patient");
    assert_eq!(body["data"][0]["profile"]["fullName"], "Ana Ruiz");
    assert_eq!(body["data"][0]["metadata"]["dni"], "12345678");

    // Fetch by id and a garbage limit that falls back to the default.
    let resp = app
        .call(get(&format!("/api/users/patients?id={id}&limit=nope")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Unknown id is a 404.
    let resp = app
        .call(get(&format!("/api/users/patients?id={}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_endpoint() {
    let (mut app, _mock) = build_app();
    let resp = app.call(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["status"], "ok");
}
