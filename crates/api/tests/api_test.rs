//! Router tests driven through `tower::ServiceExt::oneshot` on in-memory SQLite.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use leavedesk_api::{AppState, create_router};
use leavedesk_core::auth::hash_password;
use leavedesk_core::balance::LeavePolicy;
use leavedesk_core::storage::{StorageConfig, StorageProvider, StorageService};
use leavedesk_db::UserRepository;
use leavedesk_db::migration::Migrator;
use leavedesk_db::repositories::CreateUserInput;
use leavedesk_shared::{JwtConfig, JwtService, Role};

const PASSWORD: &str = "Secret123";

struct TestApp {
    router: Router,
    jwt: Arc<JwtService>,
    admin_id: Uuid,
    employee_id: Uuid,
}

impl TestApp {
    async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options).await.expect("sqlite");
        Migrator::up(&db, None).await.expect("migrate");

        let users = UserRepository::new(db.clone());
        let hash = hash_password(PASSWORD).expect("hash");
        let mut ids = Vec::new();
        for (email, role) in [
            ("admin@example.com", Role::Admin),
            ("employee@example.com", Role::Employee),
        ] {
            let created = users
                .create(
                    CreateUserInput {
                        email: email.to_string(),
                        password_hash: hash.clone(),
                        first_name: "Test".to_string(),
                        last_name: role.as_str().to_string(),
                        role,
                        hire_date: None,
                    },
                    LeavePolicy::default(),
                )
                .await
                .expect("user");
            ids.push(created.user.id);
        }

        let root = std::env::temp_dir().join(format!("leavedesk-api-{}", Uuid::new_v4()));
        let storage = StorageService::from_config(StorageConfig::new(StorageProvider::local_fs(
            root,
        )))
        .expect("storage");

        let jwt = Arc::new(JwtService::new(JwtConfig {
            secret: "api-test-secret".to_string(),
            access_token_expires_secs: 3600,
        }));
        let state = AppState {
            db: Arc::new(db),
            jwt_service: Arc::clone(&jwt),
            storage: Some(Arc::new(storage)),
            policy: LeavePolicy::default(),
        };

        Self {
            router: create_router(state),
            jwt,
            admin_id: ids[0],
            employee_id: ids[1],
        }
    }

    fn token(&self, user_id: Uuid, role: Role) -> String {
        self.jwt.generate_access_token(user_id, role).unwrap()
    }

    fn admin(&self) -> String {
        self.token(self.admin_id, Role::Admin)
    }

    fn employee(&self) -> String {
        self.token(self.employee_id, Role::Employee)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.json("GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "local");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "employee@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "employee");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = app.json("GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["@id"], format!("/api/users/{}", app.employee_id));
    assert_eq!(me["@type"], "User");
    assert!(me.get("passwordHash").is_none());

    let (status, body) = app
        .json(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "employee@example.com", "password": "wrong-pass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_missing_or_bad_token() {
    let app = TestApp::new().await;

    let (status, body) = app.json("GET", "/api/leaves", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app
        .json("GET", "/api/leaves", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_employee_cannot_manage_balances() {
    let app = TestApp::new().await;
    let employee = app.employee();

    let (status, body) = app
        .json(
            "POST",
            "/api/leave_balances",
            Some(&employee),
            Some(json!({ "user": format!("/api/users/{}", app.employee_id), "year": 2024 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_carry_over_and_guarded_update() {
    let app = TestApp::new().await;
    let admin = app.admin();
    let user = format!("/api/users/{}", app.employee_id);

    let (status, created) = app
        .json(
            "POST",
            "/api/leave_balances",
            Some(&admin),
            Some(json!({ "user": user, "year": 2024 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["remainingPaidLeave"], 22);
    assert_eq!(created["user"], user);

    let (status, result) = app
        .json(
            "POST",
            "/api/leave_balances/carry_over",
            Some(&admin),
            Some(json!({ "user": user, "fromYear": 2024, "days": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["from"]["remainingPaidLeave"], 17);
    assert_eq!(result["from"]["carriedOverToNextYear"], 5);
    assert_eq!(result["to"]["year"], 2025);
    assert_eq!(result["to"]["carriedOverFromPreviousYear"], 5);
    assert_eq!(result["to"]["remainingPaidLeave"], 27);
    assert_eq!(result["discardedDays"], 0);

    let (status, updated) = app
        .json(
            "PUT",
            created["@id"].as_str().unwrap(),
            Some(&admin),
            Some(json!({ "remainingPaidLeave": 100, "carriedOverToNextYear": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["remainingPaidLeave"], 17);
    assert_eq!(updated["carriedOverToNextYear"], 3);
    assert_eq!(updated["nextYear"]["carriedOverFromPreviousYear"], 3);
    assert_eq!(updated["nextYear"]["remainingPaidLeave"], 25);
    assert_eq!(updated["discardedDays"], 0);

    let (status, page) = app
        .json(
            "GET",
            &format!("/api/leave_balances?user={user}&year=2025"),
            Some(&app.employee()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["@type"], "hydra:Collection");
    assert_eq!(page["hydra:totalItems"], 1);
    assert_eq!(page["member"][0]["year"], 2025);
}

#[tokio::test]
async fn test_carry_over_past_last_year_is_a_validation_error() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            "POST",
            "/api/leave_balances/carry_over",
            Some(&app.admin()),
            Some(json!({
                "user": app.employee_id.to_string(),
                "fromYear": i32::MAX,
                "days": 1
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_deduct_beyond_balance_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin();
    let user = app.employee_id.to_string();

    app.json(
        "POST",
        "/api/leave_balances",
        Some(&admin),
        Some(json!({ "user": user, "year": 2024, "monthsWorked": 1 })),
    )
    .await;

    let (status, body) = app
        .json(
            "POST",
            "/api/leave_balances/deduct",
            Some(&admin),
            Some(json!({ "user": user, "year": 2024, "days": 3, "type": "Congé payé" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INSUFFICIENT_BALANCE");

    let (status, body) = app
        .json(
            "POST",
            "/api/leave_balances/deduct",
            Some(&admin),
            Some(json!({ "user": user, "year": 2024, "days": 2, "type": "Congé payé" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"]["remainingPaidLeave"], 0);
    assert_eq!(body["deduction"]["pool"], "paid");
    assert_eq!(body["deduction"]["fromCurrentYear"], 2);
}

#[tokio::test]
async fn test_leave_approval_flow() {
    let app = TestApp::new().await;
    let admin = app.admin();
    let employee = app.employee();

    app.json(
        "POST",
        "/api/leave_balances",
        Some(&admin),
        Some(json!({ "user": app.employee_id.to_string(), "year": 2024 })),
    )
    .await;

    let (status, leave) = app
        .json(
            "POST",
            "/api/leaves",
            Some(&employee),
            Some(json!({
                "type": "Congé payé",
                "startDate": "2024-03-04",
                "endDate": "2024-03-08",
                "reason": "Vacances"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(leave["status"], "En attente");
    assert_eq!(leave["user"], format!("/api/users/{}", app.employee_id));
    let leave_iri = leave["@id"].as_str().unwrap().to_string();

    let (status, _) = app
        .json(
            "PUT",
            &format!("{leave_iri}/status"),
            Some(&employee),
            Some(json!({ "status": "Approuvé" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, decided) = app
        .json(
            "PUT",
            &format!("{leave_iri}/status"),
            Some(&admin),
            Some(json!({ "status": "Approuvé" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["status"], "Approuvé");
    assert_eq!(decided["workingDays"], 5);

    let (status, body) = app
        .json(
            "PUT",
            &format!("{leave_iri}/status"),
            Some(&admin),
            Some(json!({ "status": "Rejeté" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BUSINESS_RULE_VIOLATION");

    let (_, balances) = app
        .json("GET", "/api/leave_balances?year=2024", Some(&employee), None)
        .await;
    assert_eq!(balances["hydra:member"][0]["remainingPaidLeave"], 17);

    let (status, _) = app.json("DELETE", &leave_iri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_employee_sees_only_own_leaves() {
    let app = TestApp::new().await;
    let admin = app.admin();

    let (_, leave) = app
        .json(
            "POST",
            "/api/leaves",
            Some(&admin),
            Some(json!({
                "user": format!("/api/users/{}", app.admin_id),
                "type": "Congé sans solde",
                "startDate": "2024-03-04",
                "endDate": "2024-03-04"
            })),
        )
        .await;

    let (status, page) = app
        .json("GET", "/api/leaves", Some(&app.employee()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalItems"], 0);

    let (status, _) = app
        .json(
            "GET",
            leave["@id"].as_str().unwrap(),
            Some(&app.employee()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_certificate_round_trip() {
    let app = TestApp::new().await;
    let employee = app.employee();

    let (_, leave) = app
        .json(
            "POST",
            "/api/leaves",
            Some(&employee),
            Some(json!({
                "type": "Congé maladie",
                "startDate": "2024-03-04",
                "endDate": "2024-03-05"
            })),
        )
        .await;
    let certificate_uri = format!("{}/certificate", leave["@id"].as_str().unwrap());

    let boundary = "leavedesk-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"arret maladie.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         %PDF-1.4 test\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri(&certificate_uri)
        .header(header::AUTHORIZATION, format!("Bearer {employee}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, uploaded) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(uploaded["certificateName"], "arret maladie.pdf");
    assert_eq!(uploaded["certificate"], certificate_uri);

    let request = Request::builder()
        .uri(&certificate_uri)
        .header(header::AUTHORIZATION, format!("Bearer {employee}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"arret maladie.pdf\"; filename*=UTF-8''arret%20maladie.pdf"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"%PDF-1.4 test");
}

#[tokio::test]
async fn test_certificate_missing_is_not_found() {
    let app = TestApp::new().await;
    let employee = app.employee();

    let (_, leave) = app
        .json(
            "POST",
            "/api/leaves",
            Some(&employee),
            Some(json!({
                "type": "Congé maladie",
                "startDate": "2024-03-04",
                "endDate": "2024-03-05"
            })),
        )
        .await;

    let (status, body) = app
        .json(
            "GET",
            &format!("{}/certificate", leave["@id"].as_str().unwrap()),
            Some(&employee),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}
