mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, ADMIN_USERNAME};

fn van(plate: &str) -> serde_json::Value {
    json!({
        "brand": "Ford",
        "model": "Transit",
        "license_plate": plate,
        "vehicle_type": "Van"
    })
}

fn driver_request(email: &str, license_number: &str) -> serde_json::Value {
    json!({
        "first_name": "Anna",
        "last_name": "Nowak",
        "license_number": license_number,
        "email": email,
        "password": "Kierowca#1"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/vehicles", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/vehicles", Some("not.a.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_returns_roles_and_rejects_bad_password() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": ADMIN_USERNAME, "password": "Admin#2026" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["roles"], json!(["Admin"]));

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": ADMIN_USERNAME, "password": "nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_creates_account_without_roles() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "username": "guest@fleetmaster.pl", "password": "Guest#123" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["roles"], json!([]));

    let token = app.login("guest@fleetmaster.pl", "Guest#123").await;
    let (status, _) = app.get("/api/vehicles", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/issues",
            Some(&token),
            json!({ "title": "Noise", "vehicle_id": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_vehicle_crud_is_admin_only_for_writes() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app.post("/api/vehicles", Some(&admin), van("wa 12345")).await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle = body["data"].clone();
    assert_eq!(vehicle["license_plate"], "WA 12345");
    assert_eq!(vehicle["is_operational"], true);
    let id = vehicle["id"].as_i64().unwrap();

    let (status, _) = app
        .post("/api/drivers", Some(&admin), driver_request("anna@fleetmaster.pl", "PL-100"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let driver = app.login("anna@fleetmaster.pl", "Kierowca#1").await;

    let (status, body) = app.get("/api/vehicles", Some(&driver)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.post("/api/vehicles", Some(&driver), van("KR 1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // is_operational no es editable por el cliente
    let (status, body) = app
        .put(
            &format!("/api/vehicles/{}", id),
            Some(&admin),
            json!({
                "brand": "Ford",
                "model": "Transit Custom",
                "license_plate": "WA 12345",
                "vehicle_type": "Van",
                "is_operational": false,
                "version": 1
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["model"], "Transit Custom");
    assert_eq!(body["data"]["is_operational"], true);
    assert_eq!(body["data"]["version"], 2);

    let (status, body) = app
        .put(
            &format!("/api/vehicles/{}", id),
            Some(&admin),
            json!({
                "brand": "Ford",
                "model": "Stale",
                "license_plate": "WA 12345",
                "vehicle_type": "Van",
                "version": 1
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = app.delete(&format!("/api/vehicles/{}", id), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/vehicles/{}", id), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_plate_and_invalid_body_are_validation_errors() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    app.post("/api/vehicles", Some(&admin), van("WA 12345")).await;
    let (status, body) = app.post("/api/vehicles", Some(&admin), van("WA 12345")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["code"], "DuplicateLicensePlate");

    let (status, body) = app
        .post(
            "/api/vehicles",
            Some(&admin),
            json!({ "brand": "", "model": "X", "license_plate": "!", "vehicle_type": "Van" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_weak_password_creates_nothing() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let mut request = driver_request("anna", "PL-100");
    request["password"] = json!("abc");
    let (status, body) = app.post("/api/drivers", Some(&admin), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let codes: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["code"].as_str())
        .collect();
    assert!(codes.contains(&"InvalidUserName"));
    assert!(codes.contains(&"PasswordTooShort"));
    assert!(codes.contains(&"PasswordRequiresUpper"));

    let (_, body) = app.get("/api/drivers", Some(&admin)).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_driver_update_checks_path_id_and_version() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (_, body) = app
        .post("/api/drivers", Some(&admin), driver_request("anna@fleetmaster.pl", "PL-100"))
        .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let update = json!({
        "id": id + 1,
        "first_name": "Anna",
        "last_name": "Nowak-Kowalska",
        "license_number": "PL-100",
        "status": "On route",
        "version": 1
    });
    let (status, _) = app.put(&format!("/api/drivers/{}", id), Some(&admin), update.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut update = update;
    update["id"] = json!(id);
    let (status, body) = app.put(&format!("/api/drivers/{}", id), Some(&admin), update.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "On route");

    let (status, _) = app.put(&format!("/api/drivers/{}", id), Some(&admin), update).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_driver_list_includes_assigned_vehicle() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (_, body) = app.post("/api/vehicles", Some(&admin), van("PO 4321")).await;
    let vehicle_id = body["data"]["id"].clone();

    let mut request = driver_request("anna@fleetmaster.pl", "PL-100");
    request["assigned_vehicle_id"] = vehicle_id.clone();
    let (status, _) = app.post("/api/drivers", Some(&admin), request).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get("/api/drivers", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["assigned_vehicle"]["id"], vehicle_id);
    assert_eq!(body[0]["assigned_vehicle"]["license_plate"], "PO 4321");
    assert_eq!(body[0]["status"], "Available");
}

#[tokio::test]
async fn test_me_without_driver_profile_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app.get("/api/drivers/me", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_trip_log_crud() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (_, body) = app.post("/api/vehicles", Some(&admin), van("GD 777")).await;
    let vehicle_id = body["data"]["id"].clone();
    let (_, body) = app
        .post("/api/drivers", Some(&admin), driver_request("anna@fleetmaster.pl", "PL-100"))
        .await;
    let driver_id = body["data"]["id"].clone();
    let driver = app.login("anna@fleetmaster.pl", "Kierowca#1").await;

    let log = json!({
        "date": "2026-03-02T08:00:00Z",
        "route_from": "Gdańsk",
        "route_to": "Warszawa",
        "distance_km": 340.5,
        "duration_minutes": 250,
        "driver_id": driver_id,
        "vehicle_id": vehicle_id
    });
    let (status, body) = app.post("/api/logs", Some(&driver), log.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["distance_km"], 340.5);
    let id = body["data"]["id"].as_i64().unwrap();

    let mut update = log.clone();
    update["route_to"] = json!("Łódź");
    update["version"] = json!(1);
    let (status, body) = app.put(&format!("/api/logs/{}", id), Some(&driver), update.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["route_to"], "Łódź");

    let (status, _) = app.put(&format!("/api/logs/{}", id), Some(&driver), update).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut negative = log.clone();
    negative["distance_km"] = json!(-1);
    let (status, _) = app.post("/api/logs", Some(&driver), negative).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut dangling = log;
    dangling["vehicle_id"] = json!(9999);
    let (status, _) = app.post("/api/logs", Some(&driver), dangling).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/logs/{}", id), Some(&driver)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/logs/{}", id), Some(&driver)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_issue_status_errors() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .patch("/api/issues/4242/status", Some(&admin), json!({ "status": "Resolved" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, body) = app.post("/api/vehicles", Some(&admin), van("WA 1")).await;
    let vehicle_id = body["data"]["id"].clone();
    let (status, body) = app
        .post(
            "/api/issues",
            Some(&admin),
            json!({ "title": "Wipers", "vehicle_id": vehicle_id, "priority": "urgent" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["code"], "InvalidIssuePriority");

    let (status, body) = app
        .post(
            "/api/issues",
            Some(&admin),
            json!({ "title": "Wipers", "vehicle_id": vehicle_id, "priority": "high" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["priority"], "High");
    assert_eq!(body["data"]["status"], "Reported");
    let issue_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .patch(
            &format!("/api/issues/{}/status", issue_id),
            Some(&admin),
            json!({ "status": "Closed" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["code"], "InvalidIssueStatus");
}
