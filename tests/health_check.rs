use actix_web::{test, App, web};
use nomadgo_auth::{configure, AppState, Settings};

#[actix_web::test]
async fn test_health_check() {
    let config = Settings::new_for_test().expect("Failed to load test config");
    let state = AppState::new(config).await.expect("Failed to build state");

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure)
    ).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json, serde_json::json!({ "status": "ok" }));
}

#[actix_web::test]
async fn test_health_check_handler_standalone() {
    // Liveness does not depend on application state.
    let app = test::init_service(
        App::new().route("/api/health", web::get().to(nomadgo_auth::health_check))
    ).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}
