use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use nomadgo_auth::{
    auth::{AuthService, LoginRequest, PasswordHasher, RegisterRequest, TokenCodec},
    error::{AppError, AuthError},
    MemoryUserStore, UserStore,
};

fn auth_service(store: Arc<dyn UserStore>, ttl: Duration) -> AuthService {
    AuthService::new(
        store,
        TokenCodec::new("test_secret", Algorithm::HS256, ttl),
        PasswordHasher::new(4),
    )
}

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Ana".to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
    }
}

#[tokio::test]
async fn test_auth_flow() {
    let service = auth_service(Arc::new(MemoryUserStore::new()), Duration::hours(24));

    let registered = service.register(register_request("a@x.com")).await.unwrap();
    let logged_in = service
        .login(LoginRequest { email: "a@x.com".to_string(), password: "secret1".to_string() })
        .await
        .unwrap();
    assert_eq!(logged_in.user, registered.user);

    for token in [&registered.token, &logged_in.token] {
        let user = service.resolve_caller(token).await.unwrap();
        assert_eq!(user.id, registered.user.id);
        assert_eq!(user.email, "a@x.com");
    }
}

#[tokio::test]
async fn test_every_registration_round_trips() {
    let service = auth_service(Arc::new(MemoryUserStore::new()), Duration::hours(1));

    for i in 0..5 {
        let registered = service
            .register(register_request(&format!("user{}@example.org", i)))
            .await
            .unwrap();
        let caller = service.resolve_caller(&registered.token).await.unwrap();
        assert_eq!(caller.id, registered.user.id);
    }
}

#[tokio::test]
async fn test_email_domain_case_is_ignored() {
    let service = auth_service(Arc::new(MemoryUserStore::new()), Duration::hours(1));
    service.register(register_request("ana@Example.com")).await.unwrap();

    let err = service.register(register_request("ana@EXAMPLE.COM")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let logged_in = service
        .login(LoginRequest { email: "ana@example.COM".to_string(), password: "secret1".to_string() })
        .await
        .unwrap();
    assert_eq!(logged_in.user.email, "ana@example.com");
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    let expired_issuer = auth_service(store.clone(), Duration::seconds(-1));
    let service = auth_service(store, Duration::hours(1));

    let registered = expired_issuer.register(register_request("a@x.com")).await.unwrap();

    match service.resolve_caller(&registered.token).await {
        Err(AppError::AuthError(AuthError::TokenExpired)) => (),
        other => panic!("Expected expired token error, got {:?}", other.map(|u| u.id)),
    }
}

#[tokio::test]
async fn test_invalid_token() {
    let service = auth_service(Arc::new(MemoryUserStore::new()), Duration::hours(1));

    match service.resolve_caller("invalid_token").await {
        Err(AppError::AuthError(AuthError::InvalidToken)) => (),
        _ => panic!("Expected invalid token error"),
    }
}
