use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenCodec;
use crate::config::Settings;
use crate::db::{User, UserStore};
use crate::error::{AppError, AuthError, DatabaseError};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already registered";

/// Account lifecycle: create, verify credentials, issue tokens and resolve
/// the caller behind a token. Holds no per-request state.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenCodec,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenCodec, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    pub fn from_settings(store: Arc<dyn UserStore>, config: &Settings) -> Result<Self, AppError> {
        Ok(Self::new(
            store,
            TokenCodec::from_settings(&config.auth)?,
            PasswordHasher::new(config.auth.bcrypt_cost),
        ))
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// The existence check and the insert are separate store calls; two
    /// concurrent registrations for one email can both pass the check unless
    /// the store carries a unique index.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        let request = request.validate()?;

        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.into()));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let user = User::new(request.name, request.email, password_hash);

        match self.store.insert(&user).await {
            Ok(()) => {}
            Err(DatabaseError::Duplicate) => {
                return Err(AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.into()));
            }
            Err(e) => return Err(e.into()),
        }

        let token = self.tokens.issue(&user.id)?;
        info!("Registered user {} ({})", user.id, user.email);

        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let request = request.validate()?;

        let user = match self.store.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                warn!("Login rejected for {}: unknown email", request.email);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.hasher.verify(&request.password, &user.password_hash).await? {
            warn!("Login rejected for {}: password mismatch", request.email);
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(&user.id)?;
        info!("User {} logged in", user.id);

        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    /// Returns the full record for the token's subject.
    pub async fn resolve_caller(&self, token: &str) -> Result<User, AppError> {
        let claims = self.tokens.decode(token).map_err(|e| {
            warn!("Token rejected: {:?}", e);
            e
        })?;

        self.store
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!("Token subject {} no longer exists", claims.sub);
                AuthError::UserNotFound.into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MockUserStore;
    use crate::db::MemoryUserStore;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;

    fn service_with(store: Arc<dyn UserStore>) -> AuthService {
        AuthService::new(
            store,
            TokenCodec::new("test_secret", Algorithm::HS256, Duration::hours(1)),
            PasswordHasher::new(4),
        )
    }

    fn ana() -> RegisterRequest {
        RegisterRequest {
            name: "Ana".into(),
            email: "a@x.com".into(),
            password: "secret1".into(),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_register_then_resolve() {
        let service = service_with(Arc::new(MemoryUserStore::new()));
        let registered = service.register(ana()).await.unwrap();

        assert!(!registered.user.id.is_empty());
        assert!(!registered.token.is_empty());

        let caller = service.resolve_caller(&registered.token).await.unwrap();
        assert_eq!(caller.id, registered.user.id);
        assert_eq!(caller.name, "Ana");
        assert_ne!(caller.password_hash, "secret1");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let service = service_with(Arc::new(MemoryUserStore::new()));
        service.register(ana()).await.unwrap();

        let again = RegisterRequest {
            name: "Someone Else".into(),
            password: "different".into(),
            ..ana()
        };
        let err = service.register(again).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == DUPLICATE_EMAIL_MESSAGE));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service_with(Arc::new(MemoryUserStore::new()));
        service.register(ana()).await.unwrap();

        let wrong_password = service
            .login(LoginRequest { email: "a@x.com".into(), password: "wrong".into() })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(LoginRequest { email: "nobody@x.com".into(), password: "secret1".into() })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::AuthError(AuthError::InvalidCredentials)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_resolve_deleted_user() {
        let store = MemoryUserStore::new();
        let service = service_with(Arc::new(store.clone()));
        let registered = service.register(ana()).await.unwrap();

        store.remove(&registered.user.id).await;

        let err = service.resolve_caller(&registered.token).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_validation_happens_before_store_access() {
        // No expectations: any store call would panic.
        let service = service_with(Arc::new(MockUserStore::new()));
        let err = service
            .register(RegisterRequest { password: "123".into(), ..ana() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_email()
            .returning(|_| Err(DatabaseError::ConnectionError("unreachable".into())));

        let service = service_with(Arc::new(store));
        let err = service
            .login(LoginRequest { email: "a@x.com".into(), password: "secret1".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(DatabaseError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_insert_race_reported_as_conflict() {
        let mut store = MockUserStore::new();
        store.expect_find_by_email().times(1).returning(|_| Ok(None));
        store
            .expect_insert()
            .times(1)
            .returning(|_| Err(DatabaseError::Duplicate));

        let service = service_with(Arc::new(store));
        let err = service.register(ana()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
