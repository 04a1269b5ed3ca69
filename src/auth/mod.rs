//! Authentication module for the NomadGo backend
//!
//! This module handles credential storage and verification, token
//! issuance and resolving the caller behind a bearer token.

pub mod handlers;
pub mod models;
mod password;
mod service;
mod token;

pub use handlers::CurrentUser;
pub use models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
pub use password::PasswordHasher;
pub use service::{AuthService, DUPLICATE_EMAIL_MESSAGE};
pub use token::{parse_algorithm, Claims, TokenCodec};
