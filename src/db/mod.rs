//! Credential store for the auth service.
//!
//! User records live in a document collection. The service only sees the
//! `UserStore` trait; the MongoDB and in-memory backends are picked from
//! `database.url` at startup.

pub mod memory;
pub mod models;
pub mod mongo;
pub mod store;

pub use memory::MemoryUserStore;
pub use models::User;
pub use mongo::MongoUserStore;
pub use store::UserStore;
