// Service exports
pub mod auth;
pub mod cache;
pub mod firestore;
pub mod postgres;
pub mod users;

pub use auth::{AuthError, AuthUser, Claims, TokenVerifier};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use firestore::{FirestoreClient, FirestoreError};
pub use postgres::{PostgresClient, PostgresError, StoredReport};
pub use users::{DirectoryError, UserDirectory};
