//! Repository Implementations
//!
//! Implementations of the domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - users in PostgreSQL, ETag-guarded updates
//! - **PgSessionRepository** - sessions in PostgreSQL
//! - **InMemoryStore** - users and sessions in process memory
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgSessionRepository, PgUserRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let user_repo = PgUserRepository::new(pool.clone());
//!     let session_repo = PgSessionRepository::new(pool);
//! }
//! ```

pub mod memory;
pub mod session_repository;
pub mod user_repository;

pub use memory::InMemoryStore;
pub use session_repository::PgSessionRepository;
pub use user_repository::PgUserRepository;
