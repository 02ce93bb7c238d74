//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **TokenService**: PASETO token issue and verification
//! - **SessionService**: refresh-token session lifecycle
//! - **UserService**: registration, authentication, ETag-guarded updates
//! - **AuthService**: login flow composing the three above

pub mod auth_service;
pub mod session_service;
pub mod token_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceImpl, LoginError, LoginOutcome};
pub use session_service::{SessionError, SessionService, SessionServiceImpl};
pub use token_service::{PasetoTokenService, TokenError, TokenService};
pub use user_service::{PasswordComparator, UserError, UserService, UserServiceImpl};
