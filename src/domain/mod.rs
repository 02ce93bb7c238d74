//! # Domain Layer
//!
//! Validation rules, the user and session model, and the persistence
//! contracts the application layer depends on.
//!
//! ## Structure
//!
//! - **value_objects**: self-validating values (Username, EmailAddress, ...)
//! - **errors**: validation, authentication and repository error types
//! - **requests**: validated registration, login and update requests
//! - **entities**: User, Session, Payload and their repository traits
//!
//! Nothing here depends on the infrastructure or presentation layers.

pub mod entities;
pub mod errors;
pub mod requests;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use requests::*;
pub use value_objects::*;
