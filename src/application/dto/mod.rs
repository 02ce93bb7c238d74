//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{LoginUserRequest, RegisterUserRequest, UpdateUserRequest};
pub use response::{LoginResponse, SessionResponse, UserResponse};
