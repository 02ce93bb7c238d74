//! # Domain Entities
//!
//! - **User**: identity aggregate, versioned by its ETag
//! - **Session**: refresh-token session of a user
//! - **Payload**: claims carried inside a token
//!
//! Repository traits live next to the entities they persist and are
//! implemented in the infrastructure layer.

mod payload;
mod session;
mod user;

pub use payload::Payload;
pub use session::{Session, SessionRepository};
pub use user::{
    next_updated_at, User, UserChanges, UserParts, UserRepository, EMAIL_UNIQUE_CONSTRAINT,
    USERNAME_UNIQUE_CONSTRAINT,
};

#[cfg(test)]
pub use session::MockSessionRepository;
#[cfg(test)]
pub use user::MockUserRepository;
