//! # Domain Value Objects
//!
//! Immutable, self-validating wrappers around primitive input. Each type can
//! only be obtained through its parse function, so every instance satisfies
//! its validation rules.
//!
//! - **Username**: 3 to 16 letters, digits or underscores
//! - **EmailAddress**: RFC 5322-style mailbox address
//! - **PasswordHash**: Argon2id hash, redacted when printed
//! - **Role**: Reader, Author, Editor or Admin
//! - **ETag**: entity id plus last-modified timestamp

mod email;
mod etag;
mod password;
mod role;
mod username;

pub use email::EmailAddress;
pub use etag::{ETag, ParseETagError};
pub use password::{
    compare, hash_password, parse_password, parse_password_with, validate_password, PasswordHash,
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN,
};
pub use role::Role;
pub use username::{Username, USERNAME_MAX_LEN, USERNAME_MIN_LEN};
