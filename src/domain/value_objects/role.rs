//! Role value object.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// Closed set of user roles, backed by a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i16)]
pub enum Role {
    #[default]
    Reader = 0,
    Author = 1,
    Editor = 2,
    Admin = 3,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Reader, Self::Author, Self::Editor, Self::Admin];

    /// Accept only integers inside the enum's contiguous range.
    pub fn parse(candidate: i32) -> Result<Self, ValidationError> {
        match candidate {
            0 => Ok(Self::Reader),
            1 => Ok(Self::Author),
            2 => Ok(Self::Editor),
            3 => Ok(Self::Admin),
            other => Err(ValidationError::RoleOutOfRange(other)),
        }
    }

    /// Storage representation.
    pub fn as_i16(&self) -> i16 {
        *self as i16
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "Reader",
            Self::Author => "Author",
            Self::Editor => "Editor",
            Self::Admin => "Admin",
        }
    }

    /// Parse the name produced by [`Role::as_str`], case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for Role {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        i32::from(role.as_i16())
    }
}
