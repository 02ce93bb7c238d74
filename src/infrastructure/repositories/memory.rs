//! In-memory repositories.
//!
//! [`InMemoryStore`] implements both repository traits with the same
//! observable behavior as the PostgreSQL adapters: the same unique
//! constraint names, and an ETag check that is atomic with the write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::{
    ETag, EmailAddress, RegistrationRequest, RepositoryError, Session, SessionRepository, User,
    UserChanges, UserRepository, EMAIL_UNIQUE_CONSTRAINT, USERNAME_UNIQUE_CONSTRAINT,
};

/// Users and sessions held in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    /// Sessions keyed by id, tagged with an insertion sequence number.
    sessions: DashMap<Uuid, (u64, Session)>,
    session_seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Name of the unique constraint a user with `username` or `email` would
/// violate among `users`, ignoring the user `skip`.
fn violated_constraint<'a>(
    users: impl IntoIterator<Item = &'a User>,
    skip: Option<Uuid>,
    username: Option<&str>,
    email: Option<&str>,
) -> Option<&'static str> {
    users
        .into_iter()
        .filter(|u| Some(u.id()) != skip)
        .find_map(|u| {
            if username == Some(u.username().as_str()) {
                Some(USERNAME_UNIQUE_CONSTRAINT)
            } else if email == Some(u.email().as_str()) {
                Some(EMAIL_UNIQUE_CONSTRAINT)
            } else {
                None
            }
        })
}

fn unique_violation(constraint: &str) -> RepositoryError {
    RepositoryError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get_user_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        self.users
            .lock()
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, RepositoryError> {
        self.users
            .lock()
            .values()
            .find(|u| u.email() == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.users.lock().contains_key(&id))
    }

    async fn create_user(&self, request: &RegistrationRequest) -> Result<User, RepositoryError> {
        let mut users = self.users.lock();

        if let Some(constraint) = violated_constraint(
            users.values(),
            None,
            Some(request.username().as_str()),
            Some(request.email().as_str()),
        ) {
            return Err(unique_violation(constraint));
        }

        let user = User::register(Uuid::new_v4(), request.clone(), Utc::now());
        users.insert(user.id(), user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: Uuid,
        changes: &UserChanges,
        expected: &ETag,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.lock();

        let current = match users.get(&id) {
            Some(user) if user.etag() == *expected => user,
            _ => return Err(RepositoryError::NoRowsAffected),
        };

        if let Some(constraint) = violated_constraint(
            users.values(),
            Some(id),
            changes.username.as_ref().map(|u| u.as_str()),
            changes.email.as_ref().map(|e| e.as_str()),
        ) {
            return Err(unique_violation(constraint));
        }

        let mut updated = current.clone();
        updated.apply(changes.clone(), Utc::now());
        users.insert(id, updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn create_session(&self, session: &Session) -> Result<Session, RepositoryError> {
        let seq = self.session_seq.fetch_add(1, Ordering::Relaxed);
        self.sessions.insert(session.id, (seq, session.clone()));
        Ok(session.clone())
    }

    async fn get_session(&self, id: Uuid) -> Result<Session, RepositoryError> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().1.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_session_by_user_id(&self, user_id: Uuid) -> Result<Session, RepositoryError> {
        self.sessions
            .iter()
            .filter(|entry| entry.value().1.user_id == user_id)
            .max_by_key(|entry| (entry.value().1.created_at, entry.value().0))
            .map(|entry| entry.value().1.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.sessions.remove(&id);
        Ok(())
    }
}
