//! Session Repository Implementation
//!
//! PostgreSQL implementation of the SessionRepository trait.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{RepositoryError, Session, SessionRepository};
use crate::infrastructure::metrics::record_db_query;

/// Database row representation matching the sessions table schema.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    refresh_token: String,
    user_agent: String,
    client_ip: String,
    is_blocked: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    /// Convert database row to domain Session entity.
    fn into_session(self) -> Session {
        Session {
            id: self.id,
            user_id: self.user_id,
            refresh_token: self.refresh_token,
            user_agent: self.user_agent,
            client_ip: self.client_ip,
            is_blocked: self.is_blocked,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL session repository implementation.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new PgSessionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create_session(&self, session: &Session) -> Result<Session, RepositoryError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, user_id, refresh_token, user_agent, client_ip,
                                  is_blocked, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, refresh_token, user_agent, client_ip,
                      is_blocked, expires_at, created_at
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.refresh_token)
        .bind(&session.user_agent)
        .bind(&session.client_ip)
        .bind(session.is_blocked)
        .bind(session.expires_at)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await?;
        record_db_query("insert", "sessions", started.elapsed().as_secs_f64());

        Ok(row.into_session())
    }

    async fn get_session(&self, id: Uuid) -> Result<Session, RepositoryError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, refresh_token, user_agent, client_ip,
                   is_blocked, expires_at, created_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        record_db_query("select", "sessions", started.elapsed().as_secs_f64());

        row.map(SessionRow::into_session)
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_session_by_user_id(&self, user_id: Uuid) -> Result<Session, RepositoryError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, refresh_token, user_agent, client_ip,
                   is_blocked, expires_at, created_at
            FROM sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        record_db_query("select", "sessions", started.elapsed().as_secs_f64());

        row.map(SessionRow::into_session)
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), RepositoryError> {
        let started = Instant::now();
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        record_db_query("delete", "sessions", started.elapsed().as_secs_f64());

        Ok(())
    }
}
