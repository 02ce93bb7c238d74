//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.
//! Maps between the database schema and domain User entity.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    ETag, EmailAddress, PasswordHash, RegistrationRequest, RepositoryError, Role, User,
    UserChanges, UserParts, UserRepository, Username,
};
use crate::infrastructure::metrics::record_db_query;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, created_at, password_changed_at, updated_at";

/// Database row representation matching the users table schema.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: Vec<u8>,
    role: i16,
    created_at: DateTime<Utc>,
    password_changed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert database row to domain User entity.
    ///
    /// Stored values are re-validated; a row that no longer satisfies the
    /// value-object rules is reported as corrupt.
    fn into_user(self) -> Result<User, RepositoryError> {
        let corrupt = |e| RepositoryError::CorruptRecord(format!("user {}: {}", self.id, e));

        Ok(User::from(UserParts {
            id: self.id,
            username: Username::parse(&self.username).map_err(corrupt)?,
            email: EmailAddress::parse(&self.email).map_err(corrupt)?,
            password_hash: PasswordHash::from_trusted_source(self.password_hash),
            role: Role::parse(i32::from(self.role)).map_err(corrupt)?,
            created_at: self.created_at,
            password_changed_at: self.password_changed_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Translate a write failure, keeping the name of a violated unique
/// constraint.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::UniqueViolation {
                constraint: db_err.constraint().unwrap_or_default().to_string(),
            }
        }
        _ => RepositoryError::Database(e),
    }
}

/// Whether `etag`'s timestamp survives a round trip through `timestamptz`.
///
/// Binding truncates below the microsecond, so an ETag carrying extra
/// nanoseconds would otherwise compare equal to a version it is not.
fn storable_precision(etag: &ETag) -> bool {
    etag.updated_at().timestamp_subsec_nanos() % 1_000 == 0
}

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        column: &str,
        value: impl for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
    ) -> Result<User, RepositoryError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        record_db_query("select", "users", started.elapsed().as_secs_f64());

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_user_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        self.fetch_one_where("id", id).await
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, RepositoryError> {
        self.fetch_one_where("email", email.as_str().to_owned()).await
    }

    async fn user_exists(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let started = Instant::now();
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        record_db_query("exists", "users", started.elapsed().as_secs_f64());

        Ok(exists)
    }

    async fn create_user(&self, request: &RegistrationRequest) -> Result<User, RepositoryError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.username().as_str())
        .bind(request.email().as_str())
        .bind(request.password_hash().as_bytes())
        .bind(Role::default().as_i16())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        record_db_query("insert", "users", started.elapsed().as_secs_f64());

        row.into_user()
    }

    /// Conditional update in a single statement.
    ///
    /// The `updated_at = $2` predicate and the write are atomic: a concurrent
    /// writer that commits first changes `updated_at`, so this statement then
    /// matches no row.
    async fn update_user(
        &self,
        id: Uuid,
        changes: &UserChanges,
        expected: &ETag,
    ) -> Result<User, RepositoryError> {
        if expected.id() != id || !storable_precision(expected) {
            return Err(RepositoryError::NoRowsAffected);
        }

        let started = Instant::now();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($3, username),
                email = COALESCE($4, email),
                password_hash = COALESCE($5, password_hash),
                password_changed_at = CASE WHEN $5::bytea IS NULL
                                           THEN password_changed_at
                                           ELSE NOW() END,
                role = COALESCE($6, role),
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1 AND updated_at = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected.updated_at())
        .bind(changes.username.as_ref().map(|u| u.as_str()))
        .bind(changes.email.as_ref().map(|e| e.as_str()))
        .bind(changes.password_hash.as_ref().map(|h| h.as_bytes()))
        .bind(changes.role.map(|r| r.as_i16()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;
        record_db_query("update", "users", started.elapsed().as_secs_f64());

        row.ok_or(RepositoryError::NoRowsAffected)?.into_user()
    }
}
