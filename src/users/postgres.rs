use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::{info_span, Instrument};

use super::{Role, User, UserRepository};

/// Postgres backed repository reading `users`, `roles` and `user_roles`.
#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = r"
            SELECT users.id, users.username, users.password, roles.name AS role_name
            FROM users
            LEFT JOIN user_roles ON user_roles.user_id = users.id
            LEFT JOIN roles ON roles.id = user_roles.role_id
            WHERE users.username = $1
            ORDER BY roles.name
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(username)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by username")?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };

        let mut roles = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(name) = row.try_get::<Option<String>, _>("role_name")? {
                roles.push(Role::new(name));
            }
        }

        Ok(Some(User {
            id: first.try_get("id")?,
            username: first.try_get("username")?,
            password_hash: first.try_get("password")?,
            roles,
        }))
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}
