use super::{NewUser, StoreError, User, UserFilter, UserId, UserStore};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

const SELECT_BY_USERNAME: &str =
    "SELECT id, username, password FROM users WHERE username = $1 LIMIT 1";
const SELECT_BY_CREDENTIALS: &str =
    "SELECT id, username, password FROM users WHERE username = $1 AND password = $2 LIMIT 1";
const INSERT_USER: &str =
    "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING id, username, password";
const DELETE_BY_USERNAME: &str = "DELETE FROM users WHERE username = $1";
const DELETE_BY_CREDENTIALS: &str = "DELETE FROM users WHERE username = $1 AND password = $2";

/// `PostgreSQL` backed store over the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_span(operation: &str, statement: &'static str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let username: String = row.try_get("username")?;
    let password: String = row.try_get("password")?;

    Ok(User {
        id: UserId::from(id),
        username,
        password: SecretString::from(password),
    })
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code.as_ref() == UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let row = match filter.password_value() {
            Some(password) => {
                sqlx::query(SELECT_BY_CREDENTIALS)
                    .bind(filter.username_value())
                    .bind(password.expose_secret())
                    .fetch_optional(&self.pool)
                    .instrument(query_span("SELECT", SELECT_BY_CREDENTIALS))
                    .await?
            }
            None => {
                sqlx::query(SELECT_BY_USERNAME)
                    .bind(filter.username_value())
                    .fetch_optional(&self.pool)
                    .instrument(query_span("SELECT", SELECT_BY_USERNAME))
                    .await?
            }
        };

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query(INSERT_USER)
            .bind(&user.username)
            .bind(user.password.expose_secret())
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", INSERT_USER))
            .await;

        match result {
            Ok(row) => Ok(user_from_row(&row)?),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict {
                username: user.username,
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn remove(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let result = match filter.password_value() {
            Some(password) => {
                sqlx::query(DELETE_BY_CREDENTIALS)
                    .bind(filter.username_value())
                    .bind(password.expose_secret())
                    .execute(&self.pool)
                    .instrument(query_span("DELETE", DELETE_BY_CREDENTIALS))
                    .await?
            }
            None => {
                sqlx::query(DELETE_BY_USERNAME)
                    .bind(filter.username_value())
                    .execute(&self.pool)
                    .instrument(query_span("DELETE", DELETE_BY_USERNAME))
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgresql"
    }
}
