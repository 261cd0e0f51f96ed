use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub firstname: String,
    pub fullname: String,
    pub lastname: String,
    pub username: String,
    pub password_hash: String, // bcrypt hash, never serialized
    pub status: String,
}

pub struct NewUser {
    pub firstname: String,
    pub fullname: String,
    pub lastname: String,
    pub username: String,
    pub password_hash: String,
    pub status: String,
}

/// Full profile overwrite; the hash is only replaced when present.
pub struct UserChanges {
    pub firstname: String,
    pub fullname: String,
    pub lastname: String,
    pub username: String,
    pub status: String,
    pub password_hash: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Current time as seen by the store; doubles as a liveness check.
    async fn server_time(&self) -> Result<OffsetDateTime, RepoError>;
    async fn list(&self) -> Result<Vec<User>, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
    /// Returns `false` when no row has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> Result<bool, RepoError>;
    /// Returns `false` when no row has this id.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::UsernameTaken,
        _ => RepoError::Database(e),
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn server_time(&self) -> Result<OffsetDateTime, RepoError> {
        let (now,): (OffsetDateTime,) = sqlx::query_as("SELECT NOW()")
            .fetch_one(&self.db)
            .await?;
        Ok(now)
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, firstname, fullname, lastname, username, password_hash, status
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, firstname, fullname, lastname, username, password_hash, status
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, firstname, fullname, lastname, username, password_hash, status
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (firstname, fullname, lastname, username, password_hash, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, firstname, fullname, lastname, username, password_hash, status
            "#,
        )
        .bind(user.firstname)
        .bind(user.fullname)
        .bind(user.lastname)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.status)
        .fetch_one(&self.db)
        .await
        .map_err(map_write_error)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET firstname = $1, fullname = $2, lastname = $3, username = $4, status = $5,
                password_hash = COALESCE($6, password_hash)
            WHERE id = $7
            "#,
        )
        .bind(changes.firstname)
        .bind(changes.fullname)
        .bind(changes.lastname)
        .bind(changes.username)
        .bind(changes.status)
        .bind(changes.password_hash)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
