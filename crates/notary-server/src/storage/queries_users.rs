//! User account queries.

use super::db::NotaryDatabase;
use super::models::{PERMISSIONS_ADMIN, User};
use notary_core::db::DatabaseError;

impl NotaryDatabase {
    /// Create a user.
    ///
    /// The first user ever stored is always an administrator, whatever
    /// `permissions` asks for. The emptiness check and the insert run as a
    /// single statement, so two concurrent first sign-ups cannot both
    /// become admin.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        permissions: i64,
    ) -> Result<User, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, permissions) \
             SELECT ?, ?, CASE WHEN NOT EXISTS (SELECT 1 FROM users) THEN ? ELSE ? END",
        )
        .bind(username)
        .bind(password_hash)
        .bind(PERMISSIONS_ADMIN)
        .bind(permissions)
        .execute(self.pool())
        .await?;

        self.get_user(result.last_insert_rowid()).await
    }

    /// Create the first user, as an administrator, only while no user exists.
    ///
    /// Returns `None` when another user is already stored. The emptiness
    /// check is part of the insert, so of several concurrent callers exactly
    /// one gets a user back.
    pub async fn create_first_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, permissions) \
             SELECT ?, ?, ? WHERE NOT EXISTS (SELECT 1 FROM users)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(PERMISSIONS_ADMIN)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user(result.last_insert_rowid()).await.map(Some)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, permissions FROM users ORDER BY id",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(users)
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, permissions FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Get a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, permissions FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("User with username {username}")))
    }

    pub async fn count_users(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    pub async fn update_user_password(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<i64, DatabaseError> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }
        Ok(id)
    }

    pub async fn delete_user(&self, id: i64) -> Result<i64, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }
        Ok(id)
    }
}
