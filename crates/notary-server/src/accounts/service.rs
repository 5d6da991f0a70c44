//! Account operations backed by the credential store.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::error::AccountError;
use super::policy::{generate_password, validate_password};
use crate::auth::JwtManager;
use crate::auth::password::{hash_password, verify_login};
use crate::storage::{DatabaseError, NotaryDatabase, PERMISSIONS_USER, User};

/// Result of a successful account creation.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: i64,
    /// Present only when the server generated the password.
    pub generated_password: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    db: NotaryDatabase,
    jwt: Arc<JwtManager>,
}

fn not_found_or_store(id: i64) -> impl FnOnce(DatabaseError) -> AccountError {
    move |e| {
        if e.is_not_found() {
            AccountError::NotFound(id)
        } else {
            AccountError::Store(e)
        }
    }
}

fn duplicate_or_store(e: DatabaseError) -> AccountError {
    if e.is_duplicate() {
        AccountError::DuplicateUsername
    } else {
        AccountError::Store(e)
    }
}

/// A validated password and its hash, ready to store.
struct Credential {
    password: String,
    generated: bool,
    hash: String,
}

impl Credential {
    fn prepare(username: &str, password: Option<&str>) -> Result<Self, AccountError> {
        if username.is_empty() {
            return Err(AccountError::UsernameRequired);
        }

        let (password, generated) = match password.filter(|p| !p.is_empty()) {
            Some(p) => (p.to_string(), false),
            None => (generate_password(), true),
        };
        if !validate_password(&password) {
            return Err(AccountError::WeakPassword);
        }

        let hash = hash_password(&password)?;
        Ok(Self {
            password,
            generated,
            hash,
        })
    }

    fn into_account(self, id: i64) -> NewAccount {
        NewAccount {
            id,
            generated_password: self.generated.then_some(self.password),
        }
    }
}

impl AccountService {
    pub const fn new(db: NotaryDatabase, jwt: Arc<JwtManager>) -> Self {
        Self { db, jwt }
    }

    /// Create an account, generating a password when none is supplied.
    ///
    /// The store makes the very first account an administrator.
    #[instrument(skip(self, password))]
    pub async fn create_account(
        &self,
        username: &str,
        password: Option<&str>,
    ) -> Result<NewAccount, AccountError> {
        let credential = Credential::prepare(username, password)?;
        let user = self
            .db
            .create_user(username, &credential.hash, PERMISSIONS_USER)
            .await
            .map_err(duplicate_or_store)?;

        info!(user_id = user.id, username = %user.username, admin = user.is_admin(), "Account created");
        Ok(credential.into_account(user.id))
    }

    /// Create the administrator of an uninitialized deployment.
    ///
    /// Fails with [`AccountError::AlreadyInitialized`] once any account
    /// exists, including one created concurrently by another caller.
    #[instrument(skip(self, password))]
    pub async fn create_first_account(
        &self,
        username: &str,
        password: Option<&str>,
    ) -> Result<NewAccount, AccountError> {
        let credential = Credential::prepare(username, password)?;
        let Some(user) = self
            .db
            .create_first_user(username, &credential.hash)
            .await
            .map_err(duplicate_or_store)?
        else {
            warn!(username, "First account already created");
            return Err(AccountError::AlreadyInitialized);
        };

        info!(user_id = user.id, username = %user.username, "Administrator account created");
        Ok(credential.into_account(user.id))
    }

    #[instrument(skip(self, password))]
    pub async fn change_password(&self, id: i64, password: &str) -> Result<i64, AccountError> {
        if password.is_empty() {
            return Err(AccountError::PasswordRequired);
        }
        if !validate_password(password) {
            return Err(AccountError::WeakPassword);
        }

        let hash = hash_password(password)?;
        let id = self
            .db
            .update_user_password(id, &hash)
            .await
            .map_err(not_found_or_store(id))?;

        info!(user_id = id, "Password changed");
        Ok(id)
    }

    /// Delete a standard account. Administrator accounts cannot be deleted.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: i64) -> Result<i64, AccountError> {
        let user = self.db.get_user(id).await.map_err(not_found_or_store(id))?;
        if user.is_admin() {
            return Err(AccountError::AdminDeletionForbidden);
        }

        let id = self.db.delete_user(id).await.map_err(not_found_or_store(id))?;
        info!(user_id = id, username = %user.username, "Account deleted");
        Ok(id)
    }

    /// Verify credentials and issue a session token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AccountError> {
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }

        let user = match self.db.get_user_by_username(username).await {
            Ok(user) => Some(user),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(AccountError::Store(e)),
        };

        // Unknown usernames still pay for one argon2 verification.
        let verified = verify_login(password, user.as_ref())?;
        let Some(user) = user.filter(|_| verified) else {
            warn!(username, "Failed login attempt");
            return Err(AccountError::InvalidCredentials);
        };

        let token = self.jwt.issue(&user)?;
        info!(user_id = user.id, username, "User logged in");
        Ok(token)
    }

    pub async fn list_accounts(&self) -> Result<Vec<User>, AccountError> {
        Ok(self.db.list_users().await?)
    }

    pub async fn get_account(&self, id: i64) -> Result<User, AccountError> {
        self.db.get_user(id).await.map_err(not_found_or_store(id))
    }

    /// Number of stored accounts; zero means the deployment is uninitialized.
    pub async fn count_accounts(&self) -> Result<i64, AccountError> {
        Ok(self.db.count_users().await?)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn test_service() -> (AccountService, Arc<JwtManager>) {
        let db = NotaryDatabase::open_in_memory().await.unwrap();
        let jwt = Arc::new(JwtManager::new(b"account-tests"));
        (AccountService::new(db, Arc::clone(&jwt)), jwt)
    }

    #[tokio::test]
    async fn first_account_is_admin_second_is_not() {
        let (svc, _) = test_service().await;
        let first = svc.create_account("admin", Some("Admin123")).await.unwrap();
        let second = svc.create_account("user", Some("User1234")).await.unwrap();

        assert!(svc.get_account(first.id).await.unwrap().is_admin());
        assert!(!svc.get_account(second.id).await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn supplied_password_is_not_echoed() {
        let (svc, _) = test_service().await;
        let created = svc.create_account("admin", Some("Admin123")).await.unwrap();
        assert!(created.generated_password.is_none());
    }

    #[tokio::test]
    async fn omitted_password_is_generated_and_usable() {
        let (svc, _) = test_service().await;
        let created = svc.create_account("admin", None).await.unwrap();

        let password = created.generated_password.unwrap();
        assert_eq!(password.len(), 16);
        assert!(validate_password(&password));
        svc.login("admin", &password).await.unwrap();
    }

    #[tokio::test]
    async fn empty_username_is_required() {
        let (svc, _) = test_service().await;
        assert!(matches!(
            svc.create_account("", Some("Admin123")).await,
            Err(AccountError::UsernameRequired)
        ));
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let (svc, _) = test_service().await;
        assert!(matches!(
            svc.create_account("admin", Some("weak")).await,
            Err(AccountError::WeakPassword)
        ));
        assert_eq!(svc.count_accounts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (svc, _) = test_service().await;
        svc.create_account("admin", Some("Admin123")).await.unwrap();
        assert!(matches!(
            svc.create_account("admin", Some("Admin456")).await,
            Err(AccountError::DuplicateUsername)
        ));
    }

    #[tokio::test]
    async fn login_issues_token_with_identity() {
        let (svc, jwt) = test_service().await;
        let created = svc.create_account("admin", Some("Admin123")).await.unwrap();

        let token = svc.login("admin", "Admin123").await.unwrap();
        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.id, created.id);
        assert_eq!(claims.username, "admin");
        assert!(claims.is_admin());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (svc, _) = test_service().await;
        svc.create_account("admin", Some("Admin123")).await.unwrap();

        let wrong_password = svc.login("admin", "Wrong123").await.unwrap_err();
        let unknown_user = svc.login("nobody", "Admin123").await.unwrap_err();
        assert!(matches!(wrong_password, AccountError::InvalidCredentials));
        assert!(matches!(unknown_user, AccountError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_both_verify() {
        use crate::auth::password::verifications;

        let (svc, _) = test_service().await;
        svc.create_account("admin", Some("Admin123")).await.unwrap();

        let before = verifications();
        svc.login("admin", "Wrong123").await.unwrap_err();
        let wrong_password = verifications() - before;

        let before = verifications();
        svc.login("nobody", "Wrong123").await.unwrap_err();
        let unknown_user = verifications() - before;

        assert_eq!(wrong_password, 1);
        assert_eq!(unknown_user, 1);
    }

    #[tokio::test]
    async fn first_account_creation_closes_after_one() {
        let (svc, _) = test_service().await;
        let admin = svc.create_first_account("admin", None).await.unwrap();
        assert!(svc.get_account(admin.id).await.unwrap().is_admin());
        assert!(admin.generated_password.is_some());

        assert!(matches!(
            svc.create_first_account("late", Some("Late1234")).await,
            Err(AccountError::AlreadyInitialized)
        ));
        assert_eq!(svc.count_accounts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_accounts_have_one_winner() {
        let (svc, _) = test_service().await;
        let (a, b) = tokio::join!(
            svc.create_first_account("first", Some("First123")),
            svc.create_first_account("intruder", Some("Intrude1")),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(AccountError::AlreadyInitialized)))
        );
        let users = svc.list_accounts().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin());
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let (svc, _) = test_service().await;
        assert!(matches!(
            svc.login("", "Admin123").await,
            Err(AccountError::MissingCredentials)
        ));
        assert!(matches!(
            svc.login("admin", "").await,
            Err(AccountError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn change_password_takes_effect() {
        let (svc, _) = test_service().await;
        let created = svc.create_account("admin", Some("Admin123")).await.unwrap();

        svc.change_password(created.id, "Changed99").await.unwrap();
        assert!(svc.login("admin", "Admin123").await.is_err());
        svc.login("admin", "Changed99").await.unwrap();
    }

    #[tokio::test]
    async fn change_password_validates_and_finds() {
        let (svc, _) = test_service().await;
        let created = svc.create_account("admin", Some("Admin123")).await.unwrap();

        assert!(matches!(
            svc.change_password(created.id, "").await,
            Err(AccountError::PasswordRequired)
        ));
        assert!(matches!(
            svc.change_password(created.id, "weak").await,
            Err(AccountError::WeakPassword)
        ));
        assert!(matches!(
            svc.change_password(999, "Changed99").await,
            Err(AccountError::NotFound(999))
        ));
    }

    #[tokio::test]
    async fn admin_account_cannot_be_deleted() {
        let (svc, _) = test_service().await;
        let admin = svc.create_account("admin", Some("Admin123")).await.unwrap();

        assert!(matches!(
            svc.delete_account(admin.id).await,
            Err(AccountError::AdminDeletionForbidden)
        ));
        assert_eq!(svc.count_accounts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn standard_account_can_be_deleted() {
        let (svc, _) = test_service().await;
        svc.create_account("admin", Some("Admin123")).await.unwrap();
        let user = svc.create_account("user", Some("User1234")).await.unwrap();

        assert_eq!(svc.delete_account(user.id).await.unwrap(), user.id);
        assert!(matches!(
            svc.get_account(user.id).await,
            Err(AccountError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_missing_account_is_not_found() {
        let (svc, _) = test_service().await;
        assert!(matches!(
            svc.delete_account(42).await,
            Err(AccountError::NotFound(42))
        ));
    }
}
