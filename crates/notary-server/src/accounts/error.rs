use notary_core::db::DatabaseError;

/// Account and login failures.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Username is required")]
    UsernameRequired,

    #[error("Password is required")]
    PasswordRequired,

    #[error(
        "Password must have 8 or more characters, must include at least one capital letter, one lowercase letter, and either a number or a symbol."
    )]
    WeakPassword,

    #[error("user with given username already exists")]
    DuplicateUsername,

    /// A first-account creation lost to an account that already exists.
    #[error("an account already exists")]
    AlreadyInitialized,

    #[error("user {0} not found")]
    NotFound(i64),

    #[error("deleting an Admin account is not allowed.")]
    AdminDeletionForbidden,

    #[error("Username and password are required")]
    MissingCredentials,

    /// Unknown username and wrong password are reported identically.
    #[error("The username or password is incorrect. Try again.")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

impl From<argon2::password_hash::Error> for AccountError {
    fn from(e: argon2::password_hash::Error) -> Self {
        Self::Hashing(e.to_string())
    }
}
