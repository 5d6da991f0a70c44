//! User accounts: creation, password policy, deletion, and login.

mod error;
pub mod policy;
mod service;

pub use error::AccountError;
pub use service::{AccountService, NewAccount};
