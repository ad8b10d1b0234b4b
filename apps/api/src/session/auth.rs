//! Local identity: signup, login, guest login and logout over a `KvStore`.
//!
//! Keys mirror the browser-storage layout the web client expects:
//! - `users`        JSON array of registered users
//! - `loggedInUser` email of the current session, absent when signed out
//! - `isGuest`      `"true"` only for the guest session
//!
//! Every operation validates before writing, so a rejected call leaves the
//! store untouched.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::models::user::User;
use crate::session::store::{KvStore, StoreError};

pub const GUEST_EMAIL: &str = "guest@deepfolio.ai";

const USERS_KEY: &str = "users";
const LOGGED_IN_KEY: &str = "loggedInUser";
const GUEST_KEY: &str = "isGuest";

const MAX_SIGNUP_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("A valid email and password are required.")]
    MissingCredentials,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("User with this email already exists.")]
    UserExists,

    #[error("Too many concurrent account changes. Please try again.")]
    Contended,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A registered user as persisted under `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    email: String,
    password_sha256: String,
}

pub struct AuthService<S: KvStore> {
    store: S,
}

impl<S: KvStore> AuthService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new user and signs them in.
    ///
    /// The `users` list is replaced with a compare-and-set against the value
    /// that was read, so two signups for one email cannot both land.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        check_credentials(email, password)?;

        for _ in 0..MAX_SIGNUP_ATTEMPTS {
            let raw = self.store.get(USERS_KEY).await?;
            let mut users = parse_users(raw.as_deref())?;
            if users.iter().any(|u| u.email == email) {
                return Err(AuthError::UserExists);
            }

            users.push(StoredUser {
                email: email.to_string(),
                password_sha256: digest(password),
            });
            let updated = serde_json::to_string(&users).map_err(StoreError::from)?;
            if self
                .store
                .compare_and_set(USERS_KEY, raw.as_deref(), &updated)
                .await?
            {
                return self.start_session(email, false).await;
            }
            debug!("users list changed during signup; retrying");
        }

        Err(AuthError::Contended)
    }

    /// Signs in an existing user. Email comparison is exact.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let users = self.load_users().await?;
        let password_sha256 = digest(password);
        let found = users
            .iter()
            .any(|u| u.email == email && u.password_sha256 == password_sha256);

        if !found {
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(email, false).await
    }

    /// Starts the fixed guest session. Always succeeds unless the store fails.
    pub async fn login_as_guest(&self) -> Result<User, AuthError> {
        self.start_session(GUEST_EMAIL, true).await
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.delete(LOGGED_IN_KEY).await?;
        self.store.delete(GUEST_KEY).await?;
        Ok(())
    }

    /// The signed-in identity, if any.
    pub async fn current_user(&self) -> Result<Option<User>, AuthError> {
        let Some(email) = self.store.get(LOGGED_IN_KEY).await? else {
            return Ok(None);
        };
        let is_guest = self.store.get(GUEST_KEY).await?.as_deref() == Some("true");
        Ok(Some(User { email, is_guest }))
    }

    async fn start_session(&self, email: &str, is_guest: bool) -> Result<User, AuthError> {
        self.store.set(LOGGED_IN_KEY, email).await?;
        if is_guest {
            self.store.set(GUEST_KEY, "true").await?;
        } else {
            self.store.delete(GUEST_KEY).await?;
        }
        Ok(User {
            email: email.to_string(),
            is_guest,
        })
    }

    async fn load_users(&self) -> Result<Vec<StoredUser>, AuthError> {
        parse_users(self.store.get(USERS_KEY).await?.as_deref())
    }

    #[cfg(test)]
    async fn registered_emails(&self) -> Vec<String> {
        self.load_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect()
    }
}

fn parse_users(raw: Option<&str>) -> Result<Vec<StoredUser>, AuthError> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(raw).map_err(StoreError::from)?),
        None => Ok(Vec::new()),
    }
}

fn check_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || !email.contains('@') || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(())
}

fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
