use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SessionError, StorageError, ValidationError};
use crate::saving;

/// User data structure representing a registered application user
///
/// Users are created on signup and never edited afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    /// Username (unique, case-sensitive identifier for the user)
    pub username: String,

    /// Argon2 hash of the user's password in PHC string format
    pub password_hash: String,
}

/// One-way salted password hashing with verification
pub trait CredentialHasher {
    /// Hash a plaintext password with a fresh salt
    fn hash(&self, password: &str) -> Result<String, SessionError>;

    /// Check a plaintext password against a stored hash
    ///
    /// # Returns
    /// * `Ok(true)` if the password matches, `Ok(false)` if not
    ///
    /// # Errors
    /// * Returns an error if the stored hash is in an invalid format
    fn verify(&self, password: &str, hash: &str) -> Result<bool, SessionError>;
}

/// Argon2id password hasher with default parameters
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, SessionError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        match argon2.hash_password(password.as_bytes(), &salt) {
            Ok(hash) => Ok(hash.to_string()),
            Err(e) => Err(SessionError::HashFailure(e.to_string())),
        }
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, SessionError> {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(hash) => hash,
            Err(_) => {
                return Err(SessionError::HashFailure(
                    "Invalid password hash format".to_string(),
                ));
            }
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(_) => Ok(false), // Password didn't match
        }
    }
}

/// JSON file of registered users
///
/// Every operation re-reads the file, so several sessions sharing one
/// file see each other's signups (last writer wins).
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    /// Open the store at `path`, creating an empty file if it is missing
    ///
    /// A file that cannot be created is logged and retried on the next access.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Err(e) = saving::ensure_store_file(&path) {
            log::error!("User store unavailable: {}", e);
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get all registered users
    ///
    /// Returns an empty list if the file is unreadable or corrupted.
    pub fn all(&self) -> Vec<User> {
        saving::load_records_or_empty(&self.path)
    }

    /// Look up a user by exact, case-sensitive username
    pub fn find(&self, username: &str) -> Option<User> {
        self.all().into_iter().find(|user| user.username == username)
    }

    pub fn exists(&self, username: &str) -> bool {
        self.find(username).is_some()
    }

    /// Add a new user
    ///
    /// # Errors
    /// * `ValidationError::DuplicateUser` if the username is taken; the file is left untouched
    /// * `StorageError::Unwritable` if the file cannot be written
    pub fn insert(&self, user: User) -> Result<(), SessionError> {
        let mut users: Vec<User> = saving::load_records_for_update(&self.path)?;
        if users.iter().any(|existing| existing.username == user.username) {
            return Err(ValidationError::DuplicateUser.into());
        }

        users.push(user);
        self.save(&users)?;
        Ok(())
    }

    fn save(&self, users: &[User]) -> Result<(), StorageError> {
        saving::save_records(users, &self.path).inspect_err(|e| {
            log::error!("Could not save users: {}", e);
        })
    }
}
