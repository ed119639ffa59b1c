//! Shared test infrastructure.
//!
//! - `FakeDirectory`: in-memory LDAP server that counts connections, binds
//!   and unbinds, so tests can check a connection is always released.
//! - `FakeAccounts`: account existence checks without a database.
//! - user and form builders.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use quadmembers::auth::ldap::{Directory, DirectoryConnection, DirectoryConnector, DirectoryError};
use quadmembers::auth::password;
use quadmembers::errors::AppError;
use quadmembers::forms::FormData;
use quadmembers::models::user::{AccountLookup, User};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const PEOPLE_BASE: &str = "ou=people,dc=esmgquadrivium,dc=nl";
pub const LDAP_PASSWORD: &str = "directory-secret";
pub const LOCAL_PASSWORD: &str = "local-secret-1";

// ============================================================================
// FAKE DIRECTORY
// ============================================================================

#[derive(Default)]
pub struct DirectoryStats {
    connects: AtomicUsize,
    binds: AtomicUsize,
    unbinds: AtomicUsize,
    last_dn: Mutex<Option<String>>,
}

impl DirectoryStats {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn binds(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }

    pub fn unbinds(&self) -> usize {
        self.unbinds.load(Ordering::SeqCst)
    }

    pub fn last_dn(&self) -> Option<String> {
        self.last_dn.lock().expect("stats lock").clone()
    }
}

/// How the fake server answers.
#[derive(Clone)]
pub enum Behaviour {
    /// Binds succeed only with this password.
    Accept(String),
    /// Every bind fails with this non-credential result code.
    Fail(u32),
    /// The server cannot be reached.
    Unreachable,
}

#[derive(Clone)]
pub struct FakeDirectory {
    pub behaviour: Behaviour,
    pub fail_unbind: bool,
    pub stats: Arc<DirectoryStats>,
}

impl FakeDirectory {
    pub fn accepting(password: &str) -> Self {
        Self::with(Behaviour::Accept(password.to_string()))
    }

    pub fn failing(rc: u32) -> Self {
        Self::with(Behaviour::Fail(rc))
    }

    pub fn unreachable() -> Self {
        Self::with(Behaviour::Unreachable)
    }

    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            fail_unbind: false,
            stats: Arc::new(DirectoryStats::default()),
        }
    }

    pub fn with_failing_unbind(mut self) -> Self {
        self.fail_unbind = true;
        self
    }

    /// A `Directory` backed by this fake, plus the counters to inspect.
    pub fn into_directory(self) -> (Directory, Arc<DirectoryStats>) {
        let stats = self.stats.clone();
        (Directory::new(Box::new(self), PEOPLE_BASE), stats)
    }
}

#[async_trait]
impl DirectoryConnector for FakeDirectory {
    async fn connect(&self) -> Result<Box<dyn DirectoryConnection>, DirectoryError> {
        if let Behaviour::Unreachable = self.behaviour {
            return Err(DirectoryError::Operation {
                rc: 52,
                text: "server unavailable".to_string(),
            });
        }
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            server: self.clone(),
        }))
    }
}

struct FakeConnection {
    server: FakeDirectory,
}

#[async_trait]
impl DirectoryConnection for FakeConnection {
    async fn simple_bind(&mut self, user: &str, password: &str) -> Result<(), DirectoryError> {
        let stats = &self.server.stats;
        stats.binds.fetch_add(1, Ordering::SeqCst);
        *stats.last_dn.lock().expect("stats lock") = Some(user.to_string());
        match &self.server.behaviour {
            Behaviour::Accept(expected) if expected == password => Ok(()),
            Behaviour::Accept(_) => Err(DirectoryError::InvalidCredentials),
            Behaviour::Fail(rc) => Err(DirectoryError::Operation {
                rc: *rc,
                text: "server error".to_string(),
            }),
            Behaviour::Unreachable => unreachable!("no connection to an unreachable server"),
        }
    }

    async fn unbind(&mut self) -> Result<(), DirectoryError> {
        self.server.stats.unbinds.fetch_add(1, Ordering::SeqCst);
        if self.server.fail_unbind {
            return Err(DirectoryError::Operation {
                rc: 80,
                text: "unbind failed".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// FAKE ACCOUNTS
// ============================================================================

#[derive(Default)]
pub struct FakeAccounts {
    pub usernames: Vec<String>,
    pub person_ids: Vec<String>,
    pub broken: bool,
}

impl FakeAccounts {
    pub fn with_username(mut self, username: &str) -> Self {
        self.usernames.push(username.to_string());
        self
    }

    pub fn with_person_id(mut self, person_id: &str) -> Self {
        self.person_ids.push(person_id.to_string());
        self
    }

    /// Every lookup fails as if the database were down.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), AppError> {
        if self.broken {
            return Err(AppError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountLookup for FakeAccounts {
    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.usernames.iter().any(|u| u == username))
    }

    async fn person_id_exists(&self, person_id: &str) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.person_ids.iter().any(|p| p == person_id))
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Account whose password lives in the directory.
pub fn ldap_user(username: &str) -> User {
    User {
        id: 1,
        username: username.to_string(),
        password: password::LDAP_MANAGED_PASSWORD.to_string(),
        is_staff: false,
        person: Some(1),
    }
}

/// Account with a local argon2 hash of `LOCAL_PASSWORD`.
pub fn local_user(username: &str) -> User {
    User {
        id: 2,
        username: username.to_string(),
        password: password::hash_password(LOCAL_PASSWORD).expect("Failed to hash password"),
        is_staff: false,
        person: Some(2),
    }
}

/// Staff account as created by the admin bootstrap: local hash, no person.
pub fn bootstrap_admin(username: &str) -> User {
    User {
        id: 3,
        username: username.to_string(),
        password: password::hash_password(LOCAL_PASSWORD).expect("Failed to hash password"),
        is_staff: true,
        person: None,
    }
}

pub fn form_data(pairs: &[(&str, &str)]) -> FormData {
    FormData::from_pairs(pairs.iter().copied())
}
