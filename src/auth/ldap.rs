//! Directory (LDAP) binds used to verify passwords of accounts whose
//! credentials live outside the database.
//!
//! The connection seam is a pair of traits so the bind helper can be driven
//! by the real `ldap3` client or by an in-memory directory in tests.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};

/// LDAP result code for a bind with a wrong identity or password.
const RC_INVALID_CREDENTIALS: u32 = 49;

#[derive(Debug)]
pub enum DirectoryError {
    /// The server rejected the bind identity or password.
    InvalidCredentials,
    /// The server answered an operation with a non-success result code.
    Operation { rc: u32, text: String },
    /// Transport or protocol failure reported by the client library.
    Ldap(ldap3::LdapError),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::InvalidCredentials => write!(f, "invalid credentials"),
            DirectoryError::Operation { rc, text } => {
                write!(f, "operation failed with code {rc}: {text}")
            }
            DirectoryError::Ldap(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Opens connections to a directory server.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DirectoryConnection>, DirectoryError>;
}

/// A single open directory connection.
#[async_trait]
pub trait DirectoryConnection: Send {
    async fn simple_bind(&mut self, user: &str, password: &str) -> Result<(), DirectoryError>;
    async fn unbind(&mut self) -> Result<(), DirectoryError>;
}

/// Tries to bind (log in) on the directory with the given credentials.
///
/// Returns `Ok(true)` when the bind succeeds and `Ok(false)` when the server
/// reports invalid credentials. Any other failure is returned as an error.
/// Once opened, the connection is unbound exactly once before returning,
/// whatever the outcome of the bind.
pub async fn try_ldap_bind(
    connector: &dyn DirectoryConnector,
    user: &str,
    password: &str,
) -> Result<bool, DirectoryError> {
    // A simple bind with an empty password is an anonymous bind and succeeds.
    if password.is_empty() {
        return Ok(false);
    }

    let mut conn = connector.connect().await?;
    let outcome = conn.simple_bind(user, password).await;
    let released = conn.unbind().await;

    match outcome {
        Ok(()) => {
            released?;
            Ok(true)
        }
        Err(DirectoryError::InvalidCredentials) => {
            released?;
            Ok(false)
        }
        Err(e) => {
            if let Err(unbind_err) = released {
                log::warn!("Error during LDAP unbind after failed bind: {unbind_err}");
            }
            Err(e)
        }
    }
}

/// The directory as the application sees it: a connector plus the subtree
/// where member entries live.
pub struct Directory {
    connector: Box<dyn DirectoryConnector>,
    people_base: String,
}

impl Directory {
    pub fn new(connector: Box<dyn DirectoryConnector>, people_base: &str) -> Self {
        Self {
            connector,
            people_base: people_base.to_string(),
        }
    }

    /// Distinguished name of a member entry, e.g.
    /// `uid=jdoe,ou=people,dc=esmgquadrivium,dc=nl`.
    pub fn user_dn(&self, username: &str) -> String {
        format!("uid={},{}", ldap3::dn_escape(username), self.people_base)
    }

    /// Bind as the member entry of `username`.
    pub async fn check_member_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, DirectoryError> {
        let dn = self.user_dn(username);
        log::debug!("Verifying password of {dn} against the directory");
        try_ldap_bind(self.connector.as_ref(), &dn, password).await
    }
}

/// Connector backed by the `ldap3` async client.
pub struct LdapConnector {
    url: String,
    starttls: bool,
    timeout: Duration,
}

impl LdapConnector {
    pub fn new(url: &str, starttls: bool, timeout: Duration) -> Self {
        Self {
            url: url.to_string(),
            starttls,
            timeout,
        }
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    async fn connect(&self) -> Result<Box<dyn DirectoryConnection>, DirectoryError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.timeout)
            .set_starttls(self.starttls);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.url)
            .await
            .map_err(DirectoryError::Ldap)?;

        // The driver finishes once the connection is unbound.
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                log::warn!("LDAP connection driver error: {e}");
            }
        });

        Ok(Box::new(LdapSession { ldap }))
    }
}

struct LdapSession {
    ldap: Ldap,
}

#[async_trait]
impl DirectoryConnection for LdapSession {
    async fn simple_bind(&mut self, user: &str, password: &str) -> Result<(), DirectoryError> {
        let result = self
            .ldap
            .simple_bind(user, password)
            .await
            .map_err(DirectoryError::Ldap)?;

        match result.rc {
            0 => Ok(()),
            RC_INVALID_CREDENTIALS => Err(DirectoryError::InvalidCredentials),
            rc => Err(DirectoryError::Operation {
                rc,
                text: result.text,
            }),
        }
    }

    async fn unbind(&mut self) -> Result<(), DirectoryError> {
        self.ldap.unbind().await.map_err(DirectoryError::Ldap)
    }
}
