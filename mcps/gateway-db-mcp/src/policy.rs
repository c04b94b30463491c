//! Read-only policy
//!
//! The access mode is fixed at startup. Every gateway operation declares an
//! [`Access`] class and is checked here before anything leaves the process.

use thiserror::Error;

use crate::classifier::{find_write_keyword, is_write_query};
use crate::config::AccessMode;

/// What a gateway operation can do to the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    /// Reads only, by construction
    Read,
    /// Caller-supplied SQL text, screened in read-only mode
    Sql(&'a str),
    /// Exists to change data or schema
    Mutation,
}

/// Why the policy refused an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyRefusal {
    #[error("Read-only mode is enabled: this tool modifies data and is disabled.")]
    MutationBlocked,

    #[error(
        "Read-only mode is enabled: the query contains a write operation \
         (INSERT, UPDATE, DELETE, DROP, CREATE, ALTER, TRUNCATE, GRANT, REVOKE, REPLACE) \
         and was not executed."
    )]
    WriteQueryBlocked,
}

#[derive(Debug, Clone, Copy)]
pub struct Policy {
    mode: AccessMode,
}

impl Policy {
    pub fn new(mode: AccessMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Decide whether an operation may be forwarded
    pub fn check(&self, access: &Access<'_>) -> Result<(), PolicyRefusal> {
        if !self.mode.is_restricted() {
            return Ok(());
        }

        match access {
            Access::Read => Ok(()),
            Access::Mutation => Err(PolicyRefusal::MutationBlocked),
            Access::Sql(text) if is_write_query(text) => {
                tracing::debug!(keyword = ?find_write_keyword(text), "write keyword in query");
                Err(PolicyRefusal::WriteQueryBlocked)
            }
            Access::Sql(_) => Ok(()),
        }
    }
}
