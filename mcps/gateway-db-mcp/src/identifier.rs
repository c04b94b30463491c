//! SQL identifier sanitization
//!
//! Table, schema and column names arrive as free-form tool arguments and end
//! up inside generated SQL or gateway URLs. Anything that is not a plain
//! identifier is rejected before it gets that far.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Schema assumed when none is given
pub const DEFAULT_SCHEMA: &str = "public";

// Segments may carry extra dots and dollar signs; quotes, whitespace,
// semicolons and hyphens (so also `--`) never match.
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$.]*(\.[A-Za-z_][A-Za-z0-9_$.]*)?$")
        .expect("Invalid identifier regex")
});

/// A value that is not a safe SQL identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Invalid {label}: '{value}'. Identifiers must start with a letter or underscore \
     and may only contain letters, digits, underscores, dollar signs and dots."
)]
pub struct IdentifierError {
    /// Role of the value, e.g. `table_name` or `column`
    pub label: String,
    /// The rejected input, verbatim
    pub value: String,
}

/// Check that `value` is a safe identifier and hand it back unchanged
///
/// `label` only appears in the error message.
pub fn sanitize_identifier<'a>(value: &'a str, label: &str) -> Result<&'a str, IdentifierError> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(value)
    } else {
        Err(IdentifierError {
            label: label.to_string(),
            value: value.to_string(),
        })
    }
}

/// Sanitize every name in `names`, stopping at the first bad one
pub fn sanitize_all<'a, I>(names: I, label: &str) -> Result<(), IdentifierError>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .try_for_each(|name| sanitize_identifier(name, label).map(|_| ()))
}

/// A resolved, sanitized table reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
    /// Name to splice into SQL: bare for `public`, `schema.table` otherwise
    pub qualified: String,
}

impl TableRef {
    /// Resolve a table argument and optional schema argument
    ///
    /// A dotted `table` (`audit.users`) carries its own schema; the `schema`
    /// argument is then ignored and the result is always qualified, even
    /// for `public.users`. An undotted `table` takes `schema` (or `public`)
    /// and is only qualified when that schema is not `public`.
    pub fn resolve(table: &str, schema: Option<&str>) -> Result<Self, IdentifierError> {
        if let Some((schema_part, table_part)) = table.split_once('.') {
            let schema = sanitize_identifier(schema_part, "schema")?;
            let table = sanitize_identifier(table_part, "table_name")?;
            return Ok(Self {
                qualified: format!("{}.{}", schema, table),
                schema: schema.to_string(),
                table: table.to_string(),
            });
        }

        let table = sanitize_identifier(table, "table_name")?;
        let schema = sanitize_identifier(schema.unwrap_or(DEFAULT_SCHEMA), "schema")?;

        let qualified = if schema == DEFAULT_SCHEMA {
            table.to_string()
        } else {
            format!("{}.{}", schema, table)
        };

        Ok(Self {
            schema: schema.to_string(),
            table: table.to_string(),
            qualified,
        })
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)
    }
}
