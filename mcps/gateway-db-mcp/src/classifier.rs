//! Write-intent classification for raw SQL text
//!
//! Purely lexical: a keyword counts wherever it appears as a whole word,
//! including inside comments and string literals. A false positive only
//! blocks a harmless query in read-only mode, so that is accepted.

use std::sync::LazyLock;

use regex::Regex;

/// Keywords that mark a statement as mutating data or schema
pub const WRITE_KEYWORDS: [&str; 10] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "TRUNCATE", "GRANT", "REVOKE",
    "REPLACE",
];

static WRITE_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII word boundaries: a keyword right after a non-ASCII letter still counts
    let pattern = format!(r"(?i)(?-u:\b)(?:{})(?-u:\b)", WRITE_KEYWORDS.join("|"));
    Regex::new(&pattern).expect("Invalid write keyword regex")
});

/// True if any write keyword appears as a standalone word
pub fn is_write_query(sql: &str) -> bool {
    WRITE_KEYWORD_RE.is_match(sql)
}

/// The first write keyword found, in upper case
pub fn find_write_keyword(sql: &str) -> Option<&'static str> {
    let found = WRITE_KEYWORD_RE.find(sql)?;
    WRITE_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| keyword.eq_ignore_ascii_case(found.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reads_are_not_writes() {
        assert!(!is_write_query("SELECT * FROM users"));
        assert!(!is_write_query("select id, email from users where id = 1"));
        assert!(!is_write_query("WITH t AS (SELECT 1) SELECT * FROM t"));
        assert!(!is_write_query("EXPLAIN SELECT * FROM orders"));
        assert!(!is_write_query(""));
    }

    #[test]
    fn test_keyword_inside_identifier_does_not_match() {
        assert!(!is_write_query("SELECT * FROM insert_log"));
        assert!(!is_write_query("SELECT updated_at, created_by FROM t"));
        assert!(!is_write_query("SELECT * FROM log_delete"));
        assert!(!is_write_query("SELECT dropped FROM stats"));
    }

    #[test]
    fn test_write_statements_match() {
        assert!(is_write_query("INSERT INTO users VALUES (1)"));
        assert!(is_write_query("update users set name = 'x'"));
        assert!(is_write_query("Delete From users"));
        assert!(is_write_query("DROP TABLE users"));
        assert!(is_write_query("create index idx on users (email)"));
        assert!(is_write_query("ALTER TABLE users ADD COLUMN age int"));
        assert!(is_write_query("TRUNCATE users"));
        assert!(is_write_query("GRANT SELECT ON users TO analyst"));
        assert!(is_write_query("REVOKE ALL ON users FROM analyst"));
        assert!(is_write_query("CREATE OR REPLACE VIEW v AS SELECT 1"));
    }

    #[test]
    fn test_keyword_anywhere_in_text_matches() {
        assert!(is_write_query("/* INSERT comment */ SELECT 1"));
        assert!(is_write_query("SELECT 1; DROP TABLE users"));
        assert!(is_write_query("SELECT 'please delete me' AS note"));
        assert!(is_write_query("WITH gone AS (DELETE FROM t RETURNING *) SELECT * FROM gone"));
        assert!(is_write_query("SELECT 1 -- update later"));
    }

    #[test]
    fn test_non_ascii_neighbour_does_not_hide_keyword() {
        assert!(is_write_query("SELECT 1;éDELETE FROM t"));
        assert!(is_write_query("ÄUPDATE t SET x = 1"));
        assert!(!is_write_query("SELECT * FROM insert_log"));
    }

    #[test]
    fn test_find_write_keyword() {
        assert_eq!(find_write_keyword("select 1"), None);
        assert_eq!(find_write_keyword("insert into t values (1)"), Some("INSERT"));
        assert_eq!(find_write_keyword("SELECT 1; truncate t"), Some("TRUNCATE"));
    }
}
