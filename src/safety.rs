//! Query Safety Validator
//!
//! Pure deny-list filter enforcing the read-only, single-statement policy on
//! model-generated SQL. This is a shape check, not a SQL parser: it matches
//! keywords on word boundaries, so it can over-reject legitimate SELECTs
//! (e.g. a column literally named `update`) and cannot catch every obfuscated
//! statement. Treat it as defense-in-depth; the executor opens the store
//! read-only as the second layer.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FORBIDDEN_KEYWORD: Regex =
        Regex::new(r"(?i)\b(insert|update|delete|drop|alter|attach|pragma)\b")
            .expect("forbidden keyword regex");
}

/// Verdict of the safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryVerdict {
    Safe,
    Blocked(String),
}

impl QueryVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, QueryVerdict::Safe)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            QueryVerdict::Safe => None,
            QueryVerdict::Blocked(reason) => Some(reason),
        }
    }
}

/// Validate a candidate SQL statement against the read-only policy.
///
/// Rejects empty input, anything that is not a single statement, anything
/// that does not start with SELECT, and any statement containing a mutating
/// or session-level keyword.
pub fn validate_query(candidate: &str) -> QueryVerdict {
    let trimmed = candidate.trim();

    if trimmed.is_empty() {
        return QueryVerdict::Blocked("Empty query".to_string());
    }

    // A single trailing semicolon is tolerated; anything after it is a
    // second statement.
    if let Some(pos) = trimmed.find(';') {
        if !trimmed[pos + 1..].trim().is_empty() {
            return QueryVerdict::Blocked(
                "Multiple SQL statements are not allowed".to_string(),
            );
        }
    }

    let starts_with_select = trimmed
        .get(..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("select"))
        .unwrap_or(false);
    if !starts_with_select {
        return QueryVerdict::Blocked("Only SELECT statements are allowed".to_string());
    }

    if let Some(m) = FORBIDDEN_KEYWORD.find(trimmed) {
        return QueryVerdict::Blocked(format!(
            "Forbidden keyword '{}' detected",
            m.as_str().to_uppercase()
        ));
    }

    QueryVerdict::Safe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_select() {
        assert!(validate_query("SELECT id, subject FROM ER").is_safe());
    }

    #[test]
    fn accepts_select_with_trailing_semicolon() {
        assert!(validate_query("select count(*) from ER;").is_safe());
    }

    #[test]
    fn accepts_select_with_aliases_and_coalesce() {
        let sql = r#"SELECT c.name AS "company", COALESCE(AVG(e.totalCached), 0) AS "avgScore"
                     FROM ER e JOIN Company c ON e.companyId = c.id GROUP BY c.name"#;
        assert!(validate_query(sql).is_safe());
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(!validate_query("").is_safe());
        assert!(!validate_query("   \n\t ").is_safe());
    }

    #[test]
    fn rejects_second_statement_after_semicolon() {
        let verdict = validate_query("SELECT 1; DROP TABLE ER");
        assert_eq!(
            verdict,
            QueryVerdict::Blocked("Multiple SQL statements are not allowed".to_string())
        );
    }

    #[test]
    fn rejects_mutating_keywords_any_case() {
        for sql in [
            "INSERT INTO ER VALUES (1)",
            "update ER set status = 'OPEN'",
            "DeLeTe FROM ER",
            "DROP TABLE ER",
            "alter table ER add column x",
            "ATTACH DATABASE 'x' AS y",
            "PRAGMA table_info(ER)",
        ] {
            assert!(!validate_query(sql).is_safe(), "should block: {}", sql);
        }
    }

    #[test]
    fn rejects_non_select_prefix() {
        assert!(!validate_query("WITH t AS (SELECT 1) SELECT * FROM t").is_safe());
        assert!(!validate_query("EXPLAIN SELECT 1").is_safe());
    }

    #[test]
    fn rejects_select_that_smuggles_delete() {
        assert!(!validate_query("SELECT 1 WHERE EXISTS (DELETE FROM ER)").is_safe());
    }

    // Known over-rejection of the keyword filter: a column named after a
    // mutating verb is blocked even though the statement is a pure SELECT.
    #[test]
    fn over_rejects_column_named_update() {
        assert!(!validate_query("SELECT update FROM audit_log").is_safe());
    }

    #[test]
    fn keyword_match_respects_word_boundaries() {
        // "updatedAt" contains "update" as a substring but not as a word.
        assert!(validate_query("SELECT updatedAt FROM ER").is_safe());
        assert!(validate_query("SELECT lastUpdated, droplets FROM ER").is_safe());
    }
}
