//! Owner configuration module for resolving which ledger the binary operates on.
//!
//! Authentication lives outside this crate; the binary identifies its owner through
//! the `BUDGET_OWNER_ID` environment variable (usually set in `.env`).

/// Environment variable holding the owner id
pub const OWNER_ID_VAR: &str = "BUDGET_OWNER_ID";

/// Gets the configured owner id, if any.
///
/// Blank values are treated as unset so that an empty line in `.env` does not
/// authenticate an anonymous owner.
#[must_use]
pub fn get_owner_id() -> Option<String> {
    parse_owner_id(std::env::var(OWNER_ID_VAR).ok())
}

/// Trims a raw owner id, mapping missing or blank values to `None`.
#[must_use]
pub fn parse_owner_id(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_id() {
        assert_eq!(parse_owner_id(None), None);
        assert_eq!(parse_owner_id(Some(String::new())), None);
        assert_eq!(parse_owner_id(Some("   ".to_string())), None);
        assert_eq!(
            parse_owner_id(Some(" alice ".to_string())),
            Some("alice".to_string())
        );
    }
}
