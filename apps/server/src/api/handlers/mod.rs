pub mod admin;
pub mod businesses;
pub mod health;

use crate::{Error, Result};

/// Parse an optional positive integer query parameter.
///
/// Absent or empty values yield `None`; anything else must parse as `u32 >= 1`.
pub(crate) fn parse_positive(name: &str, raw: Option<&str>) -> Result<Option<u32>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(value) if value >= 1 => Ok(Some(value)),
        _ => Err(Error::Validation(format!(
            "{name} must be a positive integer"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_positive;

    #[test]
    fn positive_integers_only() {
        assert_eq!(parse_positive("limit", None).unwrap(), None);
        assert_eq!(parse_positive("limit", Some("")).unwrap(), None);
        assert_eq!(parse_positive("limit", Some("5")).unwrap(), Some(5));
        assert!(parse_positive("limit", Some("0")).is_err());
        assert!(parse_positive("limit", Some("-3")).is_err());
        assert!(parse_positive("limit", Some("ten")).is_err());
    }
}
