//! Request and response payloads.
//!
//! Everything here is camelCase on the wire. Request bodies carry their
//! `validator` rules; list queries keep `page`/`limit` as raw strings so that
//! garbage values fall back to the defaults instead of failing the request.

pub mod assembly;
pub mod dashboard;
pub mod inventory;
pub mod orders;
pub mod production;
pub mod quality;
pub mod receiving;
pub mod sub_products;
pub mod transfer;
pub mod warehouses;

use validator::ValidationError;

/// Rejects strings that are empty after trimming.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Trims an optional string and drops it when nothing is left.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(not_blank("  ").is_err());
        assert!(not_blank(" x ").is_ok());
    }

    #[test]
    fn clean_drops_whitespace_only() {
        assert_eq!(clean(Some("  ".into())), None);
        assert_eq!(clean(Some(" A1 ".into())), Some("A1".into()));
        assert_eq!(clean(None), None);
    }
}
