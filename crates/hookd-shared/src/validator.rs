//! Field-level validation for inbound commands.
//!
//! A [`Validator`] is constructed per command, fed a series of checks, and
//! discarded once the command is admitted or rejected. Command types hold
//! a `Validator` value and the transport layer invokes it explicitly.

use std::collections::HashMap;

use url::Url;

/// Accumulates named field failures for a single inbound command.
///
/// Only the first reason recorded per field is kept; later checks against
/// the same field are no-ops, so callers see the message of the rule that
/// failed first.
#[derive(Debug, Default)]
pub struct Validator {
    field_errors: HashMap<String, String>,
}

impl Validator {
    /// Record `reason` under `field` unless the field already has one.
    pub fn set_field_error(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.field_errors.entry(field.into()).or_insert_with(|| reason.into());
    }

    /// Record `reason` under `field` when the condition does not hold.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, reason: impl Into<String>) {
        if !ok {
            self.set_field_error(field, reason);
        }
    }

    /// True iff no field has a recorded reason.
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Consume the accumulator, yielding the recorded failures.
    pub fn into_field_errors(self) -> HashMap<String, String> {
        self.field_errors
    }
}

// ---------------------------------------------------------------------------
// Check helpers
// ---------------------------------------------------------------------------

/// True when the value contains at least one non-whitespace character.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// True when the value is at least `n` characters long.
pub fn min_length(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

/// True when the value is at most `n` characters long.
pub fn max_length(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

/// True when the value parses as an absolute http or https URL with a
/// non-empty host.
pub fn http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_lifecycle() {
        let mut validator = Validator::default();
        assert!(validator.is_valid());

        validator.check(true, "foo", "bar");
        assert!(validator.is_valid());

        validator.check(false, "foo", "bar");
        assert!(!validator.is_valid());
    }

    #[test]
    fn first_reason_per_field_wins() {
        let mut validator = Validator::default();
        validator.check(false, "name", "Must be provided");
        validator.check(false, "name", "Must have at most 255 characters");
        validator.check(false, "url", "Must be a valid http or https url");

        let errors = validator.into_field_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["name"], "Must be provided");
        assert_eq!(errors["url"], "Must be a valid http or https url");
    }

    #[test]
    fn blank_checks() {
        assert!(not_blank("hello"));
        assert!(!not_blank(""));
        assert!(!not_blank("   \t\n"));
    }

    #[test]
    fn length_checks_count_chars_not_bytes() {
        assert!(max_length("héllo", 5));
        assert!(!max_length("héllo", 4));
        assert!(min_length("héllo", 5));
        assert!(!min_length("héllo", 6));
    }

    #[test]
    fn url_checks() {
        assert!(http_url("http://example.com"));
        assert!(http_url("https://example.com/hooks?x=1"));
        assert!(!http_url("ftp://example.com"));
        assert!(!http_url("example.com"));
        assert!(!http_url("http://"));
        assert!(!http_url("not a url"));
    }
}
