//! Structured configuration issues.
//!
//! Configuration loaders report problems as [`ConfigIssue`] values rather
//! than failing on the first one, so every issue can be shown at once.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the bar cannot open with this configuration.
    Error,
    /// Non-fatal: the bar runs but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A numeric value lies outside its allowed range.
    OutOfRange { field: String },
    /// A string value is not one of the accepted choices.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// Two personas share a name.
    DuplicatePersona { name: String },
    /// No personas were configured.
    EmptyRoster,
    /// The n-gram range is inverted.
    InvertedRange { min_field: String, max_field: String },
    /// A required value is blank.
    EmptyField { field: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Returns an issue if `value` is outside `[0, 1]`.
pub fn check_unit_interval(field: &str, value: f64) -> Option<ConfigIssue> {
    if (0.0..=1.0).contains(&value) {
        None
    } else {
        Some(ConfigIssue::error(
            ConfigIssueCode::OutOfRange {
                field: field.to_string(),
            },
            format!("{}: {} is outside [0, 1]", field, value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_accepts_bounds() {
        assert!(check_unit_interval("x", 0.0).is_none());
        assert!(check_unit_interval("x", 1.0).is_none());
    }

    #[test]
    fn unit_interval_rejects_out_of_range() {
        let issue = check_unit_interval("diversity.threshold", 1.5).unwrap();
        assert!(issue.is_error());
        assert_eq!(
            issue.code,
            ConfigIssueCode::OutOfRange {
                field: "diversity.threshold".to_string()
            }
        );
        assert!(check_unit_interval("x", -0.1).is_some());
        assert!(check_unit_interval("x", f64::NAN).is_some());
    }
}
