use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

fn patient_id_regex() -> &'static Regex {
    static PATIENT_ID: OnceLock<Regex> = OnceLock::new();
    PATIENT_ID.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("patient id pattern compiles"))
}

/// Loose `local@domain.tld` shape check, no whitespace and a single `@`
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_valid_patient_id(id: &str) -> bool {
    patient_id_regex().is_match(id)
}

/// Split a comma separated field into trimmed, non-empty tags
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cosmetic per-keystroke state of a form field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldCheck {
    #[default]
    Clean,
    Invalid(&'static str),
}

impl FieldCheck {
    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldCheck::Invalid(_))
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            FieldCheck::Clean => None,
            FieldCheck::Invalid(msg) => Some(msg),
        }
    }
}

/// Runs on every edit of the patient id field. An empty field is never flagged.
pub fn check_patient_id(value: &str) -> FieldCheck {
    if value.is_empty() || is_valid_patient_id(value) {
        FieldCheck::Clean
    } else {
        FieldCheck::Invalid("Patient ID can only contain letters and numbers")
    }
}

/// Runs on every edit of the email field. An empty field is never flagged.
pub fn check_email(value: &str) -> FieldCheck {
    if value.is_empty() || is_valid_email(value) {
        FieldCheck::Clean
    } else {
        FieldCheck::Invalid("Please enter a valid email address")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@mail.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("jane@@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_patient_id_alphanumeric_only() {
        assert!(is_valid_patient_id("P1234"));
        assert!(!is_valid_patient_id("P-1234"));
        assert!(!is_valid_patient_id(""));
    }

    #[test]
    fn test_split_tags_trims_and_drops_empty() {
        assert_eq!(split_tags("asthma, diabetes"), vec!["asthma", "diabetes"]);
        assert_eq!(split_tags(" , penicillin,,  latex , "), vec!["penicillin", "latex"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_field_checks_ignore_empty_input() {
        assert_eq!(check_email(""), FieldCheck::Clean);
        assert_eq!(check_patient_id(""), FieldCheck::Clean);
        assert!(check_email("jane@").is_invalid());
        assert_eq!(
            check_patient_id("ab_12").message(),
            Some("Patient ID can only contain letters and numbers")
        );
    }
}
