//! Small field checks shared by the request validators.

use super::FieldErrors;

pub const BLANK: &str = "This field may not be blank.";
pub const REQUIRED: &str = "This field is required.";

/// Returns the trimmed value of a required text field, recording an error
/// when it is missing or blank.
pub fn required_text(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(v) => Some(v.trim().to_string()),
    }
}

/// Like [`required_text`] but only checks values that are present.
pub fn optional_text(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(v) => Some(v.trim().to_string()),
        None => None,
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_reports_missing_and_blank() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_text(&mut errors, "title", None), None);
        assert_eq!(required_text(&mut errors, "description", Some("   ")), None);
        assert_eq!(
            required_text(&mut errors, "tel", Some(" 0123 ")),
            Some("0123".to_string())
        );

        assert_eq!(errors.get("title"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("description"), Some(&[BLANK.to_string()][..]));
        assert!(!errors.contains("tel"));
    }

    #[test]
    fn test_optional_text_ignores_absent_values() {
        let mut errors = FieldErrors::new();
        assert_eq!(optional_text(&mut errors, "location", None), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane@@example.com"));
        assert!(!is_valid_email("jane doe@example.com"));
    }

    #[test]
    fn test_round_price_two_decimals() {
        assert_eq!(round_price(99.999), 100.0);
        assert_eq!(round_price(12.344), 12.34);
        assert_eq!(round_price(150.0), 150.0);
    }
}
