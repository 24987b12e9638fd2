//! Registration-time identity validation: the formatted identity id, the
//! 50-state set, zip codes and email addresses.

use crate::error::DomainError;

const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

/// Identity ids are formatted `NNN-NN-NNNN`.
pub fn validate_identity_id(raw: &str) -> Result<(), DomainError> {
    let bytes = raw.as_bytes();
    if bytes.len() != 11 {
        return Err(DomainError::InvalidUserId);
    }
    for (i, b) in bytes.iter().enumerate() {
        let ok = match i {
            3 | 6 => *b == b'-',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return Err(DomainError::InvalidUserId);
        }
    }
    Ok(())
}

pub fn validate_state(raw: &str) -> Result<(), DomainError> {
    if US_STATES.contains(&raw) {
        Ok(())
    } else {
        Err(DomainError::MalformedState)
    }
}

/// Accepts `NNNNN` and `NNNNN-NNNN`.
pub fn validate_zip(raw: &str) -> Result<(), DomainError> {
    let bytes = raw.as_bytes();
    let ok = match bytes.len() {
        5 => bytes.iter().all(|b| b.is_ascii_digit()),
        10 => {
            bytes[..5].iter().all(|b| b.is_ascii_digit())
                && bytes[5] == b'-'
                && bytes[6..].iter().all(|b| b.is_ascii_digit())
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(DomainError::MalformedZip)
    }
}

/// Lowercases and checks the shape; storage always holds the lowercased form.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::InvalidEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.starts_with('.') {
        return Err(DomainError::InvalidEmail);
    }
    if email.contains(char::is_whitespace) {
        return Err(DomainError::InvalidEmail);
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_id_format() {
        assert!(validate_identity_id("123-45-6789").is_ok());
        assert!(validate_identity_id("123456789").is_err());
        assert!(validate_identity_id("123-45-678").is_err());
        assert!(validate_identity_id("abc-de-fghi").is_err());
        assert!(validate_identity_id("123-45-67890").is_err());
    }

    #[test]
    fn state_set_is_the_fifty_states() {
        assert!(validate_state("CA").is_ok());
        assert!(validate_state("NY").is_ok());
        assert!(validate_state("ZZ").is_err());
        // Two-letter codes that are not states
        assert!(validate_state("DC").is_err());
        assert!(validate_state("PR").is_err());
        assert!(validate_state("ca").is_err());
    }

    #[test]
    fn zip_plain_and_plus_four() {
        assert!(validate_zip("94107").is_ok());
        assert!(validate_zip("94107-1234").is_ok());
        assert!(validate_zip("9410").is_err());
        assert!(validate_zip("94107-12").is_err());
        assert!(validate_zip("94107 1234").is_err());
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(normalize_email("Traveler@Example.COM").unwrap(), "traveler@example.com");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("user@nodot").is_err());
        assert!(normalize_email("user@.com").is_err());
    }
}
