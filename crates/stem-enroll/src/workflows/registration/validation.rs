//! Pure field validators. Every fault is a typed value; the orchestrator maps
//! them onto per-step issues so nothing invalid reaches the persistence layer.

use regex::Regex;
use std::sync::OnceLock;

const EMAIL_SHAPE: &str = r"^[\w.\-]+@[\w.\-]+\.\w+$";

/// Top-level domains accepted by the registration form.
const ALLOWED_TLDS: [&str; 7] = ["com", "org", "net", "edu", "gov", "io", "in"];

/// Frequently observed misspellings of the big providers, mapped to the
/// domain the applicant almost certainly meant.
const DOMAIN_TYPOS: [(&str, &str); 5] = [
    ("gamil.com", "gmail.com"),
    ("gnail.com", "gmail.com"),
    ("gmial.com", "gmail.com"),
    ("yaho.com", "yahoo.com"),
    ("outlok.com", "outlook.com"),
];

fn email_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(EMAIL_SHAPE).expect("email pattern compiles"))
}

/// Faults detectable from the address text alone. Uniqueness against prior
/// applicants is a storage concern and is checked by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailFault {
    #[error("invalid email format")]
    Malformed,
    #[error("did you mean {suggestion}?")]
    KnownTypo { suggestion: String },
    #[error("invalid email domain")]
    UnsupportedDomain,
}

pub fn check_email(addr: &str) -> Result<(), EmailFault> {
    let trimmed = addr.trim();
    if !email_shape().is_match(trimmed) {
        return Err(EmailFault::Malformed);
    }

    let (local, domain) = trimmed.split_once('@').ok_or(EmailFault::Malformed)?;
    let domain_lower = domain.to_ascii_lowercase();

    if let Some((_, fixed)) = DOMAIN_TYPOS
        .iter()
        .find(|(typo, _)| *typo == domain_lower)
    {
        return Err(EmailFault::KnownTypo {
            suggestion: format!("{local}@{fixed}"),
        });
    }

    let tld_allowed = ALLOWED_TLDS
        .iter()
        .any(|tld| domain_lower.ends_with(&format!(".{tld}")));
    if !tld_allowed {
        return Err(EmailFault::UnsupportedDomain);
    }

    Ok(())
}

/// Pure first-letter lookup: offer the canonical provider domain when the
/// typed domain starts with the same letter but differs from it.
pub fn suggest_provider(addr: &str) -> Option<String> {
    let (local, domain) = addr.trim().split_once('@')?;
    let first = domain.chars().next()?.to_ascii_lowercase();
    let canonical = match first {
        'g' => "gmail.com",
        'y' => "yahoo.com",
        'o' => "outlook.com",
        _ => return None,
    };

    if domain.eq_ignore_ascii_case(canonical) {
        None
    } else {
        Some(format!("{local}@{canonical}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneFault {
    #[error("phone number is required")]
    Empty,
    #[error("phone number should not contain letters")]
    ContainsLetters,
    #[error("phone number must be exactly 10 digits (you entered {found})")]
    WrongLength { found: usize },
    #[error("phone number should start with 6, 7, 8, or 9")]
    BadPrefix,
}

/// Validate a 10-digit mobile number, returning the normalized digit string.
/// Separators are stripped; alphabetic characters fail outright.
pub fn check_phone(raw: &str) -> Result<String, PhoneFault> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PhoneFault::Empty);
    }
    if trimmed.chars().any(char::is_alphabetic) {
        return Err(PhoneFault::ContainsLetters);
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return Err(PhoneFault::WrongLength {
            found: digits.len(),
        });
    }
    if !matches!(digits.as_bytes()[0], b'6'..=b'9') {
        return Err(PhoneFault::BadPrefix);
    }

    Ok(digits)
}

/// Generous ceiling so pasted essays cannot blow up the metadata blob.
pub const ESSAY_CEILING_CHARS: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EssayFault {
    #[error("minimum {min} characters required (currently: {found})")]
    TooShort { min: usize, found: usize },
    #[error("maximum {max} characters exceeded (currently: {found})")]
    TooLong { max: usize, found: usize },
}

/// Trimmed character count against a configured minimum.
pub fn check_essay(text: &str, min_chars: usize) -> Result<(), EssayFault> {
    let found = text.trim().chars().count();
    if found < min_chars {
        return Err(EssayFault::TooShort {
            min: min_chars,
            found,
        });
    }
    if found > ESSAY_CEILING_CHARS {
        return Err(EssayFault::TooLong {
            max: ESSAY_CEILING_CHARS,
            found,
        });
    }
    Ok(())
}
