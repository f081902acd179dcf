use crate::workflows::registration::validation::{
    check_email, check_essay, check_phone, suggest_provider, EmailFault, EssayFault, PhoneFault,
};

#[test]
fn well_formed_addresses_pass() {
    for addr in [
        "new.student@gmail.com",
        "priya_k@iitb.edu",
        "someone@research.org",
        "a.b-c@sub.domain.in",
    ] {
        assert_eq!(check_email(addr), Ok(()), "{addr} should validate");
    }
}

#[test]
fn malformed_addresses_are_rejected() {
    for addr in ["not-an-email", "missing@tld", "two@@signs.com", "", "   "] {
        assert_eq!(check_email(addr), Err(EmailFault::Malformed), "{addr}");
    }
}

#[test]
fn known_typo_yields_a_correction_not_a_bare_failure() {
    let fault = check_email("priya@gamil.com").expect_err("typo flagged");
    assert_eq!(
        fault,
        EmailFault::KnownTypo {
            suggestion: "priya@gmail.com".to_string()
        }
    );

    let fault = check_email("priya@outlok.com").expect_err("typo flagged");
    assert_eq!(
        fault,
        EmailFault::KnownTypo {
            suggestion: "priya@outlook.com".to_string()
        }
    );
}

#[test]
fn unlisted_tld_is_rejected() {
    assert_eq!(
        check_email("someone@univ.ac.uk"),
        Err(EmailFault::UnsupportedDomain)
    );
}

#[test]
fn provider_hint_fires_only_when_domain_differs() {
    assert_eq!(
        suggest_provider("priya@gm.com"),
        Some("priya@gmail.com".to_string())
    );
    assert_eq!(
        suggest_provider("priya@yahooo.com"),
        Some("priya@yahoo.com".to_string())
    );
    assert_eq!(suggest_provider("priya@gmail.com"), None);
    assert_eq!(suggest_provider("priya@rediffmail.com"), None);
    assert_eq!(suggest_provider("no-at-sign"), None);
}

#[test]
fn ten_digit_mobile_numbers_pass() {
    for raw in ["9876543210", " 98765 43210 ", "98-76-54-32-10", "6000000000"] {
        let digits = check_phone(raw).expect("valid number");
        assert_eq!(digits.len(), 10);
        assert!(digits.starts_with(['6', '7', '8', '9']));
    }
}

#[test]
fn phone_faults_name_the_defect() {
    assert_eq!(check_phone(""), Err(PhoneFault::Empty));
    assert_eq!(check_phone("   "), Err(PhoneFault::Empty));
    assert_eq!(
        check_phone("98765abcde"),
        Err(PhoneFault::ContainsLetters)
    );
    assert_eq!(
        check_phone("12345"),
        Err(PhoneFault::WrongLength { found: 5 })
    );
    assert_eq!(
        check_phone("98765432101"),
        Err(PhoneFault::WrongLength { found: 11 })
    );
    assert_eq!(check_phone("1234567890"), Err(PhoneFault::BadPrefix));
    assert_eq!(check_phone("5876543210"), Err(PhoneFault::BadPrefix));
}

#[test]
fn wrong_length_message_reports_the_observed_count() {
    let fault = check_phone("987654").expect_err("too short");
    assert!(fault.to_string().contains("you entered 6"));
}

#[test]
fn essay_minimum_is_a_strict_boundary() {
    let text_49 = "x".repeat(49);
    let text_50 = "x".repeat(50);
    assert_eq!(
        check_essay(&text_49, 50),
        Err(EssayFault::TooShort { min: 50, found: 49 })
    );
    assert_eq!(check_essay(&text_50, 50), Ok(()));
}

#[test]
fn essay_length_counts_trimmed_characters() {
    let padded = format!("   {}   ", "y".repeat(50));
    assert_eq!(check_essay(&padded, 50), Ok(()));
}
