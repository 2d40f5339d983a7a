//! Ingestion checks for certificate submissions.

use crate::domain::certificate::Submission;
use crate::domain::error::CertError;

/// Hex digits after the `0x` prefix of a wallet address.
const ADDRESS_HEX_LEN: usize = 40;

/// Checks required fields in order (`id`, `name`, `degree`, `major`, `year`)
/// and then the student address format when one is given.
pub fn validate_submission(submission: &Submission) -> Result<(), CertError> {
    let required: [(&'static str, &str); 5] = [
        ("id", submission.id.as_str()),
        ("name", submission.name.as_str()),
        ("degree", submission.degree.as_str()),
        ("major", submission.major.as_str()),
        ("year", submission.year.as_str()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(CertError::MissingField(*field));
    }

    if let Some(address) = submission.student_address() {
        if !is_valid_address(address) {
            return Err(CertError::InvalidAddress);
        }
    }
    Ok(())
}

/// `^0x[0-9a-fA-F]{40}$`
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == ADDRESS_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
