//! Bearer-token subject parsing.
//!
//! Identity-provider subjects look like `oauth2|discord|81234567890123456`.
//! The trailing numeric segment is the caller's Discord id, which is the
//! internal identifier used everywhere else.

/// Extract the trailing numeric segment of a `provider|provider|numericId`
/// subject. Returns `None` when the last segment is empty or not all digits.
pub fn discord_id_from_subject(subject: &str) -> Option<String> {
    let last = subject.rsplit('|').next()?;
    if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
        Some(last.to_string())
    } else {
        None
    }
}
