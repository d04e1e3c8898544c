//! Free-text extraction of signup details.
//!
//! Waitlist signup messages are human-written; the contract is loose: an
//! email-shaped token anywhere in the text plus a `Name: ...` line. Both must
//! be present or the message is dropped by the caller.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("email pattern is valid"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Name: ([^\n]+)").expect("name pattern is valid"));

/// Signup details pulled out of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
}

/// Extract an email address and a name from free text.
///
/// Returns `None` unless both are found.
pub fn extract_user_info(text: &str) -> Option<UserInfo> {
    let email = EMAIL_RE.find(text)?.as_str().to_string();
    let name = NAME_RE.captures(text)?.get(1)?.as_str().to_string();

    Some(UserInfo { email, name })
}
