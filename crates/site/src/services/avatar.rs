//! Gravatar avatar resolution.
//!
//! Comments show the author's Gravatar, resolved purely from their email
//! address. No network I/O happens here; we only build the URL.

use md5::{Digest, Md5};

/// Avatar size in pixels.
const SIZE: u32 = 100;

/// Default image style when the email has no Gravatar.
const DEFAULT: &str = "retro";

/// Maximum content rating.
const RATING: &str = "g";

/// Build the Gravatar URL for an email address.
///
/// The email is trimmed and lowercased before hashing, per the Gravatar
/// convention, so equivalent addresses resolve to the same avatar.
#[must_use]
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Md5::digest(normalized.as_bytes());
    let hash = hex::encode(digest);

    format!("https://www.gravatar.com/avatar/{hash}?s={SIZE}&d={DEFAULT}&r={RATING}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // Digest from the Gravatar documentation example.
        let url = gravatar_url("MyEmailAddress@example.com ");
        assert!(url.contains("/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346"));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(
            gravatar_url("User@Example.com"),
            gravatar_url("  user@example.com  ")
        );
    }

    #[test]
    fn test_fixed_parameters() {
        let url = gravatar_url("user@example.com");
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?s=100&d=retro&r=g"));
    }
}
