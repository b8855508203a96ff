/// Opaque bearer token utilities
///
/// Access tokens are random strings handed to the client once at login or
/// registration. Only their SHA-256 digest is stored, so a leaked database
/// row cannot be replayed as a credential. Lookup is by digest through the
/// unique index on `access_tokens.token_hash`; the plaintext is never
/// compared directly.
///
/// # Format
///
/// ```text
/// tbk_ + 40 alphanumeric characters = 44 characters total
/// ```
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::token::{generate_token, hash_token};
///
/// let (token, hash) = generate_token();
/// assert!(token.starts_with("tbk_"));
/// assert_eq!(hash, hash_token(&token));
/// ```

use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

/// Prefix carried by every issued token
pub const TOKEN_PREFIX: &str = "tbk_";

/// Number of random characters after the prefix
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Full plaintext token length
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new token and its storage hash
///
/// Returns `(plaintext, sha256_hex)`. The plaintext must be shown to the
/// caller exactly once; persist only the hash.
pub fn generate_token() -> (String, String) {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LENGTH)
        .map(char::from)
        .collect();

    let token = format!("{}{}", TOKEN_PREFIX, random);
    let hash = hash_token(&token);

    (token, hash)
}

/// SHA-256 digest of a token, hex encoded (64 chars)
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Cheap structural check run before touching the database
///
/// ```
/// use taskboard_shared::auth::token::validate_token_format;
///
/// assert!(validate_token_format("tbk_0123456789abcdefghijABCDEFGHIJ0123456789"));
/// assert!(!validate_token_format("tbk_short"));
/// assert!(!validate_token_format("Bearer tbk_0123456789abcdefghijABCDEFGHIJ012345"));
/// ```
pub fn validate_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token.starts_with(TOKEN_PREFIX)
        && token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
}

/// Extracts the credential from an `Authorization` header value
///
/// The scheme is matched case-insensitively, as HTTP auth schemes are.
///
/// ```
/// use taskboard_shared::auth::token::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
/// assert_eq!(parse_bearer("bearer abc"), Some("abc"));
/// assert_eq!(parse_bearer("Basic abc"), None);
/// assert_eq!(parse_bearer("Bearer "), None);
/// ```
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    let (scheme, credential) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let credential = credential.trim();
    if credential.is_empty() {
        None
    } else {
        Some(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let (token, hash) = generate_token();

        assert!(token.starts_with(TOKEN_PREFIX));
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(validate_token_format(&token));
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_generate_token_is_random() {
        let (a, hash_a) = generate_token();
        let (b, hash_b) = generate_token();

        assert_ne!(a, b);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_hash_token_deterministic() {
        assert_eq!(hash_token("tbk_same"), hash_token("tbk_same"));
        assert_ne!(hash_token("tbk_same"), hash_token("tbk_other"));
    }

    #[test]
    fn test_validate_token_format_rejects_symbols() {
        let mut token = String::from(TOKEN_PREFIX);
        token.push_str(&"a".repeat(39));
        token.push('!');

        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(!validate_token_format(&token));
    }

    #[test]
    fn test_parse_bearer_trims_whitespace() {
        assert_eq!(parse_bearer("Bearer   tbk_abc  "), Some("tbk_abc"));
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer(""), None);
    }
}
