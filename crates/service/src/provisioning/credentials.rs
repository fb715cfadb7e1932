use std::fmt::Write as _;

use rand::rngs::OsRng;
use rand::RngCore;

/// Product prefix on generated temporary passwords. Keeps support able to
/// recognize never-changed credentials at a glance.
pub const PASSWORD_PREFIX: &str = "Pausiva-";

/// Minimum length the identity subsystem enforces for credentials.
pub const MIN_PASSWORD_LEN: usize = 8;

const SUFFIX_BYTES: usize = 8;

/// Generate `Pausiva-` followed by 8 bytes of OS randomness, hex-encoded.
/// 64 bits of entropy makes reuse across calls effectively impossible.
pub fn generate_temporary_password() -> String {
    let mut bytes = [0u8; SUFFIX_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let mut out = String::with_capacity(PASSWORD_PREFIX.len() + SUFFIX_BYTES * 2);
    out.push_str(PASSWORD_PREFIX);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// An explicit password is honored verbatim (trimmed) when it meets the
/// minimum length; anything shorter, blank, or absent falls back to a
/// generated credential.
pub fn resolve_credential(explicit: Option<&str>) -> String {
    match explicit.map(str::trim) {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LEN => p.to_string(),
        _ => generate_temporary_password(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_password_shape() {
        let pw = generate_temporary_password();
        assert!(pw.starts_with(PASSWORD_PREFIX));
        let suffix = &pw[PASSWORD_PREFIX.len()..];
        assert_eq!(suffix.len(), SUFFIX_BYTES * 2);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(pw.len() >= MIN_PASSWORD_LEN);
    }

    #[test]
    fn generated_passwords_are_distinct() {
        let generated: HashSet<String> =
            (0..1000).map(|_| generate_temporary_password()).collect();
        assert_eq!(generated.len(), 1000);
    }

    #[test]
    fn explicit_password_used_verbatim_after_trim() {
        assert_eq!(resolve_credential(Some("  hunter2-secret  ")), "hunter2-secret");
        assert_eq!(resolve_credential(Some("exactly8!")), "exactly8!");
    }

    #[test]
    fn short_or_missing_password_falls_back_to_generation() {
        for explicit in [None, Some(""), Some("   "), Some("short"), Some(" 1234567 ")] {
            let pw = resolve_credential(explicit);
            assert!(pw.starts_with(PASSWORD_PREFIX), "got {pw:?} for {explicit:?}");
        }
    }
}
