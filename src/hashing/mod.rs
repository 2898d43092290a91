//! Question normalization and Tier-1 fingerprints.
//!
//! The same [`normalize`] must run when the exact-match store is built and when a query is
//! looked up; any divergence turns every Tier-1 lookup into a miss.

use crate::constants::FINGERPRINT_BYTES;

/// Characters stripped from both ends of a normalized question.
pub const EDGE_PUNCTUATION: [char; 9] = ['?', '.', '!', ',', ';', ':', '-', '—', '–'];

#[inline]
fn is_edge_char(c: char) -> bool {
    c.is_whitespace() || EDGE_PUNCTUATION.contains(&c)
}

/// Canonicalizes question text into the Tier-1 key.
///
/// Lowercases, collapses whitespace runs into one space and strips leading/trailing
/// punctuation together with outer whitespace. Idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_matches(is_edge_char).to_string()
}

/// Returns the 128-bit BLAKE3 digest of an already-normalized key.
#[inline]
pub fn hash_normalized(normalized: &str) -> [u8; FINGERPRINT_BYTES] {
    let hash = blake3::hash(normalized.as_bytes());
    let mut out = [0u8; FINGERPRINT_BYTES];
    out.copy_from_slice(&hash.as_bytes()[..FINGERPRINT_BYTES]);
    out
}

/// Lowercase hex form of a fingerprint digest (the persisted map key).
pub fn fingerprint_hex(digest: &[u8; FINGERPRINT_BYTES]) -> String {
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// `hash(normalize(text))`, hex-encoded.
///
/// Distinct normalized texts with equal digests are treated as the same question.
#[inline]
pub fn fingerprint(text: &str) -> String {
    fingerprint_hex(&hash_normalized(&normalize(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_normalize_lowercases_and_collapses() {
        assert_eq!(normalize("  Как   СБРОСИТЬ\tпароль?  "), "как сбросить пароль");
    }

    #[test]
    fn test_normalize_strips_edge_punctuation() {
        assert_eq!(normalize("— Где мой заказ?!"), "где мой заказ");
        assert_eq!(normalize("...hello, world..."), "hello, world");
        assert_eq!(normalize("? - hello"), "hello");
    }

    #[test]
    fn test_normalize_keeps_inner_punctuation() {
        assert_eq!(normalize("Can't log in: error 403?"), "can't log in: error 403");
    }

    #[test]
    fn test_normalize_only_punctuation() {
        assert_eq!(normalize("?!..."), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_fingerprint_equivalent_inputs() {
        let a = fingerprint("Как сбросить пароль?");
        let b = fingerprint("  как  сбросить ПАРОЛЬ ");
        let c = fingerprint("как сбросить пароль!!!");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_fingerprint_reworded_differs() {
        let a = fingerprint("Как сбросить пароль?");
        let b = fingerprint("Как сбросить пароль пожалуйста?");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_is_128_bit_hex() {
        let fp = fingerprint("test");
        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_uniqueness() {
        let questions = [
            "What is the capital of France?",
            "What is the capital of Germany?",
            "What is the capital of France, really?",
            "capital of France",
        ];
        let prints: HashSet<_> = questions.iter().map(|q| fingerprint(q)).collect();
        assert_eq!(prints.len(), questions.len());
    }

    #[test]
    fn test_fingerprint_matches_manual_pipeline() {
        let text = "  Hello World? ";
        assert_eq!(fingerprint(text), fingerprint_hex(&hash_normalized("hello world")));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn text_strategy() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Zа-яА-Я0-9 \t.,!?;:—–-]{0,120}").expect("valid regex")
    }

    fn edge_strategy() -> impl Strategy<Value = String> {
        prop::string::string_regex("[ \t?.!,;:—–-]{0,6}").expect("valid regex")
    }

    proptest! {
        #[test]
        fn proptest_normalize_idempotent(text in text_strategy()) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn proptest_fingerprint_ignores_case_whitespace_and_edges(
            core in "[a-zа-я]{1,12}( [a-zа-я]{1,12}){0,4}",
            prefix in edge_strategy(),
            suffix in edge_strategy(),
        ) {
            let decorated = format!("{}{}{}", prefix, core.to_uppercase().replace(' ', "   "), suffix);
            prop_assert_eq!(fingerprint(&decorated), fingerprint(&core));
        }
    }
}
