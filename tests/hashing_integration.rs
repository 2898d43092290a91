//! Integration tests for question normalization and exact-match keys.

use std::collections::HashSet;

use triage::cache::ExactMatchStore;
use triage::hashing::{fingerprint, fingerprint_hex, hash_normalized, normalize};
use triage::knowledge::KnowledgeEntry;

#[test]
fn test_blake3_truncation_matches_fingerprint() {
    let normalized = normalize("Как сбросить пароль?");
    let full = blake3::hash(normalized.as_bytes());

    let digest = hash_normalized(&normalized);
    assert_eq!(&digest[..], &full.as_bytes()[..16]);
    assert_eq!(fingerprint("Как сбросить пароль?"), fingerprint_hex(&digest));
}

#[test]
fn test_fingerprint_is_32_lowercase_hex_chars() {
    let fp = fingerprint("Где мой заказ?");
    assert_eq!(fp.len(), 32);
    assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_surface_variants_share_a_key() {
    let variants = [
        "Как сбросить пароль?",
        "как сбросить пароль",
        "  КАК   сбросить\tПАРОЛЬ?!  ",
        "Как сбросить пароль...",
    ];
    let keys: HashSet<String> = variants.iter().map(|v| fingerprint(v)).collect();
    assert_eq!(keys.len(), 1);
}

#[test]
fn test_different_questions_have_different_keys() {
    let questions = [
        "Как сбросить пароль?",
        "Как сбросить пароль пожалуйста?",
        "Как изменить пароль?",
        "Как сбросить email?",
    ];
    let keys: HashSet<String> = questions.iter().map(|q| fingerprint(q)).collect();
    assert_eq!(keys.len(), questions.len());
}

#[test]
fn test_store_round_trips_through_json() {
    let entries = vec![
        KnowledgeEntry::new(0, "Как сбросить пароль?", "Нажмите «Забыли пароль?»")
            .with_category("Аккаунт", "Доступ"),
        KnowledgeEntry::new(1, "Где мой заказ?", "Проверьте статус в разделе Заказы"),
    ];
    let store = ExactMatchStore::build(&entries);

    let json = serde_json::to_string(&store).expect("serialize");
    let restored: ExactMatchStore = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, store);
    let hit = restored.lookup("КАК СБРОСИТЬ ПАРОЛЬ").expect("hit after reload");
    assert_eq!(hit.ordinal, 0);
    assert_eq!(hit.category, "Аккаунт");

    let value: serde_json::Value = serde_json::from_str(&json).expect("json");
    let key = fingerprint("Где мой заказ?");
    assert_eq!(value[&key]["normalized_question"], "где мой заказ");
}
