use super::l1::{ExactMatchEntry, ExactMatchStore};
use super::types::{Hint, Route};
use crate::hashing::fingerprint;
use crate::knowledge::KnowledgeEntry;

fn password_entry() -> KnowledgeEntry {
    KnowledgeEntry::new(0, "Как сбросить пароль?", "Перейдите в настройки → Сброс пароля")
        .with_category("Аккаунт", "Пароль")
}

#[test]
fn test_route_values() {
    assert_eq!(Route::ExactMatch.as_str(), "L1");
    assert_eq!(Route::Semantic.as_str(), "L2");
    assert_eq!(Route::SemanticFailed.as_str(), "L2 (failed)");
    assert_eq!(Route::Arbiter.as_str(), "L3");
    assert_eq!(Route::ArbiterFailed.as_str(), "L3 (failed)");
    assert_eq!(Route::Error.as_str(), "ERROR");
}

#[test]
fn test_route_serializes_as_tag() {
    assert_eq!(
        serde_json::to_value(Route::ArbiterFailed).expect("serialize"),
        serde_json::json!("L3 (failed)")
    );
    assert_eq!(format!("{}", Route::ExactMatch), "L1");
    assert!(Route::Arbiter.is_answer());
    assert!(!Route::Error.is_answer());
}

#[test]
fn test_hint_answer_copies_entry() {
    let hint = Hint::answer(Route::ExactMatch, &password_entry(), 100);
    assert_eq!(hint.response, "Перейдите в настройки → Сброс пароля");
    assert_eq!(hint.template, hint.response);
    assert_eq!(hint.category, "Аккаунт");
    assert_eq!(hint.confidence, 100);
}

#[test]
fn test_hint_degraded_shapes() {
    let error = Hint::unavailable(Route::Error);
    assert_eq!(error.confidence, 0);
    assert_eq!(error.category, "Ошибка");
    assert!(error.template.is_empty());

    let none = Hint::no_answer(Route::Semantic);
    assert_eq!(none.category, "Неизвестно");
    assert_eq!(none.subcategory, "Неизвестно");
}

#[test]
fn test_store_exact_lookup() {
    let store = ExactMatchStore::build([&password_entry()]);
    let hit = store.lookup("Как сбросить пароль?").expect("should hit");
    assert_eq!(hit.template, "Перейдите в настройки → Сброс пароля");
    assert_eq!(hit.normalized_question, "как сбросить пароль");
}

#[test]
fn test_store_lookup_is_normalized() {
    let store = ExactMatchStore::build([&password_entry()]);
    assert!(store.lookup("  как СБРОСИТЬ   пароль ").is_some());
    assert!(store.lookup("как сбросить пароль!!!").is_some());
}

#[test]
fn test_store_reworded_misses() {
    let store = ExactMatchStore::build([&password_entry()]);
    assert!(store.lookup("Как сбросить пароль пожалуйста?").is_none());
    assert!(store.lookup("").is_none());
    assert!(store.lookup("???").is_none());
}

#[test]
fn test_store_last_write_wins() {
    let first = KnowledgeEntry::new(0, "Где мой заказ?", "Первый ответ");
    let second = KnowledgeEntry::new(5, "где мой заказ", "Второй ответ");
    let store = ExactMatchStore::build([&first, &second]);

    assert_eq!(store.len(), 1);
    let hit = store.lookup("Где мой заказ?").expect("should hit");
    assert_eq!(hit.template, "Второй ответ");
    assert_eq!(hit.ordinal, 5);
}

#[test]
fn test_store_skips_unindexable_entries() {
    let blank_template = KnowledgeEntry::new(0, "Вопрос", " ");
    let punctuation_only = KnowledgeEntry::new(1, "?!", "Ответ");
    let store = ExactMatchStore::build([&blank_template, &punctuation_only]);
    assert!(store.is_empty());
}

#[test]
fn test_entry_key_is_fingerprint() {
    let entry = ExactMatchEntry::from_knowledge(&password_entry()).expect("entry");
    assert_eq!(entry.normalized_key_hash, fingerprint("Как сбросить пароль?"));
    assert_eq!(entry.to_knowledge(), password_entry());
}

#[test]
fn test_store_serialization_is_deterministic() {
    let entries = [
        KnowledgeEntry::new(0, "b question", "t1"),
        KnowledgeEntry::new(1, "a question", "t2"),
        KnowledgeEntry::new(2, "c question", "t3"),
    ];
    let forward = ExactMatchStore::build(entries.iter());
    let reversed = ExactMatchStore::build(entries.iter().rev());

    let a = serde_json::to_string(&forward).expect("serialize");
    let b = serde_json::to_string(&reversed).expect("serialize");
    assert_eq!(a, b);

    let restored: ExactMatchStore = serde_json::from_str(&a).expect("deserialize");
    assert_eq!(restored, forward);
}
