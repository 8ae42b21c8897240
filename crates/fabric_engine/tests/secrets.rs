use fabric_engine::{EnvFileStore, SecretError, DEFAULT_MODEL, DEFAULT_VENDOR};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn store(dir: &TempDir) -> EnvFileStore {
    EnvFileStore::new(dir.path().join(".env"))
}

#[test]
fn missing_key_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let err = store(&dir).get(DEFAULT_MODEL).unwrap_err();
    assert!(matches!(err, SecretError::NotFound(_)));
    assert_eq!(err.to_string(), "Key 'DEFAULT_MODEL' not found in .env file");
}

#[test]
fn set_updates_in_place_and_preserves_other_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    std::fs::write(&path, "# comment\nDEFAULT_MODEL=old\nOPENAI_API_KEY=sk-1\n").unwrap();
    let store = EnvFileStore::new(path.clone());

    store.set(DEFAULT_MODEL, "gpt-4o").unwrap();
    store.set(DEFAULT_VENDOR, "OpenAI").unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "# comment\nDEFAULT_MODEL=gpt-4o\nOPENAI_API_KEY=sk-1\nDEFAULT_VENDOR=OpenAI\n"
    );
    assert_eq!(store.get(DEFAULT_MODEL).unwrap(), "gpt-4o");
}

#[test]
fn reset_keeps_the_key_with_an_empty_value() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.set(DEFAULT_MODEL, "llama3").unwrap();
    store.reset(DEFAULT_MODEL).unwrap();
    assert_eq!(store.get(DEFAULT_MODEL).unwrap(), "");
}

#[test]
fn get_many_skips_absent_keys() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.set("A", "1").unwrap();
    let found = store
        .get_many(&["A".to_string(), "B".to_string()])
        .unwrap();
    assert_eq!(found, vec![("A".to_string(), "1".to_string())]);
}

#[test]
fn keys_containing_equals_are_rejected() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        store(&dir).set("A=B", "1"),
        Err(SecretError::InvalidKey(_))
    ));
}
