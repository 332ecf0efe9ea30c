//! Tests for the on-disk profile cache.

mod common;

use common::user;
use skillswap_core::storage::{ProfileCache, StorageError};

#[test]
fn test_load_missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProfileCache::new(dir.path().join("profile.json"));

    assert!(cache.load().unwrap().is_none());
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProfileCache::new(dir.path().join("profile.json"));

    let mut alice = user("alice");
    alice.bio = "I teach ceramics".into();
    alice.skills = vec!["ceramics".into(), "glazing".into()];
    cache.save(&alice).unwrap();

    let loaded = cache.load().unwrap().unwrap();
    assert_eq!(loaded, alice);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProfileCache::new(dir.path().join("nested").join("deeper").join("profile.json"));

    cache.save(&user("alice")).unwrap();
    assert!(cache.path().exists());
}

#[test]
fn test_save_overwrites_previous_profile() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProfileCache::new(dir.path().join("profile.json"));

    cache.save(&user("alice")).unwrap();
    cache.save(&user("bob")).unwrap();

    assert_eq!(cache.load().unwrap().unwrap().id, "bob");
}

#[test]
fn test_clear_removes_file_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProfileCache::new(dir.path().join("profile.json"));

    cache.save(&user("alice")).unwrap();
    cache.clear().unwrap();
    assert!(!cache.path().exists());

    // Clearing again is not an error.
    cache.clear().unwrap();
    assert!(cache.load().unwrap().is_none());
}

#[test]
fn test_corrupt_file_reports_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(&path, "{ not json").unwrap();

    let cache = ProfileCache::new(&path);
    assert!(matches!(
        cache.load(),
        Err(StorageError::Serialization(_))
    ));
}
