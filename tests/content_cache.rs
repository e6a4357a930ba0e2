mod common;

use std::fs;
use std::path::Path;
use std::thread;

use common::{FixtureServer, zip_bytes};
use recdata::{CacheConfig, CacheEntry, CancellationToken, ContentCache, DatasetError};
use tempfile::tempdir;

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|read| {
            read.filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn repeated_get_downloads_once() {
    let server = FixtureServer::spawn(vec![("/ratings.txt", b"u1\ti1\t4\n".to_vec())], 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));
    let entry = CacheEntry::new(server.url("/ratings.txt"), "toy/ratings.txt");

    let first = cache.get(&entry).unwrap();
    let second = cache.get(&entry).unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read(&first).unwrap(), b"u1\ti1\t4\n");
    assert_eq!(server.request_count(), 1);
    assert_eq!(dir_entries(first.parent().unwrap()), vec!["ratings.txt"]);
}

#[test]
fn unzip_publishes_member_and_siblings() {
    let archive = zip_bytes(&[
        ("rating.txt", b"u1\ti1\t5\n".as_slice()),
        ("readme.txt", b"notes".as_slice()),
    ]);
    let server = FixtureServer::spawn(vec![("/toy/rating.zip", archive)], 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));

    let path = cache
        .fetch(&server.url("/toy/rating.zip"), "toy/rating.txt", true)
        .unwrap();

    assert_eq!(path, temp.path().join("toy/rating.txt"));
    assert_eq!(fs::read(&path).unwrap(), b"u1\ti1\t5\n");
    assert!(cache.contains("toy/readme.txt"));
    assert_eq!(
        dir_entries(&temp.path().join("toy")),
        vec!["rating.txt", "readme.txt"]
    );
    assert_eq!(cache.usage_bytes(), 9 + 5);
}

#[test]
fn corrupt_archive_leaves_nothing_behind() {
    let server = FixtureServer::spawn(vec![("/bad.zip", b"definitely not a zip".to_vec())], 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));

    let err = cache
        .fetch(&server.url("/bad.zip"), "toy/rating.txt", true)
        .unwrap_err();

    assert!(matches!(err, DatasetError::Archive { .. }), "got {err:?}");
    assert!(!cache.contains("toy/rating.txt"));
    assert!(dir_entries(&temp.path().join("toy")).is_empty());
}

#[test]
fn missing_archive_member_is_an_archive_error() {
    let archive = zip_bytes(&[("other.txt", b"x".as_slice())]);
    let server = FixtureServer::spawn(vec![("/a.zip", archive)], 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));

    let err = cache
        .fetch(&server.url("/a.zip"), "toy/rating.txt", true)
        .unwrap_err();

    assert!(matches!(err, DatasetError::Archive { .. }), "got {err:?}");
    assert!(cache.cached_files().is_empty());
}

#[test]
fn http_error_surfaces_as_network_failure() {
    let server = FixtureServer::spawn(Vec::new(), 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));

    let err = cache
        .fetch(&server.url("/missing.txt"), "toy/missing.txt", false)
        .unwrap_err();

    assert!(matches!(err, DatasetError::Network { .. }), "got {err:?}");
    assert!(!cache.contains("toy/missing.txt"));
}

#[test]
fn stale_entry_is_replaced_when_size_disagrees() {
    let body = b"i1\ti2\ni2\ti3\n".to_vec();
    let server = FixtureServer::spawn(vec![("/context.txt", body.clone())], 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));
    let target = cache.path_for("toy/context.txt").unwrap();
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, b"i1\t").unwrap();

    let entry = CacheEntry::new(server.url("/context.txt"), "toy/context.txt")
        .with_expected_bytes(body.len() as u64);
    let path = cache.get(&entry).unwrap();

    assert_eq!(fs::read(path).unwrap(), body);
    assert_eq!(server.request_count(), 1);
}

#[test]
fn size_mismatch_after_download_is_rejected() {
    let server = FixtureServer::spawn(vec![("/ids.txt", b"a\nb\n".to_vec())], 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));
    let entry = CacheEntry::new(server.url("/ids.txt"), "toy/ids.txt").with_expected_bytes(99);

    let err = cache.get(&entry).unwrap_err();

    assert!(matches!(err, DatasetError::Network { .. }), "got {err:?}");
    assert!(!cache.contains("toy/ids.txt"));
}

#[test]
fn rejected_download_never_replaces_the_cached_file() {
    let server = FixtureServer::spawn(vec![("/ids.txt", b"a\nb\nc\n".to_vec())], 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));
    let target = cache.path_for("toy/ids.txt").unwrap();
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, b"a\n").unwrap();
    let entry = CacheEntry::new(server.url("/ids.txt"), "toy/ids.txt").with_expected_bytes(4);

    let err = cache.get(&entry).unwrap_err();

    assert!(matches!(err, DatasetError::Network { .. }), "got {err:?}");
    assert_eq!(fs::read(&target).unwrap(), b"a\n");
    assert_eq!(dir_entries(&temp.path().join("toy")), vec!["ids.txt"]);
}

#[test]
fn archive_member_of_wrong_size_is_not_published() {
    let archive = zip_bytes(&[("item_ids.txt", b"i1\ni2\n".as_slice())]);
    let server = FixtureServer::spawn(vec![("/toy/item_ids.zip", archive)], 1);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));
    let entry = CacheEntry::new(server.url("/toy/item_ids.zip"), "toy/item_ids.txt")
        .unzipped()
        .with_expected_bytes(100);

    let err = cache.get(&entry).unwrap_err();

    assert!(matches!(err, DatasetError::Archive { .. }), "got {err:?}");
    assert!(dir_entries(&temp.path().join("toy")).is_empty());
}

#[test]
fn cancelled_cache_refuses_to_download() {
    let server = FixtureServer::spawn(vec![("/ids.txt", b"a\n".to_vec())], 1);
    let temp = tempdir().unwrap();
    let token = CancellationToken::new();
    let cache = ContentCache::new(CacheConfig::new(temp.path())).with_cancellation(token.clone());
    token.cancel();

    let err = cache
        .fetch(&server.url("/ids.txt"), "toy/ids.txt", false)
        .unwrap_err();

    assert!(matches!(err, DatasetError::Cancelled { .. }), "got {err:?}");
    assert_eq!(server.request_count(), 0);
    assert!(!cache.contains("toy/ids.txt"));
}

#[test]
fn concurrent_misses_both_observe_a_complete_file() {
    let body: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    let server = FixtureServer::spawn(vec![("/blob.bin", body.clone())], 2);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));
    let entry = CacheEntry::new(server.url("/blob.bin"), "toy/blob.bin");

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let cache = cache.clone();
            let entry = entry.clone();
            thread::spawn(move || cache.get(&entry).unwrap())
        })
        .collect();
    for handle in handles {
        let path = handle.join().unwrap();
        assert_eq!(fs::read(path).unwrap(), body);
    }
    assert_eq!(dir_entries(&temp.path().join("toy")), vec!["blob.bin"]);
}

#[test]
fn evict_forces_a_fresh_download() {
    let server = FixtureServer::spawn(vec![("/ids.txt", b"a\n".to_vec())], 2);
    let temp = tempdir().unwrap();
    let cache = ContentCache::new(CacheConfig::new(temp.path()));

    cache
        .fetch(&server.url("/ids.txt"), "toy/ids.txt", false)
        .unwrap();
    assert!(cache.evict("toy/ids.txt").unwrap());
    assert!(!cache.evict("toy/ids.txt").unwrap());
    cache
        .fetch(&server.url("/ids.txt"), "toy/ids.txt", false)
        .unwrap();

    assert_eq!(server.request_count(), 2);
}
