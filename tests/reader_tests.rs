//! Reader behavior tests
//!
//! These tests verify:
//! - Lookup hits and misses
//! - Collision chains within one bucket
//! - Duplicate-key policy (last insert wins on lookup, both enumerate)
//! - Lazy, restartable name iteration
//! - The buffered and memory-mapped open paths

use std::collections::HashSet;

use hivefile::{table_hash, FileAssembler, HiveFile, ItemKind, TableBuilder};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn build_flat(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = TableBuilder::new();
    for (key, value) in entries {
        builder.insert_bytes(*key, value.to_vec()).unwrap();
    }
    FileAssembler::new().write_to_vec(builder).unwrap()
}

/// Find `count` distinct keys that all land in the same bucket of a
/// `count`-bucket table
fn colliding_keys(count: usize) -> Vec<String> {
    let mut found = Vec::new();
    let mut i = 0;
    while found.len() < count {
        let key = format!("k{}", i);
        if table_hash(&key) % count as u32 == 0 {
            found.push(key);
        }
        i += 1;
    }
    found
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn test_lookup_finds_every_inserted_key() {
    let entries: Vec<(String, Vec<u8>)> = (0..64)
        .map(|i| (format!("entry-{}", i), format!("{}", i * 7).into_bytes()))
        .collect();

    let mut builder = TableBuilder::new();
    for (key, value) in &entries {
        builder.insert_bytes(key.clone(), value.clone()).unwrap();
    }
    let data = FileAssembler::new().write_to_vec(builder).unwrap();

    let file = HiveFile::from_bytes(data.into()).unwrap();
    let table = file.root_table().unwrap();

    for (key, value) in &entries {
        let item = table.lookup(key).unwrap().unwrap();
        assert_eq!(item.hash(), table_hash(key));
        assert_eq!(table.value_bytes(&item).unwrap().unwrap(), value.as_slice());
    }
}

#[test]
fn test_lookup_misses_report_none() {
    let data = build_flat(&[("present", b"yes")]);
    let file = HiveFile::from_bytes(data.into()).unwrap();
    let table = file.root_table().unwrap();

    assert!(table.lookup("absent").unwrap().is_none());
    assert!(table.lookup("presen").unwrap().is_none());
    assert!(table.lookup("present2").unwrap().is_none());
    assert!(table.lookup("").unwrap().is_none());
}

#[test]
fn test_lookup_walks_collision_chain() {
    let keys = colliding_keys(4);
    let mut builder = TableBuilder::new();
    for key in &keys {
        builder.insert_bytes(key.clone(), key.as_bytes().to_vec()).unwrap();
    }
    let data = FileAssembler::new().write_to_vec(builder).unwrap();

    let file = HiveFile::from_bytes(data.into()).unwrap();
    let table = file.root_table().unwrap();
    assert_eq!(table.bucket_count(), 4);

    // All four share bucket 0 and must still resolve individually
    for key in &keys {
        let item = table.lookup(key).unwrap().unwrap();
        assert_eq!(table.value_bytes(&item).unwrap().unwrap(), key.as_bytes());
    }

    // The chain walk enumerates each exactly once
    let names: Vec<String> = table.names().map(|n| n.unwrap()).collect();
    assert_eq!(names.len(), 4);
    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), 4);
    assert_eq!(unique, keys.iter().collect::<HashSet<_>>());
}

#[test]
fn test_item_kinds_are_disjoint() {
    let mut inner = TableBuilder::new();
    inner.insert_bytes("leaf", b"v".as_slice()).unwrap();

    let mut builder = TableBuilder::new();
    builder.insert_bytes("payload", b"data".as_slice()).unwrap();
    builder.insert_table("child", inner).unwrap();
    let data = FileAssembler::new().write_to_vec(builder).unwrap();

    let file = HiveFile::from_bytes(data.into()).unwrap();
    let table = file.root_table().unwrap();

    let payload = table.lookup("payload").unwrap().unwrap();
    assert_eq!(payload.kind(), ItemKind::Payload);

    let child = table.lookup("child").unwrap().unwrap();
    assert_eq!(child.kind(), ItemKind::ChildTable);
}

// =============================================================================
// Duplicate Keys
// =============================================================================

#[test]
fn test_duplicate_key_last_insert_wins() {
    let mut builder = TableBuilder::new();
    builder.insert_bytes("twice", b"first".as_slice()).unwrap();
    builder.insert_bytes("twice", b"second".as_slice()).unwrap();
    assert_eq!(builder.len(), 2);

    let data = FileAssembler::new().write_to_vec(builder).unwrap();
    let file = HiveFile::from_bytes(data.into()).unwrap();
    let table = file.root_table().unwrap();

    // Both entries persist and enumerate
    assert_eq!(table.len(), 2);
    let names: Vec<String> = table.names().map(|n| n.unwrap()).collect();
    assert_eq!(names, vec!["twice".to_string(), "twice".to_string()]);

    // Lookup resolves to the most recently inserted entry
    let item = table.lookup("twice").unwrap().unwrap();
    assert_eq!(table.value_bytes(&item).unwrap(), Some(b"second".as_slice()));
}

// =============================================================================
// Name Iteration
// =============================================================================

#[test]
fn test_names_is_restartable() {
    let data = build_flat(&[("a", b"1"), ("b", b"2"), ("c", b"3")]);
    let file = HiveFile::from_bytes(data.into()).unwrap();
    let table = file.root_table().unwrap();

    let first: Vec<String> = table.names().map(|n| n.unwrap()).collect();
    let second: Vec<String> = table.names().map(|n| n.unwrap()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_names_is_lazy() {
    let data = build_flat(&[("a", b"1"), ("b", b"2"), ("c", b"3")]);
    let file = HiveFile::from_bytes(data.into()).unwrap();
    let table = file.root_table().unwrap();

    // Taking one element must not require walking the rest
    let mut iter = table.names();
    let first = iter.next().unwrap().unwrap();
    assert!(!first.is_empty());
    drop(iter);

    assert_eq!(table.names().count(), 3);
}

#[test]
fn test_names_covers_all_entries_exactly_once() {
    let expected: HashSet<String> = (0..50).map(|i| format!("name{}", i)).collect();

    let mut builder = TableBuilder::new();
    for name in &expected {
        builder.insert_bytes(name.clone(), b"x".as_slice()).unwrap();
    }
    let data = FileAssembler::new().write_to_vec(builder).unwrap();

    let file = HiveFile::from_bytes(data.into()).unwrap();
    let table = file.root_table().unwrap();

    let names: Vec<String> = table.names().map(|n| n.unwrap()).collect();
    assert_eq!(names.len(), 50);
    assert_eq!(names.into_iter().collect::<HashSet<_>>(), expected);
}

// =============================================================================
// Open Paths
// =============================================================================

#[test]
fn test_open_from_file_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.hive");

    let mut builder = TableBuilder::new();
    builder.insert_bytes("disk", b"backed".as_slice()).unwrap();
    FileAssembler::new().write_to_file(builder, &path).unwrap();

    let file = HiveFile::from_file(&path).unwrap();
    let table = file.root_table().unwrap();
    let item = table.lookup("disk").unwrap().unwrap();
    assert_eq!(table.value_bytes(&item).unwrap(), Some(b"backed".as_slice()));
}

#[test]
fn test_open_from_file_mmap() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.hive");

    let mut inner = TableBuilder::new();
    inner.insert_bytes("int", 42u32.to_le_bytes().to_vec()).unwrap();
    let mut builder = TableBuilder::new();
    builder.insert_bytes("string", b"test string".as_slice()).unwrap();
    builder.insert_table("table", inner).unwrap();
    FileAssembler::new().write_to_file(builder, &path).unwrap();

    // Safety: nothing else writes to the freshly created temp file
    let file = unsafe { HiveFile::from_file_mmap(&path).unwrap() };
    let table = file.root_table().unwrap();

    let item = table.lookup("string").unwrap().unwrap();
    assert_eq!(
        table.value_bytes(&item).unwrap(),
        Some(b"test string".as_slice())
    );

    let sub = table
        .child_table(&table.lookup("table").unwrap().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(sub.len(), 1);
}

// =============================================================================
// Navigator
// =============================================================================

#[test]
fn test_navigator_flat_and_path_access() {
    let mut level2 = TableBuilder::new();
    level2.insert_bytes("deep", b"treasure".as_slice()).unwrap();

    let mut level1 = TableBuilder::new();
    level1.insert_table("inner", level2).unwrap();
    level1.insert_bytes("shallow", b"pebble".as_slice()).unwrap();

    let mut root = TableBuilder::new();
    root.insert_table("outer", level1).unwrap();
    root.insert_bytes("top", b"surface".as_slice()).unwrap();

    let data = FileAssembler::new().write_to_vec(root).unwrap();
    let file = HiveFile::from_bytes(data.into()).unwrap();
    let nav = file.navigator().unwrap();

    let names: HashSet<String> = nav.names().unwrap().into_iter().collect();
    assert_eq!(
        names,
        ["outer".to_string(), "top".to_string()].into_iter().collect()
    );

    // Flat access
    assert_eq!(nav.value("top").unwrap(), Some(b"surface".as_slice()));
    assert!(nav.value("outer").unwrap().is_none());
    assert!(nav.table("outer").unwrap().is_some());
    assert!(nav.table("top").unwrap().is_none());

    // Path access
    assert_eq!(
        nav.value_at("outer.inner.deep").unwrap(),
        Some(b"treasure".as_slice())
    );
    assert_eq!(nav.value_at("outer.shallow").unwrap(), Some(b"pebble".as_slice()));
    assert!(nav.table_at("outer.inner").unwrap().is_some());

    // Misses and wrong shapes are None, not errors
    assert!(nav.value_at("outer.missing.deep").unwrap().is_none());
    assert!(nav.value_at("top.deep").unwrap().is_none());
    assert!(nav.value_at("outer.inner").unwrap().is_none());
    assert!(nav.table_at("outer.inner.deep").unwrap().is_none());
}

#[test]
fn test_navigator_custom_separator() {
    let mut inner = TableBuilder::new();
    inner.insert_bytes("key", b"value".as_slice()).unwrap();
    let mut root = TableBuilder::new();
    root.insert_table("dotted.name", inner).unwrap();

    let data = FileAssembler::new().write_to_vec(root).unwrap();
    let file = HiveFile::from_bytes(data.into()).unwrap();

    let nav = hivefile::Navigator::with_separator(&file, '/').unwrap();
    assert_eq!(nav.value_at("dotted.name/key").unwrap(), Some(b"value".as_slice()));
}
