//! End-to-end `open` scenarios: minimal file, sibling discovery, corrupt
//! alignment, and duplicate tile rejection.

use crate::integration::fixtures::{write_container, EntrySpec};
use zisraw_reader::container::{Container, OpenOptions};

#[test]
fn opens_minimal_single_tile_file() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![EntrySpec::tile(0, 0, vec![0xAB; 64])];
    let path = write_container(dir.path(), "single.czi", &entries);

    let container = Container::open(&path, OpenOptions::default()).unwrap();
    assert_eq!(container.level_count(), 1);
    assert_eq!(container.level_tiles(0).unwrap().len(), 1);
}

#[test]
fn probes_recognize_header_without_full_open() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![EntrySpec::tile(0, 0, vec![1, 2, 3])];
    let path = write_container(dir.path(), "probe.czi", &entries);

    assert!(Container::is_zisraw(&path).unwrap());

    let not_czi = dir.path().join("not_czi.bin");
    std::fs::write(&not_czi, b"definitely not zisraw").unwrap();
    assert!(!Container::is_zisraw(&not_czi).unwrap());
}

#[test]
fn discovers_and_indexes_sibling_part_files() {
    let dir = tempfile::tempdir().unwrap();
    write_container(
        dir.path(),
        "volume.czi",
        &[EntrySpec::tile(0, 0, vec![1; 16])],
    );
    write_container(
        dir.path(),
        "volume (1).czi",
        &[EntrySpec::tile(16, 0, vec![2; 16])],
    );

    let path = dir.path().join("volume.czi");
    let container = Container::open(&path, OpenOptions::default()).unwrap();

    assert_eq!(container.source_count(), 2);
    // Both files' tiles land in the same level since they share
    // pyramid_kind/ssX/ssY.
    assert_eq!(container.level_tiles(0).unwrap().len(), 2);
}

#[test]
fn rejects_duplicate_tile_coordinates_within_a_level() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![
        EntrySpec::tile(0, 0, vec![1; 16]),
        EntrySpec::tile(0, 0, vec![2; 16]),
    ];
    let path = write_container(dir.path(), "dup.czi", &entries);

    let result = Container::open(&path, OpenOptions::default());
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("duplicate"));
}

#[test]
fn corrupt_segment_identifier_fails_open_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![EntrySpec::tile(0, 0, vec![1; 16])];
    let mut bytes = crate::integration::fixtures::build_container(&entries);

    // Stomp the directory segment's identifier with garbage bytes.
    bytes[128..144].copy_from_slice(b"NOTASEGMENTIDXXX");

    let path = dir.path().join("corrupt.czi");
    std::fs::write(&path, &bytes).unwrap();

    let result = Container::open(&path, OpenOptions::default());
    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("decode source 0"));
}
