//! Query-API scenarios against an already-open container: tile payload
//! retrieval, release/re-load, and out-of-range/not-found errors.

use crate::integration::fixtures::{write_container, EntrySpec};
use zisraw_reader::container::{Container, OpenOptions, TileId};

#[test]
fn load_tile_returns_the_exact_payload_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let payload = vec![0xDE, 0xAD, 0xBE, 0xEF];
    let entries = vec![EntrySpec::tile(0, 0, payload.clone())];
    let path = write_container(dir.path(), "payload.czi", &entries);

    let container = Container::open(&path, OpenOptions::default()).unwrap();
    let tiles = container.level_tiles(0).unwrap();
    let id = tiles[0].id;

    let bytes = container.load_tile(id).unwrap();
    assert_eq!(bytes.as_ref(), payload.as_slice());

    // Second load hits the cache and returns the same bytes.
    let cached = container.load_tile(id).unwrap();
    assert_eq!(cached.as_ref(), payload.as_slice());

    container.release_tile(id);
    let reloaded = container.load_tile(id).unwrap();
    assert_eq!(reloaded.as_ref(), payload.as_slice());
}

#[test]
fn load_tile_out_of_range_level_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![EntrySpec::tile(0, 0, vec![1, 2, 3])];
    let path = write_container(dir.path(), "single.czi", &entries);

    let container = Container::open(&path, OpenOptions::default()).unwrap();
    let bogus = TileId {
        level: 5,
        key: [0; 8],
    };
    let result = container.load_tile(bogus);
    assert!(result.is_err());
}

#[test]
fn load_tile_missing_key_within_valid_level_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![EntrySpec::tile(0, 0, vec![1, 2, 3])];
    let path = write_container(dir.path(), "single.czi", &entries);

    let container = Container::open(&path, OpenOptions::default()).unwrap();
    let bogus = TileId {
        level: 0,
        key: [0xFF; 8],
    };
    let result = container.load_tile(bogus);
    assert!(result.is_err());
}
