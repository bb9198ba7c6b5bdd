//! End-to-end pyramid-indexing scenarios: distinct subsampling factors
//! landing in distinct levels, and capability flags derived from the S axis.

use crate::integration::fixtures::{write_container, EntrySpec};
use zisraw_reader::container::{Container, OpenOptions};

#[test]
fn two_resolutions_become_two_levels() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![
        EntrySpec::downsampled(0, 256, 256, vec![0u8; 16]),
        EntrySpec::downsampled(0, 512, 256, vec![0u8; 16]),
    ];
    let path = write_container(dir.path(), "pyramid.czi", &entries);

    let container = Container::open(&path, OpenOptions::default()).unwrap();
    assert_eq!(container.level_count(), 2);

    let levels: Vec<i32> = (0..2).map(|i| container.level(i).unwrap().ss_x).collect();
    assert!(levels.contains(&1));
    assert!(levels.contains(&2));
}

#[test]
fn distinct_single_scene_tiles_do_not_set_multi_scene() {
    // Three tiles at distinct S starts, each with S.size == 1: the level's
    // aggregate S span is 3, but no single tile spans more than one scene,
    // so `multi_scene` must stay false.
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![
        EntrySpec::tile(0, 0, vec![0u8; 16]).with_scene(0),
        EntrySpec::tile(16, 0, vec![0u8; 16]).with_scene(1),
        EntrySpec::tile(32, 0, vec![0u8; 16]).with_scene(2),
    ];
    let path = write_container(dir.path(), "scenes.czi", &entries);

    let container = Container::open(&path, OpenOptions::default()).unwrap();
    let caps = container.capabilities();
    assert!(!caps.multi_scene);
    assert!(!caps.multi_channel);
    assert!(caps.has_uncompressed);
}

#[test]
fn single_tile_spanning_multiple_scenes_sets_multi_scene() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![EntrySpec::tile(0, 0, vec![0u8; 16]).with_scene_span(0, 3)];
    let path = write_container(dir.path(), "scene_span.czi", &entries);

    let container = Container::open(&path, OpenOptions::default()).unwrap();
    let caps = container.capabilities();
    assert!(caps.multi_scene);
}
