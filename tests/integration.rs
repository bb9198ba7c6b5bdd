//! Integration tests for the ZISRAW/CZI container reader.
//!
//! Exercises `Container::open`/query against synthetic `.czi` files written
//! to real temporary paths: minimal single-tile files, two-level pyramids,
//! multi-scene capability derivation, sibling part-file discovery, corrupt
//! segment recovery, and duplicate-tile rejection.

mod integration {
    pub mod fixtures;

    pub mod open_tests;
    pub mod pyramid_tests;
    pub mod query_tests;
}
