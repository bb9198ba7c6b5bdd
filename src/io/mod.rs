pub mod byte_reader;
pub mod source;

pub use byte_reader::ByteReader;
pub use source::{discover_sources, Source};
