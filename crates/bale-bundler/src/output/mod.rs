//! Writing build results to disk.

pub mod writer;

pub use writer::write_bundle;
