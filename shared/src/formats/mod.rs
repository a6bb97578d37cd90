//! Cooked asset archive format
//!
//! Source payloads are stored verbatim; decoding them is the game loader's job.

pub mod cooked_archive;

pub use cooked_archive::*;
