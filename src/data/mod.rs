//! Built-in data sources.
//!
//! - the example academic-anxiety table (`sample`)
//! - seeded synthetic linear data (`synthetic`)

pub mod sample;
pub mod synthetic;

pub use sample::*;
pub use synthetic::*;
