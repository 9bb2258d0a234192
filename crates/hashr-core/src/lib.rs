//! Core types and trait definitions for the hashr sample catalog.
//!
//! This crate is deliberately free of database dependencies. The storage
//! backends and the retrieval front-end all depend on it.

pub mod digest;
pub mod error;
pub mod sample;
pub mod source;
pub mod store;
pub mod table;

pub use digest::Digest;
pub use error::{Error, Result};
pub use sample::{Payload, Sample};
pub use source::{SampleSource, Source};
pub use store::HashStore;
pub use table::Table;
