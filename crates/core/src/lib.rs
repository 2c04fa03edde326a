//! Core building blocks for the domaincache facade.
//!
//! Everything in this crate is free of I/O: namespace prefix derivation,
//! the stored value codec, glob matching, and the `KeyValueStore` trait
//! that concrete store backends implement.

pub mod cache;
