//! `#[derive(Record)]` implementation.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
