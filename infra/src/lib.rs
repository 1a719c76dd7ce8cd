//! Persistence plumbing shared by the application crates: typed document
//! ids, document metadata, and the embedded document store.

pub mod documents;
pub mod ids;
pub mod persistence;
