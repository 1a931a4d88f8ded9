//! Adapter implementations
//!
//! Adapters provide concrete implementations of the port traits.

pub mod text_store;

pub use text_store::TextStore;
