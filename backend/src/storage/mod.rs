//! Storage layer: the storage traits and the JSON document store that
//! implements them.

pub mod json;
pub mod traits;

pub use json::JsonConnection;
pub use traits::*;
