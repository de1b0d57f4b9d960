//! Downstream service clients

pub mod product;

pub use product::{LookupError, ProductClient, ProductLookup, ProductSnapshot};
