//! Order domain

pub mod service;

pub use service::{OrderService, ProposedItem};
