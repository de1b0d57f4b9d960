//! Database models

pub mod order;

pub use order::{
    Order, OrderCreate, OrderItem, OrderItemCreate, OrderItemWrite, OrderUpdate, STATUS_CREATED,
};
