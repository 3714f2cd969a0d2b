//! Data models for dispensing orders and configuration.

pub mod config;
pub mod order;

pub use config::PharmconfConfig;
pub use order::{LineItem, Order, OrderHeader};
