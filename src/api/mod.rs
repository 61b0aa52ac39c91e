//! Inventory server API client.
//!
//! This module provides the REST client, authentication, wire types and
//! error handling for talking to an inventory management server.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use client::{InventoryClient, StockListQuery};
pub use error::ApiError;
