//! Delivery admin client library
//!
//! Core of the food-delivery admin dashboard: a generic table engine, typed
//! REST services for the backend resources, bearer-token authentication, a
//! notifier for toasts and dialogs, a polling new-order feed and a help-desk
//! assistant.

pub mod api;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod model;
pub mod notify;
pub mod stats;
pub mod table;

mod client;

pub use client::*;
pub use error::Error;
