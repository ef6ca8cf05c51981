// src/lib.rs
//! FundFolio client: request gateway, typed API groups and the session store
//! for a personal mutual-fund portfolio tracker.

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod session;
pub mod storage;
pub mod views;

pub use api::Api;
pub use config::{Config, TokenTransport};
pub use error::ApiError;
pub use gateway::Gateway;
pub use session::SessionStore;
