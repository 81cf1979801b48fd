//! VeriSL business registry
//!
//! Public lookup of registered businesses, admin verification of their
//! records and QR codes that link to each public profile.

pub mod admin_auth;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
