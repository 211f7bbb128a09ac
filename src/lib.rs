//! Pricewatch Monitoring Library
//!
//! This library provides the core components for the pricewatch price
//! monitoring service: periodic fetching of tracked product pages, price
//! extraction, history recording, and alert evaluation.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod persistence;
