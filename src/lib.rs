//! Plaza - marketplace platform core services
//!
//! This library provides the two business-rule cores of the Plaza
//! marketplace: booking availability checking and the social follow graph.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
