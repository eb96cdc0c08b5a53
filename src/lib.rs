//! Vehicle Vision API library.
//!
//! Vehicle registry, image storage and the asynchronous image analysis
//! pipeline, plus the HTTP API over them.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
