//! HTTP request handlers for the point-data API.

pub mod common;
pub mod dmi;
pub mod health;
pub mod hip;
pub mod maptiler;
