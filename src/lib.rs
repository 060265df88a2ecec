// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Vitrine: cultural-heritage archive viewer
//!
//! Browse artifacts grouped into collections, filter them, inspect their
//! metadata and, as an administrator, add new ones. Private artifacts and
//! consent/IRB details are only exposed to administrators.

pub mod collections;
pub mod config;
pub mod detail;
pub mod download;
pub mod draft;
pub mod error;
pub mod filter;
pub mod model;
pub mod navigation;
pub mod session;
pub mod store;
pub mod visibility;
pub mod web;

pub use config::AppConfig;
pub use error::{Result, VitrineError};
