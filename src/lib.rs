//! Catalog bot for the ChinaBuyHub Discord community.
//!
//! Loads the product sheet (published CSV or Sheets API), posts products to
//! the community channels on a schedule and answers search commands.

pub mod activity;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod csv;
pub mod cursor;
pub mod error;
pub mod hub;
pub mod posting;
pub mod render;
pub mod search;
pub mod sheets;
pub mod source;
