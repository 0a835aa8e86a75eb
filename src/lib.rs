//! SnapCal Library
//!
//! Nutrition targets, daily accounting and achievements for a photo-based
//! calorie tracker, with SQLite storage and an MCP tool surface.

pub mod build_info;
pub mod config;
pub mod db;
pub mod flow;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
pub mod vision;
