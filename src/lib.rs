//! EasyMeal Library
//!
//! Calorie planning, food diary and habit tracker engine, with the SQLite
//! document store and MCP tools built on top of it.

pub mod build_info;
pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
