//! EasyMeal Tools module
//!
//! MCP tool implementations: each loads what it needs from the document store,
//! runs the engine, and stores the result.

pub mod diary;
pub mod profile;
pub mod status;
pub mod trackers;
