//! Runtime configuration
//!
//! Settings come from the environment; the database lives under the project's
//! `data/` directory unless `EASYMEAL_DATABASE_PATH` says otherwise.

use std::path::PathBuf;

pub const DATABASE_PATH_VAR: &str = "EASYMEAL_DATABASE_PATH";

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_database_path())
}

fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|p| p.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("easymeal.db");
    path
}
