use std::env;
use std::path::PathBuf;

/// Message shown in place of section text when a project has no versions
pub const EMPTY_STATE_MESSAGE: &str = "No spec generated yet.";

/// Maximum size for a single section body or requirement description (1MB)
pub const MAX_SECTION_SIZE: usize = 1024 * 1024;

/// Get the path to the specgen directory (~/.specgen)
pub fn specgen_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".specgen")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".specgen")
    }
}

/// Get the path to the default database file (~/.specgen/specgen.db)
pub fn database_file() -> PathBuf {
    specgen_dir().join("specgen.db")
}
