//! Recorded payload fixture loader.
//!
//! Loads JSON files from `contracts/` (e.g. webhook bodies captured from the
//! reservation platform) for tests.

use std::path::Path;

use serde_json::Value;

/// Load a JSON fixture file relative to the workspace root.
///
/// # Example
/// ```no_run
/// use reserva_testing::fixture::Fixture;
/// let val = Fixture::load("contracts/webhooks/newrega.json");
/// ```
pub struct Fixture;

impl Fixture {
    /// Load and parse a fixture JSON file at `workspace_root/path`.
    ///
    /// Panics if the file is missing or invalid JSON.
    pub fn load(relative_path: &str) -> Value {
        let contents = Self::load_raw(relative_path);
        serde_json::from_str(&contents)
            .unwrap_or_else(|e| panic!("invalid JSON in fixture {relative_path}: {e}"))
    }

    /// Load a fixture file as raw text, for tests that exercise parsing themselves.
    pub fn load_raw(relative_path: &str) -> String {
        let full_path = workspace_root().join(relative_path);
        std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("fixture not found at {}: {e}", full_path.display()))
    }
}

fn workspace_root() -> std::path::PathBuf {
    std::env::var("CARGO_MANIFEST_DIR")
        .map(|dir| {
            // Walk up from the crate dir to the directory holding `contracts/`.
            let p = Path::new(&dir);
            p.ancestors()
                .find(|a| a.join("contracts").is_dir())
                .unwrap_or(p)
                .to_path_buf()
        })
        .unwrap_or_else(|_| std::env::current_dir().unwrap())
}
