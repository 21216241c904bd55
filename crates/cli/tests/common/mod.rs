//! Shared test utilities for devgate integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Issue real developer keys through the binary itself.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper are hermetic by default.
//! - No `DEVGATE_*` variable from the host reaches the child process.

use assert_cmd::Command;

/// Returns a hermetic `devgate` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - Every `DEVGATE_*` override is cleared to ensure no leakage from the host.
pub fn devgate_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("devgate");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    cmd.env_remove("DEVGATE_SETTINGS_PATH")
        .env_remove("DEVGATE_DEBUG")
        .env_remove("DEVGATE_ENV")
        .env_remove("DEVGATE_DEFAULT_ENV")
        .env_remove("DEVGATE_CONFIG_DIR")
        .env_remove("RUST_LOG");

    cmd
}

/// Keys issued by `devgate new-developer`.
#[allow(dead_code)]
pub struct Keys {
    pub public_key: String,
    pub secret_key: String,
    pub secret_key_urlencoded: String,
}

/// Runs `devgate new-developer <slug> --output json` and parses the result.
#[allow(dead_code)]
pub fn issue_keys(slug: &str) -> Keys {
    let output = devgate_cmd()
        .args(["new-developer", slug, "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "new-developer failed: {output:?}");

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let field = |name: &str| json[name].as_str().unwrap().to_string();
    Keys {
        public_key: field("public_key"),
        secret_key: field("secret_key"),
        secret_key_urlencoded: field("secret_key_urlencoded"),
    }
}
