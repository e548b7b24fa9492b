//! Helpers for driving the binary.

use assert_cmd::Command;

/// The `legacy-import` binary with configuration lookups isolated from the
/// developer's environment.
pub fn cli(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("legacy-import").unwrap();
    cmd.env_remove("LEGACY_IMPORT_CONFIG").env_remove("RUST_LOG").env("HOME", home).env("NO_COLOR", "1");
    cmd
}
