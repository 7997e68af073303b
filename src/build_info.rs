//! Build-time information
//!
//! Build metadata captured at compile time. The version string is stamped
//! into every persisted report so results can be traced back to a binary.

/// Build timestamp (when the binary was compiled)
pub const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

/// Cargo optimization level (0, 1, 2, 3, s, z)
pub const CARGO_OPT_LEVEL: &str = env!("VERGEN_CARGO_OPT_LEVEL");

/// Target triple (e.g., x86_64-unknown-linux-gnu)
pub const CARGO_TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

/// Rust compiler version (e.g., 1.85.0)
pub const RUSTC_SEMVER: &str = env!("VERGEN_RUSTC_SEMVER");

/// Rust channel (stable, beta, or nightly)
pub const RUSTC_CHANNEL: &str = env!("VERGEN_RUSTC_CHANNEL");

/// Returns the version string recorded in reports
///
/// Format: `{crate_version} ({target_triple}-opt{opt_level})`
pub fn version_string() -> String {
    format!(
        "{} ({}-opt{})",
        env!("CARGO_PKG_VERSION"),
        CARGO_TARGET_TRIPLE,
        CARGO_OPT_LEVEL
    )
}

/// Detailed build info for `--version` output
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    "-opt",
    env!("VERGEN_CARGO_OPT_LEVEL"),
    ")\nBuilt: ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    "\nRustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
    " (",
    env!("VERGEN_RUSTC_CHANNEL"),
    ")"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_carries_package_version() {
        let version = version_string();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(CARGO_TARGET_TRIPLE));
    }

    #[test]
    fn test_long_version_extends_version_string() {
        assert!(LONG_VERSION.starts_with(&version_string()));
        assert!(LONG_VERSION.contains(RUSTC_SEMVER));
        assert!(LONG_VERSION.contains(BUILD_TIMESTAMP));
    }
}
