// build information shown by `--version`

/// Version of the running binary
///
/// The semantic version always comes from Cargo.toml, git information is only present when the
/// build was done from a git checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Semantic version from Cargo.toml (e.g., "0.4.0")
    pub semantic: String,
    /// Git describe output (e.g., "v0.3.1-7-g644da27")
    pub git_describe: Option<String>,
    /// Short git commit hash
    pub git_hash: Option<String>,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            semantic: env!("CARGO_PKG_VERSION").to_string(),
            git_describe: option_env!("RMIR_GIT_DESCRIBE").map(String::from),
            git_hash: option_env!("RMIR_GIT_HASH").map(String::from),
        }
    }

    /// Get a human-readable version string
    ///
    /// # Examples
    ///
    /// ```
    /// use common::version::VersionInfo;
    ///
    /// let version = VersionInfo {
    ///     semantic: "0.4.0".to_string(),
    ///     git_describe: Some("v0.3.1-7-g644da27".to_string()),
    ///     git_hash: None,
    /// };
    /// assert_eq!(version.display(), "0.4.0 (v0.3.1-7-g644da27)");
    /// ```
    pub fn display(&self) -> String {
        match (&self.git_describe, &self.git_hash) {
            (Some(describe), _) => format!("{} ({})", self.semantic, describe),
            (None, Some(hash)) => format!("{} ({})", self.semantic, hash),
            (None, None) => self.semantic.clone(),
        }
    }
}
