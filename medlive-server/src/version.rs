//! Version information and build metadata display

use std::fmt;

/// Version and build metadata for the server binary
pub struct VersionInfo {
    /// Package version from Cargo.toml
    pub server_version: &'static str,
    /// Target triple (e.g., x86_64-unknown-linux-gnu)
    pub target: &'static str,
    /// Build profile (debug or release)
    pub profile: &'static str,
    /// Git commit hash (if available)
    pub git_commit: Option<&'static str>,
    /// Build timestamp
    pub build_timestamp: &'static str,
}

impl VersionInfo {
    /// Get current version information
    pub fn current() -> Self {
        Self {
            server_version: env!("CARGO_PKG_VERSION"),
            target: env!("TARGET"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
            git_commit: option_env!("GIT_COMMIT_HASH"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
        }
    }

    /// Engine profiles the server can select
    pub fn engine_profiles(&self) -> Vec<&'static str> {
        vec![
            "large-v3 / float16 (V100, Ada, RTX 30, RTX 40)",
            "turbo / int8_float16 (Titan X, Quadro, RTX 20)",
            "medium / int8 (other GPUs, CPU)",
        ]
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "medlive-server {}", self.server_version)?;
        writeln!(f)?;

        writeln!(f, "Build Information:")?;
        writeln!(f, "  Target:       {}", self.target)?;
        writeln!(f, "  Profile:      {}", self.profile)?;
        writeln!(f, "  Build Date:   {}", self.build_timestamp)?;

        if let Some(commit) = self.git_commit {
            writeln!(f, "  Git Commit:   {}", commit)?;
        }

        writeln!(f)?;
        writeln!(f, "Engine Profiles:")?;
        for profile in self.engine_profiles() {
            writeln!(f, "  • {}", profile)?;
        }

        Ok(())
    }
}

/// Long version string (for --build-info)
pub fn version_long() -> String {
    VersionInfo::current().to_string()
}
