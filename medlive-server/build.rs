// Stamps the binary with what `--build-info` reports

use std::env;
use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() {
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TARGET={target}");

    let built_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    println!("cargo:rustc-env=BUILD_TIMESTAMP={built_at}");

    // Absent outside a git checkout; version.rs reads it with option_env!
    if let Some(commit) = git_short_hash() {
        println!("cargo:rustc-env=GIT_COMMIT_HASH={commit}");
    }

    println!("cargo:rerun-if-changed=../.git/HEAD");
}
