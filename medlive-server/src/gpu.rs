//! GPU detection for engine profile selection

use std::process::Command;

use medlive_engine::EngineProfile;
use tracing::{info, warn};

/// Name of the first CUDA device, if any
///
/// Queries `nvidia-smi`; a missing binary or a failing query means no GPU.
pub fn detect_gpu_name() -> Option<String> {
    let output = Command::new("nvidia-smi")
        .args(["--query-gpu=name", "--format=csv,noheader"])
        .output()
        .ok()?;

    if !output.status.success() {
        warn!("nvidia-smi failed - falling back to CPU");
        return None;
    }

    let name = parse_gpu_name(&String::from_utf8_lossy(&output.stdout));
    match &name {
        Some(name) => info!("Detected NVIDIA GPU: {}", name),
        None => warn!("nvidia-smi reported no devices - falling back to CPU"),
    }
    name
}

/// First non-empty line of `nvidia-smi` CSV output
fn parse_gpu_name(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Detect hardware and pick the engine profile
pub fn select_profile(model_override: &str, language: &str) -> (Option<String>, EngineProfile) {
    let gpu_name = detect_gpu_name();
    let profile = EngineProfile::select(gpu_name.as_deref())
        .with_model_override(model_override)
        .with_language(language);
    (gpu_name, profile)
}
