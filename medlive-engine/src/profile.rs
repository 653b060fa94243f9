//! Hardware class → engine profile lookup
//!
//! The recognizer variant is picked from the detected GPU name:
//! - **V100 / Ada / RTX 30 / RTX 40**: `large-v3` at `float16` (best quality)
//! - **Titan X / Quadro / RTX 20**: `turbo` at `int8_float16`
//! - **anything else or no GPU**: `medium` at `int8` (fallback)

/// Capability class of the detected accelerator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareClass {
    HighEnd,
    MidRange,
    Fallback,
}

const HIGH_END_MARKERS: &[&str] = &["V100", "ADA", "RTX 30", "RTX 40"];
const MID_RANGE_MARKERS: &[&str] = &["Titan X", "Quadro", "RTX 20"];

/// Default transcription language
pub const DEFAULT_LANGUAGE: &str = "de";

impl HardwareClass {
    /// Classify a GPU by its reported name (`None` = no GPU)
    pub fn from_gpu_name(gpu_name: Option<&str>) -> Self {
        let Some(name) = gpu_name else {
            return HardwareClass::Fallback;
        };

        if HIGH_END_MARKERS.iter().any(|m| name.contains(m)) {
            HardwareClass::HighEnd
        } else if MID_RANGE_MARKERS.iter().any(|m| name.contains(m)) {
            HardwareClass::MidRange
        } else {
            HardwareClass::Fallback
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HardwareClass::HighEnd => "high-end",
            HardwareClass::MidRange => "mid-range",
            HardwareClass::Fallback => "fallback",
        }
    }
}

/// Configuration handed to the engine at start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineProfile {
    pub hardware: HardwareClass,
    /// Model name understood by the recognizer
    pub model: String,
    /// Numeric precision, e.g. `float16`
    pub compute_type: String,
    pub language: String,
    /// `cuda` or `cpu`
    pub device: String,
}

impl EngineProfile {
    /// Profile for a hardware class
    pub fn for_class(hardware: HardwareClass, gpu_present: bool) -> Self {
        let (model, compute_type) = match hardware {
            HardwareClass::HighEnd => ("large-v3", "float16"),
            HardwareClass::MidRange => ("turbo", "int8_float16"),
            HardwareClass::Fallback => ("medium", "int8"),
        };

        Self {
            hardware,
            model: model.to_string(),
            compute_type: compute_type.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            device: if gpu_present { "cuda" } else { "cpu" }.to_string(),
        }
    }

    /// Select a profile from a detected GPU name
    pub fn select(gpu_name: Option<&str>) -> Self {
        Self::for_class(HardwareClass::from_gpu_name(gpu_name), gpu_name.is_some())
    }

    /// Replace the model name unless the override is `auto` or empty
    pub fn with_model_override(mut self, model_override: &str) -> Self {
        let model_override = model_override.trim();
        if !model_override.is_empty() && !model_override.eq_ignore_ascii_case("auto") {
            self.model = model_override.to_string();
        }
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }
}
