use serde::{Deserialize, Serialize};
use shx_output::TargetFormat;
use std::path::PathBuf;

/// Settings for the process-wide [`Compiler`](crate::Compiler).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Logical name given to every module loaded from inline source.
    pub module_name: String,
    /// Ordered roots used to resolve `#include` directives.
    pub search_paths: Vec<PathBuf>,
    pub profiles: TargetProfiles,
    pub validation: ValidationConfig,
}

impl CompilerConfig {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            module_name: "shader".to_owned(),
            search_paths: vec![
                PathBuf::from("./"),
                PathBuf::from("../shaders/"),
                PathBuf::from("../../shaders/"),
            ],
            profiles: TargetProfiles::default(),
            validation: ValidationConfig::default(),
        }
    }
}

/// Default profile name per target.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TargetProfiles {
    pub glsl: String,
    pub hlsl: String,
    pub spirv: String,
}

impl TargetProfiles {
    pub fn for_target(&self, target: TargetFormat) -> &str {
        match target {
            TargetFormat::Glsl => &self.glsl,
            TargetFormat::Hlsl => &self.hlsl,
            TargetFormat::Spirv => &self.spirv,
        }
    }
}

impl Default for TargetProfiles {
    fn default() -> Self {
        Self {
            glsl: "glsl_450".to_owned(),
            hlsl: "sm_6_0".to_owned(),
            spirv: "spirv_1_0".to_owned(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validate against every capability naga knows; otherwise core WGSL only.
    pub all_capabilities: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            all_capabilities: true,
        }
    }
}
