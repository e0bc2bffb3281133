use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Output representation requested from the compiler.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetFormat {
    Glsl,
    Hlsl,
    Spirv,
}

impl TargetFormat {
    /// Text targets produce UTF-8 source; SPIR-V produces an opaque word stream.
    pub fn is_text(self) -> bool {
        match self {
            Self::Glsl | Self::Hlsl => true,
            Self::Spirv => false,
        }
    }
}

impl Display for TargetFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Glsl => write!(f, "glsl"),
            Self::Hlsl => write!(f, "hlsl"),
            Self::Spirv => write!(f, "spirv"),
        }
    }
}
