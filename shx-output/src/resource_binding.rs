use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One shader-visible resource slot.
///
/// `binding` and `set` are normalized per target: descriptor binding/set for
/// SPIR-V, register/space for HLSL, and a flat binding slot (set 0) for GLSL.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceBinding {
    pub kind: ResourceBindingKind,
    pub binding: u32,
    pub set: u32,
    /// Number of elements; 1 for non-array resources, 0 for runtime-sized arrays.
    pub count: u32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceBindingKind {
    ConstantBuffer,
    StructuredBuffer,
    Texture,
    Sampler,
    Uav,
}

impl Display for ResourceBindingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ConstantBuffer => write!(f, "constant buffer"),
            Self::StructuredBuffer => write!(f, "structured buffer"),
            Self::Texture => write!(f, "texture"),
            Self::Sampler => write!(f, "sampler"),
            Self::Uav => write!(f, "unordered access view"),
        }
    }
}
