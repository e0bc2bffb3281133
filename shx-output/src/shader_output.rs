use crate::{ResourceBinding, TargetFormat};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Generated code for one entry point.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShaderOutput {
    target: TargetFormat,
    entry_point_name: String,
    data: Vec<u8>,
    resource_bindings: Vec<ResourceBinding>,
}

impl ShaderOutput {
    pub fn new(
        target: TargetFormat,
        entry_point_name: String,
        data: Vec<u8>,
        resource_bindings: Vec<ResourceBinding>,
    ) -> Self {
        Self {
            target,
            entry_point_name,
            data,
            resource_bindings,
        }
    }

    pub fn target(&self) -> TargetFormat {
        self.target
    }

    pub fn entry_point_name(&self) -> &str {
        &self.entry_point_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn resource_bindings(&self) -> &[ResourceBinding] {
        &self.resource_bindings
    }

    /// Payload as text. Invalid UTF-8 (only possible for SPIR-V) is replaced.
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Reassembles the little-endian SPIR-V word stream.
    ///
    /// Returns `None` for text targets or a payload that is not word-aligned.
    pub fn as_spirv_words(&self) -> Option<Vec<u32>> {
        if self.target.is_text() || self.data.len() % 4 != 0 {
            return None;
        }

        Some(
            self.data
                .chunks_exact(4)
                .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        )
    }
}
