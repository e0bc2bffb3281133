use crate::Profile;
use shx_output::TargetFormat;
use std::path::{Path, PathBuf};

/// Everything one compile call needs. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationRequest {
    source: String,
    entry_points: Vec<String>,
    target: TargetFormat,
    path_hint: Option<PathBuf>,
    profile: Option<Profile>,
    reflect: bool,
}

impl CompilationRequest {
    pub fn new<I, S>(source: impl Into<String>, entry_points: I, target: TargetFormat) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            entry_points: entry_points.into_iter().map(Into::into).collect(),
            target,
            path_hint: None,
            profile: None,
            reflect: false,
        }
    }

    /// Path used to label diagnostics and to anchor relative includes.
    /// An empty path is treated as no hint.
    pub fn with_path_hint(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.path_hint = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    /// Overrides the compiler's default profile for the target.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_reflection(mut self, reflect: bool) -> Self {
        self.reflect = reflect;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entry_points(&self) -> &[String] {
        &self.entry_points
    }

    pub fn target(&self) -> TargetFormat {
        self.target
    }

    pub fn path_hint(&self) -> Option<&Path> {
        self.path_hint.as_deref()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.profile
    }

    pub fn reflect(&self) -> bool {
        self.reflect
    }
}
