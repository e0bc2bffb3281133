use crate::{
    CompilerConfig, Profile, ProfileParseError, Session, SessionCreationError, TargetDescriptor,
};
use log::debug;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use shx_output::TargetFormat;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("the module name must not be empty")]
    EmptyModuleName,
    #[error("the default {target} profile is invalid: {source}")]
    InvalidProfile {
        target: TargetFormat,
        #[source]
        source: ProfileParseError,
    },
    #[error("the default profile `{profile}` cannot be used for the {target} target")]
    IncompatibleProfile {
        target: TargetFormat,
        profile: Profile,
    },
}

/// The process-wide compiler handle.
///
/// Created once by the application and passed by reference to everything that
/// compiles. It is never mutated after construction; every request builds its
/// own [`Session`] from it.
#[derive(Debug, Clone)]
pub struct Compiler {
    module_name: String,
    search_paths: Vec<PathBuf>,
    glsl_profile: Profile,
    hlsl_profile: Profile,
    spirv_profile: Profile,
    validation_flags: ValidationFlags,
    capabilities: Capabilities,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Result<Self, InitializationError> {
        if config.module_name.is_empty() {
            return Err(InitializationError::EmptyModuleName);
        }

        let glsl_profile = default_profile(&config, TargetFormat::Glsl)?;
        let hlsl_profile = default_profile(&config, TargetFormat::Hlsl)?;
        let spirv_profile = default_profile(&config, TargetFormat::Spirv)?;

        let capabilities = if config.validation.all_capabilities {
            Capabilities::all()
        } else {
            Capabilities::empty()
        };

        debug!(
            "compiler initialized with profiles glsl=`{}`, hlsl=`{}`, spirv=`{}`.",
            glsl_profile, hlsl_profile, spirv_profile
        );

        Ok(Self {
            module_name: config.module_name,
            search_paths: config.search_paths,
            glsl_profile,
            hlsl_profile,
            spirv_profile,
            validation_flags: ValidationFlags::all(),
            capabilities,
        })
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn default_profile(&self, target: TargetFormat) -> Profile {
        match target {
            TargetFormat::Glsl => self.glsl_profile,
            TargetFormat::Hlsl => self.hlsl_profile,
            TargetFormat::Spirv => self.spirv_profile,
        }
    }

    pub fn find_profile(&self, name: &str) -> Result<Profile, ProfileParseError> {
        Profile::parse(name)
    }

    /// Creates a session bound to one target and a fixed list of search roots.
    pub fn create_session(
        &self,
        target: TargetDescriptor,
        search_paths: &[PathBuf],
    ) -> Result<Session<'_>, SessionCreationError> {
        Session::new(self, target, search_paths.to_vec())
    }

    /// Creates a session with the configured default profile and search paths.
    pub fn create_default_session(
        &self,
        format: TargetFormat,
    ) -> Result<Session<'_>, SessionCreationError> {
        self.create_session(
            TargetDescriptor {
                format,
                profile: self.default_profile(format),
            },
            &self.search_paths,
        )
    }

    pub(crate) fn validator(&self) -> Validator {
        Validator::new(self.validation_flags, self.capabilities)
    }
}

fn default_profile(
    config: &CompilerConfig,
    target: TargetFormat,
) -> Result<Profile, InitializationError> {
    let profile = Profile::parse(config.profiles.for_target(target))
        .map_err(|source| InitializationError::InvalidProfile { target, source })?;

    if !profile.supports(target) {
        return Err(InitializationError::IncompatibleProfile { target, profile });
    }

    Ok(profile)
}
