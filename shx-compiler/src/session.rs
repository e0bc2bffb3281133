mod include;

pub use include::*;

use crate::{
    reflection::find_binding_collisions, BindingModel, Compiler, ComposedProgram, DiagnosticPhase,
    Diagnostics, EntryPointRef, LinkedProgram, LoadedModule, Profile,
};
use log::debug;
use shx_output::TargetFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output format plus the profile it is compiled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDescriptor {
    pub format: TargetFormat,
    pub profile: Profile,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionCreationError {
    #[error("the profile `{profile}` cannot be used for the {format} target")]
    IncompatibleProfile {
        format: TargetFormat,
        profile: Profile,
    },
    #[error("the search path at index {index} is empty")]
    EmptySearchPath { index: usize },
}

/// A compilation context bound to exactly one target and one list of search
/// roots. Built fresh for every request and dropped afterwards.
#[derive(Debug)]
pub struct Session<'c> {
    compiler: &'c Compiler,
    target: TargetDescriptor,
    search_paths: Vec<PathBuf>,
}

impl<'c> Session<'c> {
    pub(crate) fn new(
        compiler: &'c Compiler,
        target: TargetDescriptor,
        search_paths: Vec<PathBuf>,
    ) -> Result<Self, SessionCreationError> {
        if !target.profile.supports(target.format) {
            return Err(SessionCreationError::IncompatibleProfile {
                format: target.format,
                profile: target.profile,
            });
        }

        if let Some(index) = search_paths
            .iter()
            .position(|path| path.as_os_str().is_empty())
        {
            return Err(SessionCreationError::EmptySearchPath { index });
        }

        Ok(Self {
            compiler,
            target,
            search_paths,
        })
    }

    pub fn target(&self) -> TargetDescriptor {
        self.target
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Loads inline WGSL as a module.
    ///
    /// `path` only labels diagnostics and anchors relative includes; the
    /// source itself is never read from disk. Non-fatal messages go to
    /// `diagnostics`; on failure the rendered diagnostic text is returned.
    pub fn load_module_from_source(
        &self,
        module_name: &str,
        path: Option<&Path>,
        source: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<LoadedModule, String> {
        let label = match path {
            Some(path) => path.display().to_string(),
            None => module_name.to_owned(),
        };

        debug!("loading the module `{}` from `{}`.", module_name, label);

        let origin = path.and_then(|path| path.parent());
        let expanded = expand_includes(source, origin, &self.search_paths, diagnostics)
            .map_err(|err| format!("{}: {}", label, err))?;

        let module = naga::front::wgsl::parse_str(&expanded.content)
            .map_err(|err| err.emit_to_string_with_path(&expanded.content, &label))?;

        Ok(LoadedModule::new(
            module_name.to_owned(),
            label,
            expanded.content,
            module,
        ))
    }

    pub fn create_composite(
        &self,
        module: &LoadedModule,
        entry_points: &[EntryPointRef],
    ) -> Result<ComposedProgram, String> {
        ComposedProgram::compose(module, entry_points)
    }

    /// Validates the composed program once for all of its entry points.
    pub fn link(
        &self,
        program: ComposedProgram,
        diagnostics: &mut Diagnostics,
    ) -> Result<LinkedProgram<'c>, String> {
        let mut validator = self.compiler.validator();
        let info = validator
            .validate(program.module())
            .map_err(|err| err.emit_to_string_with_path(program.source(), program.label()))?;

        for collision in find_binding_collisions(program.module()) {
            diagnostics.warn(DiagnosticPhase::Link, collision);
        }

        let binding_model = BindingModel::new(self.target.format, program.module());

        for warning in binding_model.warnings() {
            diagnostics.warn(DiagnosticPhase::Link, warning.as_str());
        }

        Ok(LinkedProgram::new(
            self.compiler,
            self.target,
            program,
            info,
            binding_model,
        ))
    }
}
