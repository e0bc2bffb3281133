mod codegen;

pub use codegen::*;

use crate::{extract_resource_bindings, BindingModel, Compiler, TargetDescriptor};
use naga::{valid::ModuleInfo, Module, ShaderStage};
use shx_output::{ResourceBinding, TargetFormat};
use std::collections::BTreeSet;

/// A parsed module together with the source it was parsed from.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    name: String,
    label: String,
    source: String,
    module: Module,
}

impl LoadedModule {
    pub(crate) fn new(name: String, label: String, source: String, module: Module) -> Self {
        Self {
            name,
            label,
            source,
            module,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name used for diagnostics: the path hint if one was given.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source after include expansion.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn entry_point_names(&self) -> impl Iterator<Item = &str> {
        self.module
            .entry_points
            .iter()
            .map(|entry_point| entry_point.name.as_str())
    }

    pub fn find_entry_point_by_name(&self, name: &str) -> Option<EntryPointRef> {
        self.module
            .entry_points
            .iter()
            .position(|entry_point| entry_point.name == name)
            .map(|index| EntryPointRef {
                index,
                name: name.to_owned(),
                stage: self.module.entry_points[index].stage,
            })
    }
}

/// An entry point resolved against a [`LoadedModule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointRef {
    index: usize,
    name: String,
    stage: ShaderStage,
}

impl EntryPointRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

/// The module plus the requested entry points, not yet validated.
///
/// Entry point `i` of the program is the `i`-th requested entry point.
#[derive(Debug, Clone)]
pub struct ComposedProgram {
    label: String,
    source: String,
    module: Module,
}

impl ComposedProgram {
    pub(crate) fn compose(
        module: &LoadedModule,
        entry_points: &[EntryPointRef],
    ) -> Result<Self, String> {
        if entry_points.is_empty() {
            return Err("a program needs at least one entry point".to_owned());
        }

        let mut seen = BTreeSet::new();

        for entry_point in entry_points {
            if !seen.insert(entry_point.index) {
                return Err(format!(
                    "the entry point `{}` is composed more than once",
                    entry_point.name
                ));
            }
        }

        let mut composed_entry_points = Vec::with_capacity(entry_points.len());

        for entry_point in entry_points {
            match module.module.entry_points.get(entry_point.index) {
                Some(candidate)
                    if candidate.name == entry_point.name && candidate.stage == entry_point.stage =>
                {
                    composed_entry_points.push(candidate.clone());
                }
                _ => {
                    return Err(format!(
                        "the entry point `{}` does not belong to this module",
                        entry_point.name
                    ));
                }
            }
        }

        let mut composed = module.module.clone();
        composed.entry_points = composed_entry_points;

        Ok(Self {
            label: module.label.clone(),
            source: module.source.clone(),
            module: composed,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn entry_point_count(&self) -> usize {
        self.module.entry_points.len()
    }
}

/// A validated program ready for per-entry-point code generation.
#[derive(Debug)]
pub struct LinkedProgram<'c> {
    compiler: &'c Compiler,
    target: TargetDescriptor,
    program: ComposedProgram,
    info: ModuleInfo,
    binding_model: BindingModel,
}

impl<'c> LinkedProgram<'c> {
    pub(crate) fn new(
        compiler: &'c Compiler,
        target: TargetDescriptor,
        program: ComposedProgram,
        info: ModuleInfo,
        binding_model: BindingModel,
    ) -> Self {
        Self {
            compiler,
            target,
            program,
            info,
            binding_model,
        }
    }

    pub fn target(&self) -> TargetDescriptor {
        self.target
    }

    pub fn entry_point_count(&self) -> usize {
        self.program.entry_point_count()
    }

    pub fn binding_model(&self) -> &BindingModel {
        &self.binding_model
    }

    /// Generates code for one entry point against the session target.
    pub fn entry_point_code(&self, index: usize) -> Result<Vec<u8>, CodeGenError> {
        let module = &self.program.module;
        let entry_point = match module.entry_points.get(index) {
            Some(entry_point) => entry_point,
            None => {
                return Err(CodeGenError::IndexOutOfRange {
                    index,
                    count: module.entry_points.len(),
                })
            }
        };
        let profile = self.target.profile;

        match self.target.format {
            TargetFormat::Glsl => {
                let code = write_glsl(
                    module,
                    &self.info,
                    entry_point,
                    profile.glsl_version(),
                    self.binding_model.glsl_binding_map(),
                )?;
                Ok(code.into_bytes())
            }
            TargetFormat::Hlsl => {
                let shader_model = match profile.hlsl_shader_model() {
                    Some(shader_model) => shader_model,
                    None => return Err(CodeGenError::UnsupportedProfile(profile)),
                };
                let view = single_entry_point_view(module, index);
                let view_info = self
                    .compiler
                    .validator()
                    .validate(&view)
                    .map_err(|err| {
                        CodeGenError::Validation(
                            err.emit_to_string_with_path(&self.program.source, &self.program.label),
                        )
                    })?;
                let code = write_hlsl(
                    &view,
                    &view_info,
                    shader_model,
                    self.binding_model.hlsl_binding_map(),
                )?;
                Ok(code.into_bytes())
            }
            TargetFormat::Spirv => {
                let words = write_spirv(module, &self.info, entry_point, profile.spirv_version())?;
                Ok(words.iter().flat_map(|word| word.to_le_bytes()).collect())
            }
        }
    }

    /// Resource bindings of the whole program, normalized for the target.
    pub fn resource_bindings(&self) -> Vec<ResourceBinding> {
        extract_resource_bindings(&self.program.module, &self.binding_model)
    }
}

fn single_entry_point_view(module: &Module, index: usize) -> Module {
    let mut view = module.clone();
    let entry_point = view.entry_points.swap_remove(index);
    view.entry_points = vec![entry_point];
    view
}
