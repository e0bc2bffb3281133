use crate::{
    CompilationRequest, Compiler, Diagnostic, DiagnosticPhase, Diagnostics,
    SessionCreationError, TargetDescriptor,
};
use log::{debug, info};
use shx_output::{ShaderOutput, TargetFormat};
use std::path::Path;
use thiserror::Error;

/// Fatal failures of a compile call. None of them produce partial output.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("invalid compilation request: {0}")]
    InvalidRequest(String),
    #[error("failed to create a compilation session: {0}")]
    SessionCreation(#[from] SessionCreationError),
    #[error("failed to load the module `{module}`:\n{diagnostics}")]
    ModuleLoad { module: String, diagnostics: String },
    #[error("failed to find the entry point `{name}`")]
    EntryPointNotFound { name: String },
    #[error("failed to compose the program: {diagnostics}")]
    Composition { diagnostics: String },
    #[error("failed to link the program:\n{diagnostics}")]
    Link { diagnostics: String },
}

/// Outputs of a compile call together with every non-fatal diagnostic.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub outputs: Vec<ShaderOutput>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns shader source into per-entry-point GLSL, HLSL or SPIR-V.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'c> {
    compiler: &'c Compiler,
}

impl<'c> Translator<'c> {
    pub fn new(compiler: &'c Compiler) -> Self {
        Self { compiler }
    }

    pub fn compiler(&self) -> &'c Compiler {
        self.compiler
    }

    /// Returns one output per entry point that produced code, in request
    /// order. Entry points whose code generation fails are skipped.
    pub fn compile(&self, request: &CompilationRequest) -> Result<Vec<ShaderOutput>, CompileError> {
        self.compile_with_diagnostics(request)
            .map(|compilation| compilation.outputs)
    }

    pub fn compile_with_diagnostics(
        &self,
        request: &CompilationRequest,
    ) -> Result<Compilation, CompileError> {
        if request.entry_points().is_empty() {
            return Err(CompileError::InvalidRequest(
                "no entry points specified".to_owned(),
            ));
        }

        let target = TargetDescriptor {
            format: request.target(),
            profile: request
                .profile()
                .unwrap_or_else(|| self.compiler.default_profile(request.target())),
        };
        let session = self
            .compiler
            .create_session(target, self.compiler.search_paths())?;

        let mut diagnostics = Diagnostics::new();
        let module_name = self.compiler.module_name();
        let module = session
            .load_module_from_source(
                module_name,
                request.path_hint(),
                request.source(),
                &mut diagnostics,
            )
            .map_err(|diagnostics| CompileError::ModuleLoad {
                module: module_name.to_owned(),
                diagnostics,
            })?;

        let mut entry_points = Vec::with_capacity(request.entry_points().len());

        for name in request.entry_points() {
            match module.find_entry_point_by_name(name) {
                Some(entry_point) => entry_points.push(entry_point),
                None => {
                    return Err(CompileError::EntryPointNotFound { name: name.clone() });
                }
            }
        }

        let program = session
            .create_composite(&module, &entry_points)
            .map_err(|diagnostics| CompileError::Composition { diagnostics })?;
        let linked = session
            .link(program, &mut diagnostics)
            .map_err(|diagnostics| CompileError::Link { diagnostics })?;

        let resource_bindings = if request.reflect() {
            linked.resource_bindings()
        } else {
            Vec::new()
        };

        let mut outputs = Vec::with_capacity(entry_points.len());

        for (index, name) in request.entry_points().iter().enumerate() {
            let data = match linked.entry_point_code(index) {
                Ok(data) => data,
                Err(err) => {
                    diagnostics.entry_point_error(DiagnosticPhase::CodeGen, name, err.to_string());
                    continue;
                }
            };

            debug!(
                "generated {} bytes of {} for the entry point `{}`.",
                data.len(),
                target.format,
                name
            );

            outputs.push(ShaderOutput::new(
                target.format,
                name.clone(),
                data,
                resource_bindings.clone(),
            ));
        }

        info!(
            "compiled {} of {} entry points to {}.",
            outputs.len(),
            entry_points.len(),
            target.format
        );

        Ok(Compilation {
            outputs,
            diagnostics: diagnostics.into_vec(),
        })
    }

    pub fn compile_to_glsl(
        &self,
        source: &str,
        entry_points: &[&str],
        path: Option<&Path>,
    ) -> Result<Vec<ShaderOutput>, CompileError> {
        self.compile_to(TargetFormat::Glsl, source, entry_points, path)
    }

    pub fn compile_to_hlsl(
        &self,
        source: &str,
        entry_points: &[&str],
        path: Option<&Path>,
    ) -> Result<Vec<ShaderOutput>, CompileError> {
        self.compile_to(TargetFormat::Hlsl, source, entry_points, path)
    }

    pub fn compile_to_spirv(
        &self,
        source: &str,
        entry_points: &[&str],
        path: Option<&Path>,
    ) -> Result<Vec<ShaderOutput>, CompileError> {
        self.compile_to(TargetFormat::Spirv, source, entry_points, path)
    }

    /// Empty text means no output was produced, not an empty shader.
    pub fn compile_to_glsl_single(
        &self,
        source: &str,
        entry_point: &str,
        path: Option<&Path>,
    ) -> Result<String, CompileError> {
        let outputs = self.compile_to_glsl(source, &[entry_point], path)?;
        Ok(first_text(&outputs))
    }

    /// Empty text means no output was produced, not an empty shader.
    pub fn compile_to_hlsl_single(
        &self,
        source: &str,
        entry_point: &str,
        path: Option<&Path>,
    ) -> Result<String, CompileError> {
        let outputs = self.compile_to_hlsl(source, &[entry_point], path)?;
        Ok(first_text(&outputs))
    }

    /// An empty buffer means no output was produced.
    pub fn compile_to_spirv_single(
        &self,
        source: &str,
        entry_point: &str,
        path: Option<&Path>,
    ) -> Result<Vec<u8>, CompileError> {
        let outputs = self.compile_to_spirv(source, &[entry_point], path)?;
        Ok(outputs
            .into_iter()
            .next()
            .map(ShaderOutput::into_data)
            .unwrap_or_default())
    }

    fn compile_to(
        &self,
        target: TargetFormat,
        source: &str,
        entry_points: &[&str],
        path: Option<&Path>,
    ) -> Result<Vec<ShaderOutput>, CompileError> {
        let mut request = CompilationRequest::new(source, entry_points.iter().copied(), target);

        if let Some(path) = path {
            request = request.with_path_hint(path);
        }

        self.compile(&request)
    }
}

fn first_text(outputs: &[ShaderOutput]) -> String {
    outputs
        .first()
        .map(|output| output.as_text().into_owned())
        .unwrap_or_default()
}
