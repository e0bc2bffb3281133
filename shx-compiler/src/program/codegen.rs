use crate::Profile;
use naga::{
    back::{glsl, hlsl, spv},
    proc::BoundsCheckPolicies,
    valid::ModuleInfo,
    EntryPoint, Module,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodeGenError {
    #[error("entry point index {index} is out of range for a program with {count} entry points")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("the profile `{0}` cannot drive this backend")]
    UnsupportedProfile(Profile),
    #[error("failed to validate the entry point:\n{0}")]
    Validation(String),
    #[error("failed to write GLSL: {0}")]
    Glsl(#[from] glsl::Error),
    #[error("failed to write HLSL: {0}")]
    Hlsl(#[from] hlsl::Error),
    #[error("failed to write SPIR-V: {0}")]
    Spirv(#[from] spv::Error),
}

pub(crate) fn write_glsl(
    module: &Module,
    info: &ModuleInfo,
    entry_point: &EntryPoint,
    version: glsl::Version,
    binding_map: glsl::BindingMap,
) -> Result<String, CodeGenError> {
    let options = glsl::Options {
        version,
        binding_map,
        ..glsl::Options::default()
    };
    let pipeline_options = glsl::PipelineOptions {
        shader_stage: entry_point.stage,
        entry_point: entry_point.name.clone(),
        multiview: None,
    };

    let mut code = String::new();
    let mut writer = glsl::Writer::new(
        &mut code,
        module,
        info,
        &options,
        &pipeline_options,
        BoundsCheckPolicies::default(),
    )?;
    writer.write()?;
    drop(writer);

    Ok(code)
}

/// The HLSL writer emits every entry point of `module`, so callers pass a
/// module that holds only the entry point they want.
pub(crate) fn write_hlsl(
    module: &Module,
    info: &ModuleInfo,
    shader_model: hlsl::ShaderModel,
    binding_map: hlsl::BindingMap,
) -> Result<String, CodeGenError> {
    let options = hlsl::Options {
        shader_model,
        binding_map,
        ..hlsl::Options::default()
    };

    let mut code = String::new();
    let mut writer = hlsl::Writer::new(&mut code, &options);
    writer.write(module, info)?;
    drop(writer);

    Ok(code)
}

pub(crate) fn write_spirv(
    module: &Module,
    info: &ModuleInfo,
    entry_point: &EntryPoint,
    lang_version: (u8, u8),
) -> Result<Vec<u32>, CodeGenError> {
    let options = spv::Options {
        lang_version,
        ..spv::Options::default()
    };
    let pipeline_options = spv::PipelineOptions {
        shader_stage: entry_point.stage,
        entry_point: entry_point.name.clone(),
    };

    Ok(spv::write_vec(
        module,
        info,
        &options,
        Some(&pipeline_options),
    )?)
}
