use anyhow::{Context, Error as AnyError};
use shx_compiler::Translator;

pub const TWO_STAGE_SOURCE: &str = r#"
@vertex
fn vertexMain(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 1.0);
}

@fragment
fn fragmentMain(@builtin(position) pos: vec4<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

const ENTRY_POINTS: &[&str] = &["vertexMain", "fragmentMain"];

/// Compiles both stages to GLSL and SPIR-V in one pass each, then the vertex
/// stage alone through the single-entry-point path.
pub fn translate_inline_source(translator: &Translator, source: &str) -> Result<(), AnyError> {
    let glsl_shaders = translator
        .compile_to_glsl(source, ENTRY_POINTS, None)
        .context("failed to compile to GLSL")?;
    println!("Compiled {} GLSL shaders:", glsl_shaders.len());

    for shader in &glsl_shaders {
        println!("\n=== {} ===", shader.entry_point_name());
        println!("{}", shader.as_text());
    }

    let spirv_shaders = translator
        .compile_to_spirv(source, ENTRY_POINTS, None)
        .context("failed to compile to SPIR-V")?;
    println!("\nCompiled {} SPIR-V shaders:", spirv_shaders.len());

    for shader in &spirv_shaders {
        println!("{}: {} bytes", shader.entry_point_name(), shader.data().len());
    }

    let single_glsl = translator
        .compile_to_glsl_single(source, "vertexMain", None)
        .context("failed to compile the vertex stage to GLSL")?;

    if single_glsl.is_empty() {
        println!("\nNo GLSL was produced for the vertex stage.");
    } else {
        println!("\nSingle vertex shader GLSL:\n{}", single_glsl);
    }

    Ok(())
}
