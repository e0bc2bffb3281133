mod demo;

use anyhow::{anyhow, Context, Error as AnyError};
use log::{error, LevelFilter};
use shx_compiler::{Compiler, CompilerConfig, Translator};

const CONFIG_ENV: &str = "SHX_CONFIG";

fn main() {
    env_logger::Builder::from_env("LOG")
        .filter_level(LevelFilter::Info)
        .format_module_path(false)
        .format_target(false)
        .init();

    if let Err(err) = run() {
        let mut errors = Vec::new();

        for cause in err.chain() {
            errors.push(format!("- {}", cause));
        }

        error!("failed to translate shaders. error:\n{}", errors.join("\n"));
        std::process::exit(1);
    }
}

fn run() -> Result<(), AnyError> {
    let config = load_config()?;
    let compiler = Compiler::new(config).context("failed to initialize the shader compiler")?;
    let translator = Translator::new(&compiler);

    println!("Shader translator examples:");
    demo::translate_inline_source(&translator, demo::TWO_STAGE_SOURCE)
        .context("failed to translate the inline source")?;

    Ok(())
}

fn load_config() -> Result<CompilerConfig, AnyError> {
    match std::env::var(CONFIG_ENV) {
        Ok(content) => CompilerConfig::from_json(&content)
            .with_context(|| format!("failed to parse the configuration in `{}`", CONFIG_ENV)),
        Err(std::env::VarError::NotPresent) => Ok(CompilerConfig::default()),
        Err(err) => Err(anyhow!(err))
            .with_context(|| format!("failed to read the configuration in `{}`", CONFIG_ENV)),
    }
}
