mod compiler;
mod config;
mod diagnostics;
mod profile;
mod program;
mod reflection;
mod request;
mod session;
mod translator;

pub use compiler::*;
pub use config::*;
pub use diagnostics::*;
pub use profile::*;
pub use program::*;
pub use reflection::*;
pub use request::*;
pub use session::*;
pub use translator::*;

pub use shx_output::{ResourceBinding, ResourceBindingKind, ShaderOutput, TargetFormat};
