mod resource_binding;
mod shader_output;
mod target_format;

pub use resource_binding::*;
pub use shader_output::*;
pub use target_format::*;
