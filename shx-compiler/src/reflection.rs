mod binding_model;

pub use binding_model::*;

use naga::{
    AddressSpace, ArraySize, GlobalVariable, ImageClass, Module, StorageAccess, TypeInner,
};
use shx_output::{ResourceBinding, ResourceBindingKind};
use std::collections::BTreeMap;

/// Classification of one resource global, before target numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResourceClass {
    pub kind: ResourceBindingKind,
    pub count: u32,
    /// Read-write storage buffers land in a different register class on HLSL.
    pub writable: bool,
}

pub(crate) fn classify_global(module: &Module, variable: &GlobalVariable) -> Option<ResourceClass> {
    let (inner, count) = match module.types[variable.ty].inner {
        TypeInner::BindingArray { base, size } => (&module.types[base].inner, array_count(size)),
        ref inner => (inner, 1),
    };

    let (kind, writable) = match variable.space {
        AddressSpace::Uniform => (ResourceBindingKind::ConstantBuffer, false),
        AddressSpace::Storage { access } => (
            ResourceBindingKind::StructuredBuffer,
            access.contains(StorageAccess::STORE),
        ),
        AddressSpace::Handle => match *inner {
            TypeInner::Image {
                class: ImageClass::Storage { .. },
                ..
            } => (ResourceBindingKind::Uav, true),
            TypeInner::Image { .. } => (ResourceBindingKind::Texture, false),
            TypeInner::Sampler { .. } => (ResourceBindingKind::Sampler, false),
            _ => return None,
        },
        AddressSpace::Function
        | AddressSpace::Private
        | AddressSpace::WorkGroup
        | AddressSpace::PushConstant => return None,
    };

    Some(ResourceClass {
        kind,
        count,
        writable,
    })
}

fn array_count(size: ArraySize) -> u32 {
    match size {
        ArraySize::Constant(count) => count.get(),
        ArraySize::Dynamic => 0,
    }
}

/// Walks the program's resource globals in declaration order.
///
/// Globals the binding model has no slot for are left out; extraction itself
/// never fails.
pub fn extract_resource_bindings(module: &Module, model: &BindingModel) -> Vec<ResourceBinding> {
    let mut bindings = Vec::new();

    for (_, variable) in module.global_variables.iter() {
        let resource_binding = match &variable.binding {
            Some(resource_binding) => resource_binding,
            None => continue,
        };
        let class = match classify_global(module, variable) {
            Some(class) => class,
            None => continue,
        };
        let slot = match model.slot(resource_binding) {
            Some(slot) => slot,
            None => continue,
        };

        let name = match &variable.name {
            Some(name) => name.clone(),
            None => format!(
                "_group{}_binding{}",
                resource_binding.group, resource_binding.binding
            ),
        };

        bindings.push(ResourceBinding {
            kind: class.kind,
            binding: slot.binding,
            set: slot.set,
            count: class.count,
            name,
        });
    }

    bindings
}

/// Describes every pair of globals declared at the same group and binding.
pub(crate) fn find_binding_collisions(module: &Module) -> Vec<String> {
    let mut owners = BTreeMap::new();
    let mut collisions = Vec::new();

    for (_, variable) in module.global_variables.iter() {
        let resource_binding = match &variable.binding {
            Some(resource_binding) => resource_binding,
            None => continue,
        };
        let name = variable.name.as_deref().unwrap_or("<unnamed>");

        if let Some(previous) = owners.insert(resource_binding.clone(), name) {
            collisions.push(format!(
                "the resources `{}` and `{}` share @group({}) @binding({})",
                previous, name, resource_binding.group, resource_binding.binding
            ));
        }
    }

    collisions
}
