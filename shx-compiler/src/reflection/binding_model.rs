use super::{classify_global, ResourceClass};
use naga::{
    back::{glsl, hlsl},
    Module, ResourceBinding as NagaResourceBinding,
};
use shx_output::{ResourceBindingKind, TargetFormat};
use std::collections::BTreeMap;

/// Normalized location of a resource: `binding` is the descriptor binding,
/// register or flat slot, `set` the descriptor set or register space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSlot {
    pub binding: u32,
    pub set: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum HlslRegisterClass {
    B,
    T,
    S,
    U,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum GlslBindingClass {
    UniformBlock,
    StorageBlock,
    TextureUnit,
    ImageUnit,
    Sampler,
}

/// Per-target numbering of every resource in a program.
///
/// | target | binding | set |
/// |--------|---------|-----|
/// | SPIR-V | `@binding` | `@group` |
/// | HLSL   | register, counted per class (`b`/`t`/`s`/`u`) within the space | `@group` |
/// | GLSL   | slot, counted per GL binding class | 0 |
///
/// Registers and slots are handed out in (`@group`, `@binding`) order, and an
/// array of N elements takes N consecutive ones. Runtime-sized arrays have no
/// upper bound, so they are placed after every sized resource of their class.
/// The same assignment feeds the backend binding maps, so generated code and
/// reflection agree.
#[derive(Debug, Clone)]
pub struct BindingModel {
    target: TargetFormat,
    slots: BTreeMap<NagaResourceBinding, BindingSlot>,
    warnings: Vec<String>,
}

impl BindingModel {
    pub fn new(target: TargetFormat, module: &Module) -> Self {
        let mut resources = module
            .global_variables
            .iter()
            .filter_map(|(_, variable)| {
                Some((
                    variable.binding.clone()?,
                    classify_global(module, variable)?,
                ))
            })
            .collect::<Vec<_>>();

        resources.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        // colliding declarations keep the first one
        resources.dedup_by(|(lhs, _), (rhs, _)| lhs == rhs);

        let mut warnings = Vec::new();
        let slots = match target {
            TargetFormat::Spirv => assign_descriptor_slots(resources),
            TargetFormat::Hlsl => assign_counted_slots(
                resources,
                |binding, class| (binding.group, hlsl_register_class(class)),
                |binding| binding.group,
                &mut warnings,
            ),
            TargetFormat::Glsl => assign_counted_slots(
                resources,
                |_, class| glsl_binding_class(class),
                |_| 0,
                &mut warnings,
            ),
        };

        for (binding, slot) in &slots {
            match target {
                TargetFormat::Glsl if u8::try_from(slot.binding).is_err() => {
                    warnings.push(format!(
                        "the resource at @group({}) @binding({}) needs the GLSL binding {}, which is above {}; it is emitted without an explicit binding",
                        binding.group,
                        binding.binding,
                        slot.binding,
                        u8::MAX
                    ));
                }
                TargetFormat::Hlsl if u8::try_from(slot.set).is_err() => {
                    warnings.push(format!(
                        "the resource at @group({}) @binding({}) needs the register space {}, which is above {}; it keeps its default register",
                        binding.group,
                        binding.binding,
                        slot.set,
                        u8::MAX
                    ));
                }
                _ => {}
            }
        }

        Self {
            target,
            slots,
            warnings,
        }
    }

    pub fn target(&self) -> TargetFormat {
        self.target
    }

    pub fn slot(&self, binding: &NagaResourceBinding) -> Option<BindingSlot> {
        self.slots.get(binding).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resources the backends cannot place where this model puts them.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn glsl_binding_map(&self) -> glsl::BindingMap {
        self.slots
            .iter()
            .filter_map(|(binding, slot)| Some((binding.clone(), u8::try_from(slot.binding).ok()?)))
            .collect()
    }

    pub(crate) fn hlsl_binding_map(&self) -> hlsl::BindingMap {
        self.slots
            .iter()
            .filter_map(|(binding, slot)| {
                Some((
                    binding.clone(),
                    hlsl::BindTarget {
                        space: u8::try_from(slot.set).ok()?,
                        register: slot.binding,
                        binding_array_size: None,
                    },
                ))
            })
            .collect()
    }
}

fn hlsl_register_class(class: &ResourceClass) -> HlslRegisterClass {
    match class.kind {
        ResourceBindingKind::ConstantBuffer => HlslRegisterClass::B,
        ResourceBindingKind::StructuredBuffer if class.writable => HlslRegisterClass::U,
        ResourceBindingKind::StructuredBuffer | ResourceBindingKind::Texture => {
            HlslRegisterClass::T
        }
        ResourceBindingKind::Sampler => HlslRegisterClass::S,
        ResourceBindingKind::Uav => HlslRegisterClass::U,
    }
}

fn glsl_binding_class(class: &ResourceClass) -> GlslBindingClass {
    match class.kind {
        ResourceBindingKind::ConstantBuffer => GlslBindingClass::UniformBlock,
        ResourceBindingKind::StructuredBuffer => GlslBindingClass::StorageBlock,
        ResourceBindingKind::Texture => GlslBindingClass::TextureUnit,
        ResourceBindingKind::Uav => GlslBindingClass::ImageUnit,
        ResourceBindingKind::Sampler => GlslBindingClass::Sampler,
    }
}

fn assign_descriptor_slots(
    resources: Vec<(NagaResourceBinding, ResourceClass)>,
) -> BTreeMap<NagaResourceBinding, BindingSlot> {
    resources
        .into_iter()
        .map(|(binding, _)| {
            let slot = BindingSlot {
                binding: binding.binding,
                set: binding.group,
            };
            (binding, slot)
        })
        .collect()
}

/// Hands out consecutive numbers per counter, sized resources first.
///
/// A runtime-sized array (count 0) starts after every sized resource of its
/// counter and claims the open-ended rest, so a second one on the same
/// counter can only alias the first.
fn assign_counted_slots<K: Ord>(
    resources: Vec<(NagaResourceBinding, ResourceClass)>,
    counter_of: impl Fn(&NagaResourceBinding, &ResourceClass) -> K,
    set_of: impl Fn(&NagaResourceBinding) -> u32,
    warnings: &mut Vec<String>,
) -> BTreeMap<NagaResourceBinding, BindingSlot> {
    let (sized, unbounded): (Vec<_>, Vec<_>) =
        resources.into_iter().partition(|(_, class)| class.count != 0);

    let mut next_slots = BTreeMap::<K, u32>::new();
    let mut slots = BTreeMap::new();

    for (binding, class) in sized {
        let next = next_slots.entry(counter_of(&binding, &class)).or_default();
        let slot = BindingSlot {
            binding: *next,
            set: set_of(&binding),
        };
        *next += class.count;

        slots.insert(binding, slot);
    }

    let mut open_ended = BTreeMap::<K, NagaResourceBinding>::new();

    for (binding, class) in unbounded {
        let counter = counter_of(&binding, &class);
        let slot = BindingSlot {
            binding: next_slots.get(&counter).copied().unwrap_or_default(),
            set: set_of(&binding),
        };

        match open_ended.get(&counter) {
            Some(owner) => warnings.push(format!(
                "the runtime-sized arrays at @group({}) @binding({}) and @group({}) @binding({}) both start at slot {} and overlap",
                owner.group, owner.binding, binding.group, binding.binding, slot.binding
            )),
            None => {
                open_ended.insert(counter, binding.clone());
            }
        }

        slots.insert(binding, slot);
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOURCES: &str = r#"
struct Globals {
    tint: vec4<f32>,
}

@group(0) @binding(0) var<uniform> globals: Globals;
@group(0) @binding(1) var albedo: texture_2d<f32>;
@group(0) @binding(2) var albedo_sampler: sampler;
@group(1) @binding(0) var<storage, read> particles: array<vec4<f32>>;
@group(1) @binding(1) var<storage, read_write> counters: array<u32>;
@group(1) @binding(2) var output_image: texture_storage_2d<rgba8unorm, write>;
@group(2) @binding(0) var layers: binding_array<texture_2d<f32>, 4>;
@group(2) @binding(1) var shadow: texture_depth_2d;
@group(2) @binding(2) var shadow_sampler: sampler_comparison;
"#;

    fn slot_of(model: &BindingModel, group: u32, binding: u32) -> BindingSlot {
        model
            .slot(&NagaResourceBinding { group, binding })
            .unwrap()
    }

    fn model(target: TargetFormat) -> BindingModel {
        let module = naga::front::wgsl::parse_str(RESOURCES).unwrap();
        BindingModel::new(target, &module)
    }

    #[test]
    fn test_spirv_keeps_group_and_binding() {
        let model = model(TargetFormat::Spirv);

        assert_eq!(model.len(), 9);
        assert_eq!(slot_of(&model, 1, 2), BindingSlot { binding: 2, set: 1 });
        assert_eq!(slot_of(&model, 2, 1), BindingSlot { binding: 1, set: 2 });
    }

    #[test]
    fn test_hlsl_counts_registers_per_class_and_space() {
        let model = model(TargetFormat::Hlsl);

        // b0, t0 and s0 in space 0
        assert_eq!(slot_of(&model, 0, 0), BindingSlot { binding: 0, set: 0 });
        assert_eq!(slot_of(&model, 0, 1), BindingSlot { binding: 0, set: 0 });
        assert_eq!(slot_of(&model, 0, 2), BindingSlot { binding: 0, set: 0 });
        // t0, u0, u1 in space 1
        assert_eq!(slot_of(&model, 1, 0), BindingSlot { binding: 0, set: 1 });
        assert_eq!(slot_of(&model, 1, 1), BindingSlot { binding: 0, set: 1 });
        assert_eq!(slot_of(&model, 1, 2), BindingSlot { binding: 1, set: 1 });
        // t0..t3 for the array, then t4
        assert_eq!(slot_of(&model, 2, 0), BindingSlot { binding: 0, set: 2 });
        assert_eq!(slot_of(&model, 2, 1), BindingSlot { binding: 4, set: 2 });
        assert_eq!(slot_of(&model, 2, 2), BindingSlot { binding: 0, set: 2 });

        let binding_map = model.hlsl_binding_map();
        let target = &binding_map[&NagaResourceBinding {
            group: 2,
            binding: 1,
        }];
        assert_eq!(target.space, 2);
        assert_eq!(target.register, 4);
    }

    #[test]
    fn test_glsl_flattens_per_binding_class() {
        let model = model(TargetFormat::Glsl);

        assert_eq!(slot_of(&model, 0, 0), BindingSlot { binding: 0, set: 0 });
        assert_eq!(slot_of(&model, 0, 1), BindingSlot { binding: 0, set: 0 });
        assert_eq!(slot_of(&model, 1, 0), BindingSlot { binding: 0, set: 0 });
        assert_eq!(slot_of(&model, 1, 1), BindingSlot { binding: 1, set: 0 });
        assert_eq!(slot_of(&model, 1, 2), BindingSlot { binding: 0, set: 0 });
        assert_eq!(slot_of(&model, 2, 0), BindingSlot { binding: 1, set: 0 });
        assert_eq!(slot_of(&model, 2, 1), BindingSlot { binding: 5, set: 0 });
        assert_eq!(slot_of(&model, 2, 2), BindingSlot { binding: 1, set: 0 });

        assert_eq!(model.glsl_binding_map().len(), 9);
    }

    #[test]
    fn test_colliding_bindings_keep_the_first_declaration() {
        let module = naga::front::wgsl::parse_str(
            r#"
@group(0) @binding(0) var first: texture_2d<f32>;
@group(0) @binding(0) var second: sampler;
"#,
        )
        .unwrap();
        let model = BindingModel::new(TargetFormat::Hlsl, &module);

        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_runtime_sized_arrays_follow_sized_resources() {
        let module = naga::front::wgsl::parse_str(
            r#"
@group(0) @binding(0) var textures: binding_array<texture_2d<f32>>;
@group(0) @binding(1) var albedo: texture_2d<f32>;
@group(0) @binding(2) var normal: texture_2d<f32>;
"#,
        )
        .unwrap();

        for target in [TargetFormat::Hlsl, TargetFormat::Glsl] {
            let model = BindingModel::new(target, &module);

            assert_eq!(slot_of(&model, 0, 1).binding, 0);
            assert_eq!(slot_of(&model, 0, 2).binding, 1);
            assert_eq!(slot_of(&model, 0, 0).binding, 2);
            assert!(model.warnings().is_empty());
        }
    }

    #[test]
    fn test_second_runtime_sized_array_of_a_class_warns() {
        let module = naga::front::wgsl::parse_str(
            r#"
@group(0) @binding(0) var first: binding_array<texture_2d<f32>>;
@group(0) @binding(1) var second: binding_array<texture_2d<f32>>;
@group(0) @binding(2) var samplers: binding_array<sampler>;
"#,
        )
        .unwrap();
        let model = BindingModel::new(TargetFormat::Hlsl, &module);

        assert_eq!(slot_of(&model, 0, 0).binding, 0);
        assert_eq!(slot_of(&model, 0, 1).binding, 0);
        assert_eq!(slot_of(&model, 0, 2).binding, 0);
        assert_eq!(model.warnings().len(), 1);
        assert!(model.warnings()[0].contains("@group(0) @binding(1)"));
    }

    #[test]
    fn test_unrepresentable_slots_warn() {
        let module = naga::front::wgsl::parse_str(
            r#"
@group(0) @binding(0) var layers: binding_array<texture_2d<f32>, 300>;
@group(0) @binding(1) var albedo: texture_2d<f32>;
@group(256) @binding(0) var far_away: texture_2d<f32>;
"#,
        )
        .unwrap();

        let glsl = BindingModel::new(TargetFormat::Glsl, &module);
        assert_eq!(slot_of(&glsl, 0, 1).binding, 300);
        assert_eq!(slot_of(&glsl, 256, 0).binding, 301);
        assert_eq!(glsl.warnings().len(), 2);
        assert!(glsl.warnings()[0].contains("GLSL binding 300"));
        assert_eq!(glsl.glsl_binding_map().len(), 1);

        let hlsl = BindingModel::new(TargetFormat::Hlsl, &module);
        assert_eq!(hlsl.warnings().len(), 1);
        assert!(hlsl.warnings()[0].contains("register space 256"));
        assert_eq!(hlsl.hlsl_binding_map().len(), 2);

        assert!(BindingModel::new(TargetFormat::Spirv, &module)
            .warnings()
            .is_empty());
    }
}
