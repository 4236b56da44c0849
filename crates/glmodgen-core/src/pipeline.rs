//! # Generation Pipeline
//!
//! Runs the whole engine in one pass:
//!
//! ```text
//! RegistrySource -> EntityTable -> OwnershipResolver -> ModulePartitioner
//!                -> SharedExtractor -> ExtensionGrouper -> ModuleGraph
//! ```
//!
//! The resulting [`ModuleGraph`] is read-only and is handed to a
//! [`ModuleEmitter`] in a fixed order.

use crate::config::{CollisionPolicy, Config};
use crate::entity_table::{EntityTable, NameCollision, SignatureDeriver};
use crate::gather::{ExtensionGrouper, GatherModule};
use crate::inheritance::ProfileInheritance;
use crate::partition::{
    Module, ModuleCollision, ModulePartitioner, extension_collisions, known_modules,
};
use crate::registry::RegistrySource;
use crate::resolver::OwnershipResolver;
use crate::shared::{SharedExtractor, SharedModule};
use crate::{GenError, ModuleId};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// OUTPUT
// =============================================================================

/// Everything an emitter needs, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleGraph {
    /// Namespace module paths are qualified under.
    pub module_root: String,
    /// Lattice and extension modules, in id order.
    pub modules: BTreeMap<ModuleId, Module>,
    pub shared: SharedModule,
    /// Vendor gathers, sorted by vendor.
    pub vendor_gathers: Vec<GatherModule>,
    pub extension_gather: GatherModule,
    /// Canonicalization collisions seen while building the entity table.
    pub collisions: Vec<NameCollision>,
    /// Extension names merged into another name's module.
    pub module_collisions: Vec<ModuleCollision>,
    pub entity_count: usize,
}

impl ModuleGraph {
    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.get(id)
    }

    /// Full name of `id` under the configured root, e.g. `Graphics.GL.Core32`.
    #[must_use]
    pub fn qualified_name(&self, id: &ModuleId) -> String {
        id.qualified_name(&self.module_root)
    }

    /// Feed every module to `emitter`: owned modules, shared, vendor gathers,
    /// then the top gather. Stops at the first error.
    pub fn emit_to<E>(&self, emitter: &mut E) -> Result<(), GenError>
    where
        E: ModuleEmitter + ?Sized,
    {
        for module in self.modules.values() {
            emitter.emit_module(module)?;
        }
        emitter.emit_shared(&self.shared)?;
        for gather in &self.vendor_gathers {
            emitter.emit_gather(gather)?;
        }
        emitter.emit_gather(&self.extension_gather)?;

        tracing::info!(
            "Emitted {} modules, {} gathers",
            self.modules.len() + 1,
            self.vendor_gathers.len() + 1
        );
        Ok(())
    }
}

/// Renders finished modules. Implemented outside this crate.
pub trait ModuleEmitter {
    fn emit_module(&mut self, module: &Module) -> Result<(), GenError>;
    fn emit_shared(&mut self, shared: &SharedModule) -> Result<(), GenError>;
    fn emit_gather(&mut self, gather: &GatherModule) -> Result<(), GenError>;
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Drives a generation run.
pub struct Generator<'a, D: ?Sized> {
    config: &'a Config,
    deriver: &'a D,
}

impl<'a, D> Generator<'a, D>
where
    D: SignatureDeriver + ?Sized,
{
    #[must_use]
    pub const fn new(config: &'a Config, deriver: &'a D) -> Self {
        Self { config, deriver }
    }

    /// Build the module graph for `registry`.
    pub fn run<R>(&self, registry: &R) -> Result<ModuleGraph, GenError>
    where
        R: RegistrySource + ?Sized,
    {
        self.config.validate()?;

        let known = known_modules(registry)?;
        ProfileInheritance::validate(&known)?;
        let module_collisions = self.check_module_collisions(registry)?;

        let table = EntityTable::build(registry, self.deriver, self.config)?;
        let ownership = OwnershipResolver::new(&table).resolve(registry)?;
        let mut modules = ModulePartitioner::partition(&table, &ownership, &known)?;
        let shared = SharedExtractor::extract(&mut modules);
        let groups = ExtensionGrouper::group(modules.keys());

        Ok(ModuleGraph {
            module_root: self.config.module_root.clone(),
            modules,
            shared,
            vendor_gathers: groups.vendors,
            extension_gather: groups.top,
            collisions: table.collisions().to_vec(),
            module_collisions,
            entity_count: table.len(),
        })
    }

    fn check_module_collisions<R>(&self, registry: &R) -> Result<Vec<ModuleCollision>, GenError>
    where
        R: RegistrySource + ?Sized,
    {
        let collisions = extension_collisions(registry)?;
        for collision in &collisions {
            if self.config.collision_policy == CollisionPolicy::Reject {
                return Err(GenError::ModuleCollision {
                    module: collision.module.clone(),
                    previous: collision.previous.clone(),
                    current: collision.current.clone(),
                });
            }
            tracing::warn!(
                "Module collision on {}: `{}` merged into `{}`",
                collision.module,
                collision.current,
                collision.previous
            );
        }
        Ok(collisions)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_table::PrototypeSignature;
    use crate::registry::{Extension, Feature, FeatureId, Registry};
    use crate::{Entity, EntityRef, ProfileModule};

    #[derive(Default)]
    struct Recorder {
        order: Vec<ModuleId>,
        fail_on: Option<ModuleId>,
    }

    impl Recorder {
        fn record(&mut self, id: &ModuleId) -> Result<(), GenError> {
            if self.fail_on.as_ref() == Some(id) {
                return Err(GenError::Emit(format!("cannot write {id}")));
            }
            self.order.push(id.clone());
            Ok(())
        }
    }

    impl ModuleEmitter for Recorder {
        fn emit_module(&mut self, module: &Module) -> Result<(), GenError> {
            self.record(&module.id)
        }

        fn emit_shared(&mut self, shared: &SharedModule) -> Result<(), GenError> {
            self.record(&shared.id)
        }

        fn emit_gather(&mut self, gather: &GatherModule) -> Result<(), GenError> {
            self.record(&gather.id)
        }
    }

    fn registry() -> Registry {
        Registry::new()
            .with_entity(Entity::constant("GL_A", "1"))
            .with_entity(Entity::function("glDraw", ["GLint"], ""))
            .with_feature(Feature::new(FeatureId::Gl10).require(
                None,
                vec![EntityRef::constant("GL_A"), EntityRef::function("glDraw")],
            ))
            .with_extension(
                Extension::new("GL_ARB_draw").require(vec![EntityRef::function("glDraw")]),
            )
    }

    #[test]
    fn run_produces_complete_graph() {
        let config = Config::default();
        let graph = Generator::new(&config, &PrototypeSignature)
            .run(&registry())
            .expect("run");

        assert_eq!(graph.entity_count, 2);
        assert_eq!(graph.modules.len(), ProfileModule::ALL.len() + 1);
        assert_eq!(graph.shared.len(), 2);
        assert_eq!(graph.vendor_gathers.len(), 1);
        assert_eq!(graph.extension_gather.members.len(), 1);
        assert!(graph.collisions.is_empty());

        let v10 = graph
            .module(&ModuleId::Profile(ProfileModule::Version10))
            .expect("module");
        assert!(v10.imports_shared);
        assert_eq!(v10.local_entries().count(), 0);
    }

    #[test]
    fn emit_order_is_fixed() {
        let config = Config::default();
        let graph = Generator::new(&config, &PrototypeSignature)
            .run(&registry())
            .expect("run");

        let mut recorder = Recorder::default();
        graph.emit_to(&mut recorder).expect("emit");

        let n = recorder.order.len();
        assert_eq!(n, ProfileModule::ALL.len() + 1 + 1 + 1 + 1);
        assert_eq!(recorder.order[0], ModuleId::Profile(ProfileModule::Version10));
        assert_eq!(recorder.order[n - 3], ModuleId::Shared);
        assert_eq!(recorder.order[n - 2], ModuleId::VendorGather("ARB".into()));
        assert_eq!(recorder.order[n - 1], ModuleId::ExtensionGather);
    }

    #[test]
    fn emitter_errors_propagate() {
        let config = Config::default();
        let graph = Generator::new(&config, &PrototypeSignature)
            .run(&registry())
            .expect("run");

        let mut recorder = Recorder {
            fail_on: Some(ModuleId::Shared),
            ..Recorder::default()
        };
        assert!(matches!(graph.emit_to(&mut recorder), Err(GenError::Emit(_))));
        assert!(!recorder.order.contains(&ModuleId::ExtensionGather));
    }

    #[test]
    fn invalid_config_aborts_run() {
        let config = Config {
            module_root: String::new(),
            ..Config::default()
        };
        let result = Generator::new(&config, &PrototypeSignature).run(&registry());
        assert!(matches!(result, Err(GenError::Config(_))));
    }

    #[test]
    fn module_root_qualifies_names() {
        let default = Config::default();
        let custom = Config {
            module_root: "Gfx.Raw".into(),
            ..Config::default()
        };
        let id = ModuleId::Profile(ProfileModule::Core32);

        let graph = Generator::new(&default, &PrototypeSignature)
            .run(&registry())
            .expect("run");
        assert_eq!(graph.qualified_name(&id), "Graphics.GL.Core32");

        let graph = Generator::new(&custom, &PrototypeSignature)
            .run(&registry())
            .expect("run");
        assert_eq!(graph.module_root, "Gfx.Raw");
        assert_eq!(graph.qualified_name(&id), "Gfx.Raw.Core32");
        assert_eq!(graph.qualified_name(&ModuleId::Shared), "Gfx.Raw.Internal.Shared");
    }

    #[test]
    fn overlapping_prefixes_abort_run() {
        let config = Config {
            constant_prefix: "gl".into(),
            ..Config::default()
        };
        let registry = Registry::new()
            .with_entity(Entity::function("glFinish", Vec::<String>::new(), ""))
            .with_feature(
                Feature::new(FeatureId::Es20).require(None, vec![EntityRef::constant("GL_Finish")]),
            );
        let result = Generator::new(&config, &PrototypeSignature).run(&registry);
        assert!(matches!(result, Err(GenError::Config(_))));
    }

    #[test]
    fn constant_reference_to_function_is_unknown() {
        let registry = Registry::new()
            .with_entity(Entity::function("glFinish", Vec::<String>::new(), ""))
            .with_feature(
                Feature::new(FeatureId::Es20).require(None, vec![EntityRef::constant("GL_FINISH")]),
            );
        let config = Config::default();
        let result = Generator::new(&config, &PrototypeSignature).run(&registry);
        assert!(matches!(result, Err(GenError::UnknownReference { .. })));
    }

    #[test]
    fn extension_spelling_collisions_are_recorded() {
        let registry = Registry::new()
            .with_extension(Extension::new("GL_ARB_foo_bar"))
            .with_extension(Extension::new("GL_ARB_fooBar"));

        let config = Config::default();
        let graph = Generator::new(&config, &PrototypeSignature)
            .run(&registry)
            .expect("run");
        assert_eq!(graph.module_collisions.len(), 1);
        assert_eq!(graph.module_collisions[0].current, "GL_ARB_fooBar");
        assert_eq!(graph.vendor_gathers[0].members.len(), 1);

        let config = Config {
            collision_policy: CollisionPolicy::Reject,
            ..Config::default()
        };
        let result = Generator::new(&config, &PrototypeSignature).run(&registry);
        assert!(matches!(result, Err(GenError::ModuleCollision { .. })));
    }

    #[test]
    fn malformed_extension_aborts_run() {
        let registry = Registry::new().with_extension(Extension::new("GL_ARB"));
        let config = Config::default();
        let result = Generator::new(&config, &PrototypeSignature).run(&registry);
        assert!(matches!(result, Err(GenError::MalformedExtensionName(_))));
    }
}
