//! # glmodgen-core
//!
//! The deterministic ownership and partitioning engine for glmodgen.
//!
//! Given an ordered registry of constants, functions, versioned features and
//! vendor extensions, this crate works out which output modules must expose
//! each entity and builds a partitioned, deduplicated, inheritance-aware
//! module graph ready for rendering.
//!
//! ## Pipeline
//!
//! 1. [`EntityTable`] canonicalizes names and renders values
//! 2. [`OwnershipResolver`] folds require/remove edits into owner sets
//! 3. [`ModulePartitioner`] distributes entities into modules
//! 4. [`SharedExtractor`] pulls multi-owned entities into one shared module
//! 5. [`ExtensionGrouper`] builds vendor and top-level gather modules
//!
//! [`Generator`] runs all five and returns a [`ModuleGraph`].
//!
//! ## Architectural Constraints
//!
//! - Registry parsing and text rendering are external collaborators
//!   ([`RegistrySource`], [`ModuleEmitter`])
//! - Single-threaded, single pass, BTreeMap ordering throughout
//! - The first violation aborts the run; there is no partial output

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod entity_table;
pub mod gather;
pub mod inheritance;
pub mod partition;
pub mod pipeline;
pub mod profile;
pub mod registry;
pub mod resolver;
pub mod shared;
pub mod system;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Command, Constant, Entity, EntityKind, EntityName, EntityRef, ExtensionModule, GenError,
    ModuleId, ProfileModule,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use config::{CollisionPolicy, Config};
pub use entity_table::{
    Canonicalizer, EntityIndex, EntityTable, NameCollision, PrototypeSignature, SignatureDeriver,
};
pub use gather::{ExtensionGrouper, ExtensionGroups, GatherModule};
pub use inheritance::ProfileInheritance;
pub use partition::{
    Module, ModuleCollision, ModuleEntry, ModulePartitioner, extension_collisions, known_modules,
};
pub use pipeline::{Generator, ModuleEmitter, ModuleGraph};
pub use profile::{ProfileModules, Track, baseline_companion, profile_modules};
pub use registry::{ApiFamily, Edit, Extension, Feature, FeatureId, Profile, Registry, RegistrySource};
pub use resolver::{OwnershipMap, OwnershipResolver};
pub use shared::{SharedExtractor, SharedModule};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::PlanMetrics;
