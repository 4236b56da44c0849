//! # Module Partitioner
//!
//! Distributes resolved entities into their owning modules.
//!
//! Every known module (the whole lattice plus one module per extension) is
//! registered up front, so a module that owns nothing still exists
//! downstream. Entities are visited in table order, which fixes the order of
//! every module's entry list.

use crate::entity_table::EntityTable;
use crate::inheritance::ProfileInheritance;
use crate::registry::RegistrySource;
use crate::resolver::OwnershipMap;
use crate::{EntityKind, EntityName, ExtensionModule, GenError, ModuleId, ProfileModule};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One entity as listed by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntry {
    /// Owned by more than one module; rendered in the shared module only.
    pub shared: bool,
    pub name: EntityName,
    pub kind: EntityKind,
    pub value: String,
}

/// A lattice or extension module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub id: ModuleId,
    /// Entries in entity table order.
    pub entries: Vec<ModuleEntry>,
    /// Modules re-exported instead of duplicated.
    pub ancestors: Vec<ModuleId>,
    /// Whether any entry lives in the shared module.
    pub imports_shared: bool,
}

impl Module {
    #[must_use]
    pub fn new(id: ModuleId) -> Self {
        let ancestors = ProfileInheritance::ancestors_of(&id);
        Self {
            id,
            entries: Vec::new(),
            ancestors,
            imports_shared: false,
        }
    }

    /// Entries this module renders itself.
    pub fn local_entries(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.entries.iter().filter(|e| !e.shared)
    }

    /// Entries this module re-exports from the shared module.
    pub fn shared_entries(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.entries.iter().filter(|e| e.shared)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every module that must exist: the lattice plus each extension's module.
pub fn known_modules<R>(registry: &R) -> Result<BTreeSet<ModuleId>, GenError>
where
    R: RegistrySource + ?Sized,
{
    let mut known: BTreeSet<ModuleId> = ProfileModule::ALL
        .into_iter()
        .map(ModuleId::Profile)
        .collect();
    for extension in registry.extensions() {
        known.insert(ModuleId::Extension(ExtensionModule::from_extension_name(
            &extension.name,
        )?));
    }
    Ok(known)
}

/// Two distinct extension names that map to one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCollision {
    pub module: ModuleId,
    /// Name that claimed the module first.
    pub previous: String,
    /// Differently spelled name merged into it.
    pub current: String,
}

/// Extension names that map onto a module another name already claimed, in
/// declaration order. Repeating the same name is not a collision.
pub fn extension_collisions<R>(registry: &R) -> Result<Vec<ModuleCollision>, GenError>
where
    R: RegistrySource + ?Sized,
{
    let mut claimed: BTreeMap<ExtensionModule, &str> = BTreeMap::new();
    let mut collisions = Vec::new();

    for extension in registry.extensions() {
        let module = ExtensionModule::from_extension_name(&extension.name)?;
        match claimed.get(&module) {
            Some(&first) if first != extension.name => collisions.push(ModuleCollision {
                module: ModuleId::Extension(module),
                previous: first.to_string(),
                current: extension.name.clone(),
            }),
            Some(_) => {}
            None => {
                claimed.insert(module, &extension.name);
            }
        }
    }
    Ok(collisions)
}

/// Groups entities by owning module.
pub struct ModulePartitioner;

impl ModulePartitioner {
    /// Build the module table.
    ///
    /// An owner outside `known` is reported as an undeclared module.
    pub fn partition(
        table: &EntityTable,
        ownership: &OwnershipMap,
        known: &BTreeSet<ModuleId>,
    ) -> Result<BTreeMap<ModuleId, Module>, GenError> {
        let mut modules: BTreeMap<ModuleId, Module> = known
            .iter()
            .map(|id| (id.clone(), Module::new(id.clone())))
            .collect();

        for (index, entry) in table.iter() {
            let Some(owners) = ownership.owners(index) else {
                continue;
            };
            let shared = owners.len() > 1;

            for owner in owners {
                let module = modules
                    .get_mut(owner)
                    .ok_or_else(|| GenError::UndeclaredModule {
                        entity: entry.name.clone(),
                        module: owner.clone(),
                    })?;
                module.entries.push(ModuleEntry {
                    shared,
                    name: entry.name.clone(),
                    kind: entry.kind,
                    value: entry.value.clone(),
                });
            }
        }

        tracing::info!(
            "Partitioned {} entities into {} modules",
            table.len(),
            modules.len()
        );
        Ok(modules)
    }
}

// =============================================================================
// TESTS
// =============================================================================
