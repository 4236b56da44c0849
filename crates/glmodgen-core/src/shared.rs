//! # Shared Extraction
//!
//! Collects every multi-owned entity into the single shared module and marks
//! the modules that must import it. The shared module is the only place a
//! shared entity is rendered; owner modules re-export it.

use crate::partition::{Module, ModuleEntry};
use crate::{EntityName, ModuleId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The module holding every entity owned by more than one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedModule {
    pub id: ModuleId,
    /// Each shared entity once, in first-seen order.
    pub entries: Vec<ModuleEntry>,
}

impl SharedModule {
    #[must_use]
    pub fn contains(&self, name: &EntityName) -> bool {
        self.entries.iter().any(|e| &e.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the shared module from a partitioned module table.
pub struct SharedExtractor;

impl SharedExtractor {
    /// Scan modules in id order, deduplicate shared entries by name, and set
    /// `imports_shared` on every module that lists one.
    pub fn extract(modules: &mut BTreeMap<ModuleId, Module>) -> SharedModule {
        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();

        for module in modules.values_mut() {
            for entry in module.entries.iter().filter(|e| e.shared) {
                module.imports_shared = true;
                if seen.insert(entry.name.clone()) {
                    entries.push(entry.clone());
                }
            }
        }

        let importers = modules.values().filter(|m| m.imports_shared).count();
        tracing::info!(
            "Shared module: {} entities, imported by {} modules",
            entries.len(),
            importers
        );

        SharedModule {
            id: ModuleId::Shared,
            entries,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityKind, ProfileModule};

    fn entry(name: &str, shared: bool) -> ModuleEntry {
        ModuleEntry {
            shared,
            name: EntityName::new(name),
            kind: EntityKind::Constant,
            value: "0".into(),
        }
    }

    fn module(id: ProfileModule, entries: Vec<ModuleEntry>) -> (ModuleId, Module) {
        let id = ModuleId::Profile(id);
        let mut module = Module::new(id.clone());
        module.entries = entries;
        (id, module)
    }

    #[test]
    fn shared_entries_collected_once_in_first_seen_order() {
        let mut modules: BTreeMap<_, _> = [
            module(
                ProfileModule::Version10,
                vec![entry("GL_B", true), entry("GL_LOCAL", false), entry("GL_A", true)],
            ),
            module(ProfileModule::Core32, vec![entry("GL_B", true), entry("GL_A", true)]),
            module(ProfileModule::Embedded20, vec![entry("GL_ES", false)]),
        ]
        .into_iter()
        .collect();

        let shared = SharedExtractor::extract(&mut modules);

        let names: Vec<_> = shared.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["GL_B", "GL_A"]);
        assert_eq!(shared.id, ModuleId::Shared);
        assert!(!shared.contains(&EntityName::new("GL_LOCAL")));
    }

    #[test]
    fn importers_are_marked() {
        let mut modules: BTreeMap<_, _> = [
            module(ProfileModule::Version10, vec![entry("GL_A", true)]),
            module(ProfileModule::Embedded20, vec![entry("GL_ES", false)]),
        ]
        .into_iter()
        .collect();

        SharedExtractor::extract(&mut modules);

        assert!(modules[&ModuleId::Profile(ProfileModule::Version10)].imports_shared);
        assert!(!modules[&ModuleId::Profile(ProfileModule::Embedded20)].imports_shared);
    }

    #[test]
    fn no_shared_entities_yields_empty_module() {
        let mut modules: BTreeMap<_, _> =
            [module(ProfileModule::Version10, vec![entry("GL_A", false)])]
                .into_iter()
                .collect();

        let shared = SharedExtractor::extract(&mut modules);
        assert!(shared.is_empty());
        assert_eq!(shared.len(), 0);
    }
}
