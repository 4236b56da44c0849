//! # Ownership Resolver
//!
//! Folds the registry's ordered edits into per-entity owner sets.
//!
//! The fold threads an [`OwnershipMap`] accumulator through every block in
//! registry order:
//! 1. Extensions: each require adds the extension's module.
//! 2. Features, one at a time: every require adds the block's primary module
//!    (plus the baseline companion for unprofiled desktop versions), then
//!    every remove drops the primary module and adds its compatibility alias.
//!
//! Entity values are never touched. A reference to an unknown entity aborts
//! the run.

use crate::entity_table::{EntityIndex, EntityTable};
use crate::profile::{baseline_companion, profile_modules};
use crate::registry::{Edit, Extension, Feature, RegistrySource};
use crate::{EntityRef, ExtensionModule, GenError, ModuleId, ProfileModule};
use std::collections::BTreeSet;

// =============================================================================
// OWNERSHIP MAP
// =============================================================================

/// Owner sets, indexed parallel to an [`EntityTable`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnershipMap {
    owners: Vec<BTreeSet<ModuleId>>,
}

impl OwnershipMap {
    /// Empty owner sets for every entity of `table`.
    #[must_use]
    pub fn for_table(table: &EntityTable) -> Self {
        Self {
            owners: vec![BTreeSet::new(); table.len()],
        }
    }

    #[must_use]
    pub fn owners(&self, index: EntityIndex) -> Option<&BTreeSet<ModuleId>> {
        self.owners.get(index.0)
    }

    /// Shared iff owned by two or more modules.
    #[must_use]
    pub fn is_shared(&self, index: EntityIndex) -> bool {
        self.owners(index).is_some_and(|set| set.len() > 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    fn add(mut self, index: EntityIndex, module: ModuleId) -> Self {
        if let Some(set) = self.owners.get_mut(index.0) {
            set.insert(module);
        }
        self
    }

    fn remove(mut self, index: EntityIndex, module: &ModuleId) -> Self {
        if let Some(set) = self.owners.get_mut(index.0) {
            set.remove(module);
        }
        self
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Applies the registry's edits to an entity table.
pub struct OwnershipResolver<'a> {
    table: &'a EntityTable,
}

impl<'a> OwnershipResolver<'a> {
    #[must_use]
    pub const fn new(table: &'a EntityTable) -> Self {
        Self { table }
    }

    /// Run the full fold: extensions first, then features in declaration order.
    pub fn resolve<R>(&self, registry: &R) -> Result<OwnershipMap, GenError>
    where
        R: RegistrySource + ?Sized,
    {
        let map = registry
            .extensions()
            .iter()
            .try_fold(OwnershipMap::for_table(self.table), |map, extension| {
                self.apply_extension(map, extension)
            })?;

        let map = registry
            .features()
            .iter()
            .try_fold(map, |map, feature| self.apply_feature(map, feature))?;

        tracing::info!(
            "Ownership resolved: {} extensions, {} features, {} entities",
            registry.extensions().len(),
            registry.features().len(),
            map.len()
        );
        Ok(map)
    }

    /// Add the extension's module to every entity its requires name.
    pub fn apply_extension(
        &self,
        map: OwnershipMap,
        extension: &Extension,
    ) -> Result<OwnershipMap, GenError> {
        let module = ModuleId::Extension(ExtensionModule::from_extension_name(&extension.name)?);
        tracing::debug!("Applying extension {} -> {}", extension.name, module);

        extension
            .requires
            .iter()
            .flatten()
            .try_fold(map, |map, reference| {
                let index = self.index_of(&extension.name, reference)?;
                Ok(map.add(index, module.clone()))
            })
    }

    /// Apply all requires of a feature, then all of its removes.
    pub fn apply_feature(
        &self,
        map: OwnershipMap,
        feature: &Feature,
    ) -> Result<OwnershipMap, GenError> {
        tracing::debug!(
            "Applying feature {}: {} requires, {} removes",
            feature.id,
            feature.requires.len(),
            feature.removes.len()
        );

        let map = feature
            .requires
            .iter()
            .try_fold(map, |map, block| self.apply_require(map, feature, block))?;

        feature
            .removes
            .iter()
            .try_fold(map, |map, block| self.apply_remove(map, feature, block))
    }

    fn apply_require(
        &self,
        map: OwnershipMap,
        feature: &Feature,
        block: &Edit,
    ) -> Result<OwnershipMap, GenError> {
        let primary = profile_modules(feature.id, block.profile)?.primary;
        let targets = require_targets(primary);

        block.entities.iter().try_fold(map, |map, reference| {
            let index = self.index_of(feature.id.name(), reference)?;
            Ok(targets
                .iter()
                .fold(map, |map, module| map.add(index, ModuleId::Profile(*module))))
        })
    }

    fn apply_remove(
        &self,
        map: OwnershipMap,
        feature: &Feature,
        block: &Edit,
    ) -> Result<OwnershipMap, GenError> {
        let modules = profile_modules(feature.id, block.profile)?;
        let primary = ModuleId::Profile(modules.primary);

        block.entities.iter().try_fold(map, |map, reference| {
            let index = self.index_of(feature.id.name(), reference)?;
            let map = map.remove(index, &primary);
            Ok(match modules.alias {
                Some(alias) => map.add(index, ModuleId::Profile(alias)),
                None => map,
            })
        })
    }

    fn index_of(&self, origin: &str, reference: &EntityRef) -> Result<EntityIndex, GenError> {
        self.table
            .lookup(reference)
            .ok_or_else(|| GenError::UnknownReference {
                origin: origin.to_string(),
                kind: reference.kind,
                name: reference.name.clone(),
            })
    }
}

/// Modules a require block of `primary` adds, primary first.
#[must_use]
pub fn require_targets(primary: ProfileModule) -> Vec<ProfileModule> {
    std::iter::once(primary)
        .chain(baseline_companion(primary))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entity_table::PrototypeSignature;
    use crate::registry::{FeatureId, Profile, Registry};
    use crate::Entity;

    fn profile(module: ProfileModule) -> ModuleId {
        ModuleId::Profile(module)
    }

    fn owners_of(registry: &Registry, name: &str) -> BTreeSet<ModuleId> {
        let table =
            EntityTable::build(registry, &PrototypeSignature, &Config::default()).expect("build");
        let map = OwnershipResolver::new(&table)
            .resolve(registry)
            .expect("resolve");
        let index = table.lookup(&EntityRef::constant(name)).expect("lookup");
        map.owners(index).cloned().unwrap_or_default()
    }

    #[test]
    fn extension_require_adds_extension_module() {
        let registry = Registry::new()
            .with_entity(Entity::constant("GL_SYNC_FLAGS", "0x9115"))
            .with_extension(
                crate::registry::Extension::new("GL_ARB_sync")
                    .require(vec![EntityRef::constant("GL_SYNC_FLAGS")]),
            );

        let owners = owners_of(&registry, "GL_SYNC_FLAGS");
        assert_eq!(owners.len(), 1);
        assert!(owners.contains(&ModuleId::Extension(ExtensionModule {
            vendor: "ARB".into(),
            name: "Sync".into(),
        })));
    }

    #[test]
    fn unprofiled_require_adds_baseline_companion() {
        let registry = Registry::new()
            .with_entity(Entity::constant("GL_LINES", "0x0001"))
            .with_feature(
                Feature::new(FeatureId::Gl10).require(None, vec![EntityRef::constant("GL_LINES")]),
            );

        let owners = owners_of(&registry, "GL_LINES");
        assert_eq!(
            owners,
            BTreeSet::from([profile(ProfileModule::Version10), profile(ProfileModule::Core32)])
        );
    }

    #[test]
    fn require_then_remove_migrates_to_alias() {
        let registry = Registry::new()
            .with_entity(Entity::constant("GL_X", "1"))
            .with_feature(
                Feature::new(FeatureId::Gl33)
                    .require(None, vec![EntityRef::constant("GL_X")])
                    .remove(Some(Profile::Core), vec![EntityRef::constant("GL_X")]),
            );

        let owners = owners_of(&registry, "GL_X");
        assert_eq!(owners, BTreeSet::from([profile(ProfileModule::Compatibility33)]));
    }

    #[test]
    fn remove_before_require_differs() {
        // The same edits in the opposite order, split over two features so the
        // remove commits first.
        let registry = Registry::new()
            .with_entity(Entity::constant("GL_X", "1"))
            .with_feature(
                Feature::new(FeatureId::Gl33)
                    .remove(Some(Profile::Core), vec![EntityRef::constant("GL_X")]),
            )
            .with_feature(
                Feature::new(FeatureId::Gl33).require(None, vec![EntityRef::constant("GL_X")]),
            );

        let owners = owners_of(&registry, "GL_X");
        assert_eq!(
            owners,
            BTreeSet::from([
                profile(ProfileModule::Core33),
                profile(ProfileModule::Compatibility33)
            ])
        );
    }

    #[test]
    fn unknown_reference_is_fatal() {
        let registry = Registry::new().with_feature(
            Feature::new(FeatureId::Gl20).require(None, vec![EntityRef::function("glMissing")]),
        );
        let table =
            EntityTable::build(&registry, &PrototypeSignature, &Config::default()).expect("build");

        let result = OwnershipResolver::new(&table).resolve(&registry);
        assert!(matches!(
            result,
            Err(GenError::UnknownReference { ref origin, ref name, .. })
                if origin == "GL_VERSION_2_0" && name == "glMissing"
        ));
    }

    #[test]
    fn unknown_extension_reference_is_fatal() {
        let registry = Registry::new().with_extension(
            crate::registry::Extension::new("GL_NV_fence")
                .require(vec![EntityRef::constant("GL_FENCE_STATUS_NV")]),
        );
        let table =
            EntityTable::build(&registry, &PrototypeSignature, &Config::default()).expect("build");

        assert!(OwnershipResolver::new(&table).resolve(&registry).is_err());
    }

    #[test]
    fn foreign_profile_is_fatal() {
        let registry = Registry::new()
            .with_entity(Entity::constant("GL_X", "1"))
            .with_feature(
                Feature::new(FeatureId::Gl21)
                    .require(Some(Profile::Core), vec![EntityRef::constant("GL_X")]),
            );
        let table =
            EntityTable::build(&registry, &PrototypeSignature, &Config::default()).expect("build");

        assert!(matches!(
            OwnershipResolver::new(&table).resolve(&registry),
            Err(GenError::UnknownProfilePairing { .. })
        ));
    }

    #[test]
    fn shared_flag_follows_owner_count() {
        let registry = Registry::new()
            .with_entity(Entity::constant("GL_A", "1"))
            .with_entity(Entity::constant("GL_B", "2"))
            .with_feature(
                Feature::new(FeatureId::Es20).require(None, vec![EntityRef::constant("GL_A")]),
            )
            .with_feature(Feature::new(FeatureId::Es30).require(
                None,
                vec![EntityRef::constant("GL_A"), EntityRef::constant("GL_B")],
            ));
        let table =
            EntityTable::build(&registry, &PrototypeSignature, &Config::default()).expect("build");
        let map = OwnershipResolver::new(&table)
            .resolve(&registry)
            .expect("resolve");

        assert!(map.is_shared(EntityIndex(0)));
        assert!(!map.is_shared(EntityIndex(1)));
    }

    #[test]
    fn require_targets_policy() {
        assert_eq!(
            require_targets(ProfileModule::Version14),
            vec![ProfileModule::Version14, ProfileModule::Core32]
        );
        assert_eq!(
            require_targets(ProfileModule::Embedded31),
            vec![ProfileModule::Embedded31]
        );
    }
}
