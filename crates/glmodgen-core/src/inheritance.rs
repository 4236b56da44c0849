//! # Profile Inheritance
//!
//! Static table of which lattice modules a module re-exports instead of
//! duplicating their entities. Independent of registry content and used only
//! when composing exports, never for ownership.
//!
//! Two families of edges:
//! - **Version chain**: version N imports the same track's version N-1
//!   (`Version11 -> Version10`, `Core33 -> Core32`, `Embedded30 -> Embedded20`).
//! - **Core/compat pairing**: `CompatibilityN` imports `CompatibilityN-1`
//!   and then `CoreN`.

use crate::{GenError, ModuleId, ProfileModule};
use std::collections::BTreeSet;

/// Static module -> ancestors lookup.
pub struct ProfileInheritance;

impl ProfileInheritance {
    /// Ordered direct ancestors of a lattice module.
    #[must_use]
    pub const fn profile_ancestors(module: ProfileModule) -> &'static [ProfileModule] {
        use ProfileModule as M;

        match module {
            M::Version10 => &[],
            M::Version11 => &[M::Version10],
            M::Version12 => &[M::Version11],
            M::Version13 => &[M::Version12],
            M::Version14 => &[M::Version13],
            M::Version15 => &[M::Version14],
            M::Version20 => &[M::Version15],
            M::Version21 => &[M::Version20],
            M::Version30 => &[M::Version21],
            M::Version31 => &[M::Version30],
            M::Core32 => &[],
            M::Core33 => &[M::Core32],
            M::Core40 => &[M::Core33],
            M::Core41 => &[M::Core40],
            M::Core42 => &[M::Core41],
            M::Core43 => &[M::Core42],
            M::Core44 => &[M::Core43],
            M::Core45 => &[M::Core44],
            M::Core46 => &[M::Core45],
            M::Compatibility32 => &[M::Core32],
            M::Compatibility33 => &[M::Compatibility32, M::Core33],
            M::Compatibility40 => &[M::Compatibility33, M::Core40],
            M::Compatibility41 => &[M::Compatibility40, M::Core41],
            M::Compatibility42 => &[M::Compatibility41, M::Core42],
            M::Compatibility43 => &[M::Compatibility42, M::Core43],
            M::Compatibility44 => &[M::Compatibility43, M::Core44],
            M::Compatibility45 => &[M::Compatibility44, M::Core45],
            M::Compatibility46 => &[M::Compatibility45, M::Core46],
            M::EmbeddedCommon10 => &[],
            M::Embedded20 => &[],
            M::Embedded30 => &[M::Embedded20],
            M::Embedded31 => &[M::Embedded30],
            M::Embedded32 => &[M::Embedded31],
        }
    }

    /// Ordered direct ancestors of any module; empty outside the lattice.
    #[must_use]
    pub fn ancestors_of(module: &ModuleId) -> Vec<ModuleId> {
        match module {
            ModuleId::Profile(p) => Self::profile_ancestors(*p)
                .iter()
                .copied()
                .map(ModuleId::Profile)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Transitive ancestors of a module.
    #[must_use]
    pub fn closure(module: &ModuleId) -> BTreeSet<ModuleId> {
        let mut seen = BTreeSet::new();
        let mut stack = Self::ancestors_of(module);
        while let Some(next) = stack.pop() {
            if seen.insert(next.clone()) {
                stack.extend(Self::ancestors_of(&next));
            }
        }
        seen
    }

    /// Check that the table is acyclic and only names declared modules.
    pub fn validate(known: &BTreeSet<ModuleId>) -> Result<(), GenError> {
        Self::validate_with(known, Self::ancestors_of)
    }

    /// Depth-first walk from every known module over the edges `ancestors`
    /// yields.
    fn validate_with<F>(known: &BTreeSet<ModuleId>, ancestors: F) -> Result<(), GenError>
    where
        F: Fn(&ModuleId) -> Vec<ModuleId>,
    {
        let mut done = BTreeSet::new();
        for module in known {
            let mut on_stack = BTreeSet::new();
            Self::visit(module, known, &ancestors, &mut on_stack, &mut done)?;
        }
        Ok(())
    }

    fn visit<F>(
        module: &ModuleId,
        known: &BTreeSet<ModuleId>,
        ancestors: &F,
        on_stack: &mut BTreeSet<ModuleId>,
        done: &mut BTreeSet<ModuleId>,
    ) -> Result<(), GenError>
    where
        F: Fn(&ModuleId) -> Vec<ModuleId>,
    {
        if done.contains(module) {
            return Ok(());
        }
        if !on_stack.insert(module.clone()) {
            return Err(GenError::InheritanceCycle(module.clone()));
        }

        for ancestor in ancestors(module) {
            if !known.contains(&ancestor) {
                return Err(GenError::UndeclaredAncestor {
                    module: module.clone(),
                    ancestor,
                });
            }
            Self::visit(&ancestor, known, ancestors, on_stack, done)?;
        }

        on_stack.remove(module);
        done.insert(module.clone());
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice() -> BTreeSet<ModuleId> {
        ProfileModule::ALL
            .into_iter()
            .map(ModuleId::Profile)
            .collect()
    }

    #[test]
    fn version_chain_is_linear() {
        assert_eq!(
            ProfileInheritance::profile_ancestors(ProfileModule::Version21),
            &[ProfileModule::Version20]
        );
        assert!(ProfileInheritance::profile_ancestors(ProfileModule::Version10).is_empty());
        assert!(ProfileInheritance::profile_ancestors(ProfileModule::Core32).is_empty());
    }

    #[test]
    fn compatibility_imports_previous_compat_then_core() {
        assert_eq!(
            ProfileInheritance::profile_ancestors(ProfileModule::Compatibility40),
            &[ProfileModule::Compatibility33, ProfileModule::Core40]
        );
    }

    #[test]
    fn non_lattice_modules_have_no_ancestors() {
        assert!(ProfileInheritance::ancestors_of(&ModuleId::Shared).is_empty());
        assert!(ProfileInheritance::ancestors_of(&ModuleId::ExtensionGather).is_empty());
        assert!(
            ProfileInheritance::ancestors_of(&ModuleId::VendorGather("ARB".into())).is_empty()
        );
    }

    #[test]
    fn closure_reaches_the_chain_root() {
        let closure = ProfileInheritance::closure(&ModuleId::Profile(ProfileModule::Compatibility33));
        assert!(closure.contains(&ModuleId::Profile(ProfileModule::Compatibility32)));
        assert!(closure.contains(&ModuleId::Profile(ProfileModule::Core33)));
        assert!(closure.contains(&ModuleId::Profile(ProfileModule::Core32)));
        assert!(!closure.contains(&ModuleId::Profile(ProfileModule::Version31)));
    }

    #[test]
    fn table_validates_against_full_lattice() {
        assert!(ProfileInheritance::validate(&lattice()).is_ok());
    }

    #[test]
    fn validate_reports_undeclared_ancestor() {
        let mut known = lattice();
        known.remove(&ModuleId::Profile(ProfileModule::Core32));
        assert!(matches!(
            ProfileInheritance::validate(&known),
            Err(GenError::UndeclaredAncestor { .. })
        ));
    }

    #[test]
    fn validate_reports_cycle() {
        use ProfileModule as M;
        // Core32 -> Core33 closes the Core33 -> Core32 edge into a loop.
        let looped = |id: &ModuleId| match id.as_profile() {
            Some(M::Core32) => vec![ModuleId::Profile(M::Core33)],
            _ => ProfileInheritance::ancestors_of(id),
        };

        let result = ProfileInheritance::validate_with(&lattice(), looped);
        assert!(matches!(
            result,
            Err(GenError::InheritanceCycle(ModuleId::Profile(M::Core32 | M::Core33)))
        ));
    }

    #[test]
    fn validate_reports_self_loop() {
        let looped = |m: &ModuleId| {
            if *m == ModuleId::Profile(ProfileModule::Embedded20) {
                vec![m.clone()]
            } else {
                Vec::new()
            }
        };
        let result = ProfileInheritance::validate_with(&lattice(), looped);
        assert!(matches!(
            result,
            Err(GenError::InheritanceCycle(ModuleId::Profile(ProfileModule::Embedded20)))
        ));
    }

    #[test]
    fn no_module_is_its_own_ancestor() {
        for module in ProfileModule::ALL {
            let id = ModuleId::Profile(module);
            assert!(!ProfileInheritance::closure(&id).contains(&id));
        }
    }
}
