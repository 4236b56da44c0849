//! # Extension Gathering
//!
//! Groups extension modules by vendor prefix. Each vendor gets one gather
//! module re-exporting its extension modules, and a single top-level gather
//! re-exports every vendor gather. A vendor with one extension still gets its
//! own gather module.

use crate::{ExtensionModule, ModuleId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A module whose only content is re-exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatherModule {
    pub id: ModuleId,
    /// Re-exported modules, sorted by id.
    pub members: Vec<ModuleId>,
}

/// Vendor gathers plus the top-level gather.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionGroups {
    /// One per vendor, sorted by vendor.
    pub vendors: Vec<GatherModule>,
    pub top: GatherModule,
}

/// Builds gather modules from the declared module set.
pub struct ExtensionGrouper;

impl ExtensionGrouper {
    /// Group every extension module among `modules` by vendor.
    pub fn group<'a, I>(modules: I) -> ExtensionGroups
    where
        I: IntoIterator<Item = &'a ModuleId>,
    {
        let mut by_vendor: BTreeMap<&str, BTreeSet<&ExtensionModule>> = BTreeMap::new();
        for id in modules {
            if let ModuleId::Extension(extension) = id {
                by_vendor
                    .entry(extension.vendor.as_str())
                    .or_default()
                    .insert(extension);
            }
        }

        let vendors: Vec<GatherModule> = by_vendor
            .into_iter()
            .map(|(vendor, members)| GatherModule {
                id: ModuleId::VendorGather(vendor.to_string()),
                members: members
                    .into_iter()
                    .cloned()
                    .map(ModuleId::Extension)
                    .collect(),
            })
            .collect();

        let top = GatherModule {
            id: ModuleId::ExtensionGather,
            members: vendors.iter().map(|g| g.id.clone()).collect(),
        };

        tracing::info!("Grouped extensions under {} vendor gathers", vendors.len());
        ExtensionGroups { vendors, top }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProfileModule;

    fn ext(vendor: &str, name: &str) -> ModuleId {
        ModuleId::Extension(ExtensionModule {
            vendor: vendor.into(),
            name: name.into(),
        })
    }

    #[test]
    fn groups_by_vendor_sorted() {
        let modules = [
            ext("NV", "FenceSync"),
            ext("ARB", "Sync"),
            ModuleId::Profile(ProfileModule::Core32),
            ext("ARB", "DebugOutput"),
        ];

        let groups = ExtensionGrouper::group(&modules);

        assert_eq!(groups.vendors.len(), 2);
        assert_eq!(groups.vendors[0].id, ModuleId::VendorGather("ARB".into()));
        assert_eq!(
            groups.vendors[0].members,
            vec![ext("ARB", "DebugOutput"), ext("ARB", "Sync")]
        );
        assert_eq!(groups.vendors[1].members, vec![ext("NV", "FenceSync")]);
        assert_eq!(
            groups.top.members,
            vec![
                ModuleId::VendorGather("ARB".into()),
                ModuleId::VendorGather("NV".into())
            ]
        );
    }

    #[test]
    fn singleton_vendor_still_gathered() {
        let modules = [ext("SGIX", "Shadow")];
        let groups = ExtensionGrouper::group(&modules);
        assert_eq!(groups.vendors.len(), 1);
        assert_eq!(groups.vendors[0].members.len(), 1);
        assert_eq!(groups.top.id, ModuleId::ExtensionGather);
    }

    #[test]
    fn no_extensions_gives_empty_top_gather() {
        let modules = [ModuleId::Profile(ProfileModule::Version10)];
        let groups = ExtensionGrouper::group(&modules);
        assert!(groups.vendors.is_empty());
        assert!(groups.top.members.is_empty());
    }
}
