//! # Profile Module Mapping
//!
//! Maps a `(feature, profile)` pair onto the lattice module that owns the
//! edits of that block, plus the compatibility alias a core-profile removal
//! migrates entities into.
//!
//! The mapping is an exhaustive match over [`FeatureId`]: adding a feature
//! without deciding its track is a compile error, and a profile that does not
//! belong to a feature's track is a fatal `UnknownProfilePairing`.

use crate::registry::{FeatureId, Profile};
use crate::{GenError, ProfileModule};

/// How a feature's blocks are split into modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Desktop versions before the core/compatibility split.
    Unprofiled(ProfileModule),
    /// Desktop versions with a core and a compatibility profile.
    Split {
        core: ProfileModule,
        compatibility: ProfileModule,
    },
    /// OpenGL ES 1.x, whose only profile is `common`.
    EmbeddedCommon(ProfileModule),
    /// OpenGL ES 2.0 and later, unprofiled.
    Embedded(ProfileModule),
}

/// Result of a mapping: the module to edit, and the alias a removal adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileModules {
    pub primary: ProfileModule,
    pub alias: Option<ProfileModule>,
}

impl ProfileModules {
    const fn single(primary: ProfileModule) -> Self {
        Self {
            primary,
            alias: None,
        }
    }
}

/// Track of a feature.
#[must_use]
pub const fn track(feature: FeatureId) -> Track {
    use ProfileModule as M;

    match feature {
        FeatureId::Gl10 => Track::Unprofiled(M::Version10),
        FeatureId::Gl11 => Track::Unprofiled(M::Version11),
        FeatureId::Gl12 => Track::Unprofiled(M::Version12),
        FeatureId::Gl13 => Track::Unprofiled(M::Version13),
        FeatureId::Gl14 => Track::Unprofiled(M::Version14),
        FeatureId::Gl15 => Track::Unprofiled(M::Version15),
        FeatureId::Gl20 => Track::Unprofiled(M::Version20),
        FeatureId::Gl21 => Track::Unprofiled(M::Version21),
        FeatureId::Gl30 => Track::Unprofiled(M::Version30),
        FeatureId::Gl31 => Track::Unprofiled(M::Version31),
        FeatureId::Gl32 => Track::Split {
            core: M::Core32,
            compatibility: M::Compatibility32,
        },
        FeatureId::Gl33 => Track::Split {
            core: M::Core33,
            compatibility: M::Compatibility33,
        },
        FeatureId::Gl40 => Track::Split {
            core: M::Core40,
            compatibility: M::Compatibility40,
        },
        FeatureId::Gl41 => Track::Split {
            core: M::Core41,
            compatibility: M::Compatibility41,
        },
        FeatureId::Gl42 => Track::Split {
            core: M::Core42,
            compatibility: M::Compatibility42,
        },
        FeatureId::Gl43 => Track::Split {
            core: M::Core43,
            compatibility: M::Compatibility43,
        },
        FeatureId::Gl44 => Track::Split {
            core: M::Core44,
            compatibility: M::Compatibility44,
        },
        FeatureId::Gl45 => Track::Split {
            core: M::Core45,
            compatibility: M::Compatibility45,
        },
        FeatureId::Gl46 => Track::Split {
            core: M::Core46,
            compatibility: M::Compatibility46,
        },
        FeatureId::EsCm10 => Track::EmbeddedCommon(M::EmbeddedCommon10),
        FeatureId::Es20 => Track::Embedded(M::Embedded20),
        FeatureId::Es30 => Track::Embedded(M::Embedded30),
        FeatureId::Es31 => Track::Embedded(M::Embedded31),
        FeatureId::Es32 => Track::Embedded(M::Embedded32),
    }
}

/// Resolve the modules a `(feature, profile)` block edits.
///
/// An unprofiled block of a split version belongs to the core profile.
pub fn profile_modules(
    feature: FeatureId,
    profile: Option<Profile>,
) -> Result<ProfileModules, GenError> {
    match (track(feature), profile) {
        (Track::Unprofiled(module), None) => Ok(ProfileModules::single(module)),
        (Track::Split { core, compatibility }, None | Some(Profile::Core)) => Ok(ProfileModules {
            primary: core,
            alias: Some(compatibility),
        }),
        (Track::Split { compatibility, .. }, Some(Profile::Compatibility)) => {
            Ok(ProfileModules::single(compatibility))
        }
        (Track::EmbeddedCommon(module), None | Some(Profile::Common)) => {
            Ok(ProfileModules::single(module))
        }
        (Track::Embedded(module), None) => Ok(ProfileModules::single(module)),
        (_, profile) => Err(GenError::UnknownProfilePairing {
            feature: feature.to_string(),
            profile: profile.map_or_else(|| "<none>".to_string(), |p| p.to_string()),
        }),
    }
}

/// Baseline policy for requires.
///
/// Unprofiled desktop modules also populate `Core32`, the first profile-split
/// version, so the legacy surface stays visible from the profiled namespace.
/// Core-profile removals in 3.2 then migrate the deprecated part of it into
/// `Compatibility32`.
#[must_use]
pub const fn baseline_companion(module: ProfileModule) -> Option<ProfileModule> {
    if module.is_unprofiled_desktop() {
        Some(ProfileModule::Core32)
    } else {
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================
