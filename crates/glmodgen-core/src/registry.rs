//! # Registry Model
//!
//! The read-only, ordered feed of entities, features and extensions that the
//! ownership engine consumes. Parsing a registry file into this model happens
//! outside the crate; anything implementing [`RegistrySource`] can drive a run.
//!
//! Feature and profile names are parsed into closed enumerations as soon as
//! they enter the model, so an unknown version or profile fails at load time
//! rather than halfway through resolution.

use crate::{Entity, EntityRef, GenError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// API FAMILIES & FEATURES
// =============================================================================

/// API family a feature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApiFamily {
    /// Desktop GL.
    Gl,
    /// OpenGL ES 1.x (common profile).
    Gles1,
    /// OpenGL ES 2.0 and later.
    Gles2,
}

/// Every feature (API version) the lattice knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FeatureId {
    Gl10,
    Gl11,
    Gl12,
    Gl13,
    Gl14,
    Gl15,
    Gl20,
    Gl21,
    Gl30,
    Gl31,
    Gl32,
    Gl33,
    Gl40,
    Gl41,
    Gl42,
    Gl43,
    Gl44,
    Gl45,
    Gl46,
    EsCm10,
    Es20,
    Es30,
    Es31,
    Es32,
}

impl FeatureId {
    /// All features in version order.
    pub const ALL: [FeatureId; 24] = [
        Self::Gl10,
        Self::Gl11,
        Self::Gl12,
        Self::Gl13,
        Self::Gl14,
        Self::Gl15,
        Self::Gl20,
        Self::Gl21,
        Self::Gl30,
        Self::Gl31,
        Self::Gl32,
        Self::Gl33,
        Self::Gl40,
        Self::Gl41,
        Self::Gl42,
        Self::Gl43,
        Self::Gl44,
        Self::Gl45,
        Self::Gl46,
        Self::EsCm10,
        Self::Es20,
        Self::Es30,
        Self::Es31,
        Self::Es32,
    ];

    /// Registry name of the feature.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gl10 => "GL_VERSION_1_0",
            Self::Gl11 => "GL_VERSION_1_1",
            Self::Gl12 => "GL_VERSION_1_2",
            Self::Gl13 => "GL_VERSION_1_3",
            Self::Gl14 => "GL_VERSION_1_4",
            Self::Gl15 => "GL_VERSION_1_5",
            Self::Gl20 => "GL_VERSION_2_0",
            Self::Gl21 => "GL_VERSION_2_1",
            Self::Gl30 => "GL_VERSION_3_0",
            Self::Gl31 => "GL_VERSION_3_1",
            Self::Gl32 => "GL_VERSION_3_2",
            Self::Gl33 => "GL_VERSION_3_3",
            Self::Gl40 => "GL_VERSION_4_0",
            Self::Gl41 => "GL_VERSION_4_1",
            Self::Gl42 => "GL_VERSION_4_2",
            Self::Gl43 => "GL_VERSION_4_3",
            Self::Gl44 => "GL_VERSION_4_4",
            Self::Gl45 => "GL_VERSION_4_5",
            Self::Gl46 => "GL_VERSION_4_6",
            Self::EsCm10 => "GL_VERSION_ES_CM_1_0",
            Self::Es20 => "GL_ES_VERSION_2_0",
            Self::Es30 => "GL_ES_VERSION_3_0",
            Self::Es31 => "GL_ES_VERSION_3_1",
            Self::Es32 => "GL_ES_VERSION_3_2",
        }
    }

    #[must_use]
    pub const fn api(self) -> ApiFamily {
        match self {
            Self::EsCm10 => ApiFamily::Gles1,
            Self::Es20 | Self::Es30 | Self::Es31 | Self::Es32 => ApiFamily::Gles2,
            _ => ApiFamily::Gl,
        }
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureId {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| GenError::UnknownFeature(s.to_string()))
    }
}

impl TryFrom<String> for FeatureId {
    type Error = GenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FeatureId> for String {
    fn from(value: FeatureId) -> Self {
        value.name().to_string()
    }
}

// =============================================================================
// PROFILES
// =============================================================================

/// Named variant of a feature's API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Profile {
    Core,
    Compatibility,
    Common,
}

impl Profile {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Compatibility => "compatibility",
            Self::Common => "common",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Self::Core),
            "compatibility" => Ok(Self::Compatibility),
            "common" => Ok(Self::Common),
            other => Err(GenError::UnknownProfile(other.to_string())),
        }
    }
}

impl TryFrom<String> for Profile {
    type Error = GenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Profile> for String {
    fn from(value: Profile) -> Self {
        value.name().to_string()
    }
}

// =============================================================================
// EDIT BLOCKS
// =============================================================================

/// A require or remove block of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    #[serde(default)]
    pub profile: Option<Profile>,
    pub entities: Vec<EntityRef>,
}

/// A versioned bundle of ordered edits.
///
/// All requires are applied, in listed order, before any remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    #[serde(default)]
    pub requires: Vec<Edit>,
    #[serde(default)]
    pub removes: Vec<Edit>,
}

impl Feature {
    #[must_use]
    pub fn new(id: FeatureId) -> Self {
        Self {
            id,
            requires: Vec::new(),
            removes: Vec::new(),
        }
    }

    /// Append a require block.
    #[must_use]
    pub fn require(mut self, profile: Option<Profile>, entities: Vec<EntityRef>) -> Self {
        self.requires.push(Edit { profile, entities });
        self
    }

    /// Append a remove block.
    #[must_use]
    pub fn remove(mut self, profile: Option<Profile>, entities: Vec<EntityRef>) -> Self {
        self.removes.push(Edit { profile, entities });
        self
    }
}

/// A vendor-tagged, add-only bundle of edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Registry name, e.g. `GL_ARB_sync`.
    pub name: String,
    /// Require blocks; extensions carry no profile dimension.
    #[serde(default)]
    pub requires: Vec<Vec<EntityRef>>,
}

impl Extension {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires: Vec::new(),
        }
    }

    /// Append a require block.
    #[must_use]
    pub fn require(mut self, entities: Vec<EntityRef>) -> Self {
        self.requires.push(entities);
        self
    }
}

// =============================================================================
// REGISTRY SOURCE
// =============================================================================

/// Ordered, read-only access to a parsed registry.
///
/// Implementors must preserve registry declaration order in every slice.
pub trait RegistrySource {
    fn entities(&self) -> &[Entity];
    fn features(&self) -> &[Feature];
    fn extensions(&self) -> &[Extension];
}

/// In-memory registry, deserializable with serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub extensions: Vec<Extension>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }
}

impl RegistrySource for Registry {
    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn features(&self) -> &[Feature] {
        &self.features
    }

    fn extensions(&self) -> &[Extension] {
        &self.extensions
    }
}

// =============================================================================
// TESTS
// =============================================================================
