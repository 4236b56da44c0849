//! # Core Type Definitions
//!
//! This module contains all core types for the glmodgen ownership engine:
//! - Entity identity and content (`EntityName`, `Entity`, `Constant`, `Command`)
//! - Registry references (`EntityRef`, `EntityKind`)
//! - Module identifiers (`ModuleId`, `ProfileModule`, `ExtensionModule`)
//! - Error types (`GenError`)
//!
//! ## Determinism Guarantees
//!
//! All identifier types in this module:
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Form closed enumerations where the set of values is known up front

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// ENTITY IDENTITY
// =============================================================================

/// Canonical public name of an entity.
///
/// Produced by [`crate::entity_table::Canonicalizer`]; two registry names that
/// normalize to the same `EntityName` are the same entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityName(pub String);

impl EntityName {
    /// Create a new entity name.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which namespace an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An enumerant / numeric constant.
    Constant,
    /// A callable command.
    Function,
}

// =============================================================================
// ENTITY CONTENT
// =============================================================================

/// A named constant with its literal value as written in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: String,
}

/// A command with its ordered parameter types and return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    /// Empty for commands returning nothing.
    #[serde(default)]
    pub return_type: String,
}

/// An entity declared by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Constant(Constant),
    Function(Command),
}

impl Entity {
    /// Create a constant entity.
    #[must_use]
    pub fn constant(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Constant(Constant {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Create a function entity.
    #[must_use]
    pub fn function(
        name: impl Into<String>,
        params: impl IntoIterator<Item = impl Into<String>>,
        return_type: impl Into<String>,
    ) -> Self {
        Self::Function(Command {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            return_type: return_type.into(),
        })
    }

    /// Registry (raw, non-canonical) name.
    #[must_use]
    pub fn raw_name(&self) -> &str {
        match self {
            Self::Constant(c) => &c.name,
            Self::Function(f) => &f.name,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Constant(_) => EntityKind::Constant,
            Self::Function(_) => EntityKind::Function,
        }
    }
}

/// A reference to an entity from a require or remove block.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub name: String,
}

impl EntityRef {
    #[must_use]
    pub fn constant(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Constant,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Function,
            name: name.into(),
        }
    }
}

// =============================================================================
// PROFILE MODULES (the version/profile lattice)
// =============================================================================

/// Every module of the version/profile lattice.
///
/// The set is closed: each variant is a declared module whether or not the
/// registry ends up giving it any entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProfileModule {
    Version10,
    Version11,
    Version12,
    Version13,
    Version14,
    Version15,
    Version20,
    Version21,
    Version30,
    Version31,
    Core32,
    Core33,
    Core40,
    Core41,
    Core42,
    Core43,
    Core44,
    Core45,
    Core46,
    Compatibility32,
    Compatibility33,
    Compatibility40,
    Compatibility41,
    Compatibility42,
    Compatibility43,
    Compatibility44,
    Compatibility45,
    Compatibility46,
    EmbeddedCommon10,
    Embedded20,
    Embedded30,
    Embedded31,
    Embedded32,
}

impl ProfileModule {
    /// All lattice modules in declaration order.
    pub const ALL: [ProfileModule; 33] = [
        Self::Version10,
        Self::Version11,
        Self::Version12,
        Self::Version13,
        Self::Version14,
        Self::Version15,
        Self::Version20,
        Self::Version21,
        Self::Version30,
        Self::Version31,
        Self::Core32,
        Self::Core33,
        Self::Core40,
        Self::Core41,
        Self::Core42,
        Self::Core43,
        Self::Core44,
        Self::Core45,
        Self::Core46,
        Self::Compatibility32,
        Self::Compatibility33,
        Self::Compatibility40,
        Self::Compatibility41,
        Self::Compatibility42,
        Self::Compatibility43,
        Self::Compatibility44,
        Self::Compatibility45,
        Self::Compatibility46,
        Self::EmbeddedCommon10,
        Self::Embedded20,
        Self::Embedded30,
        Self::Embedded31,
        Self::Embedded32,
    ];

    /// Module name relative to the module root.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Version10 => "Version10",
            Self::Version11 => "Version11",
            Self::Version12 => "Version12",
            Self::Version13 => "Version13",
            Self::Version14 => "Version14",
            Self::Version15 => "Version15",
            Self::Version20 => "Version20",
            Self::Version21 => "Version21",
            Self::Version30 => "Version30",
            Self::Version31 => "Version31",
            Self::Core32 => "Core32",
            Self::Core33 => "Core33",
            Self::Core40 => "Core40",
            Self::Core41 => "Core41",
            Self::Core42 => "Core42",
            Self::Core43 => "Core43",
            Self::Core44 => "Core44",
            Self::Core45 => "Core45",
            Self::Core46 => "Core46",
            Self::Compatibility32 => "Compatibility32",
            Self::Compatibility33 => "Compatibility33",
            Self::Compatibility40 => "Compatibility40",
            Self::Compatibility41 => "Compatibility41",
            Self::Compatibility42 => "Compatibility42",
            Self::Compatibility43 => "Compatibility43",
            Self::Compatibility44 => "Compatibility44",
            Self::Compatibility45 => "Compatibility45",
            Self::Compatibility46 => "Compatibility46",
            Self::EmbeddedCommon10 => "EmbeddedCommon10",
            Self::Embedded20 => "Embedded20",
            Self::Embedded30 => "Embedded30",
            Self::Embedded31 => "Embedded31",
            Self::Embedded32 => "Embedded32",
        }
    }

    /// True for the unprofiled desktop modules (`Version10` .. `Version31`).
    #[must_use]
    pub const fn is_unprofiled_desktop(self) -> bool {
        matches!(
            self,
            Self::Version10
                | Self::Version11
                | Self::Version12
                | Self::Version13
                | Self::Version14
                | Self::Version15
                | Self::Version20
                | Self::Version21
                | Self::Version30
                | Self::Version31
        )
    }
}

impl fmt::Display for ProfileModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// EXTENSION MODULES
// =============================================================================

/// Module generated for one extension, e.g. `Ext.ARB.VertexBufferObject`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExtensionModule {
    /// Vendor prefix token, verbatim (`ARB`, `EXT`, `NV`, ...).
    pub vendor: String,
    /// Camel-cased remainder of the extension name.
    pub name: String,
}

impl ExtensionModule {
    /// Derive the module from an extension name such as `GL_ARB_vertex_buffer_object`.
    ///
    /// The first field is the family tag and is dropped, the second is the
    /// vendor, and the remaining fields are camel-cased.
    pub fn from_extension_name(extension: &str) -> Result<Self, GenError> {
        let mut fields = extension.split('_');
        let (Some(_family), Some(vendor)) = (fields.next(), fields.next()) else {
            return Err(GenError::MalformedExtensionName(extension.to_string()));
        };

        let name: String = fields.map(camel_case_word).collect();
        if vendor.is_empty() || name.is_empty() {
            return Err(GenError::MalformedExtensionName(extension.to_string()));
        }

        Ok(Self {
            vendor: vendor.to_string(),
            name,
        })
    }
}

fn camel_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

// =============================================================================
// MODULE IDENTIFIERS
// =============================================================================

/// Identifier of any module in the output graph.
///
/// The derived `Ord` is the emission order: lattice modules, extension
/// modules, the shared module, then gathers. Serializes as its path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum ModuleId {
    Profile(ProfileModule),
    Extension(ExtensionModule),
    Shared,
    VendorGather(String),
    ExtensionGather,
}

impl ModuleId {
    /// Dotted path relative to the module root.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Profile(p) => p.name().to_string(),
            Self::Extension(e) => format!("Ext.{}.{}", e.vendor, e.name),
            Self::Shared => "Internal.Shared".to_string(),
            Self::VendorGather(vendor) => format!("Ext.{vendor}"),
            Self::ExtensionGather => "Ext".to_string(),
        }
    }

    /// Fully qualified name under `root` (e.g. `Graphics.GL.Core32`).
    #[must_use]
    pub fn qualified_name(&self, root: &str) -> String {
        format!("{root}.{}", self.path())
    }

    #[must_use]
    pub const fn as_profile(&self) -> Option<ProfileModule> {
        match self {
            Self::Profile(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.path()
    }
}

impl From<ProfileModule> for ModuleId {
    fn from(module: ProfileModule) -> Self {
        Self::Profile(module)
    }
}

impl From<ExtensionModule> for ModuleId {
    fn from(module: ExtensionModule) -> Self {
        Self::Extension(module)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that abort a generation run.
///
/// - No silent failures
/// - There is no partial mode: the first violation is returned
#[derive(Debug, Error)]
pub enum GenError {
    /// A require/remove block names an entity the table does not contain.
    #[error("{origin} references unknown {kind:?} `{name}`")]
    UnknownReference {
        origin: String,
        kind: EntityKind,
        name: String,
    },

    /// A feature/profile pair outside the lattice.
    #[error("No module for feature {feature} with profile {profile}")]
    UnknownProfilePairing { feature: String, profile: String },

    /// A feature name that is not part of the known version set.
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// A profile name that is not part of the known profile set.
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    /// An extension name without family, vendor and remainder fields.
    #[error("Malformed extension name: {0}")]
    MalformedExtensionName(String),

    /// Two registry names normalize to one identity under the reject policy.
    #[error("Name collision on {canonical}: `{previous}` and `{current}`")]
    NameCollision {
        canonical: EntityName,
        previous: String,
        current: String,
    },

    /// Two extension names map to one module under the reject policy.
    #[error("Module collision on {module}: `{previous}` and `{current}`")]
    ModuleCollision {
        module: ModuleId,
        previous: String,
        current: String,
    },

    /// An inheritance chain loops back on itself.
    #[error("Inheritance cycle through {0}")]
    InheritanceCycle(ModuleId),

    /// An ancestor that is not a declared module.
    #[error("{module} inherits undeclared module {ancestor}")]
    UndeclaredAncestor { module: ModuleId, ancestor: ModuleId },

    /// An entity ended up owned by a module outside the declared set.
    #[error("{entity} is owned by undeclared module {module}")]
    UndeclaredModule { entity: EntityName, module: ModuleId },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// The module emitter rejected a module.
    #[error("Emit error: {0}")]
    Emit(String),
}

// =============================================================================
// TESTS
// =============================================================================
