//! # Entity Table
//!
//! Canonical identity and rendered value of every registry entity, in
//! registry declaration order.
//!
//! - Names are normalized by [`Canonicalizer`]
//! - Values are rendered once and never recomputed
//! - Two declarations with the same canonical name collapse into one entry:
//!   the later declaration overwrites the earlier one in place, and the
//!   collision is recorded (or rejected, per [`CollisionPolicy`])

use crate::config::{CollisionPolicy, Config};
use crate::registry::RegistrySource;
use crate::{Command, Entity, EntityKind, EntityName, EntityRef, GenError};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// SIGNATURE DERIVATION
// =============================================================================

/// Renders a command into the string stored as its value.
///
/// Treated as total: it never fails.
pub trait SignatureDeriver {
    fn derive(&self, command: &Command) -> String;
}

impl<F> SignatureDeriver for F
where
    F: Fn(&Command) -> String,
{
    fn derive(&self, command: &Command) -> String {
        self(command)
    }
}

/// C-style prototype: `ret name(t1, t2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrototypeSignature;

impl SignatureDeriver for PrototypeSignature {
    fn derive(&self, command: &Command) -> String {
        let ret = if command.return_type.is_empty() {
            "void"
        } else {
            command.return_type.as_str()
        };
        format!("{} {}({})", ret, command.name, command.params.join(", "))
    }
}

// =============================================================================
// CANONICALIZATION
// =============================================================================

/// Maps registry names onto public identities.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    constant_prefix: String,
    function_prefix: String,
}

impl Canonicalizer {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            constant_prefix: config.constant_prefix.clone(),
            function_prefix: config.function_prefix.clone(),
        }
    }

    /// Canonical name of a registry name of the given kind.
    ///
    /// Constants drop their first `_`-delimited field; functions drop their
    /// leading lowercase family tag. The public tag is then prefixed.
    #[must_use]
    pub fn canonical(&self, kind: EntityKind, raw: &str) -> EntityName {
        match kind {
            EntityKind::Constant => {
                let rest = raw.split_once('_').map_or(raw, |(_, rest)| rest);
                EntityName(format!("{}{}", self.constant_prefix, rest))
            }
            EntityKind::Function => {
                let rest = raw.trim_start_matches(|c: char| c.is_ascii_lowercase());
                let rest = if rest.is_empty() { raw } else { rest };
                EntityName(format!("{}{}", self.function_prefix, rest))
            }
        }
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// Position of an entity in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityIndex(pub usize);

/// One canonical entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub name: EntityName,
    pub kind: EntityKind,
    /// Registry name of the declaration that won.
    pub raw_name: String,
    /// Rendered literal (constants) or derived signature (functions).
    pub value: String,
}

/// Two registry names that normalized to one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCollision {
    pub canonical: EntityName,
    /// Declaration that was overwritten.
    pub previous: String,
    /// Declaration that replaced it.
    pub current: String,
}

/// Canonical entities in registry declaration order.
#[derive(Debug, Clone)]
pub struct EntityTable {
    entries: Vec<TableEntry>,
    index: BTreeMap<EntityName, EntityIndex>,
    collisions: Vec<NameCollision>,
    canonicalizer: Canonicalizer,
}

impl EntityTable {
    /// Build the table from a registry.
    ///
    /// Under [`CollisionPolicy::Reject`] the first collision aborts the build.
    pub fn build<R, D>(registry: &R, deriver: &D, config: &Config) -> Result<Self, GenError>
    where
        R: RegistrySource + ?Sized,
        D: SignatureDeriver + ?Sized,
    {
        let mut table = Self {
            entries: Vec::with_capacity(registry.entities().len()),
            index: BTreeMap::new(),
            collisions: Vec::new(),
            canonicalizer: Canonicalizer::from_config(config),
        };

        for entity in registry.entities() {
            let kind = entity.kind();
            let name = table.canonicalizer.canonical(kind, entity.raw_name());
            let value = match entity {
                Entity::Constant(c) => c.value.clone(),
                Entity::Function(f) => deriver.derive(f),
            };
            let entry = TableEntry {
                name: name.clone(),
                kind,
                raw_name: entity.raw_name().to_string(),
                value,
            };

            match table.index.get(&name) {
                Some(&EntityIndex(position)) => {
                    let collision = NameCollision {
                        canonical: name,
                        previous: table.entries[position].raw_name.clone(),
                        current: entry.raw_name.clone(),
                    };
                    if config.collision_policy == CollisionPolicy::Reject {
                        return Err(GenError::NameCollision {
                            canonical: collision.canonical,
                            previous: collision.previous,
                            current: collision.current,
                        });
                    }
                    tracing::warn!(
                        "Name collision on {}: `{}` overwritten by `{}`",
                        collision.canonical,
                        collision.previous,
                        collision.current
                    );
                    table.entries[position] = entry;
                    table.collisions.push(collision);
                }
                None => {
                    table
                        .index
                        .insert(name, EntityIndex(table.entries.len()));
                    table.entries.push(entry);
                }
            }
        }

        tracing::info!(
            "Entity table built: {} entities, {} collisions",
            table.entries.len(),
            table.collisions.len()
        );
        Ok(table)
    }

    /// Find the entity a block reference points at. The entry must be of the
    /// reference's kind.
    #[must_use]
    pub fn lookup(&self, reference: &EntityRef) -> Option<EntityIndex> {
        let name = self.canonicalizer.canonical(reference.kind, &reference.name);
        self.index
            .get(&name)
            .copied()
            .filter(|index| self.entries[index.0].kind == reference.kind)
    }

    #[must_use]
    pub fn entry(&self, index: EntityIndex) -> Option<&TableEntry> {
        self.entries.get(index.0)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityIndex, &TableEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (EntityIndex(i), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collisions seen while building, in the order they happened.
    #[must_use]
    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }
}

// =============================================================================
// TESTS
// =============================================================================
