//! # Plan Metrics
//!
//! Counts describing a [`ModuleGraph`], for logs and run reports.

use crate::pipeline::ModuleGraph;
use crate::ModuleId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics extracted from a module graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetrics {
    /// Canonical entities in the table.
    pub entity_count: usize,
    /// Lattice and extension modules.
    pub module_count: usize,
    /// Modules that own nothing.
    pub empty_module_count: usize,
    pub extension_module_count: usize,
    /// Entities rendered in the shared module.
    pub shared_entity_count: usize,
    /// Modules importing the shared module.
    pub shared_importer_count: usize,
    pub vendor_gather_count: usize,
    /// Entity name and extension module collisions.
    pub collision_count: usize,
    /// Shared entities per thousand entities (integer only).
    pub shared_per_thousand: u64,
}

impl PlanMetrics {
    /// Create new metrics with all zeros.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entity_count: 0,
            module_count: 0,
            empty_module_count: 0,
            extension_module_count: 0,
            shared_entity_count: 0,
            shared_importer_count: 0,
            vendor_gather_count: 0,
            collision_count: 0,
            shared_per_thousand: 0,
        }
    }

    /// Compute metrics from a graph.
    #[must_use]
    pub fn from_graph(graph: &ModuleGraph) -> Self {
        let modules = graph.modules.values();
        let shared_entity_count = graph.shared.len();

        let shared_per_thousand = if graph.entity_count > 0 {
            ((shared_entity_count as u64).saturating_mul(1000)) / (graph.entity_count as u64)
        } else {
            0
        };

        Self {
            entity_count: graph.entity_count,
            module_count: graph.modules.len(),
            empty_module_count: modules.clone().filter(|m| m.is_empty()).count(),
            extension_module_count: graph
                .modules
                .keys()
                .filter(|id| matches!(id, ModuleId::Extension(_)))
                .count(),
            shared_entity_count,
            shared_importer_count: modules.filter(|m| m.imports_shared).count(),
            vendor_gather_count: graph.vendor_gathers.len(),
            collision_count: graph.collisions.len() + graph.module_collisions.len(),
            shared_per_thousand,
        }
    }

    /// True when the run had no collisions of either kind.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.collision_count == 0
    }
}

impl fmt::Display for PlanMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entities in {} modules ({} empty, {} extensions), {} shared, {} collisions",
            self.entity_count,
            self.module_count,
            self.empty_module_count,
            self.extension_module_count,
            self.shared_entity_count,
            self.collision_count
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
