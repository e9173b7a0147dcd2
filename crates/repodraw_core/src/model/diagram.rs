//! Diagram cache model and kind registry.
//!
//! # Responsibility
//! - Define the per-repository record holding one cached script per kind.
//! - Map each diagram kind to its Mermaid notation and record accessors
//!   through one closed registry.
//!
//! # Invariants
//! - At most one `DiagramRecord` exists per repository id.
//! - A non-blank script field is authoritative cached content until an
//!   explicit invalidation operation exists (none does today).
//! - Adding a kind requires a new variant plus one `KindSpec`; exhaustive
//!   matches keep every dispatch site honest.

use crate::model::repository::RepoId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Closed set of diagram kinds the cache knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    /// Mermaid `classDiagram` script.
    Class,
    /// Mermaid `sequenceDiagram` script.
    Sequence,
    /// Mermaid `erDiagram` script.
    Erd,
}

impl DiagramKind {
    /// All kinds, in registry order.
    pub const ALL: [DiagramKind; 3] = [DiagramKind::Class, DiagramKind::Sequence, DiagramKind::Erd];

    /// Stable string form used in logs and external payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class_diagram",
            Self::Sequence => "sequence_diagram",
            Self::Erd => "er_diagram",
        }
    }

    /// Parses the stable string form back into a kind.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "class_diagram" => Some(Self::Class),
            "sequence_diagram" => Some(Self::Sequence),
            "er_diagram" => Some(Self::Erd),
            _ => None,
        }
    }

    /// Resolves the registry entry for this kind.
    pub fn spec(self) -> &'static KindSpec {
        match self {
            Self::Class => &CLASS_SPEC,
            Self::Sequence => &SEQUENCE_SPEC,
            Self::Erd => &ERD_SPEC,
        }
    }
}

impl Display for DiagramKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-repository cache record, created lazily on first generation request.
///
/// Script fields start empty and are overwritten exactly once per kind by
/// the orchestrator after a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramRecord {
    /// Owning repository (unique, 1:1).
    pub repository_id: RepoId,
    /// Cached `classDiagram` script.
    pub class_script: Option<String>,
    /// Cached `sequenceDiagram` script.
    pub sequence_script: Option<String>,
    /// Cached `erDiagram` script.
    pub erd_script: Option<String>,
}

impl DiagramRecord {
    /// Creates an empty shell for one repository.
    pub fn new(repository_id: RepoId) -> Self {
        Self {
            repository_id,
            class_script: None,
            sequence_script: None,
            erd_script: None,
        }
    }

    /// Returns the cached script for `kind`, treating blank text as absent.
    pub fn script_for(&self, kind: DiagramKind) -> Option<&str> {
        (kind.spec().field_get)(self).filter(|text| !text.trim().is_empty())
    }

    /// Overwrites the script field for `kind`.
    pub fn set_script(&mut self, kind: DiagramKind, text: impl Into<String>) {
        (kind.spec().field_set)(self, text.into());
    }
}

/// Registry entry binding one kind to its notation and record accessors.
///
/// Accessors are plain function pointers so the orchestrator stays fully
/// kind-agnostic above this registry.
pub struct KindSpec {
    /// Mermaid notation keyword, also used to name the expected output in
    /// the prompt.
    pub notation: &'static str,
    /// Reads the kind's field from a record.
    pub field_get: fn(&DiagramRecord) -> Option<&str>,
    /// Writes the kind's field on a record.
    pub field_set: fn(&mut DiagramRecord, String),
}

static CLASS_SPEC: KindSpec = KindSpec {
    notation: "classDiagram",
    field_get: get_class_script,
    field_set: set_class_script,
};

static SEQUENCE_SPEC: KindSpec = KindSpec {
    notation: "sequenceDiagram",
    field_get: get_sequence_script,
    field_set: set_sequence_script,
};

static ERD_SPEC: KindSpec = KindSpec {
    notation: "erDiagram",
    field_get: get_erd_script,
    field_set: set_erd_script,
};

fn get_class_script(record: &DiagramRecord) -> Option<&str> {
    record.class_script.as_deref()
}

fn set_class_script(record: &mut DiagramRecord, text: String) {
    record.class_script = Some(text);
}

fn get_sequence_script(record: &DiagramRecord) -> Option<&str> {
    record.sequence_script.as_deref()
}

fn set_sequence_script(record: &mut DiagramRecord, text: String) {
    record.sequence_script = Some(text);
}

fn get_erd_script(record: &DiagramRecord) -> Option<&str> {
    record.erd_script.as_deref()
}

fn set_erd_script(record: &mut DiagramRecord, text: String) {
    record.erd_script = Some(text);
}

#[cfg(test)]
mod tests {
    use super::{DiagramKind, DiagramRecord};

    #[test]
    fn registry_round_trips_every_kind() {
        for kind in DiagramKind::ALL {
            let mut record = DiagramRecord::new(1);
            assert!(record.script_for(kind).is_none());

            record.set_script(kind, format!("{} body", kind.spec().notation));
            let stored = record.script_for(kind).expect("script should be stored");
            assert!(stored.starts_with(kind.spec().notation));
        }
    }

    #[test]
    fn setting_one_kind_leaves_other_fields_untouched() {
        let mut record = DiagramRecord::new(7);
        record.set_script(DiagramKind::Sequence, "sequenceDiagram\n    A->>B: hi");

        assert!(record.class_script.is_none());
        assert!(record.erd_script.is_none());
        assert!(record.sequence_script.is_some());
    }

    #[test]
    fn blank_script_counts_as_absent() {
        let mut record = DiagramRecord::new(3);
        record.set_script(DiagramKind::Class, "   \n  ");
        assert!(record.script_for(DiagramKind::Class).is_none());
    }

    #[test]
    fn kind_string_forms_round_trip() {
        for kind in DiagramKind::ALL {
            assert_eq!(DiagramKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DiagramKind::parse("pie_chart"), None);
    }
}
