//! `EditCut` / `EditList`, the shapes persisted by `EditStore`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ArchiverError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCut {
    pub mark_in_frame: u64,
    pub mark_out_frame: u64,
    pub clip_name: String,
}

impl EditCut {
    /// `0 ≤ mark_in < mark_out ≤ frame_count`.
    pub fn new(
        mark_in_frame: u64,
        mark_out_frame: u64,
        clip_name: impl Into<String>,
        frame_count: u64,
    ) -> Result<Self, ArchiverError> {
        if mark_in_frame >= mark_out_frame {
            return Err(ArchiverError::Preflight(format!(
                "mark_in_frame {mark_in_frame} must be < mark_out_frame {mark_out_frame}"
            )));
        }
        if mark_out_frame > frame_count {
            return Err(ArchiverError::Preflight(format!(
                "mark_out_frame {mark_out_frame} exceeds frame_count {frame_count}"
            )));
        }
        Ok(Self {
            mark_in_frame,
            mark_out_frame,
            clip_name: clip_name.into(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditList {
    pub global_cuts: Vec<EditCut>,
    pub project_cuts: BTreeMap<String, Vec<EditCut>>,
}

impl EditList {
    /// A project override, when present and non-empty, completely shadows
    /// `global_cuts` for that project.
    pub fn effective_cuts(&self, project: &str) -> &[EditCut] {
        if project.is_empty() {
            return &self.global_cuts;
        }
        match self.project_cuts.get(project) {
            Some(cuts) if !cuts.is_empty() => cuts,
            _ => &self.global_cuts,
        }
    }
}
