//! One-way, idempotent migration of the legacy edit-list blob shape.
//!
//! The legacy format (per `original_source/video_cutter.py`) stored a flat
//! `"cuts"` array of `[mark_in, mark_out, clip_name]` tuples with no
//! project separation. Once a record round-trips through [`super::store`]
//! it is written back in the current `{global_cuts, project_cuts}` shape,
//! so this no longer matches — repeated migration attempts are no-ops.

use serde_json::Value;

use crate::domain::{EditCut, EditList};

pub fn migrate_legacy_blob(raw: &Value) -> Option<EditList> {
    let cuts = raw.get("cuts")?.as_array()?;
    let mut global_cuts = Vec::with_capacity(cuts.len());
    for cut in cuts {
        let tuple = cut.as_array()?;
        let mark_in = tuple.first()?.as_u64()?;
        let mark_out = tuple.get(1)?.as_u64()?;
        let clip_name = tuple.get(2).and_then(Value::as_str).unwrap_or("").to_string();
        global_cuts.push(EditCut { mark_in_frame: mark_in, mark_out_frame: mark_out, clip_name });
    }
    Some(EditList { global_cuts, project_cuts: Default::default() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_legacy_tuple_shape() {
        let raw = json!({"cuts": [[0, 100, "intro"], [100, 200, "outro"]]});
        let list = migrate_legacy_blob(&raw).unwrap();
        assert_eq!(list.global_cuts.len(), 2);
        assert_eq!(list.global_cuts[0].clip_name, "intro");
        assert!(list.project_cuts.is_empty());
    }

    #[test]
    fn current_shape_does_not_match_legacy_detection() {
        let raw = json!({"global_cuts": [], "project_cuts": {}});
        assert!(migrate_legacy_blob(&raw).is_none());
    }
}
