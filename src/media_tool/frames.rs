//! Parses `ffprobe -show_frames -read_intervals ...` JSON output into the
//! per-frame facts the cut engine's GOP scan needs: picture type, key-frame
//! flag, presentation timestamp, and packet position (the last two are
//! compared to detect open GOPs, §4.3 step 3).

use serde_json::Value;

use crate::error::{ArchiverError, ArchiverResult};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub pict_type: String,
    pub key_frame: bool,
    pub pts: i64,
    pub pts_time: f64,
    pub pkt_pos: i64,
    pub interlaced_frame: bool,
    pub top_field_first: bool,
}

impl FrameInfo {
    pub fn is_i_frame(&self) -> bool {
        self.pict_type == "I" && self.key_frame
    }
}

pub fn parse_frames_json(raw: &str) -> ArchiverResult<Vec<FrameInfo>> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|err| ArchiverError::Preflight(format!("could not parse ffprobe frame output: {err}")))?;
    let frames = root
        .get("frames")
        .and_then(Value::as_array)
        .ok_or_else(|| ArchiverError::Preflight("ffprobe frame output missing 'frames' array".to_string()))?;

    frames
        .iter()
        .map(|frame| {
            Ok(FrameInfo {
                pict_type: frame.get("pict_type").and_then(Value::as_str).unwrap_or("?").to_string(),
                key_frame: frame.get("key_frame").and_then(Value::as_u64).unwrap_or(0) == 1,
                pts: frame.get("pts").and_then(as_i64).unwrap_or(0),
                pts_time: frame
                    .get("pts_time")
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse::<f64>().ok())
                    .unwrap_or(0.0),
                pkt_pos: frame
                    .get("pkt_pos")
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(0),
                interlaced_frame: frame.get("interlaced_frame").and_then(Value::as_u64).unwrap_or(0) == 1,
                top_field_first: frame.get("top_field_first").and_then(Value::as_u64).unwrap_or(0) == 1,
            })
        })
        .collect()
}

fn as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Open-GOP detection (§4.3 step 3): a B-frame whose packet position places
/// it *after* a neighbouring I-frame, but whose PTS places it *before* that
/// I-frame, means the B-frame references the next GOP — an open GOP.
/// Grounded in the legacy probe's ordering-mismatch check.
pub fn has_open_gop(frames: &[FrameInfo]) -> bool {
    let Some(i_frame) = frames.iter().find(|f| f.is_i_frame()) else {
        return false;
    };
    frames.iter().any(|f| {
        f.pict_type == "B" && f.pkt_pos > i_frame.pkt_pos && f.pts < i_frame.pts
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"frames": [
        {"pict_type": "I", "key_frame": 1, "pts": 0, "pts_time": "0.000000", "pkt_pos": "0"},
        {"pict_type": "B", "key_frame": 0, "pts": -1, "pts_time": "-0.040000", "pkt_pos": "9000"}
    ]}"#;

    #[test]
    fn parses_frames_and_flags_open_gop() {
        let frames = parse_frames_json(SAMPLE).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_i_frame());
        assert!(has_open_gop(&frames));
    }

    #[test]
    fn closed_gop_is_not_flagged() {
        let sample = SAMPLE.replace("\"pts\": -1", "\"pts\": 5");
        let frames = parse_frames_json(&sample).unwrap();
        assert!(!has_open_gop(&frames));
    }
}
