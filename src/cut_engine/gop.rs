//! GOP boundary scanning (§4.3 step 3): two separate fixed-size-window
//! passes locate the nearest preceding and following I-frame around a mark
//! point — scan backwards from `t_mark` in 5-second steps (≤ 10 windows),
//! then scan forwards from whatever preceding I-frame that found (≤ 10
//! windows) — bailing out with `OpenGop` the moment a B-frame's packet
//! position and PTS disagree about which GOP it belongs to.

use std::path::Path;

use crate::error::{ArchiverError, ArchiverResult};
use crate::media_tool::{has_open_gop, FrameInfo, MediaTool};

/// Fixed 5-second scan window, repeated up to 10 times per direction before
/// giving up and using whatever boundary was found, per §4.3 step 3.
const SCAN_WINDOW_S: f64 = 5.0;
const MAX_SCAN_WINDOWS: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct GopBoundaries {
    pub preceding_i_time: f64,
    pub following_i_time: f64,
}

pub fn locate_gop_boundaries(tool: &dyn MediaTool, path: &Path, t_mark: f64) -> ArchiverResult<GopBoundaries> {
    let preceding = scan_backward(tool, path, t_mark)?;
    let forward_start = preceding.unwrap_or(t_mark).max(0.0);
    let following = scan_forward(tool, path, forward_start, t_mark)?;

    Ok(GopBoundaries {
        preceding_i_time: preceding.unwrap_or(0.0),
        following_i_time: following.unwrap_or(t_mark),
    })
}

/// Steps a fixed 5-second window backwards from `t_mark`, one window per
/// attempt, looking for the nearest I-frame at or before `t_mark`. Gives up
/// early the moment a window has no I-frame at all, since earlier windows
/// are no more likely to find one.
fn scan_backward(tool: &dyn MediaTool, path: &Path, t_mark: f64) -> ArchiverResult<Option<f64>> {
    let mut window_start = (t_mark - SCAN_WINDOW_S).max(0.0);

    for _ in 0..MAX_SCAN_WINDOWS {
        let frames = tool.probe_frames(path, window_start, SCAN_WINDOW_S)?;
        if has_open_gop(&frames) {
            return Err(ArchiverError::OpenGop);
        }
        if !frames.iter().any(FrameInfo::is_i_frame) {
            break;
        }
        if let Some(t) = nearest_i_frame_time(&frames, |t| t <= t_mark, f64::max) {
            return Ok(Some(t));
        }
        if window_start <= 0.0 {
            break;
        }
        window_start = (window_start - SCAN_WINDOW_S).max(0.0);
    }

    Ok(None)
}

/// Steps a fixed 5-second window forwards from `start`, one window per
/// attempt, looking for the nearest I-frame strictly after `t_mark`.
fn scan_forward(tool: &dyn MediaTool, path: &Path, start: f64, t_mark: f64) -> ArchiverResult<Option<f64>> {
    let mut window_start = start;

    for _ in 0..MAX_SCAN_WINDOWS {
        let frames = tool.probe_frames(path, window_start, SCAN_WINDOW_S)?;
        if has_open_gop(&frames) {
            return Err(ArchiverError::OpenGop);
        }
        if !frames.iter().any(FrameInfo::is_i_frame) {
            break;
        }
        if let Some(t) = nearest_i_frame_time(&frames, |t| t > t_mark, f64::min) {
            return Ok(Some(t));
        }
        window_start += SCAN_WINDOW_S;
    }

    Ok(None)
}

fn nearest_i_frame_time(frames: &[FrameInfo], keep: impl Fn(f64) -> bool, combine: impl Fn(f64, f64) -> f64) -> Option<f64> {
    frames
        .iter()
        .filter(|f| f.is_i_frame() && keep(f.pts_time))
        .map(|f| f.pts_time)
        .fold(None, |acc, t| Some(acc.map_or(t, |a| combine(a, t))))
}

/// Every probed frame in a window is `I` and `key_frame == 1` — the
/// all-I-input shortcut condition (§4.3 step 4).
pub fn all_frames_are_i(frames: &[FrameInfo]) -> bool {
    !frames.is_empty() && frames.iter().all(FrameInfo::is_i_frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pict_type: &str, key_frame: bool, pts: i64, pts_time: f64, pkt_pos: i64) -> FrameInfo {
        FrameInfo {
            pict_type: pict_type.to_string(),
            key_frame,
            pts,
            pts_time,
            pkt_pos,
            interlaced_frame: false,
            top_field_first: false,
        }
    }

    #[test]
    fn all_i_shortcut_requires_every_frame_to_be_i() {
        let all_i = vec![frame("I", true, 0, 0.0, 0), frame("I", true, 1, 0.04, 100)];
        assert!(all_frames_are_i(&all_i));

        let mixed = vec![frame("I", true, 0, 0.0, 0), frame("P", false, 1, 0.04, 100)];
        assert!(!all_frames_are_i(&mixed));
    }
}
