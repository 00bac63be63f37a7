//! Parses `ffprobe -show_format -show_streams -of json` output into
//! `EncodingInfo`. Grounded in `ffui_core::ffprobe`'s duration extraction,
//! generalized to the full field set §3 requires.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::{AspectRatio, EncodingInfo, Rational, ScanOrder, ScanType, Standard};
use crate::error::{ArchiverError, ArchiverResult};

pub fn parse_probe_json(raw: &str) -> ArchiverResult<EncodingInfo> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|err| ArchiverError::Preflight(format!("could not parse ffprobe output: {err}")))?;

    let format = root.get("format").cloned().unwrap_or(Value::Null);
    let streams = root.get("streams").and_then(Value::as_array).cloned().unwrap_or_default();

    let video = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(Value::as_str) == Some("video"))
        .ok_or_else(|| ArchiverError::Preflight("no video stream in probe output".to_string()))?;
    let audio = streams.iter().find(|s| s.get("codec_type").and_then(Value::as_str) == Some("audio"));

    let frame_rate = parse_rational(video.get("r_frame_rate").and_then(Value::as_str).unwrap_or("0/1"))?;
    let width = as_u64(video.get("width")).unwrap_or(0) as u32;
    let height = as_u64(video.get("height")).unwrap_or(0) as u32;

    let duration = format
        .get("duration")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| video.get("duration").and_then(Value::as_str).and_then(|s| s.parse::<f64>().ok()))
        .unwrap_or(0.0);

    let frame_count = video
        .get("nb_frames")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| (duration * frame_rate.as_f64()).round() as u64);

    let field_order = video.get("field_order").and_then(Value::as_str).unwrap_or("progressive");
    let (scan_type, scan_order) = match field_order {
        "tt" | "tb" => (ScanType::Interlaced, Some(ScanOrder::Tff)),
        "bb" | "bt" => (ScanType::Interlaced, Some(ScanOrder::Bff)),
        _ => (ScanType::Progressive, None),
    };

    let standard = match (frame_rate.num, frame_rate.den) {
        (25, 1) | (50, 1) => Standard::Pal,
        (30000, 1001) | (60000, 1001) | (30, 1) => Standard::Ntsc,
        _ => {
            return Err(ArchiverError::Preflight(format!(
                "frame rate {frame_rate} is not an accepted video standard"
            )));
        }
    };

    let dar_str = video.get("display_aspect_ratio").and_then(Value::as_str).unwrap_or("4:3");
    let aspect_ratio = match dar_str {
        "16:9" => AspectRatio::SixteenNine,
        _ => AspectRatio::FourThree,
    };

    let mut passthrough = BTreeMap::new();
    if let Some(scan_type_raw) = video.get("video_scan_type").and_then(Value::as_str) {
        passthrough.insert("video_scan_type".to_string(), scan_type_raw.to_string());
    }
    if let Some(codec_tag) = video.get("codec_tag_string").and_then(Value::as_str) {
        passthrough.insert("ix_codec".to_string(), codec_tag.to_string());
    }

    Ok(EncodingInfo {
        width,
        height,
        frame_rate,
        frame_count,
        duration,
        codec: video.get("codec_name").and_then(Value::as_str).unwrap_or("unknown").to_string(),
        pixel_format: video.get("pix_fmt").and_then(Value::as_str).unwrap_or("unknown").to_string(),
        scan_type,
        scan_order,
        standard,
        bitrate: format
            .get("bit_rate")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0),
        aspect_ratio,
        par: video
            .get("sample_aspect_ratio")
            .and_then(Value::as_str)
            .and_then(parse_ratio_as_f64)
            .unwrap_or(1.0),
        dar: parse_ratio_as_f64(dar_str).unwrap_or(4.0 / 3.0),
        audio_tracks: if audio.is_some() { 1 } else { 0 },
        audio_codec: audio.and_then(|a| a.get("codec_name")).and_then(Value::as_str).map(str::to_string),
        audio_channels: audio.and_then(|a| as_u64(a.get("channels"))).map(|n| n as u32),
        audio_sample_rate: audio
            .and_then(|a| a.get("sample_rate"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u32>().ok()),
        audio_bitrate: audio
            .and_then(|a| a.get("bit_rate"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u64>().ok()),
        error: String::new(),
        passthrough,
    })
}

fn as_u64(value: Option<&Value>) -> Option<u64> {
    value.and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
}

fn parse_rational(raw: &str) -> ArchiverResult<Rational> {
    let (num_str, den_str) = raw
        .split_once('/')
        .ok_or_else(|| ArchiverError::Preflight(format!("malformed frame rate: {raw}")))?;
    let num: u64 = num_str
        .parse()
        .map_err(|_| ArchiverError::Preflight(format!("malformed frame rate numerator: {raw}")))?;
    let den: u64 = den_str
        .parse()
        .map_err(|_| ArchiverError::Preflight(format!("malformed frame rate denominator: {raw}")))?;
    if den == 0 {
        return Err(ArchiverError::Preflight(format!("zero-denominator frame rate: {raw}")));
    }
    Ok(Rational::new(num, den))
}

fn parse_ratio_as_f64(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once([':', '/'])?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}
