//! `EncodingInfo` and the small value types it is built from.
//!
//! Frame rates are kept as exact rationals end to end (§9 "floating-point
//! time arithmetic") rather than pre-rounded to `f64`, because the cut
//! engine's frame-accuracy guarantee depends on matching the encoder's PTS
//! grid exactly (`30000/1001` must stay `30000/1001`, not `29.97`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ArchiverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub num: u64,
    pub den: u64,
}

impl Rational {
    pub const fn new(num: u64, den: u64) -> Self {
        Self { num, den }
    }

    pub fn as_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    pub fn frame_time(self) -> f64 {
        self.den as f64 / self.num as f64
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// The accepted frame rates from §6.4: `{25, 30000/1001, 50, 60000/1001, 30}`.
pub const ACCEPTED_FRAME_RATES: [Rational; 5] = [
    Rational::new(25, 1),
    Rational::new(30000, 1001),
    Rational::new(50, 1),
    Rational::new(60000, 1001),
    Rational::new(30, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Progressive,
    Interlaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOrder {
    Tff,
    Bff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Standard {
    Pal,
    Ntsc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "4:3")]
    FourThree,
    #[serde(rename = "16:9")]
    SixteenNine,
}

/// `standard = PAL` iff `frame_rate ∈ {25, 50}`; `NTSC` iff
/// `frame_rate ∈ {30000/1001, 60000/1001, 30}`; otherwise the rate is not
/// one of the accepted ones at all.
fn standard_for_frame_rate(frame_rate: Rational) -> Option<Standard> {
    const PAL_RATES: [Rational; 2] = [Rational::new(25, 1), Rational::new(50, 1)];
    const NTSC_RATES: [Rational; 3] = [
        Rational::new(30000, 1001),
        Rational::new(60000, 1001),
        Rational::new(30, 1),
    ];
    if PAL_RATES.contains(&frame_rate) {
        Some(Standard::Pal)
    } else if NTSC_RATES.contains(&frame_rate) {
        Some(Standard::Ntsc)
    } else {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingInfo {
    pub width: u32,
    pub height: u32,
    pub frame_rate: Rational,
    pub frame_count: u64,
    pub duration: f64,
    pub codec: String,
    pub pixel_format: String,
    pub scan_type: ScanType,
    pub scan_order: Option<ScanOrder>,
    pub standard: Standard,
    pub bitrate: u64,
    pub aspect_ratio: AspectRatio,
    pub par: f64,
    pub dar: f64,
    pub audio_tracks: u32,
    pub audio_codec: Option<String>,
    pub audio_channels: Option<u32>,
    pub audio_sample_rate: Option<u32>,
    pub audio_bitrate: Option<u64>,
    /// Empty iff the probe result is valid; a non-empty value always wins
    /// over the rest of the struct.
    pub error: String,
    /// Probe fields the original tool surfaces (scan-type quirks, codec
    /// sub-variants) that this spec does not name explicitly but a real
    /// probe wrapper should not discard. Carried opaquely rather than
    /// modelled field-by-field.
    #[serde(default)]
    pub passthrough: BTreeMap<String, String>,
}

impl EncodingInfo {
    /// Enforces the §3 invariants at construction, returning a `Preflight`
    /// error describing the first violation found rather than merely
    /// documenting them.
    pub fn validate(&self) -> Result<(), ArchiverError> {
        if !self.error.is_empty() {
            return Err(ArchiverError::Preflight(self.error.clone()));
        }

        let expected = self.duration * self.frame_rate.as_f64();
        if (self.frame_count as f64) < expected - 1.0 || (self.frame_count as f64) > expected + 1.0
        {
            return Err(ArchiverError::Preflight(format!(
                "frame_count {} outside [{}, {}] for duration {}s at {}",
                self.frame_count,
                expected - 1.0,
                expected + 1.0,
                self.duration,
                self.frame_rate
            )));
        }

        let standard = standard_for_frame_rate(self.frame_rate).ok_or_else(|| {
            ArchiverError::Preflight(format!(
                "frame rate {} is not an accepted video standard",
                self.frame_rate
            ))
        })?;
        if standard != self.standard {
            return Err(ArchiverError::Preflight(format!(
                "frame rate {} implies standard {standard:?}, not {:?}",
                self.frame_rate, self.standard
            )));
        }

        match (self.scan_type, self.scan_order) {
            (ScanType::Interlaced, None) => {
                return Err(ArchiverError::Preflight(
                    "interlaced scan requires a scan order".to_string(),
                ));
            }
            (ScanType::Progressive, Some(_)) => {
                return Err(ArchiverError::Preflight(
                    "progressive scan must not carry a scan order".to_string(),
                ));
            }
            _ => {}
        }

        Ok(())
    }

    pub fn is_accepted_frame_rate(&self) -> bool {
        ACCEPTED_FRAME_RATES.contains(&self.frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_pal_info() -> EncodingInfo {
        EncodingInfo {
            width: 720,
            height: 576,
            frame_rate: Rational::new(25, 1),
            frame_count: 250,
            duration: 10.0,
            codec: "h264".into(),
            pixel_format: "yuv420p".into(),
            scan_type: ScanType::Progressive,
            scan_order: None,
            standard: Standard::Pal,
            bitrate: 4_000_000,
            aspect_ratio: AspectRatio::FourThree,
            par: 1.0,
            dar: 4.0 / 3.0,
            audio_tracks: 1,
            audio_codec: Some("ac3".into()),
            audio_channels: Some(2),
            audio_sample_rate: Some(48_000),
            audio_bitrate: Some(192_000),
            error: String::new(),
            passthrough: BTreeMap::new(),
        }
    }

    #[test]
    fn valid_info_passes() {
        assert!(valid_pal_info().validate().is_ok());
    }

    #[test]
    fn mismatched_standard_is_rejected() {
        let mut info = valid_pal_info();
        info.standard = Standard::Ntsc;
        assert!(info.validate().is_err());
    }

    #[test]
    fn unsupported_frame_rate_is_rejected() {
        let mut info = valid_pal_info();
        info.frame_rate = Rational::new(24, 1);
        assert!(info.validate().is_err());
    }

    #[test]
    fn interlaced_without_scan_order_is_rejected() {
        let mut info = valid_pal_info();
        info.scan_type = ScanType::Interlaced;
        assert!(info.validate().is_err());
    }

    #[test]
    fn frame_count_outside_tolerance_is_rejected() {
        let mut info = valid_pal_info();
        info.frame_count = 100;
        assert!(info.validate().is_err());
    }
}
