//! Telemetry snapshot decoding and WiFi signal quality derivation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TransportError;

/// Robot self-report, replaced wholesale on each successful poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// Obstacle distance in centimetres.
    #[serde(deserialize_with = "distance_cm")]
    pub distance: f64,
    /// `true` when the left IR sensor sees a clear path.
    #[serde(deserialize_with = "ir_flag")]
    pub ir_left: bool,
    #[serde(deserialize_with = "ir_flag")]
    pub ir_right: bool,
    pub movement: String,
    /// Percent of full speed, clamped to `0..=100`.
    #[serde(deserialize_with = "speed_percent")]
    pub speed: u8,
    /// WiFi RSSI in dBm.
    #[serde(deserialize_with = "rounded_dbm")]
    pub wifi_strength: i32,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            distance: 0.0,
            ir_left: true,
            ir_right: true,
            movement: "🛑 Stopped".to_string(),
            speed: 0,
            wifi_strength: -65,
        }
    }
}

impl TelemetrySnapshot {
    pub fn from_json(body: &str) -> Result<Self, TransportError> {
        serde_json::from_str(body).map_err(|err| TransportError::Malformed(err.to_string().into()))
    }

    #[must_use]
    pub fn signal(&self) -> SignalQuality {
        SignalQuality::from_dbm(self.wifi_strength)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(f64),
}

fn ir_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(value) => Ok(value),
        RawFlag::Number(value) if value == 0.0 => Ok(false),
        RawFlag::Number(value) if value == 1.0 => Ok(true),
        RawFlag::Number(value) => Err(serde::de::Error::custom(format!(
            "IR flag must be 0 or 1, got {value}"
        ))),
    }
}

fn distance_cm<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("distance must be finite"));
    }
    Ok(value.max(0.0))
}

fn speed_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

fn rounded_dbm<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLabel {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl SignalLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SignalLabel::Excellent => "Excellent",
            SignalLabel::Good => "Good",
            SignalLabel::Fair => "Fair",
            SignalLabel::Poor => "Poor",
            SignalLabel::VeryPoor => "Very Poor",
        }
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only 0-100 scale derived linearly from -90..-30 dBm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalQuality {
    pub percent: f64,
}

impl SignalQuality {
    const FLOOR_DBM: f64 = -90.0;
    const SPAN_DBM: f64 = 60.0;

    #[must_use]
    pub fn from_dbm(dbm: i32) -> Self {
        let percent = ((f64::from(dbm) - Self::FLOOR_DBM) * (100.0 / Self::SPAN_DBM)).clamp(0.0, 100.0);
        Self { percent }
    }

    #[must_use]
    pub fn label(self) -> SignalLabel {
        let q = self.percent;
        if q > 80.0 {
            SignalLabel::Excellent
        } else if q >= 60.0 {
            SignalLabel::Good
        } else if q >= 40.0 {
            SignalLabel::Fair
        } else if q > 20.0 {
            SignalLabel::Poor
        } else {
            SignalLabel::VeryPoor
        }
    }

    /// Lit bars on a four-bar meter.
    #[must_use]
    pub fn bars(self) -> u8 {
        [20.0, 40.0, 60.0, 80.0]
            .iter()
            .filter(|threshold| self.percent > **threshold)
            .count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_numeric_ir_flags_and_camel_case_fields() {
        let snapshot = TelemetrySnapshot::from_json(
            r#"{"distance":12.5,"irLeft":1,"irRight":0,"movement":"➡️ Turning","speed":40,"wifiStrength":-55}"#,
        )
        .expect("decode telemetry");
        assert_eq!(
            snapshot,
            TelemetrySnapshot {
                distance: 12.5,
                ir_left: true,
                ir_right: false,
                movement: "➡️ Turning".to_string(),
                speed: 40,
                wifi_strength: -55,
            }
        );
    }

    #[test]
    fn rejects_missing_fields_and_bad_flags() {
        let missing = TelemetrySnapshot::from_json(r#"{"distance":1.0}"#);
        assert!(matches!(missing, Err(TransportError::Malformed(_))));
        let bad_flag = TelemetrySnapshot::from_json(
            r#"{"distance":1,"irLeft":2,"irRight":0,"movement":"x","speed":1,"wifiStrength":-40}"#,
        );
        assert!(matches!(bad_flag, Err(TransportError::Malformed(_))));
        assert!(matches!(
            TelemetrySnapshot::from_json("not json"),
            Err(TransportError::Malformed(_))
        ));
    }

    #[test]
    fn clamps_speed_and_distance() {
        let snapshot = TelemetrySnapshot::from_json(
            r#"{"distance":-3,"irLeft":true,"irRight":false,"movement":"","speed":140.4,"wifiStrength":-70.6}"#,
        )
        .expect("decode telemetry");
        assert_eq!(snapshot.distance, 0.0);
        assert_eq!(snapshot.speed, 100);
        assert_eq!(snapshot.wifi_strength, -71);
    }

    #[test]
    fn turning_sample_is_fair() {
        let quality = SignalQuality::from_dbm(-55);
        assert!((quality.percent - 58.333).abs() < 0.01);
        assert_eq!(quality.label(), SignalLabel::Fair);
        assert_eq!(quality.bars(), 2);
    }

    #[test]
    fn label_boundaries() {
        let label = |percent: f64| SignalQuality { percent }.label();
        assert_eq!(label(80.5), SignalLabel::Excellent);
        assert_eq!(label(80.0), SignalLabel::Good);
        assert_eq!(label(60.0), SignalLabel::Good);
        assert_eq!(label(40.0), SignalLabel::Fair);
        assert_eq!(label(20.5), SignalLabel::Poor);
        assert_eq!(label(20.0), SignalLabel::VeryPoor);
        assert_eq!(label(0.0), SignalLabel::VeryPoor);
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(SignalQuality::from_dbm(-20).percent, 100.0);
        assert_eq!(SignalQuality::from_dbm(-120).percent, 0.0);
        assert_eq!(SignalQuality::from_dbm(-30).bars(), 4);
    }
}
