//! Text and JSON rendering for one-shot commands.

use std::fmt::Write as _;

use robodash::{RobotEndpoint, TelemetrySnapshot};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport<'a> {
    pub endpoint: &'a str,
    pub telemetry: &'a TelemetrySnapshot,
    pub signal: SignalReport,
}

#[derive(Debug, Serialize)]
pub struct SignalReport {
    pub percent: f64,
    pub label: &'static str,
    pub bars: u8,
}

impl<'a> StatusReport<'a> {
    pub fn new(endpoint: &'a RobotEndpoint, telemetry: &'a TelemetrySnapshot) -> Self {
        let signal = telemetry.signal();
        Self {
            endpoint: endpoint.base_url(),
            telemetry,
            signal: SignalReport {
                percent: (signal.percent * 10.0).round() / 10.0,
                label: signal.label().as_str(),
                bars: signal.bars(),
            },
        }
    }
}

fn ir(clear: bool) -> &'static str {
    if clear {
        "clear"
    } else {
        "blocked"
    }
}

pub fn format_status(report: &StatusReport<'_>) -> String {
    let telemetry = report.telemetry;
    let signal = &report.signal;
    let mut out = String::new();
    let _ = writeln!(out, "robot      {}", report.endpoint);
    let _ = writeln!(out, "distance   {:.1} cm", telemetry.distance);
    let _ = writeln!(out, "ir left    {}", ir(telemetry.ir_left));
    let _ = writeln!(out, "ir right   {}", ir(telemetry.ir_right));
    let _ = writeln!(out, "movement   {}", telemetry.movement);
    let _ = writeln!(out, "speed      {}%", telemetry.speed);
    let _ = writeln!(
        out,
        "wifi       {} dBm ({:.0}% {}, {}/4 bars)",
        telemetry.wifi_strength, signal.percent, signal.label, signal.bars
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn turning() -> TelemetrySnapshot {
        TelemetrySnapshot {
            distance: 12.5,
            ir_left: true,
            ir_right: false,
            movement: "Turning".to_string(),
            speed: 40,
            wifi_strength: -55,
        }
    }

    #[test]
    fn status_text_lists_every_reading() {
        let endpoint = RobotEndpoint::parse("http://10.0.0.7/").expect("endpoint");
        let telemetry = turning();
        let text = format_status(&StatusReport::new(&endpoint, &telemetry));
        expect![[r#"
            robot      http://10.0.0.7
            distance   12.5 cm
            ir left    clear
            ir right   blocked
            movement   Turning
            speed      40%
            wifi       -55 dBm (58% Fair, 2/4 bars)
        "#]]
        .assert_eq(&text);
    }

    #[test]
    fn status_json_keeps_wire_field_names() {
        let endpoint = RobotEndpoint::default();
        let telemetry = TelemetrySnapshot::default();
        let json = serde_json::to_value(StatusReport::new(&endpoint, &telemetry)).expect("json");
        assert_eq!(json["endpoint"], "http://192.168.1.50");
        assert_eq!(json["telemetry"]["wifiStrength"], -65);
        assert_eq!(json["telemetry"]["irLeft"], true);
        assert_eq!(json["signal"]["label"], "Fair");
        assert_eq!(json["signal"]["bars"], 2);
    }
}
