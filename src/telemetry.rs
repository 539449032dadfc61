//! Diagnostics plumbing: per-cycle packets, field-overlay drawing and
//! rate-limited channel writers.

use core::fmt::{Debug, Display};
use std::time::{Duration, Instant};

use log::debug;

/// One drawing operation on the field overlay.
#[derive(Clone, PartialEq, Debug)]
pub enum CanvasOp {
    Stroke(&'static str),
    StrokeWidth(f64),
    Circle { x: f64, y: f64, radius: f64 },
    FilledCircle { x: f64, y: f64, radius: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Polyline { xs: Vec<f64>, ys: Vec<f64> },
}

/// An ordered list of drawing operations for the field overlay.
#[derive(Clone, Default, Debug)]
pub struct Canvas {
    ops: Vec<CanvasOp>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stroke(&mut self, color: &'static str) -> &mut Self {
        self.ops.push(CanvasOp::Stroke(color));
        self
    }

    pub fn set_stroke_width(&mut self, width: f64) -> &mut Self {
        self.ops.push(CanvasOp::StrokeWidth(width));
        self
    }

    pub fn stroke_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.ops.push(CanvasOp::Circle { x, y, radius });
        self
    }

    pub fn fill_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.ops.push(CanvasOp::FilledCircle { x, y, radius });
        self
    }

    pub fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> &mut Self {
        self.ops.push(CanvasOp::Line { x1, y1, x2, y2 });
        self
    }

    pub fn stroke_polyline(&mut self, xs: Vec<f64>, ys: Vec<f64>) -> &mut Self {
        self.ops.push(CanvasOp::Polyline { xs, ys });
        self
    }

    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }
}

/// The diagnostics gathered over one scheduler cycle: keyed readouts plus
/// the field overlay. One packet per cycle, sent whole.
#[derive(Default, Debug)]
pub struct TelemetryPacket {
    fields: Vec<(String, String)>,
    field_overlay: Canvas,
}

impl TelemetryPacket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Display) {
        self.fields.push((key.into(), value.to_string()));
    }

    pub fn field_overlay(&mut self) -> &mut Canvas {
        &mut self.field_overlay
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn overlay_ops(&self) -> &[CanvasOp] {
        &self.field_overlay.ops
    }
}

/// Where completed packets go. The schedulers send one packet per cycle.
pub trait DiagnosticsSink {
    fn send(&mut self, packet: TelemetryPacket);
}

/// A sink that prints packet fields through the logger and drops the
/// overlay. Good enough off the field; a dashboard sink replaces it there.
#[derive(Default)]
pub struct LogDashboard;

impl LogDashboard {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticsSink for LogDashboard {
    fn send(&mut self, packet: TelemetryPacket) {
        for (key, value) in packet.fields() {
            debug!("{key}: {value}");
        }
    }
}

/// Rate limiter for a high-frequency diagnostics channel: at most one
/// record per period, the rest are dropped.
pub struct DownsampledWriter {
    channel: &'static str,
    max_period: Duration,
    last_write: Option<Instant>,
}

impl DownsampledWriter {
    pub fn new(channel: &'static str, max_period: Duration) -> Self {
        Self {
            channel,
            max_period,
            last_write: None,
        }
    }

    pub fn write(&mut self, record: &dyn Debug) {
        let now = Instant::now();
        let due = match self.last_write {
            Some(last) => now.duration_since(last) >= self.max_period,
            None => true,
        };
        if due {
            self.last_write = Some(now);
            debug!("{}: {:?}", self.channel, record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_keeps_insertion_order() {
        let mut packet = TelemetryPacket::new();
        packet.put("x", 1.5);
        packet.put("y", -2);
        packet.put("heading (deg)", 90.0);
        let keys: Vec<&str> = packet.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["x", "y", "heading (deg)"]);
        assert_eq!(packet.fields()[1].1, "-2");
    }

    #[test]
    fn overlay_records_ops_in_order() {
        let mut packet = TelemetryPacket::new();
        packet
            .field_overlay()
            .set_stroke("#3F51B5")
            .stroke_circle(0.0, 0.0, 9.0)
            .stroke_line(0.0, 0.0, 4.5, 0.0);
        assert_eq!(packet.overlay_ops().len(), 3);
        assert_eq!(packet.overlay_ops()[0], CanvasOp::Stroke("#3F51B5"));
    }

    #[test]
    fn downsampled_writer_drops_rapid_records() {
        let mut writer = DownsampledWriter::new("TEST_CHANNEL", Duration::from_millis(50));
        writer.write(&1);
        let first = writer.last_write;
        assert!(first.is_some());
        writer.write(&2);
        // Second write lands inside the period and is dropped.
        assert_eq!(writer.last_write, first);
    }
}
