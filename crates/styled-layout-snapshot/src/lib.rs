//! Serializable snapshots of a computed [`TextLayout`] for golden tests and
//! debugging previews.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use core::fmt;

use serde::{Deserialize, Serialize};
use styled_layout::{LayoutError, Line, Rect, RunMetrics, StyleRun, TextLayout};

/// Bumped whenever the snapshot shape changes.
pub const SNAPSHOT_SCHEMA_VERSION: u8 = 1;

/// Error raised while capturing or decoding a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    Layout(LayoutError),
    Json(serde_json::Error),
    SchemaVersion { found: u8, expected: u8 },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "layout error: {}", err),
            Self::Json(err) => write!(f, "json error: {}", err),
            Self::SchemaVersion { found, expected } => write!(
                f,
                "unsupported snapshot schema: version={} [expected={}]",
                found, expected
            ),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::SchemaVersion { .. } => None,
        }
    }
}

impl From<LayoutError> for SnapshotError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectSnapshot {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<Rect> for RectSnapshot {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub start: usize,
    pub length: usize,
    pub width: i32,
    pub height: i32,
    pub baseline: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub styled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub tab: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub line_break: bool,
    /// Per-glyph advance when the run carries fixed glyph metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph_width: Option<i32>,
}

impl From<&StyleRun> for RunSnapshot {
    fn from(run: &StyleRun) -> Self {
        let glyph_width = match run.metrics {
            RunMetrics::FixedGlyph { width, .. } => Some(width),
            RunMetrics::Measured { .. } => None,
        };
        Self {
            start: run.start,
            length: run.length,
            width: run.width,
            height: run.height,
            baseline: run.baseline,
            styled: run.style.is_some(),
            tab: run.tab,
            line_break: run.line_break,
            glyph_width,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub start: usize,
    pub end: usize,
    pub y: i32,
    pub width: i32,
    pub ascent: i32,
    pub descent: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub soft_wrapped: bool,
    pub runs: Vec<RunSnapshot>,
}

impl From<&Line> for LineSnapshot {
    fn from(line: &Line) -> Self {
        Self {
            start: line.start,
            end: line.end,
            y: line.y,
            width: line.width,
            ascent: line.ascent,
            descent: line.descent,
            soft_wrapped: line.is_soft_wrapped(),
            runs: line.runs.iter().map(RunSnapshot::from).collect(),
        }
    }
}

/// Lines, runs, and bounds of a layout at one point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub version: u8,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_width: Option<i32>,
    pub bounds: RectSnapshot,
    pub line_offsets: Vec<usize>,
    pub lines: Vec<LineSnapshot>,
}

impl LayoutSnapshot {
    /// Lay out `layout` if needed and record the result.
    pub fn capture(layout: &mut TextLayout) -> Result<Self, SnapshotError> {
        let text = layout.get_text()?.to_owned();
        let wrap_width = layout.get_width()?;
        let bounds = layout.get_bounds()?.into();
        let lines = layout.line_layout()?;
        log::trace!("snapshot of {} lines", lines.line_count());
        Ok(Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            text,
            wrap_width,
            bounds,
            line_offsets: lines.offsets(),
            lines: lines.lines.iter().map(LineSnapshot::from).collect(),
        })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a snapshot, rejecting other schema versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::SchemaVersion {
                found: snapshot.version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Text of each line, break characters included.
    pub fn line_texts(&self) -> Vec<String> {
        let chars: Vec<char> = self.text.chars().collect();
        self.lines
            .iter()
            .map(|line| {
                let end = line.end.min(chars.len());
                chars[line.start.min(end)..end].iter().collect()
            })
            .collect()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use styled_layout::{FixedAdvanceMeasurer, GlyphMetrics, LayoutConfig, TextStyle};

    fn layout(text: &str, cfg: LayoutConfig) -> TextLayout {
        let mut layout = TextLayout::with_config(Arc::new(FixedAdvanceMeasurer::new()), cfg)
            .expect("config should be valid");
        layout.set_text(text).expect("text should set");
        layout
    }

    #[test]
    fn capture_records_lines_and_offsets() {
        let mut layout = layout("ab\ncd", LayoutConfig::default());
        let snapshot = LayoutSnapshot::capture(&mut layout).expect("capture");

        assert_eq!(snapshot.version, SNAPSHOT_SCHEMA_VERSION);
        assert_eq!(snapshot.line_offsets, vec![0, 3, 5]);
        assert_eq!(snapshot.line_texts(), vec!["ab\n", "cd"]);
        assert_eq!(snapshot.bounds.height, 20);
        assert!(snapshot.lines[0].runs.iter().any(|run| run.line_break));
        assert_eq!(snapshot.lines[1].y, 10);
    }

    #[test]
    fn soft_wraps_and_fixed_glyphs_are_visible() {
        let mut layout = layout("hello world", LayoutConfig::for_width(60));
        layout
            .set_style(
                Some(TextStyle::new().with_metrics(GlyphMetrics::new(9, 3, 12))),
                0,
                0,
            )
            .expect("style should apply");
        let snapshot = LayoutSnapshot::capture(&mut layout).expect("capture");

        assert_eq!(snapshot.wrap_width, Some(60));
        assert!(snapshot.lines[0].soft_wrapped);
        let first = &snapshot.lines[0].runs[0];
        assert_eq!((first.start, first.length), (0, 1));
        assert_eq!(first.glyph_width, Some(12));
        assert!(first.styled);
    }

    #[test]
    fn json_round_trip_and_version_gate() {
        let mut layout = layout("a\tb", LayoutConfig::default());
        let snapshot = LayoutSnapshot::capture(&mut layout).expect("capture");
        let json = snapshot.to_json().expect("encode");
        assert!(json.contains("\"tab\":true"));
        assert_eq!(LayoutSnapshot::from_json(&json).expect("decode"), snapshot);

        let stale = json.replacen("\"version\":1", "\"version\":9", 1);
        match LayoutSnapshot::from_json(&stale) {
            Err(SnapshotError::SchemaVersion { found, expected }) => {
                assert_eq!((found, expected), (9, SNAPSHOT_SCHEMA_VERSION));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn disposed_layout_cannot_be_captured() {
        let mut layout = layout("x", LayoutConfig::default());
        layout.dispose();
        assert!(matches!(
            LayoutSnapshot::capture(&mut layout),
            Err(SnapshotError::Layout(LayoutError::Disposed))
        ));
    }
}
