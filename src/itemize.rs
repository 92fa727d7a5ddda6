//! Splitting text into style-homogeneous runs and measuring them.

use std::sync::Arc;

use crate::measure::{TextExtent, TextMeasurer};
use crate::style::{Font, TextStyle};
use crate::style_table::StyleTable;

/// Placement result of a run, fixed once when the run is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMetrics {
    /// Extent reported by the text measurer.
    Measured {
        width: i32,
        height: i32,
        baseline: i32,
    },
    /// Explicit per-glyph metrics from the run's style; no glyphs are painted.
    FixedGlyph {
        width: i32,
        ascent: i32,
        descent: i32,
    },
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::Measured {
            width: 0,
            height: 0,
            baseline: 0,
        }
    }
}

/// One itemization-atomic, style-homogeneous span of text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleRun {
    pub start: usize,
    pub length: usize,
    pub style: Option<Arc<TextStyle>>,
    pub metrics: RunMetrics,
    /// Advance of the run on its line. Tabs and breaks override the measured width.
    pub width: i32,
    pub height: i32,
    pub baseline: i32,
    /// The run ends its line.
    pub line_break: bool,
    /// The line ends here because of wrapping, not a hard break.
    pub soft_break: bool,
    pub tab: bool,
}

impl StyleRun {
    fn new(start: usize, length: usize, style: Option<Arc<TextStyle>>) -> Self {
        Self {
            start,
            length,
            style,
            ..Self::default()
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn style(&self) -> Option<&TextStyle> {
        self.style.as_deref()
    }

    /// Per-glyph advance when the run uses fixed glyph metrics.
    pub fn glyph_width(&self) -> Option<i32> {
        match self.metrics {
            RunMetrics::FixedGlyph { width, .. } => Some(width),
            RunMetrics::Measured { .. } => None,
        }
    }

    pub fn is_fixed_glyph(&self) -> bool {
        self.glyph_width().is_some()
    }

    /// A break run that came from the text (CR, LF, or CR LF).
    pub fn is_hard_break(&self) -> bool {
        self.line_break && !self.soft_break
    }
}

/// Split `chars` at every tab, CR, and LF, then at every style boundary.
///
/// Always ends with a zero-length sentinel run at the text length. Empty text
/// yields one empty run plus the sentinel.
pub(crate) fn itemize(chars: &[char], table: &StyleTable) -> Vec<StyleRun> {
    let len = chars.len();
    let bindings = table.bindings();
    if len == 0 {
        let style = bindings.first().and_then(|binding| binding.style.clone());
        return vec![StyleRun::new(0, 0, style), StyleRun::new(0, 0, None)];
    }

    let mut items = Vec::with_capacity(8);
    let mut start = 0;
    for (i, ch) in chars.iter().enumerate() {
        if is_control(*ch) {
            if i != start {
                items.push(start);
            }
            items.push(i);
            start = i + 1;
        }
    }
    if start < len {
        items.push(start);
    }
    items.push(len);

    let mut runs = Vec::with_capacity(items.len() + bindings.len());
    let mut item_index = 0;
    let mut style_index = 0;
    let mut start = 0;
    while start < len {
        let item_limit = items.get(item_index + 1).copied().unwrap_or(len);
        let style_limit = bindings
            .get(style_index + 1)
            .map_or(len, |binding| binding.start);
        let end = item_limit.min(style_limit);
        let style = bindings
            .get(style_index)
            .and_then(|binding| binding.style.clone());
        let mut run = StyleRun::new(start, end - start, style);
        run.tab = run.length == 1 && chars[start] == '\t';
        runs.push(run);

        if style_limit <= item_limit {
            style_index += 1;
        }
        if item_limit <= style_limit {
            item_index += 1;
        }
        start = end;
    }
    runs.push(StyleRun::new(len, 0, None));
    runs
}

fn is_control(ch: char) -> bool {
    matches!(ch, '\t' | '\r' | '\n')
}

/// Measures runs and spans of the layout text with the right font.
#[derive(Clone, Copy)]
pub(crate) struct Placer<'a> {
    pub(crate) chars: &'a [char],
    pub(crate) font: Option<&'a Font>,
    pub(crate) measurer: &'a dyn TextMeasurer,
}

impl<'a> Placer<'a> {
    /// Style font, else the layout font, else the measurer's default.
    pub(crate) fn font_for(&self, style: Option<&TextStyle>) -> Font {
        style
            .and_then(|style| style.font.as_ref())
            .or(self.font)
            .cloned()
            .unwrap_or_else(|| self.measurer.default_font())
    }

    /// Measure the chars in `[start, end)` as styled by `style`.
    pub(crate) fn measure(&self, start: usize, end: usize, style: Option<&TextStyle>) -> TextExtent {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        let text: String = self.chars[start..end].iter().collect();
        self.measurer.measure_text(&text, &self.font_for(style))
    }

    /// Fill in metrics, width, height, and baseline of `run`.
    pub(crate) fn place(&self, run: &mut StyleRun) {
        if run.length == 0 {
            return;
        }
        if let Some(glyph) = run.style().and_then(|style| style.metrics) {
            let count = run.length as i32;
            run.metrics = RunMetrics::FixedGlyph {
                width: glyph.width,
                ascent: glyph.ascent,
                descent: glyph.descent,
            };
            run.width = glyph.width * count;
            run.baseline = glyph.ascent;
            run.height = glyph.ascent + glyph.descent;
            return;
        }
        let extent = self.measure(run.start, run.end(), run.style());
        run.metrics = RunMetrics::Measured {
            width: extent.width,
            height: extent.height,
            baseline: extent.baseline,
        };
        run.width = extent.width;
        run.height = extent.height;
        run.baseline = extent.baseline;
    }
}
