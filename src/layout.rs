//! The layout object: text, styles, parameters, and the cached line structure.

use core::fmt;
use std::sync::Arc;

use crate::config::{
    validate_line_metric, validate_spacing, validate_tabs, validate_wrap_width, Alignment,
    LayoutConfig, Orientation,
};
use crate::error::LayoutError;
use crate::itemize::Placer;
use crate::line_breaker::{LineBreaker, LineLayout};
use crate::measure::TextMeasurer;
use crate::style::{Font, TextStyle};
use crate::style_table::StyleTable;

static EMPTY_LAYOUT: LineLayout = LineLayout { lines: Vec::new() };

/// Line structure derived from the current text, styles, and parameters.
#[derive(Clone, Debug, Default)]
pub(crate) enum LineCache {
    #[default]
    Dirty,
    Clean(LineLayout),
}

impl LineCache {
    pub(crate) fn is_clean(&self) -> bool {
        matches!(self, Self::Clean(_))
    }

    fn get_or_compute(&mut self, compute: impl FnOnce() -> LineLayout) -> &LineLayout {
        if let Self::Dirty = self {
            *self = Self::Clean(compute());
        }
        match self {
            Self::Clean(lines) => lines,
            Self::Dirty => &EMPTY_LAYOUT,
        }
    }
}

/// Styled multi-line text with lazily computed line layout.
///
/// Mutators drop the cached lines unless the new value equals the old one;
/// queries and drawing recompute them on demand. All offsets are char
/// indices into the text.
pub struct TextLayout {
    measurer: Arc<dyn TextMeasurer>,
    font: Option<Font>,
    text: String,
    chars: Vec<char>,
    styles: StyleTable,
    cfg: LayoutConfig,
    cache: LineCache,
    disposed: bool,
}

/// Borrowed, fully laid-out state that queries and drawing run against.
pub(crate) struct LayoutView<'a> {
    pub(crate) lines: &'a LineLayout,
    pub(crate) placer: Placer<'a>,
    pub(crate) cfg: &'a LayoutConfig,
}

impl TextLayout {
    /// Create an empty layout measuring text with `measurer`.
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        Self {
            measurer,
            font: None,
            text: String::new(),
            chars: Vec::new(),
            styles: StyleTable::new(0),
            cfg: LayoutConfig::default(),
            cache: LineCache::Dirty,
            disposed: false,
        }
    }

    /// Create an empty layout with every parameter taken from `cfg`.
    pub fn with_config(
        measurer: Arc<dyn TextMeasurer>,
        cfg: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        cfg.validate()?;
        let mut layout = Self::new(measurer);
        layout.cfg = cfg;
        Ok(layout)
    }

    fn check(&self) -> Result<(), LayoutError> {
        if self.disposed {
            return Err(LayoutError::Disposed);
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.cache = LineCache::Dirty;
    }

    pub(crate) fn char_count(&self) -> usize {
        self.chars.len()
    }

    /// Whether the cached lines are current, so the next query skips relayout.
    pub fn is_laid_out(&self) -> bool {
        self.cache.is_clean()
    }

    /// Fail if the layout font or any styled font was disposed by its owner.
    fn check_fonts(&self) -> Result<(), LayoutError> {
        if self.font.as_ref().is_some_and(Font::is_disposed) {
            return Err(LayoutError::InvalidArgument("font is disposed"));
        }
        let styled = self
            .styles
            .bindings()
            .iter()
            .filter_map(|binding| binding.style.as_ref())
            .filter_map(|style| style.font.as_ref());
        for font in styled {
            if font.is_disposed() {
                return Err(LayoutError::InvalidArgument("style font is disposed"));
            }
        }
        Ok(())
    }

    /// Recompute the lines if needed and borrow everything queries need.
    pub(crate) fn view(&mut self) -> Result<LayoutView<'_>, LayoutError> {
        self.check()?;
        self.check_fonts()?;
        let placer = Placer {
            chars: &self.chars,
            font: self.font.as_ref(),
            measurer: self.measurer.as_ref(),
        };
        let cfg = &self.cfg;
        let styles = &self.styles;
        let lines = self.cache.get_or_compute(|| {
            let default_font = placer.font_for(None);
            let breaker = LineBreaker {
                placer,
                cfg,
                default_metrics: placer.measurer.font_metrics(&default_font),
            };
            breaker.layout(styles)
        });
        Ok(LayoutView { lines, placer, cfg })
    }

    /// Replace the text and clear every style.
    pub fn set_text(&mut self, text: &str) -> Result<(), LayoutError> {
        self.check()?;
        if self.text == text {
            return Ok(());
        }
        self.text = text.to_owned();
        self.chars = text.chars().collect();
        self.styles.reset(self.chars.len());
        self.invalidate();
        Ok(())
    }

    pub fn get_text(&self) -> Result<&str, LayoutError> {
        self.check()?;
        Ok(&self.text)
    }

    /// Apply `style` to the inclusive char range `[start, end]`.
    ///
    /// Bounds are clamped into the text; empty text and `start > end` are
    /// ignored. `None` clears styling for the range.
    pub fn set_style(
        &mut self,
        style: Option<TextStyle>,
        start: usize,
        end: usize,
    ) -> Result<(), LayoutError> {
        self.check()?;
        if let Some(style) = style.as_ref() {
            if style.font.as_ref().is_some_and(Font::is_disposed) {
                return Err(LayoutError::InvalidArgument("style font is disposed"));
            }
            if style.metrics.is_some_and(|metrics| !metrics.is_valid()) {
                return Err(LayoutError::InvalidArgument("glyph metrics are negative"));
            }
        }
        if self.styles.set_style(style.map(Arc::new), start, end) {
            self.invalidate();
        }
        Ok(())
    }

    /// Style in effect at `offset`, which must be inside the text.
    pub fn get_style(&self, offset: usize) -> Result<Option<&TextStyle>, LayoutError> {
        self.check()?;
        let len = self.chars.len();
        if offset >= len {
            return Err(LayoutError::range("offset", offset, len));
        }
        Ok(self.styles.style_at(offset).map(|style| style.as_ref()))
    }

    /// Inclusive ranges of every styled span, parallel to [`get_styles`](Self::get_styles).
    pub fn get_ranges(&self) -> Result<Vec<(usize, usize)>, LayoutError> {
        self.check()?;
        Ok(self.styles.ranges())
    }

    pub fn get_styles(&self) -> Result<Vec<&TextStyle>, LayoutError> {
        self.check()?;
        Ok(self.styles.styles())
    }

    /// Replace every layout parameter at once.
    pub fn set_config(&mut self, cfg: LayoutConfig) -> Result<(), LayoutError> {
        self.check()?;
        cfg.validate()?;
        if self.cfg != cfg {
            self.cfg = cfg;
            self.invalidate();
        }
        Ok(())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    /// Set the wrap width. `None` disables wrapping.
    pub fn set_width(&mut self, width: Option<i32>) -> Result<(), LayoutError> {
        self.check()?;
        validate_wrap_width(width)?;
        if self.cfg.wrap_width != width {
            self.cfg.wrap_width = width;
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_width(&self) -> Result<Option<i32>, LayoutError> {
        self.check()?;
        Ok(self.cfg.wrap_width)
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> Result<(), LayoutError> {
        self.check()?;
        if self.cfg.alignment != alignment {
            self.cfg.alignment = alignment;
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_alignment(&self) -> Result<Alignment, LayoutError> {
        self.check()?;
        Ok(self.cfg.alignment)
    }

    /// Minimum ascent of every line; `None` uses font metrics only.
    pub fn set_ascent(&mut self, ascent: Option<i32>) -> Result<(), LayoutError> {
        self.check()?;
        validate_line_metric(ascent, "ascent must not be negative")?;
        if self.cfg.ascent != ascent {
            self.cfg.ascent = ascent;
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_ascent(&self) -> Result<Option<i32>, LayoutError> {
        self.check()?;
        Ok(self.cfg.ascent)
    }

    /// Minimum descent of every line; `None` uses font metrics only.
    pub fn set_descent(&mut self, descent: Option<i32>) -> Result<(), LayoutError> {
        self.check()?;
        validate_line_metric(descent, "descent must not be negative")?;
        if self.cfg.descent != descent {
            self.cfg.descent = descent;
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_descent(&self) -> Result<Option<i32>, LayoutError> {
        self.check()?;
        Ok(self.cfg.descent)
    }

    /// Set the font used by runs whose style names none.
    pub fn set_font(&mut self, font: Option<Font>) -> Result<(), LayoutError> {
        self.check()?;
        if font.as_ref().is_some_and(Font::is_disposed) {
            return Err(LayoutError::InvalidArgument("font is disposed"));
        }
        let same_handle = match (&self.font, &font) {
            (Some(current), Some(next)) => current.same_handle(next),
            (None, None) => true,
            _ => false,
        };
        if same_handle {
            return Ok(());
        }
        // An equal descriptor measures the same, so only the handle changes.
        let relayout = self.font != font;
        self.font = font;
        if relayout {
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_font(&self) -> Result<Option<&Font>, LayoutError> {
        self.check()?;
        Ok(self.font.as_ref())
    }

    /// Indent of each paragraph's first line. Negative values are ignored.
    pub fn set_indent(&mut self, indent: i32) -> Result<(), LayoutError> {
        self.check()?;
        if indent < 0 {
            log::warn!("ignoring negative indent {}", indent);
            return Ok(());
        }
        if self.cfg.indent != indent {
            self.cfg.indent = indent;
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_indent(&self) -> Result<i32, LayoutError> {
        self.check()?;
        Ok(self.cfg.indent)
    }

    pub fn set_justify(&mut self, justify: bool) -> Result<(), LayoutError> {
        self.check()?;
        if self.cfg.justify != justify {
            self.cfg.justify = justify;
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_justify(&self) -> Result<bool, LayoutError> {
        self.check()?;
        Ok(self.cfg.justify)
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), LayoutError> {
        self.check()?;
        if self.cfg.orientation != orientation {
            self.cfg.orientation = orientation;
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_orientation(&self) -> Result<Orientation, LayoutError> {
        self.check()?;
        Ok(self.cfg.orientation)
    }

    /// Extra vertical gap below every line.
    pub fn set_spacing(&mut self, spacing: i32) -> Result<(), LayoutError> {
        self.check()?;
        validate_spacing(spacing)?;
        if self.cfg.spacing != spacing {
            self.cfg.spacing = spacing;
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_spacing(&self) -> Result<i32, LayoutError> {
        self.check()?;
        Ok(self.cfg.spacing)
    }

    /// Tab stops in pixels; must be non-negative and strictly increasing.
    pub fn set_tabs(&mut self, tabs: &[i32]) -> Result<(), LayoutError> {
        self.check()?;
        validate_tabs(tabs)?;
        if self.cfg.tabs != tabs {
            self.cfg.tabs = tabs.to_vec();
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_tabs(&self) -> Result<&[i32], LayoutError> {
        self.check()?;
        Ok(&self.cfg.tabs)
    }

    pub fn set_segments(&mut self, segments: &[usize]) -> Result<(), LayoutError> {
        self.check()?;
        if self.cfg.segments != segments {
            self.cfg.segments = segments.to_vec();
            self.invalidate();
        }
        Ok(())
    }

    pub fn get_segments(&self) -> Result<&[usize], LayoutError> {
        self.check()?;
        Ok(&self.cfg.segments)
    }

    /// Release all derived state. Further calls fail with [`LayoutError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.cache = LineCache::Dirty;
        self.font = None;
        self.text = String::new();
        self.chars = Vec::new();
        self.styles.reset(0);
        self.cfg.tabs = Vec::new();
        self.cfg.segments = Vec::new();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl fmt::Debug for TextLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disposed {
            return f.write_str("TextLayout {*DISPOSED*}");
        }
        f.debug_struct("TextLayout")
            .field("text", &self.text)
            .field("font", &self.font)
            .field("cfg", &self.cfg)
            .field("laid_out", &self.cache.is_clean())
            .finish()
    }
}
