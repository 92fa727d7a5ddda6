//! Style values applied to text ranges: colours, font handles, decorations.

use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 24-bit RGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Foreground used for link-underlined runs that carry no explicit foreground.
pub const LINK_FOREGROUND: Color = Color::rgb(0, 51, 153);

/// Font request understood by a [`TextMeasurer`](crate::TextMeasurer) backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontDescriptor {
    pub family: String,
    pub size_px: u16,
    pub bold: bool,
    pub italic: bool,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size_px: u16) -> Self {
        Self {
            family: family.into(),
            size_px,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }
}

struct FontInner {
    descriptor: FontDescriptor,
    disposed: AtomicBool,
}

/// Caller-owned font handle.
///
/// Clones share one descriptor and one disposal flag. The layout only borrows
/// fonts: it checks [`Font::is_disposed`] before accepting or using one, and
/// never disposes a font itself.
#[derive(Clone)]
pub struct Font {
    inner: Arc<FontInner>,
}

impl Font {
    pub fn new(descriptor: FontDescriptor) -> Self {
        Self {
            inner: Arc::new(FontInner {
                descriptor,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn descriptor(&self) -> &FontDescriptor {
        &self.inner.descriptor
    }

    pub fn family(&self) -> &str {
        &self.inner.descriptor.family
    }

    pub fn size_px(&self) -> u16 {
        self.inner.descriptor.size_px
    }

    /// Release the handle. Every clone observes the disposal.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::Release);
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Whether both values are clones of one handle.
    pub fn same_handle(&self, other: &Font) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.descriptor() == other.descriptor()
    }
}

impl Eq for Font {}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("descriptor", self.descriptor())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Fixed advance and vertical extent that replace font measurement for a run.
///
/// Used for embedded objects: the run reserves `width` per character and
/// paints no glyphs. All three values must be non-negative;
/// [`TextLayout::set_style`](crate::TextLayout::set_style) rejects others.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub width: i32,
}

impl GlyphMetrics {
    pub const fn new(ascent: i32, descent: i32, width: i32) -> Self {
        Self {
            ascent,
            descent,
            width,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.ascent >= 0 && self.descent >= 0 && self.width >= 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnderlineStyle {
    Single,
    Double,
    Squiggle,
    Error,
    Link,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    Solid,
    Dash,
    Dot,
}

/// Appearance of a range of text.
///
/// A `None` field means "inherit": the layout font, the surface foreground,
/// no background, and so on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStyle {
    pub font: Option<Font>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub underline: Option<UnderlineStyle>,
    pub underline_color: Option<Color>,
    pub strikeout: bool,
    pub strikeout_color: Option<Color>,
    pub border: Option<BorderStyle>,
    pub border_color: Option<Color>,
    /// Baseline shift in pixels; positive raises the text.
    pub rise: i32,
    pub metrics: Option<GlyphMetrics>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_underline(mut self, underline: UnderlineStyle) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn with_strikeout(mut self) -> Self {
        self.strikeout = true;
        self
    }

    pub fn with_border(mut self, border: BorderStyle) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_rise(mut self, rise: i32) -> Self {
        self.rise = rise;
        self
    }

    pub fn with_metrics(mut self, metrics: GlyphMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Whether a border drawn for `self` continues into a run styled `other`.
    ///
    /// Adjacent runs with adherent borders are enclosed in one rectangle.
    pub fn is_adherent_border(&self, other: Option<&TextStyle>) -> bool {
        let Some(other) = other else {
            return false;
        };
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.border != other.border {
            return false;
        }
        match self.border_color {
            Some(color) => other.border_color == Some(color),
            None => other.border_color.is_none() && self.foreground == other.foreground,
        }
    }
}
