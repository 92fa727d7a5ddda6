use crate::style::{Font, FontDescriptor};

/// Pixel extent of a measured span of text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextExtent {
    pub width: i32,
    pub height: i32,
    /// Distance from the top of the extent to the baseline.
    pub baseline: i32,
}

/// Vertical metrics of a font, or of a laid-out line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontMetrics {
    pub ascent: i32,
    pub descent: i32,
}

impl FontMetrics {
    pub fn height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// Text measurement hook used for run placement, wrapping, and hit-testing.
///
/// Drawing must use the same width model, otherwise carets and selections
/// drift away from the painted glyphs.
pub trait TextMeasurer: Send + Sync {
    /// Measure a contiguous span of characters in `font`.
    fn measure_text(&self, text: &str, font: &Font) -> TextExtent;

    /// Ascent and descent of `font`.
    fn font_metrics(&self, font: &Font) -> FontMetrics;

    /// Font used when neither the layout nor a style names one.
    fn default_font(&self) -> Font;
}

/// Headless measurer where every character advances by the same amount.
///
/// Advance is 60% of the font size, ascent 80%, descent the remainder. A
/// 10px font therefore measures 6px per character with ascent 8 and
/// descent 2.
#[derive(Clone, Debug)]
pub struct FixedAdvanceMeasurer {
    default_font: Font,
}

impl FixedAdvanceMeasurer {
    pub fn new() -> Self {
        Self::with_default_font(Font::new(FontDescriptor::new("fixed", 10)))
    }

    pub fn with_default_font(default_font: Font) -> Self {
        Self { default_font }
    }

    /// Advance of a single character in `font`.
    pub fn advance(font: &Font) -> i32 {
        (i32::from(font.size_px()) * 6 / 10).max(1)
    }
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure_text(&self, text: &str, font: &Font) -> TextExtent {
        let metrics = self.font_metrics(font);
        let chars = text.chars().count() as i32;
        TextExtent {
            width: chars * Self::advance(font),
            height: metrics.height(),
            baseline: metrics.ascent,
        }
    }

    fn font_metrics(&self, font: &Font) -> FontMetrics {
        let size = i32::from(font.size_px());
        let ascent = size * 8 / 10;
        FontMetrics {
            ascent,
            descent: size - ascent,
        }
    }

    fn default_font(&self) -> Font {
        self.default_font.clone()
    }
}
