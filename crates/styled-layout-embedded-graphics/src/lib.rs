//! embedded-graphics backend for `styled-layout`: a mono-font
//! [`TextMeasurer`] and a [`DrawingSurface`] over any RGB draw target.

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
use std::borrow::Cow;
use std::sync::Arc;

use embedded_graphics::{
    draw_target::{DrawTarget, DrawTargetExt},
    geometry::{Dimensions, Point as EgPoint, Size},
    mono_font::{
        ascii::{
            FONT_10X20, FONT_6X13_BOLD, FONT_6X13_ITALIC, FONT_6X9, FONT_7X13_ITALIC, FONT_7X14,
            FONT_7X14_BOLD, FONT_8X13, FONT_8X13_BOLD, FONT_8X13_ITALIC, FONT_9X18,
            FONT_9X18_BOLD,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::{PixelColor, Rgb888},
    primitives::{Line as EgLine, PointsIter, Rectangle},
    text::{Baseline, Text},
    Drawable, Pixel,
};
use styled_layout::{
    Color, DrawingSurface, Font, FontDescriptor, FontMetrics, LineStyle, Point, Rect, TextExtent,
    TextMeasurer,
};

/// Backend-local font identifier: size bucket in the high bits, variant in the low two.
pub type FontId = u8;

/// Why a font request had to fallback to a different face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontFallbackReason {
    UnknownFamily,
    UnsupportedWeightItalic,
}

/// Resolved mono face for a font request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontSelection {
    pub font_id: FontId,
    pub fallback_reason: Option<FontFallbackReason>,
}

/// Counters for text fallback reasons observed while drawing strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextFallbackDiagnostics {
    pub unknown_family: u64,
    pub unsupported_weight_italic: u64,
}

impl TextFallbackDiagnostics {
    /// Total fallback count across all reasons.
    pub fn total(&self) -> u64 {
        self.unknown_family
            .saturating_add(self.unsupported_weight_italic)
    }

    fn note_reason(&mut self, reason: FontFallbackReason) {
        match reason {
            FontFallbackReason::UnknownFamily => {
                self.unknown_family = self.unknown_family.saturating_add(1)
            }
            FontFallbackReason::UnsupportedWeightItalic => {
                self.unsupported_weight_italic = self.unsupported_weight_italic.saturating_add(1)
            }
        }
    }
}

/// Maps [`FontDescriptor`]s onto the built-in embedded-graphics ASCII mono fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoFontBackend;

impl MonoFontBackend {
    const SIZE_SMALL: FontId = 0;
    const SIZE_MEDIUM: FontId = 1;
    const SIZE_LARGE: FontId = 2;
    const SIZE_XL: FontId = 3;

    const VARIANT_REGULAR: FontId = 0;
    const VARIANT_ITALIC: FontId = 1;
    const VARIANT_BOLD: FontId = 2;
    const VARIANT_BOLD_ITALIC: FontId = 3;

    fn encode_font_id(size_bucket: FontId, variant: FontId) -> FontId {
        (size_bucket << 2) | (variant & 0x03)
    }

    fn decode_font_id(font_id: FontId) -> (FontId, FontId) {
        ((font_id >> 2) & 0x03, font_id & 0x03)
    }

    fn size_bucket_for(size_px: u16) -> FontId {
        if size_px >= 24 {
            Self::SIZE_XL
        } else if size_px >= 20 {
            Self::SIZE_LARGE
        } else if size_px >= 16 {
            Self::SIZE_MEDIUM
        } else {
            Self::SIZE_SMALL
        }
    }

    fn variant_for(bold: bool, italic: bool) -> FontId {
        match (bold, italic) {
            (true, true) => Self::VARIANT_BOLD_ITALIC,
            (true, false) => Self::VARIANT_BOLD,
            (false, true) => Self::VARIANT_ITALIC,
            (false, false) => Self::VARIANT_REGULAR,
        }
    }

    fn face_for(font_id: FontId) -> (&'static MonoFont<'static>, Option<FontFallbackReason>) {
        let unsupported = Some(FontFallbackReason::UnsupportedWeightItalic);
        let (size_bucket, variant) = Self::decode_font_id(font_id);
        match (size_bucket, variant) {
            (Self::SIZE_SMALL, Self::VARIANT_REGULAR) => (&FONT_6X9, None),
            (Self::SIZE_SMALL, Self::VARIANT_ITALIC) => (&FONT_6X13_ITALIC, None),
            (Self::SIZE_SMALL, Self::VARIANT_BOLD) => (&FONT_6X13_BOLD, None),
            (Self::SIZE_SMALL, _) => (&FONT_6X13_BOLD, unsupported),
            (Self::SIZE_MEDIUM, Self::VARIANT_REGULAR) => (&FONT_7X14, None),
            (Self::SIZE_MEDIUM, Self::VARIANT_ITALIC) => (&FONT_7X13_ITALIC, None),
            (Self::SIZE_MEDIUM, Self::VARIANT_BOLD) => (&FONT_7X14_BOLD, None),
            (Self::SIZE_MEDIUM, _) => (&FONT_7X14_BOLD, unsupported),
            (Self::SIZE_LARGE, Self::VARIANT_REGULAR) => (&FONT_8X13, None),
            (Self::SIZE_LARGE, Self::VARIANT_ITALIC) => (&FONT_8X13_ITALIC, None),
            (Self::SIZE_LARGE, Self::VARIANT_BOLD) => (&FONT_8X13_BOLD, None),
            (Self::SIZE_LARGE, _) => (&FONT_8X13_BOLD, unsupported),
            (_, Self::VARIANT_REGULAR) => (&FONT_10X20, None),
            (_, Self::VARIANT_ITALIC) => (&FONT_9X18, unsupported),
            (_, Self::VARIANT_BOLD) => (&FONT_9X18_BOLD, None),
            (_, _) => (&FONT_9X18_BOLD, unsupported),
        }
    }

    fn family_supported(family: &str) -> bool {
        matches!(
            family.trim().to_ascii_lowercase().as_str(),
            "monospace" | "mono" | "fixed" | "serif" | "sans-serif"
        )
    }

    /// Pick the face for `descriptor`, recording why it is not an exact match.
    pub fn resolve(&self, descriptor: &FontDescriptor) -> FontSelection {
        let font_id = Self::encode_font_id(
            Self::size_bucket_for(descriptor.size_px),
            Self::variant_for(descriptor.bold, descriptor.italic),
        );
        let (_, face_fallback) = Self::face_for(font_id);
        let fallback_reason = face_fallback.or_else(|| {
            (!Self::family_supported(&descriptor.family))
                .then_some(FontFallbackReason::UnknownFamily)
        });
        FontSelection {
            font_id,
            fallback_reason,
        }
    }

    /// The mono face used to measure and draw `font`.
    pub fn face(&self, font: &Font) -> &'static MonoFont<'static> {
        Self::face_for(self.resolve(font.descriptor()).font_id).0
    }
}

/// [`TextMeasurer`] backed by the mono font faces the surface draws with.
#[derive(Clone, Debug)]
pub struct EgTextMeasurer {
    backend: MonoFontBackend,
    default_font: Font,
}

impl EgTextMeasurer {
    pub fn new() -> Self {
        Self::with_default_font(default_font())
    }

    pub fn with_default_font(default_font: Font) -> Self {
        Self {
            backend: MonoFontBackend,
            default_font,
        }
    }

    /// Shared measurer trait object for [`styled_layout::TextLayout::new`].
    pub fn shared() -> Arc<dyn TextMeasurer> {
        Arc::new(Self::new())
    }
}

impl Default for EgTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for EgTextMeasurer {
    fn measure_text(&self, text: &str, font: &Font) -> TextExtent {
        let face = self.backend.face(font);
        let chars = normalize_text_for_mono(text).chars().count() as i32;
        TextExtent {
            width: chars * advance(face),
            height: face.character_size.height as i32,
            baseline: face.baseline as i32,
        }
    }

    fn font_metrics(&self, font: &Font) -> FontMetrics {
        let face = self.backend.face(font);
        let height = face.character_size.height as i32;
        let ascent = face.baseline as i32;
        FontMetrics {
            ascent,
            descent: height - ascent,
        }
    }

    fn default_font(&self) -> Font {
        self.default_font.clone()
    }
}

fn default_font() -> Font {
    Font::new(FontDescriptor::new("monospace", 16))
}

fn advance(face: &MonoFont<'_>) -> i32 {
    (face.character_size.width + face.character_spacing) as i32
}

fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| {
        matches!(
            ch,
            '\u{00A0}' // nbsp
                | '\u{2013}' // en dash
                | '\u{2014}' // em dash
                | '\u{2018}' // left single quote
                | '\u{2019}' // right single quote
                | '\u{201C}' // left double quote
                | '\u{201D}' // right double quote
        )
    }) {
        return Cow::Borrowed(text);
    }

    // One char in, one char out: widths stay aligned with layout offsets.
    Cow::Owned(
        text.chars()
            .map(|ch| match ch {
                '\u{00A0}' => ' ',
                '\u{2013}' | '\u{2014}' => '-',
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                other => other,
            })
            .collect(),
    )
}

fn to_eg_point(point: Point) -> EgPoint {
    EgPoint::new(point.x, point.y)
}

fn to_eg_rect(rect: Rect) -> Rectangle {
    Rectangle::new(
        EgPoint::new(rect.x, rect.y),
        Size::new(rect.width.max(0) as u32, rect.height.max(0) as u32),
    )
}

fn from_eg_rect(rect: Rectangle) -> Rect {
    Rect::new(
        rect.top_left.x,
        rect.top_left.y,
        rect.size.width as i32,
        rect.size.height as i32,
    )
}

fn intersect(a: Rect, b: Rect) -> Option<Rect> {
    let left = a.x.max(b.x);
    let top = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    (right > left && bottom > top).then(|| Rect::new(left, top, right - left, bottom - top))
}

/// Whether the `index`th pixel of a stroke is painted.
fn stroke_on(style: LineStyle, index: usize) -> bool {
    match style {
        LineStyle::Solid => true,
        LineStyle::Dash => index % 6 < 4,
        LineStyle::Dot => index % 2 == 0,
    }
}

/// Pixels of a `width` x `height` box outline, clockwise from the top-left corner.
fn perimeter(rect: Rect) -> Vec<EgPoint> {
    if rect.width <= 0 || rect.height <= 0 {
        return Vec::new();
    }
    let (left, top) = (rect.x, rect.y);
    let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
    let mut points = Vec::with_capacity(2 * (rect.width + rect.height) as usize);
    points.extend((left..=right).map(|x| EgPoint::new(x, top)));
    points.extend((top + 1..=bottom).map(|y| EgPoint::new(right, y)));
    if bottom > top {
        points.extend((left..right).rev().map(|x| EgPoint::new(x, bottom)));
    }
    if right > left {
        points.extend((top + 1..bottom).rev().map(|y| EgPoint::new(left, y)));
    }
    points
}

/// [`DrawingSurface`] over an embedded-graphics draw target.
///
/// Output is clipped to [`DrawingSurface::clipping`], which starts as the
/// target's bounding box. Dashed and dotted strokes are emulated per pixel.
pub struct EgSurface<'a, D> {
    target: &'a mut D,
    backend: MonoFontBackend,
    clip: Rect,
    foreground: Color,
    background: Color,
    font: Font,
    line_style: LineStyle,
    text_fallbacks: TextFallbackDiagnostics,
}

impl<'a, D> EgSurface<'a, D>
where
    D: DrawTarget,
    D::Color: PixelColor + From<Rgb888>,
{
    pub fn new(target: &'a mut D) -> Self {
        let clip = from_eg_rect(target.bounding_box());
        Self {
            target,
            backend: MonoFontBackend,
            clip,
            foreground: Color::BLACK,
            background: Color::WHITE,
            font: default_font(),
            line_style: LineStyle::Solid,
            text_fallbacks: TextFallbackDiagnostics::default(),
        }
    }

    pub fn set_clipping(&mut self, clip: Rect) {
        self.clip = clip;
    }

    pub fn text_fallbacks(&self) -> TextFallbackDiagnostics {
        self.text_fallbacks
    }

    fn color(color: Color) -> D::Color {
        D::Color::from(Rgb888::new(color.r, color.g, color.b))
    }

    fn stroke(&mut self, points: impl IntoIterator<Item = EgPoint>) -> Result<(), D::Error> {
        let color = Self::color(self.foreground);
        let style = self.line_style;
        let area = to_eg_rect(self.clip);
        let mut clipped = self.target.clipped(&area);
        clipped.draw_iter(
            points
                .into_iter()
                .enumerate()
                .filter(|(index, _)| stroke_on(style, *index))
                .map(|(_, point)| Pixel(point, color)),
        )
    }
}

impl<D> fmt::Debug for EgSurface<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EgSurface")
            .field("clip", &self.clip)
            .field("foreground", &self.foreground)
            .field("background", &self.background)
            .field("font", &self.font)
            .field("line_style", &self.line_style)
            .finish_non_exhaustive()
    }
}

impl<D> DrawingSurface for EgSurface<'_, D>
where
    D: DrawTarget,
    D::Color: PixelColor + From<Rgb888>,
    D::Error: fmt::Debug,
{
    type Error = D::Error;

    fn clipping(&self) -> Rect {
        self.clip
    }

    fn foreground(&self) -> Color {
        self.foreground
    }

    fn set_foreground(&mut self, color: Color) {
        self.foreground = color;
    }

    fn background(&self) -> Color {
        self.background
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn font(&self) -> Font {
        self.font.clone()
    }

    fn set_font(&mut self, font: &Font) {
        self.font = font.clone();
    }

    fn line_style(&self) -> LineStyle {
        self.line_style
    }

    fn set_line_style(&mut self, style: LineStyle) {
        self.line_style = style;
    }

    fn fill_rectangle(&mut self, rect: Rect) -> Result<(), Self::Error> {
        // Selection extents may be "infinitely" wide; clip before converting.
        let Some(area) = intersect(rect, self.clip) else {
            return Ok(());
        };
        let color = Self::color(self.background);
        self.target.fill_solid(&to_eg_rect(area), color)
    }

    fn draw_rectangle(&mut self, rect: Rect) -> Result<(), Self::Error> {
        self.stroke(perimeter(rect))
    }

    fn draw_line(&mut self, from: Point, to: Point) -> Result<(), Self::Error> {
        self.stroke(EgLine::new(to_eg_point(from), to_eg_point(to)).points())
    }

    fn draw_polyline(&mut self, points: &[Point]) -> Result<(), Self::Error> {
        let mut pixels = Vec::new();
        for (i, pair) in points.windows(2).enumerate() {
            let segment = EgLine::new(to_eg_point(pair[0]), to_eg_point(pair[1]));
            // Shared vertices are painted once.
            pixels.extend(segment.points().skip(usize::from(i > 0)));
        }
        self.stroke(pixels)
    }

    fn draw_string(&mut self, text: &str, origin: Point) -> Result<(), Self::Error> {
        let selection = self.backend.resolve(self.font.descriptor());
        if let Some(reason) = selection.fallback_reason {
            log::warn!(
                "mono fallback for {:?}: {:?}",
                self.font.descriptor(),
                reason
            );
            self.text_fallbacks.note_reason(reason);
        }
        let face = self.backend.face(&self.font);
        let style = MonoTextStyle::new(face, Self::color(self.foreground));
        let normalized = normalize_text_for_mono(text);
        let area = to_eg_rect(self.clip);
        let mut clipped = self.target.clipped(&area);
        Text::with_baseline(normalized.as_ref(), to_eg_point(origin), style, Baseline::Top)
            .draw(&mut clipped)?;
        Ok(())
    }
}
