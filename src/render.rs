//! Painting laid-out lines onto a [`DrawingSurface`].

use core::fmt;
use core::ops::{BitOr, BitOrAssign, Deref, DerefMut};

use crate::error::{DrawError, LayoutError};
use crate::geometry::{Point, Rect};
use crate::itemize::StyleRun;
use crate::layout::{LayoutView, TextLayout};
use crate::style::{BorderStyle, Color, Font, UnderlineStyle, LINK_FOREGROUND};

/// Stroke pattern for lines and rectangle outlines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
    Dot,
}

impl From<BorderStyle> for LineStyle {
    fn from(border: BorderStyle) -> Self {
        match border {
            BorderStyle::Solid => Self::Solid,
            BorderStyle::Dash => Self::Dash,
            BorderStyle::Dot => Self::Dot,
        }
    }
}

/// Drawing capability the layout paints through.
///
/// Coordinates are surface pixels. Strings are drawn transparently with
/// their top-left corner at the given origin, in the current font and
/// foreground.
pub trait DrawingSurface {
    type Error: fmt::Debug;

    /// Current clip rectangle; lines outside it are skipped.
    fn clipping(&self) -> Rect;

    fn foreground(&self) -> Color;
    fn set_foreground(&mut self, color: Color);
    fn background(&self) -> Color;
    fn set_background(&mut self, color: Color);
    fn font(&self) -> Font;
    fn set_font(&mut self, font: &Font);
    fn line_style(&self) -> LineStyle;
    fn set_line_style(&mut self, style: LineStyle);

    /// Fill `rect` with the background colour.
    fn fill_rectangle(&mut self, rect: Rect) -> Result<(), Self::Error>;
    /// Outline the `rect.width` x `rect.height` pixel box with the foreground colour.
    fn draw_rectangle(&mut self, rect: Rect) -> Result<(), Self::Error>;
    fn draw_line(&mut self, from: Point, to: Point) -> Result<(), Self::Error>;
    fn draw_polyline(&mut self, points: &[Point]) -> Result<(), Self::Error>;
    fn draw_string(&mut self, text: &str, origin: Point) -> Result<(), Self::Error>;

    /// Selection text colour used when the caller supplies none.
    fn selection_foreground(&self) -> Color {
        Color::WHITE
    }

    /// Selection fill colour used when the caller supplies none.
    fn selection_background(&self) -> Color {
        Color::rgb(0, 120, 215)
    }

    fn is_disposed(&self) -> bool {
        false
    }
}

/// Options controlling how a selection extends past line ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DrawFlags(u8);

impl DrawFlags {
    pub const NONE: Self = Self(0);
    /// Mark the line delimiter as selected with a short block after the line.
    pub const DELIMITER_SELECTION: Self = Self(1 << 0);
    /// Extend the selection to the right edge of the surface.
    pub const FULL_SELECTION: Self = Self(1 << 1);
    /// Apply the extension to the last line as well.
    pub const LAST_LINE_SELECTION: Self = Self(1 << 2);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DrawFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DrawFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Inclusive char range to highlight while drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
    /// Defaults to [`DrawingSurface::selection_foreground`].
    pub foreground: Option<Color>,
    /// Defaults to [`DrawingSurface::selection_background`].
    pub background: Option<Color>,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            foreground: None,
            background: None,
        }
    }

    pub fn with_colors(mut self, foreground: Color, background: Color) -> Self {
        self.foreground = Some(foreground);
        self.background = Some(background);
        self
    }
}

/// Saves surface state and puts it back when dropped, including on errors.
struct SurfaceGuard<'s, S: DrawingSurface> {
    surface: &'s mut S,
    foreground: Color,
    background: Color,
    font: Font,
    line_style: LineStyle,
}

impl<'s, S: DrawingSurface> SurfaceGuard<'s, S> {
    fn new(surface: &'s mut S) -> Self {
        Self {
            foreground: surface.foreground(),
            background: surface.background(),
            font: surface.font(),
            line_style: surface.line_style(),
            surface,
        }
    }
}

impl<S: DrawingSurface> Deref for SurfaceGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DrawingSurface> DerefMut for SurfaceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawingSurface> Drop for SurfaceGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.set_foreground(self.foreground);
        self.surface.set_background(self.background);
        self.surface.set_font(&self.font);
        self.surface.set_line_style(self.line_style);
    }
}

/// Zig-zag points for squiggle underlines between `top` and `bottom`.
///
/// Each peak spans twice the height; a final point closes the wave at
/// `right - 1`. Degenerate boxes yield no points.
pub fn compute_polyline(left: i32, top: i32, right: i32, bottom: i32) -> Vec<Point> {
    let height = bottom - top;
    if height <= 0 {
        return Vec::new();
    }
    let width = 2 * height;
    let mut peaks = (right - left) / width;
    if peaks == 0 && right - left > 2 {
        peaks = 1;
    }
    if peaks < 0 {
        return Vec::new();
    }
    let mut points = Vec::with_capacity(2 * peaks as usize + 1);
    for i in 0..peaks {
        let x = left + width * i;
        points.push(Point::new(x, bottom));
        points.push(Point::new(x + width / 2, top));
    }
    let end_x = (right - 1).max(0).min(left + width * peaks);
    points.push(Point::new(end_x, bottom));
    points
}

struct SelectionState {
    active: bool,
    start: usize,
    end: usize,
    foreground: Color,
    background: Color,
}

impl SelectionState {
    fn covers(&self, start: usize, end: usize) -> bool {
        self.active && self.start <= start && self.end >= end
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.active && !(self.start > end || start > self.end)
    }
}

impl LayoutView<'_> {
    /// Advance of `[from, to)` inside `run`, consistent with placement.
    fn span_width(&self, run: &StyleRun, from: usize, to: usize) -> i32 {
        match run.glyph_width() {
            Some(glyph_width) => glyph_width * to.saturating_sub(from) as i32,
            None => self.placer.measure(from, to, run.style()).width,
        }
    }

    fn run_text(&self, from: usize, to: usize) -> String {
        self.placer.chars[from..to].iter().collect()
    }

    fn paint<S: DrawingSurface>(
        &self,
        surface: &mut S,
        x: i32,
        y: i32,
        selection: Option<Selection>,
        flags: DrawFlags,
    ) -> Result<(), S::Error> {
        let len = self.placer.chars.len();
        let last_line_selection = flags.contains(DrawFlags::LAST_LINE_SELECTION);
        let active = selection.is_some_and(|sel| sel.start <= sel.end);
        let mut sel = SelectionState {
            active,
            start: 0,
            end: 0,
            foreground: Color::WHITE,
            background: Color::BLACK,
        };
        if active || last_line_selection {
            let (start, end) = selection.map_or((0, 0), |sel| (sel.start, sel.end));
            let max = len.saturating_sub(1);
            sel.start = start.min(max);
            sel.end = end.min(max);
            sel.foreground = selection
                .and_then(|sel| sel.foreground)
                .unwrap_or_else(|| surface.selection_foreground());
            sel.background = selection
                .and_then(|sel| sel.background)
                .unwrap_or_else(|| surface.selection_background());
        }

        let mut surface = SurfaceGuard::new(surface);
        let foreground = surface.foreground;
        let clip = surface.clipping();
        let lines = &self.lines.lines;
        let line_base = self.cfg.ascent.unwrap_or(0).max(0);

        for (index, line) in lines.iter().enumerate() {
            let mut draw_x = x + self.line_indent(index);
            let draw_y = y + line.y;
            let line_height = line.pitch();

            if !flags.is_empty() && (active || last_line_selection) {
                let extent = if index + 1 == lines.len() && last_line_selection {
                    true
                } else {
                    match line.last_run() {
                        Some(run) if run.is_hard_break() => {
                            sel.start <= run.start && run.start <= sel.end
                        }
                        Some(run) => {
                            flags.contains(DrawFlags::FULL_SELECTION)
                                && run
                                    .end()
                                    .checked_sub(1)
                                    .is_some_and(|end| sel.start <= end && end < sel.end)
                        }
                        None => false,
                    }
                };
                if extent {
                    let width = if flags.contains(DrawFlags::FULL_SELECTION) {
                        i32::MAX
                    } else {
                        line_height / 3
                    };
                    surface.set_background(sel.background);
                    surface.fill_rectangle(Rect::new(
                        draw_x + line.width,
                        draw_y,
                        width,
                        line_height,
                    ))?;
                }
            }

            if draw_x > clip.right() || draw_x + line.width < clip.x {
                continue;
            }
            let baseline = line
                .runs
                .iter()
                .map(|run| run.baseline)
                .fold(line_base, i32::max);

            for (i, run) in line.runs.iter().enumerate() {
                if run.length == 0 {
                    continue;
                }
                if draw_x > clip.right() {
                    break;
                }
                if draw_x + run.width >= clip.x && !run.is_hard_break() {
                    let run_y = draw_y + baseline - run.baseline;
                    let end = run.end() - 1;
                    let style = run.style();
                    let font = self.placer.font_for(style);
                    surface.set_font(&font);
                    let text = self.run_text(run.start, run.end());

                    if sel.covers(run.start, end) {
                        surface.set_background(sel.background);
                        surface.fill_rectangle(Rect::new(draw_x, draw_y, run.width, line_height))?;
                        if !run.tab && !run.is_fixed_glyph() {
                            surface.set_foreground(sel.foreground);
                            surface.draw_string(&text, Point::new(draw_x, run_y))?;
                            draw_decorations(&mut *surface, run, draw_x, run_y, run.width)?;
                        }
                    } else {
                        if let Some(background) = style.and_then(|style| style.background) {
                            surface.set_background(background);
                            surface.fill_rectangle(Rect::new(
                                draw_x, run_y, run.width, run.height,
                            ))?;
                        }
                        if !run.tab {
                            let fg = style
                                .and_then(|style| {
                                    style.foreground.or_else(|| {
                                        (style.underline == Some(UnderlineStyle::Link))
                                            .then_some(LINK_FOREGROUND)
                                    })
                                })
                                .unwrap_or(foreground);
                            if !run.is_fixed_glyph() {
                                surface.set_foreground(fg);
                                surface.draw_string(&text, Point::new(draw_x, run_y))?;
                                draw_decorations(&mut *surface, run, draw_x, run_y, run.width)?;
                            }
                            if sel.overlaps(run.start, end) {
                                let from = sel.start.max(run.start);
                                let to = sel.end.min(end) + 1;
                                let sel_x = draw_x + self.span_width(run, run.start, from);
                                let sel_width = self.span_width(run, from, to);
                                surface.set_background(sel.background);
                                surface.fill_rectangle(Rect::new(
                                    sel_x,
                                    draw_y,
                                    sel_width,
                                    line_height,
                                ))?;
                                if fg != sel.foreground && !run.is_fixed_glyph() {
                                    let selected = self.run_text(from, to);
                                    surface.set_foreground(sel.foreground);
                                    surface.draw_string(&selected, Point::new(sel_x, run_y))?;
                                    draw_decorations(&mut *surface, run, sel_x, run_y, sel_width)?;
                                }
                            }
                        }
                    }
                    draw_border(&mut *surface, &line.runs, i, draw_x, draw_y, line_height, foreground)?;
                }
                draw_x += run.width;
            }
        }
        Ok(())
    }
}

/// Underline and strikeout of `run`, drawn over `width` pixels at `(x, y)`.
fn draw_decorations<S: DrawingSurface>(
    surface: &mut S,
    run: &StyleRun,
    x: i32,
    y: i32,
    width: i32,
) -> Result<(), S::Error> {
    let Some(style) = run.style() else {
        return Ok(());
    };
    if let Some(underline) = style.underline {
        let underline_y = y + run.baseline + 1 - style.rise;
        if let Some(color) = style.underline_color {
            surface.set_foreground(color);
        }
        match underline {
            UnderlineStyle::Squiggle | UnderlineStyle::Error => {
                let squiggle_height = 2;
                let squiggle_y = underline_y.min(y + run.height - squiggle_height - 1);
                let points =
                    compute_polyline(x, squiggle_y, x + width, squiggle_y + squiggle_height);
                if !points.is_empty() {
                    surface.draw_polyline(&points)?;
                }
            }
            UnderlineStyle::Double => {
                surface.draw_line(
                    Point::new(x, underline_y + 2),
                    Point::new(x + width, underline_y + 2),
                )?;
                surface.draw_line(Point::new(x, underline_y), Point::new(x + width, underline_y))?;
            }
            UnderlineStyle::Single | UnderlineStyle::Link => {
                surface.draw_line(Point::new(x, underline_y), Point::new(x + width, underline_y))?;
            }
        }
    }
    if style.strikeout {
        let strikeout_y = y + run.height - run.height / 2 - 1;
        if let Some(color) = style.strikeout_color {
            surface.set_foreground(color);
        }
        surface.draw_line(Point::new(x, strikeout_y), Point::new(x + width, strikeout_y))?;
    }
    Ok(())
}

/// Outline the border of `runs[index]`, merged with adherent runs before it.
///
/// Nothing is drawn while the next run continues the same border.
fn draw_border<S: DrawingSurface>(
    surface: &mut S,
    runs: &[StyleRun],
    index: usize,
    x: i32,
    y: i32,
    line_height: i32,
    default_color: Color,
) -> Result<(), S::Error> {
    let Some(run) = runs.get(index) else {
        return Ok(());
    };
    let Some(style) = run.style() else {
        return Ok(());
    };
    let Some(border) = style.border else {
        return Ok(());
    };
    if runs
        .get(index + 1)
        .is_some_and(|next| style.is_adherent_border(next.style()))
    {
        return Ok(());
    }

    let mut x = x;
    let mut width = run.width;
    for prev in runs[..index].iter().rev() {
        if !style.is_adherent_border(prev.style()) {
            break;
        }
        x -= prev.width;
        width += prev.width;
    }

    let color = style
        .border_color
        .or(style.foreground)
        .unwrap_or(default_color);
    surface.set_foreground(color);
    let previous = surface.line_style();
    surface.set_line_style(border.into());
    let drawn = surface.draw_rectangle(Rect::new(x, y, width, line_height));
    surface.set_line_style(previous);
    drawn
}

impl TextLayout {
    /// Paint every line with its top-left corner at `(x, y)`.
    ///
    /// Surface state changed while drawing is restored before returning,
    /// whether drawing succeeded or not.
    pub fn draw<S: DrawingSurface>(
        &mut self,
        surface: &mut S,
        x: i32,
        y: i32,
        selection: Option<Selection>,
        flags: DrawFlags,
    ) -> Result<(), DrawError<S::Error>> {
        let view = self.view()?;
        if surface.is_disposed() {
            return Err(LayoutError::InvalidArgument("drawing surface is disposed").into());
        }
        if view.placer.chars.is_empty() && flags.is_empty() {
            return Ok(());
        }
        view.paint(surface, x, y, selection, flags)
            .map_err(DrawError::Surface)
    }

    /// Paint without selection.
    pub fn draw_plain<S: DrawingSurface>(
        &mut self,
        surface: &mut S,
        x: i32,
        y: i32,
    ) -> Result<(), DrawError<S::Error>> {
        self.draw(surface, x, y, None, DrawFlags::NONE)
    }
}
