//! Geometric and navigational queries over the computed lines.

use crate::config::Alignment;
use crate::error::LayoutError;
use crate::geometry::{Point, Rect};
use crate::layout::{LayoutView, TextLayout};
use crate::line_breaker::{Line, LineLayout};
use crate::measure::FontMetrics;

/// Unit of caret movement for [`TextLayout::get_next_offset`] and
/// [`TextLayout::get_previous_offset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Movement {
    Char,
    /// Treated like [`Movement::Char`]; no grapheme clustering is done.
    Cluster,
    Word,
    WordEnd,
    WordStart,
}

/// Result of hit-testing a point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OffsetHit {
    pub offset: usize,
    /// The point lies on the trailing half of the char at `offset`.
    pub trailing: bool,
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

impl LayoutView<'_> {
    fn len(&self) -> usize {
        self.placer.chars.len()
    }

    fn lines(&self) -> &[Line] {
        &self.lines.lines
    }

    fn last_line_index(&self) -> usize {
        self.lines().len().saturating_sub(1)
    }

    fn check_line(&self, index: usize) -> Result<&Line, LayoutError> {
        self.lines()
            .get(index)
            .ok_or_else(|| LayoutError::range("line", index, self.lines().len()))
    }

    fn check_offset(&self, offset: usize) -> Result<(), LayoutError> {
        if offset > self.len() {
            return Err(LayoutError::range("offset", offset, self.len() + 1));
        }
        Ok(())
    }

    /// Horizontal offset of line `index` from the layout origin.
    pub(crate) fn line_indent(&self, index: usize) -> i32 {
        let lines = self.lines();
        let paragraph_start = match index.checked_sub(1) {
            None => true,
            Some(prev) => lines
                .get(prev)
                .and_then(Line::last_run)
                .is_some_and(|run| run.is_hard_break()),
        };
        let mut indent = if paragraph_start { self.cfg.indent } else { 0 };
        if let Some(wrap) = self.cfg.wrap_width {
            let width = lines.get(index).map_or(0, |line| line.width) + indent;
            match self.cfg.alignment {
                Alignment::Left => {}
                Alignment::Center => indent += (wrap - width) / 2,
                Alignment::Right => indent += wrap - width,
            }
        }
        indent
    }

    pub(crate) fn line_index(&self, offset: usize) -> usize {
        self.lines()
            .iter()
            .position(|line| line.end > offset)
            .unwrap_or_else(|| self.last_line_index())
    }

    pub(crate) fn location(&self, offset: usize, trailing: bool) -> Point {
        let index = self.line_index(offset);
        let Some(line) = self.lines().get(index) else {
            return Point::default();
        };
        let indent = self.line_indent(index);
        if offset == self.len() {
            return Point::new(line.width + indent, line.y);
        }
        let mut width = 0;
        for run in &line.runs {
            if run.start <= offset && offset < run.end() {
                if run.tab {
                    if trailing {
                        width += run.width;
                    }
                } else if !run.is_hard_break() {
                    let end = if trailing { offset + 1 } else { offset };
                    width += match run.glyph_width() {
                        Some(glyph_width) => glyph_width * (end - run.start) as i32,
                        None => self.placer.measure(run.start, end, run.style()).width,
                    };
                }
                return Point::new(width + indent, line.y);
            }
            width += run.width;
        }
        Point::new(indent, 0)
    }

    pub(crate) fn offset_at(&self, x: i32, y: i32) -> OffsetHit {
        let index = self
            .lines()
            .iter()
            .position(|line| line.next_y > y)
            .unwrap_or_else(|| self.last_line_index());
        let Some(line) = self.lines().get(index) else {
            return OffsetHit::default();
        };
        let mut x = x - self.line_indent(index);
        if x >= line.width {
            x = line.width - 1;
        }
        if x < 0 {
            x = 0;
        }

        let mut width = 0;
        for run in &line.runs {
            if run.is_hard_break() {
                return OffsetHit {
                    offset: run.start,
                    trailing: false,
                };
            }
            if width + run.width > x {
                if let Some(glyph_width) = run.glyph_width().filter(|glyph_width| *glyph_width > 0) {
                    let x_run = x - width;
                    return OffsetHit {
                        offset: run.start + (x_run / glyph_width) as usize,
                        trailing: x_run % glyph_width >= glyph_width / 2,
                    };
                }
                if run.tab {
                    return OffsetHit {
                        offset: run.start,
                        trailing: x >= width + run.width / 2,
                    };
                }
                let mut offset = 0;
                let mut trailing = false;
                while offset < run.length {
                    let start = run.start + offset;
                    let char_width = self.placer.measure(start, start + 1, run.style()).width;
                    if width + char_width > x {
                        trailing = x >= width + char_width / 2;
                        break;
                    }
                    width += char_width;
                    offset += 1;
                }
                return OffsetHit {
                    offset: run.start + offset,
                    trailing,
                };
            }
            width += run.width;
        }
        OffsetHit {
            offset: line.end,
            trailing: false,
        }
    }

    pub(crate) fn next_offset(&self, offset: usize, movement: Movement) -> usize {
        let len = self.len();
        if offset == len {
            return len;
        }
        if matches!(movement, Movement::Char | Movement::Cluster) {
            return offset + 1;
        }
        let last = self.last_line_index();
        let line_end = self
            .lines()
            .iter()
            .enumerate()
            .find(|(_, line)| line.end > offset)
            .map_or(0, |(i, line)| {
                let end = line.start.max(line.end.saturating_sub(1));
                if i == last {
                    end + 1
                } else {
                    end
                }
            });

        let chars = self.placer.chars;
        let mut previous_space = !is_word_char(chars[offset]);
        let mut offset = offset + 1;
        while offset < line_end {
            let space = !is_word_char(chars[offset]);
            let stop = match movement {
                Movement::Word | Movement::WordEnd => space && !previous_space,
                Movement::WordStart => !space && previous_space,
                Movement::Char | Movement::Cluster => true,
            };
            if stop {
                break;
            }
            previous_space = space;
            offset += 1;
        }
        offset
    }

    pub(crate) fn previous_offset(&self, offset: usize, movement: Movement) -> usize {
        if offset == 0 {
            return 0;
        }
        if matches!(movement, Movement::Char | Movement::Cluster) {
            return offset - 1;
        }
        let last = self.last_line_index();
        let line_start = self
            .lines()
            .iter()
            .enumerate()
            .find(|(i, line)| {
                let end = if *i == last { line.end + 1 } else { line.end };
                end > offset
            })
            .map_or(0, |(_, line)| line.start);

        let chars = self.placer.chars;
        let mut offset = offset - 1;
        let mut previous_space = !is_word_char(chars[offset]);
        while line_start < offset {
            let space = !is_word_char(chars[offset - 1]);
            let stop = match movement {
                Movement::WordEnd => !space && previous_space,
                Movement::Word | Movement::WordStart => space && !previous_space,
                Movement::Char | Movement::Cluster => true,
            };
            if stop {
                break;
            }
            offset -= 1;
            previous_space = space;
        }
        offset
    }

    pub(crate) fn bounds(&self) -> Rect {
        let width = match self.cfg.wrap_width {
            Some(wrap) => wrap,
            None => self
                .lines()
                .iter()
                .enumerate()
                .map(|(i, line)| line.width + self.line_indent(i))
                .max()
                .unwrap_or(0)
                .max(0),
        };
        Rect::new(0, 0, width, self.lines.height())
    }

    pub(crate) fn bounds_range(&self, start: usize, end: usize) -> Rect {
        let len = self.len();
        if len == 0 || start > end {
            return Rect::default();
        }
        let start = start.min(len - 1);
        let end = end.min(len - 1);
        let start_line = self.line_index(start);
        let end_line = self.line_index(end);
        let lines = self.lines();
        let (Some(first), Some(last)) = (lines.get(start_line), lines.get(end_line)) else {
            return Rect::default();
        };

        let y = first.y;
        let height = last.next_y - y - self.cfg.spacing;
        if start_line == end_line {
            let x = self.location(start, false).x;
            let width = self.location(end, true).x - x;
            return Rect::new(x, y, width, height);
        }
        let width = lines[start_line..=end_line]
            .iter()
            .map(|line| line.width)
            .max()
            .unwrap_or(0);
        Rect::new(0, y, width, height)
    }

    pub(crate) fn line_bounds(&self, index: usize) -> Result<Rect, LayoutError> {
        let line = self.check_line(index)?;
        Ok(Rect::new(
            self.line_indent(index),
            line.y,
            line.width,
            line.pitch() - self.cfg.spacing,
        ))
    }
}

impl TextLayout {
    /// Bounding box of the whole layout.
    ///
    /// The width is the wrap width when wrapping, else the widest indented
    /// line. The height includes the spacing below the last line.
    pub fn get_bounds(&mut self) -> Result<Rect, LayoutError> {
        Ok(self.view()?.bounds())
    }

    /// Smallest rectangle enclosing the inclusive char range `[start, end]`.
    ///
    /// Bounds are clamped into the text. A range spanning several lines
    /// reports x 0 and the widest of those lines.
    pub fn get_bounds_range(&mut self, start: usize, end: usize) -> Result<Rect, LayoutError> {
        Ok(self.view()?.bounds_range(start, end))
    }

    pub fn get_line_count(&mut self) -> Result<usize, LayoutError> {
        Ok(self.view()?.lines.line_count())
    }

    /// Start offset of every line followed by the text length.
    pub fn get_line_offsets(&mut self) -> Result<Vec<usize>, LayoutError> {
        Ok(self.view()?.lines.offsets())
    }

    /// Indented line rectangle; the height excludes line spacing.
    pub fn get_line_bounds(&mut self, line: usize) -> Result<Rect, LayoutError> {
        self.view()?.line_bounds(line)
    }

    /// Horizontal offset of `line`: paragraph indent plus alignment shift.
    pub fn get_line_indent(&mut self, line: usize) -> Result<i32, LayoutError> {
        let view = self.view()?;
        view.check_line(line)?;
        Ok(view.line_indent(line))
    }

    /// Ascent and descent of `line` after font, glyph, and rise adjustments.
    pub fn get_line_metrics(&mut self, line: usize) -> Result<FontMetrics, LayoutError> {
        let view = self.view()?;
        let line = view.check_line(line)?;
        Ok(FontMetrics {
            ascent: line.ascent,
            descent: line.descent,
        })
    }

    /// Line holding `offset`; the text length maps to the last line.
    pub fn get_line_index(&mut self, offset: usize) -> Result<usize, LayoutError> {
        let view = self.view()?;
        view.check_offset(offset)?;
        Ok(view.line_index(offset))
    }

    /// Caret position of the leading, or trailing, edge of `offset`.
    pub fn get_location(&mut self, offset: usize, trailing: bool) -> Result<Point, LayoutError> {
        let view = self.view()?;
        view.check_offset(offset)?;
        Ok(view.location(offset, trailing))
    }

    /// Char under the point `(x, y)`, clamped into the nearest line.
    pub fn get_offset(&mut self, x: i32, y: i32) -> Result<OffsetHit, LayoutError> {
        Ok(self.view()?.offset_at(x, y))
    }

    pub fn get_offset_at(&mut self, point: Point) -> Result<OffsetHit, LayoutError> {
        self.get_offset(point.x, point.y)
    }

    /// Next caret stop after `offset`. Word movements never leave the line.
    pub fn get_next_offset(
        &mut self,
        offset: usize,
        movement: Movement,
    ) -> Result<usize, LayoutError> {
        let view = self.view()?;
        view.check_offset(offset)?;
        Ok(view.next_offset(offset, movement))
    }

    /// Previous caret stop before `offset`. Word movements never leave the line.
    pub fn get_previous_offset(
        &mut self,
        offset: usize,
        movement: Movement,
    ) -> Result<usize, LayoutError> {
        let view = self.view()?;
        view.check_offset(offset)?;
        Ok(view.previous_offset(offset, movement))
    }

    /// Embedding level at `offset`: the base level of the orientation.
    pub fn get_level(&self, offset: usize) -> Result<u8, LayoutError> {
        if self.is_disposed() {
            return Err(LayoutError::Disposed);
        }
        let len = self.char_count();
        if offset > len {
            return Err(LayoutError::range("offset", offset, len + 1));
        }
        Ok(self.config().orientation.base_level())
    }

    /// Computed line structure, for inspection and snapshots.
    pub fn line_layout(&mut self) -> Result<&LineLayout, LayoutError> {
        Ok(self.view()?.lines)
    }
}
