//! Sorted, gap-free table of style bindings over a text.

use std::sync::Arc;

use crate::style::TextStyle;

/// A style taking effect at `start` and lasting until the next binding.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StyleBinding {
    pub(crate) start: usize,
    pub(crate) style: Option<Arc<TextStyle>>,
}

impl StyleBinding {
    fn new(start: usize, style: Option<Arc<TextStyle>>) -> Self {
        Self { start, style }
    }
}

/// Ordered bindings covering `[0, len)` plus a sentinel at `len`.
///
/// Starts are strictly increasing except for empty text, where the first
/// binding and the sentinel both sit at 0.
#[derive(Clone, Debug)]
pub(crate) struct StyleTable {
    bindings: Vec<StyleBinding>,
}

impl StyleTable {
    pub(crate) fn new(len: usize) -> Self {
        let mut table = Self {
            bindings: Vec::with_capacity(2),
        };
        table.reset(len);
        table
    }

    pub(crate) fn reset(&mut self, len: usize) {
        self.bindings.clear();
        self.bindings.push(StyleBinding::new(0, None));
        self.bindings.push(StyleBinding::new(len, None));
    }

    /// Covered text length (start of the sentinel).
    pub(crate) fn len(&self) -> usize {
        self.bindings.last().map_or(0, |binding| binding.start)
    }

    /// Bindings excluding the sentinel.
    pub(crate) fn bindings(&self) -> &[StyleBinding] {
        let real = self.bindings.len().saturating_sub(1);
        &self.bindings[..real]
    }

    /// Index of the binding whose interval contains `offset`.
    fn index_of(&self, offset: usize) -> usize {
        let real = &self.bindings[..self.bindings.len().saturating_sub(1)];
        real.partition_point(|binding| binding.start <= offset)
            .saturating_sub(1)
    }

    /// Style in effect at `offset`. The caller validates the range.
    pub(crate) fn style_at(&self, offset: usize) -> Option<&Arc<TextStyle>> {
        self.bindings
            .get(self.index_of(offset))
            .and_then(|binding| binding.style.as_ref())
    }

    /// Bind `style` to the inclusive char range `[start, end]`.
    ///
    /// Bounds are clamped into the text. Returns whether the table changed.
    pub(crate) fn set_style(
        &mut self,
        style: Option<Arc<TextStyle>>,
        start: usize,
        end: usize,
    ) -> bool {
        let len = self.len();
        if len == 0 || start > end {
            return false;
        }
        let start = start.min(len - 1);
        let end = end.min(len - 1);

        let idx_start = self.index_of(start);
        let idx_end = self.index_of(end);

        let head = &self.bindings[idx_start];
        let head_end = self.bindings[idx_start + 1].start - 1;
        if head.start == start && head_end == end && same_style(&head.style, &style) {
            return false;
        }

        let tail_style = self.bindings[idx_end].style.clone();
        let tail_start = end + 1;
        let keep_tail = self.bindings[idx_end + 1].start != tail_start;

        let from = if head.start == start {
            idx_start
        } else {
            idx_start + 1
        };
        let mut replacement = Vec::with_capacity(2);
        replacement.push(StyleBinding::new(start, style));
        if keep_tail {
            replacement.push(StyleBinding::new(tail_start, tail_style));
        }
        self.bindings.splice(from..=idx_end, replacement);
        true
    }

    /// Inclusive `(start, end)` pairs of every styled binding, in order.
    pub(crate) fn ranges(&self) -> Vec<(usize, usize)> {
        self.bindings
            .windows(2)
            .filter(|pair| pair[0].style.is_some())
            .map(|pair| (pair[0].start, pair[1].start.saturating_sub(1)))
            .collect()
    }

    /// Styles parallel to [`ranges`](Self::ranges).
    pub(crate) fn styles(&self) -> Vec<&TextStyle> {
        self.bindings()
            .iter()
            .filter_map(|binding| binding.style.as_deref())
            .collect()
    }

    /// Start offsets of every binding including the sentinel.
    pub(crate) fn boundaries(&self) -> impl Iterator<Item = usize> + '_ {
        self.bindings.iter().map(|binding| binding.start)
    }
}

fn same_style(a: &Option<Arc<TextStyle>>, b: &Option<Arc<TextStyle>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b) || (a == b && same_font_handle(a, b)),
        _ => false,
    }
}

// Equal descriptors still differ when the caller passed a fresh handle.
fn same_font_handle(a: &TextStyle, b: &TextStyle) -> bool {
    match (&a.font, &b.font) {
        (Some(a), Some(b)) => a.same_handle(b),
        (None, None) => true,
        _ => false,
    }
}
