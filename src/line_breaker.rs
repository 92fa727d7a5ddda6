//! Tab expansion, hard breaks, soft wrapping, and line assembly.

use smallvec::SmallVec;

use crate::config::LayoutConfig;
use crate::itemize::{itemize, Placer, RunMetrics, StyleRun};
use crate::measure::FontMetrics;
use crate::style_table::StyleTable;

/// One laid-out line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub runs: SmallVec<[StyleRun; 4]>,
    /// First char offset of the line.
    pub start: usize,
    /// Exclusive end offset, including any break characters.
    pub end: usize,
    /// Top of the line relative to the layout origin.
    pub y: i32,
    /// Top of the following line; includes line spacing.
    pub next_y: i32,
    /// Sum of run advances, without indent.
    pub width: i32,
    pub ascent: i32,
    pub descent: i32,
}

impl Line {
    /// Height of the line without spacing.
    pub fn height(&self) -> i32 {
        self.ascent + self.descent
    }

    /// Height of the line including the spacing below it.
    pub fn pitch(&self) -> i32 {
        self.next_y - self.y
    }

    /// Last run of the line; every line owns at least one.
    pub fn last_run(&self) -> Option<&StyleRun> {
        self.runs.last()
    }

    /// Line ended by wrapping rather than by a break character.
    pub fn is_soft_wrapped(&self) -> bool {
        self.last_run().is_some_and(|run| run.soft_break)
    }
}

/// Cached result of a full relayout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineLayout {
    pub lines: Vec<Line>,
}

impl LineLayout {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Bottom of the last line, including its spacing.
    pub fn height(&self) -> i32 {
        self.lines.last().map_or(0, |line| line.next_y)
    }

    /// Start offset of every line followed by the end of the last one.
    pub fn offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.lines.len() + 1);
        offsets.push(0);
        offsets.extend(self.lines.iter().map(|line| line.end));
        offsets
    }
}

/// Runs the itemizer, placer, and breaker over the current layout state.
pub(crate) struct LineBreaker<'a> {
    pub(crate) placer: Placer<'a>,
    pub(crate) cfg: &'a LayoutConfig,
    /// Metrics of the layout font.
    pub(crate) default_metrics: FontMetrics,
}

impl<'a> LineBreaker<'a> {
    pub(crate) fn layout(&self, table: &StyleTable) -> LineLayout {
        let mut runs = itemize(self.placer.chars, table);
        let real = runs.len().saturating_sub(1);
        for run in &mut runs[..real] {
            self.placer.place(run);
        }
        self.break_runs(&mut runs);
        let layout = self.assemble(runs);
        log::trace!(
            "relayout: {} chars, {} lines, {} runs",
            self.placer.chars.len(),
            layout.line_count(),
            layout.lines.iter().map(|line| line.runs.len()).sum::<usize>()
        );
        layout
    }

    fn break_runs(&self, runs: &mut Vec<StyleRun>) {
        let chars = self.placer.chars;
        let mut line_start = 0;
        let mut line_width = 0;
        let mut i = 0;
        while i + 1 < runs.len() {
            if runs[i].length == 1 {
                match chars[runs[i].start] {
                    '\t' => {
                        let run = &mut runs[i];
                        run.tab = true;
                        run.baseline = 0;
                        run.width = measured_width(&run.metrics);
                        if let Some(width) = tab_width(&self.cfg.tabs, line_width) {
                            run.width = width;
                        }
                    }
                    '\n' => {
                        let run = &mut runs[i];
                        run.line_break = true;
                        run.width = 0;
                        run.baseline = 0;
                    }
                    '\r' => {
                        let absorb = runs
                            .get(i + 1)
                            .is_some_and(|next| next.length == 1 && chars[next.start] == '\n');
                        let run = &mut runs[i];
                        run.line_break = true;
                        run.width = 0;
                        run.baseline = 0;
                        if absorb {
                            run.length += 1;
                            runs.remove(i + 1);
                        }
                    }
                    _ => {}
                }
            }

            let mut at = i;
            if let Some(wrap) = self.cfg.wrap_width {
                let run = &runs[i];
                if line_width + run.width > wrap && !run.tab && !run.line_break && run.length > 0
                {
                    at = self.wrap(runs, i, line_start, wrap - line_width);
                }
            }

            line_width += runs[at].width;
            if runs[at].line_break {
                line_start = at + 1;
                line_width = 0;
            }
            i = at + 1;
        }
    }

    /// Break the line somewhere in `runs[line_start..=index]`.
    ///
    /// Returns the index of the run that now ends the line. Runs after it are
    /// processed again on the next line.
    fn wrap(&self, runs: &mut Vec<StyleRun>, index: usize, line_start: usize, room: i32) -> usize {
        let chars = self.placer.chars;
        let fit = self.fit(&runs[index], room);

        let mut found = None;
        let mut j = index;
        let mut from = Some(fit);
        loop {
            let run = &runs[j];
            if let Some(from) = from {
                if let Some(k) = (0..=from)
                    .rev()
                    .find(|k| chars[run.start + k].is_whitespace())
                {
                    found = Some((j, k + 1));
                    break;
                }
            }
            if j == line_start {
                break;
            }
            j -= 1;
            from = runs[j].length.checked_sub(1);
        }

        let (at, mut split) = match found {
            Some(hit) => hit,
            None if fit == 0 && index > line_start => {
                let prev = index - 1;
                (prev, runs[prev].length)
            }
            None => {
                log::debug!(
                    "forced wrap at offset {} without a break opportunity",
                    runs[index].start + fit.max(1)
                );
                (index, fit.max(1))
            }
        };

        let run = &runs[at];
        while split < run.length && chars[run.start + split].is_whitespace() {
            split += 1;
        }
        if 0 < split && split < run.length {
            let mut tail = StyleRun {
                start: run.start + split,
                length: run.length - split,
                style: run.style.clone(),
                ..StyleRun::default()
            };
            let head = &mut runs[at];
            head.length = split;
            self.placer.place(head);
            self.placer.place(&mut tail);
            runs.insert(at + 1, tail);
        }

        if at + 2 != runs.len() {
            let run = &mut runs[at];
            run.soft_break = true;
            run.line_break = true;
        }
        at
    }

    /// Index of the first char of `run` that no longer fits into `room`.
    ///
    /// Clamped to the last char so the caller always has a split candidate.
    fn fit(&self, run: &StyleRun, room: i32) -> usize {
        let mut width = 0;
        let mut fit = 0;
        while fit + 1 < run.length {
            let char_width = match run.glyph_width() {
                Some(glyph_width) => glyph_width,
                None => {
                    let start = run.start + fit;
                    self.placer.measure(start, start + 1, run.style()).width
                }
            };
            if width + char_width >= room {
                break;
            }
            width += char_width;
            fit += 1;
        }
        fit
    }

    fn assemble(&self, runs: Vec<StyleRun>) -> LineLayout {
        let base_ascent = self.default_metrics.ascent.max(self.cfg.ascent.unwrap_or(0));
        let base_descent = self
            .default_metrics
            .descent
            .max(self.cfg.descent.unwrap_or(0));

        let last = runs.len().saturating_sub(1);
        let mut lines = Vec::new();
        let mut current = Line {
            ascent: base_ascent,
            descent: base_descent,
            ..Line::default()
        };
        for (i, mut run) in runs.into_iter().enumerate() {
            current.width += run.width;
            if let Some(style) = run.style.as_deref() {
                let metrics = match (run.metrics, style.font.as_ref()) {
                    (RunMetrics::FixedGlyph { ascent, descent, .. }, _) => {
                        FontMetrics { ascent, descent }
                    }
                    (_, Some(font)) => self.placer.measurer.font_metrics(font),
                    _ => self.default_metrics,
                };
                current.ascent = current.ascent.max(metrics.ascent + style.rise);
                current.descent = current.descent.max(metrics.descent - style.rise);
                if style.rise != 0 {
                    run.baseline += style.rise;
                }
            }
            let ends_line = run.line_break || i == last;
            current.end = run.end();
            current.runs.push(run);
            if ends_line {
                current.next_y = current.y + current.height() + self.cfg.spacing;
                let next = Line {
                    start: current.end,
                    y: current.next_y,
                    ascent: base_ascent,
                    descent: base_descent,
                    ..Line::default()
                };
                lines.push(core::mem::replace(&mut current, next));
            }
        }
        LineLayout { lines }
    }
}

fn measured_width(metrics: &RunMetrics) -> i32 {
    match *metrics {
        RunMetrics::Measured { width, .. } => width,
        RunMetrics::FixedGlyph { width, .. } => width,
    }
}

/// Advance of a tab starting at `line_width`, or `None` to keep the glyph width.
fn tab_width(tabs: &[i32], line_width: i32) -> Option<i32> {
    if let Some(stop) = tabs.iter().find(|stop| **stop > line_width) {
        return Some(stop - line_width);
    }
    let last = *tabs.last()?;
    let interval = match tabs.len() {
        1 => last,
        n => last - tabs[n - 2],
    };
    if interval <= 0 {
        return None;
    }
    let steps = (line_width - last) / interval + 1;
    Some(last + steps * interval - line_width)
}
