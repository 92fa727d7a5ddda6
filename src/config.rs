use crate::error::LayoutError;

/// Horizontal placement of lines inside the wrap width.
///
/// Center and right only take effect when a wrap width is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Base writing direction of the layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl Orientation {
    /// Base embedding level of this direction.
    pub fn base_level(self) -> u8 {
        match self {
            Self::LeftToRight => 0,
            Self::RightToLeft => 1,
        }
    }
}

/// Layout parameters that shape line breaking and line placement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Wrap width in pixels. `None` disables wrapping.
    pub wrap_width: Option<i32>,
    pub alignment: Alignment,
    pub orientation: Orientation,
    /// Indent of the first line of each paragraph.
    pub indent: i32,
    /// Stored for callers; lines are not stretched.
    pub justify: bool,
    /// Extra gap below every line.
    pub spacing: i32,
    /// Tab stops in pixels from the layout origin. The last interval repeats.
    pub tabs: Vec<i32>,
    /// Bidi segment boundaries. Stored for callers; no reordering happens.
    pub segments: Vec<usize>,
    /// Minimum ascent of every line. `None` uses font metrics only.
    pub ascent: Option<i32>,
    /// Minimum descent of every line. `None` uses font metrics only.
    pub descent: Option<i32>,
}

impl LayoutConfig {
    /// Convenience for a wrapping layout of the given width.
    pub fn for_width(wrap_width: i32) -> Self {
        Self {
            wrap_width: Some(wrap_width),
            ..Self::default()
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_indent(mut self, indent: i32) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_spacing(mut self, spacing: i32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_tabs(mut self, tabs: Vec<i32>) -> Self {
        self.tabs = tabs;
        self
    }

    /// Check every field against the limits the setters enforce.
    pub fn validate(&self) -> Result<(), LayoutError> {
        validate_wrap_width(self.wrap_width)?;
        validate_line_metric(self.ascent, "ascent must not be negative")?;
        validate_line_metric(self.descent, "descent must not be negative")?;
        validate_spacing(self.spacing)?;
        validate_tabs(&self.tabs)?;
        if self.indent < 0 {
            return Err(LayoutError::InvalidArgument("indent must not be negative"));
        }
        Ok(())
    }
}

pub(crate) fn validate_wrap_width(width: Option<i32>) -> Result<(), LayoutError> {
    match width {
        Some(width) if width <= 0 => Err(LayoutError::InvalidArgument(
            "wrap width must be positive",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn validate_line_metric(
    value: Option<i32>,
    reason: &'static str,
) -> Result<(), LayoutError> {
    match value {
        Some(value) if value < 0 => Err(LayoutError::InvalidArgument(reason)),
        _ => Ok(()),
    }
}

pub(crate) fn validate_spacing(spacing: i32) -> Result<(), LayoutError> {
    if spacing < 0 {
        return Err(LayoutError::InvalidArgument(
            "line spacing must not be negative",
        ));
    }
    Ok(())
}

pub(crate) fn validate_tabs(tabs: &[i32]) -> Result<(), LayoutError> {
    if tabs.first().is_some_and(|first| *first < 0) {
        return Err(LayoutError::InvalidArgument("tab stops must not be negative"));
    }
    if tabs.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(LayoutError::InvalidArgument(
            "tab stops must be strictly increasing",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_unwrapped() {
        let cfg = LayoutConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.wrap_width, None);
        assert_eq!(cfg.alignment, Alignment::Left);
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        assert!(LayoutConfig::for_width(0).validate().is_err());
        assert!(LayoutConfig::default().with_spacing(-1).validate().is_err());
        assert!(LayoutConfig::default()
            .with_tabs(vec![40, 40])
            .validate()
            .is_err());
        assert!(LayoutConfig::default()
            .with_tabs(vec![-8, 40])
            .validate()
            .is_err());
        let cfg = LayoutConfig {
            ascent: Some(-2),
            ..LayoutConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn orientation_maps_to_base_level() {
        assert_eq!(Orientation::LeftToRight.base_level(), 0);
        assert_eq!(Orientation::RightToLeft.base_level(), 1);
    }
}
