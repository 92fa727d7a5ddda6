//! Styled text layout: line breaking, hit-testing, and painting of
//! multi-style text through pluggable measurement and drawing capabilities.
//!
//! A [`TextLayout`] owns text, per-range [`TextStyle`]s, and layout
//! parameters. Lines are computed lazily and cached until a mutator changes
//! something that affects them.

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

mod config;
mod error;
mod geometry;
mod itemize;
mod layout;
mod line_breaker;
mod measure;
mod query;
mod render;
mod style;
mod style_table;

pub use config::{Alignment, LayoutConfig, Orientation};
pub use error::{DrawError, LayoutError};
pub use geometry::{Point, Rect};
pub use itemize::{RunMetrics, StyleRun};
pub use layout::TextLayout;
pub use line_breaker::{Line, LineLayout};
pub use measure::{FixedAdvanceMeasurer, FontMetrics, TextExtent, TextMeasurer};
pub use query::{Movement, OffsetHit};
pub use render::{compute_polyline, DrawFlags, DrawingSurface, LineStyle, Selection};
pub use style::{
    BorderStyle, Color, Font, FontDescriptor, GlyphMetrics, TextStyle, UnderlineStyle,
    LINK_FOREGROUND,
};
