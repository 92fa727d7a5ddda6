use std::sync::Arc;

use styled_layout::{FixedAdvanceMeasurer, LayoutConfig, TextLayout};

/// Advance of one char with the default 10px [`FixedAdvanceMeasurer`] font.
pub const ADVANCE: i32 = 6;
/// Line height of the default 10px fixed font.
pub const LINE_HEIGHT: i32 = 10;

pub const PARAGRAPHS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog.",
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.",
    "tab\tseparated\tcolumns\tand a trailing break\n",
    "windows\r\nline\r\nendings",
    "supercalifragilisticexpialidocious is one long word",
    "   leading spaces and  doubled  gaps   ",
    "",
];

pub fn fixed_layout(text: &str) -> TextLayout {
    layout_with(text, LayoutConfig::default())
}

pub fn layout_with(text: &str, cfg: LayoutConfig) -> TextLayout {
    let mut layout = TextLayout::with_config(Arc::new(FixedAdvanceMeasurer::new()), cfg)
        .unwrap_or_else(|e| panic!("config rejected: {}", e));
    layout
        .set_text(text)
        .unwrap_or_else(|e| panic!("set_text {:?}: {}", text, e));
    layout
}

/// Text of every line, break characters included.
pub fn line_texts(layout: &mut TextLayout) -> Vec<String> {
    let offsets = layout
        .get_line_offsets()
        .unwrap_or_else(|e| panic!("line offsets: {}", e));
    let chars: Vec<char> = layout
        .get_text()
        .unwrap_or_else(|e| panic!("text: {}", e))
        .chars()
        .collect();
    offsets
        .windows(2)
        .map(|pair| chars[pair[0]..pair[1]].iter().collect())
        .collect()
}

/// Long generated text for budget and bench runs.
pub fn long_text(paragraphs: usize) -> String {
    let mut out = String::new();
    for i in 0..paragraphs {
        out.push_str(PARAGRAPHS[i % PARAGRAPHS.len()]);
        out.push('\n');
    }
    out
}
