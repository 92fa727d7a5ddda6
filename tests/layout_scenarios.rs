mod common;

use common::fixtures::{fixed_layout, layout_with, line_texts, ADVANCE, LINE_HEIGHT, PARAGRAPHS};
use styled_layout::{Color, LayoutConfig, LayoutError, Movement, Rect, TextStyle, UnderlineStyle};

#[test]
fn empty_text_is_one_line_of_default_height() {
    let mut layout = fixed_layout("");
    assert_eq!(layout.get_line_count().unwrap(), 1);
    assert_eq!(layout.get_bounds().unwrap(), Rect::new(0, 0, 0, LINE_HEIGHT));
    assert_eq!(layout.get_line_offsets().unwrap(), vec![0, 0]);
}

#[test]
fn hard_breaks_split_lines() {
    let mut layout = fixed_layout("ab\ncd");
    assert_eq!(layout.get_line_count().unwrap(), 2);
    assert_eq!(layout.get_line_offsets().unwrap(), vec![0, 3, 5]);
    assert_eq!(line_texts(&mut layout), vec!["ab\n", "cd"]);
    assert_eq!(layout.get_line_index(2).unwrap(), 0);
    assert_eq!(layout.get_line_index(3).unwrap(), 1);
    assert_eq!(layout.get_location(3, false).unwrap().y, LINE_HEIGHT);
}

#[test]
fn tab_advances_to_next_stop() {
    let text = "a tab\tb";
    let mut layout = layout_with(text, LayoutConfig::default().with_tabs(vec![40]));
    let tab = layout
        .line_layout()
        .unwrap()
        .lines[0]
        .runs
        .iter()
        .find(|run| run.tab)
        .cloned()
        .expect("tab run");
    assert_eq!(tab.width, 40 - 5 * ADVANCE);
    assert_eq!(layout.get_location(6, false).unwrap().x, 40);
}

#[test]
fn wrap_narrower_than_first_word_advances() {
    let text = "abcdef ghi";
    let mut layout = layout_with(text, LayoutConfig::for_width(4));
    let lines = line_texts(&mut layout);
    assert_eq!(lines.concat(), text);
    assert!(lines.iter().all(|line| !line.is_empty()));
    assert!(lines.len() >= 6);
}

#[test]
fn overlapping_styles_split_the_earlier_range() {
    let mut layout = fixed_layout("abcde");
    let first = TextStyle::new().with_foreground(Color::rgb(1, 0, 0));
    let second = TextStyle::new().with_underline(UnderlineStyle::Single);
    layout.set_style(Some(first.clone()), 0, 2).unwrap();
    layout.set_style(Some(second.clone()), 1, 3).unwrap();

    assert_eq!(layout.get_ranges().unwrap(), vec![(0, 0), (1, 3)]);
    assert_eq!(layout.get_styles().unwrap(), vec![&first, &second]);
    assert_eq!(layout.get_style(0).unwrap(), Some(&first));
    for offset in 1..=3 {
        assert_eq!(layout.get_style(offset).unwrap(), Some(&second));
    }
    assert_eq!(layout.get_style(4).unwrap(), None);
}

#[test]
fn set_text_round_trips_and_clears_styles() {
    let mut layout = fixed_layout("styled");
    layout
        .set_style(Some(TextStyle::new().with_strikeout()), 0, 5)
        .unwrap();
    layout.set_text("fresh\ttext").unwrap();
    assert_eq!(layout.get_text().unwrap(), "fresh\ttext");
    assert!(layout.get_ranges().unwrap().is_empty());
}

#[test]
fn wrapped_lines_fit_unless_one_char_is_wider() {
    for width in [4, 30, 60, 100, 200] {
        for text in PARAGRAPHS {
            let mut layout = layout_with(text, LayoutConfig::for_width(width));
            let lines = line_texts(&mut layout);
            assert_eq!(lines.concat(), *text, "width {}", width);
            for line in &lines {
                let visible = line.trim_end().chars().count() as i32;
                assert!(
                    visible * ADVANCE <= width || visible == 1,
                    "line {:?} overflows width {}",
                    line,
                    width
                );
            }
            let offsets = layout.get_line_offsets().unwrap();
            let last = offsets.len() - 2;
            assert!(
                offsets[..=last].windows(2).all(|pair| pair[0] < pair[1]),
                "a line made no progress in {:?}",
                offsets
            );
        }
    }
}

#[test]
fn location_and_offset_invert_on_unwrapped_text() {
    let text = "hit testing is exact";
    let mut layout = fixed_layout(text);
    for offset in 0..text.chars().count() {
        let point = layout.get_location(offset, false).unwrap();
        assert_eq!(point.x, offset as i32 * ADVANCE);

        let hit = layout.get_offset(point.x, point.y).unwrap();
        assert_eq!(hit.offset, offset);
        assert!(!hit.trailing);

        let trailing = layout.get_offset(point.x + ADVANCE - 1, point.y).unwrap();
        assert_eq!(trailing.offset, offset);
        assert!(trailing.trailing);
        assert_eq!(
            layout.get_location(offset, true).unwrap().x,
            point.x + ADVANCE
        );
    }
}

#[test]
fn queries_are_stable_between_mutations() {
    let mut layout = layout_with(PARAGRAPHS[1], LayoutConfig::for_width(90));
    let bounds = layout.get_bounds().unwrap();
    let offsets = layout.get_line_offsets().unwrap();
    let second_line = layout.get_line_bounds(1).unwrap();
    assert!(layout.is_laid_out());

    assert_eq!(layout.get_bounds().unwrap(), bounds);
    assert_eq!(layout.get_line_offsets().unwrap(), offsets);
    assert_eq!(layout.get_line_bounds(1).unwrap(), second_line);

    layout.set_spacing(3).unwrap();
    let spaced = layout.get_bounds().unwrap();
    let gaps = offsets.len() as i32 - 1;
    assert_eq!(spaced.height, bounds.height + 3 * gaps);
}

#[test]
fn word_navigation_walks_a_paragraph() {
    let mut layout = fixed_layout("one two\nthree");
    let mut offset = 0;
    let mut stops = Vec::new();
    loop {
        let next = layout.get_next_offset(offset, Movement::WordStart).unwrap();
        if next == offset {
            break;
        }
        stops.push(next);
        offset = next;
    }
    // The break char is its own stop; movement never jumps over it.
    assert_eq!(stops, vec![4, 7, 8, 13]);
}

#[test]
fn out_of_range_and_disposed_calls_fail() {
    let mut layout = fixed_layout("abc");
    assert!(matches!(
        layout.get_location(4, false),
        Err(LayoutError::InvalidRange { .. })
    ));
    assert!(matches!(
        layout.get_line_bounds(1),
        Err(LayoutError::InvalidRange { .. })
    ));
    assert!(matches!(
        layout.set_width(Some(0)),
        Err(LayoutError::InvalidArgument(_))
    ));

    layout.dispose();
    layout.dispose();
    assert!(layout.is_disposed());
    assert!(matches!(layout.get_text(), Err(LayoutError::Disposed)));
    assert!(matches!(layout.get_line_count(), Err(LayoutError::Disposed)));
}
