use std::alloc::{GlobalAlloc, Layout, System};
use std::convert::Infallible;
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::Rgb888,
    Pixel,
};
use styled_layout::{
    Color, FixedAdvanceMeasurer, LayoutConfig, Movement, TextLayout, TextMeasurer, TextStyle,
    UnderlineStyle,
};
use styled_layout_embedded_graphics::{EgSurface, EgTextMeasurer};

const DISPLAY_WIDTH: i32 = 480;
const DISPLAY_HEIGHT: i32 = 800;

const SAMPLES: &[(&str, &str, usize)] = &[
    (
        "prose",
        "It was a bright cold day in April, and the clocks were striking thirteen. ",
        40,
    ),
    ("tabular", "name\tvalue\tunit\tnote\n", 200),
    (
        "long-words",
        "antidisestablishmentarianism floccinaucinihilipilification ",
        60,
    ),
];

static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);

struct TrackingAllocator;

#[global_allocator]
static GLOBAL_ALLOCATOR: TrackingAllocator = TrackingAllocator;

fn note_alloc(bytes: usize) {
    let live = LIVE_BYTES.fetch_add(bytes, Ordering::Relaxed) + bytes;
    PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
}

fn note_free(bytes: usize) {
    let _ = LIVE_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| {
        Some(live.saturating_sub(bytes))
    });
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            note_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        note_free(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            note_free(layout.size());
            note_alloc(new_size);
        }
        new_ptr
    }
}

/// Draw target that only counts pixels.
struct NullDisplay {
    pixels: usize,
}

impl OriginDimensions for NullDisplay {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32)
    }
}

impl DrawTarget for NullDisplay {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.pixels += pixels.into_iter().count();
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct CaseResult {
    sample: &'static str,
    case: &'static str,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    max_ns: u128,
    median_peak_heap_bytes: usize,
}

fn run_case<F>(
    sample: &'static str,
    case: &'static str,
    warmup_iters: usize,
    measure_iters: usize,
    mut op: F,
) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..warmup_iters {
        black_box(op());
    }

    let mut time_samples = Vec::with_capacity(measure_iters);
    let mut mem_samples = Vec::with_capacity(measure_iters);
    for _ in 0..measure_iters {
        let baseline = LIVE_BYTES.load(Ordering::Relaxed);
        PEAK_BYTES.store(baseline, Ordering::Relaxed);
        let start = Instant::now();
        black_box(op());
        time_samples.push(start.elapsed().as_nanos());
        mem_samples.push(PEAK_BYTES.load(Ordering::Relaxed).saturating_sub(baseline));
    }
    time_samples.sort_unstable();
    mem_samples.sort_unstable();

    CaseResult {
        sample,
        case,
        iterations: measure_iters,
        min_ns: time_samples[0],
        median_ns: time_samples[time_samples.len() / 2],
        max_ns: time_samples[time_samples.len() - 1],
        median_peak_heap_bytes: mem_samples[mem_samples.len() / 2],
    }
}

fn build_layout(measurer: Arc<dyn TextMeasurer>, text: &str) -> TextLayout {
    let cfg = LayoutConfig::for_width(DISPLAY_WIDTH).with_tabs(vec![96]);
    let mut layout =
        TextLayout::with_config(measurer, cfg).unwrap_or_else(|e| panic!("config: {}", e));
    layout
        .set_text(text)
        .unwrap_or_else(|e| panic!("set_text: {}", e));
    let len = text.chars().count();
    let link = TextStyle::new().with_underline(UnderlineStyle::Link);
    let accent = TextStyle::new().with_foreground(Color::rgb(160, 32, 32));
    for start in (0..len).step_by(97) {
        let style = if start % 2 == 0 { &link } else { &accent };
        layout
            .set_style(Some(style.clone()), start, (start + 12).min(len))
            .unwrap_or_else(|e| panic!("set_style: {}", e));
    }
    layout
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let warmup_iters = if quick { 1 } else { 3 };
    let measure_iters = if quick { 3 } else { 15 };

    println!("# styled-layout benchmark");
    println!(
        "# mode={} warmup_iters={} measure_iters={}",
        if quick { "quick" } else { "full" },
        warmup_iters,
        measure_iters
    );
    println!("sample,case,iterations,min_ns,median_ns,max_ns,median_peak_heap_bytes");

    let fixed: Arc<dyn TextMeasurer> = Arc::new(FixedAdvanceMeasurer::new());
    let mono = EgTextMeasurer::shared();

    let mut results = Vec::new();
    for (sample, unit, repeat) in SAMPLES {
        let text = unit.repeat(*repeat);
        let len = text.chars().count();

        results.push(run_case(sample, "relayout_fixed", warmup_iters, measure_iters, || {
            let mut layout = build_layout(fixed.clone(), &text);
            layout.get_line_count().unwrap_or(0)
        }));

        results.push(run_case(sample, "relayout_mono", warmup_iters, measure_iters, || {
            let mut layout = build_layout(mono.clone(), &text);
            layout.get_line_count().unwrap_or(0)
        }));

        let mut layout = build_layout(mono.clone(), &text);
        results.push(run_case(sample, "locations", warmup_iters, measure_iters, || {
            (0..len)
                .step_by(7)
                .filter_map(|offset| layout.get_location(offset, false).ok())
                .map(|point| point.x as usize)
                .sum()
        }));

        results.push(run_case(sample, "hit_test", warmup_iters, measure_iters, || {
            let height = layout.get_bounds().map_or(0, |bounds| bounds.height);
            (0..height)
                .step_by(5)
                .filter_map(|y| layout.get_offset(y % DISPLAY_WIDTH, y).ok())
                .map(|hit| hit.offset)
                .sum()
        }));

        results.push(run_case(sample, "word_walk", warmup_iters, measure_iters, || {
            let mut offset = 0;
            let mut steps = 0;
            while let Ok(next) = layout.get_next_offset(offset, Movement::Word) {
                if next == offset {
                    break;
                }
                offset = next;
                steps += 1;
            }
            steps
        }));

        results.push(run_case(sample, "draw_mono", warmup_iters, measure_iters, || {
            let mut display = NullDisplay { pixels: 0 };
            let mut surface = EgSurface::new(&mut display);
            layout
                .draw_plain(&mut surface, 0, 0)
                .unwrap_or_else(|e| panic!("draw: {:?}", e));
            display.pixels
        }));
    }

    for result in &results {
        println!(
            "{},{},{},{},{},{},{}",
            result.sample,
            result.case,
            result.iterations,
            result.min_ns,
            result.median_ns,
            result.max_ns,
            result.median_peak_heap_bytes
        );
    }
}
