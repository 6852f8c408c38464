//! Text run segmentation and text frame resolution.

use smallvec::SmallVec;
use strata_core::{Frame, RunRow, RunSlice, Size, TextRun};

use crate::input::{StyleSpan, TextLayout};

/// Measures rendered text.
///
/// Glyph metrics belong to the embedding application, so the builder takes
/// them through this trait.
pub trait TextMeasurer: Send + Sync {
    /// Size of `run` set on one line, or wrapped at `max_width` when given.
    fn measure(&self, run: &TextRun, max_width: Option<f64>) -> Size;
}

/// Character-count based estimation for when no font backend is available.
#[derive(Debug, Clone, Copy)]
pub struct EstimatingMeasurer {
    /// Average glyph advance as a multiple of the font size.
    pub char_width: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
}

impl Default for EstimatingMeasurer {
    fn default() -> Self {
        Self {
            char_width: 0.55,
            line_height: 1.2,
        }
    }
}

impl TextMeasurer for EstimatingMeasurer {
    fn measure(&self, run: &TextRun, max_width: Option<f64>) -> Size {
        let advance = run.size * self.char_width;
        let line_height = run.size * self.line_height;

        let max_width = match max_width {
            Some(w) if w > 0.0 => w,
            _ => {
                let width = run.text.chars().count() as f64 * advance;
                return Size::new(width, line_height);
            }
        };

        let mut lines: Vec<f64> = Vec::new();
        let mut current = 0.0;
        for word in run.text.split_whitespace() {
            let word_width = word.chars().count() as f64 * advance;
            if current == 0.0 {
                current = word_width;
            } else if current + advance + word_width <= max_width {
                current += advance + word_width;
            } else {
                lines.push(current);
                current = word_width;
            }
        }
        if current > 0.0 {
            lines.push(current);
        }

        let count = lines.len().max(1);
        let width = lines.iter().copied().fold(0.0_f64, f64::max);
        Size::new(width, count as f64 * line_height)
    }
}

/// Merge consecutive spans with equal family, size and color.
///
/// Line breaks stay inside a run's text. Empty spans are dropped unless every
/// span is empty, in which case a single empty run remains.
pub fn segment(spans: &[StyleSpan]) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    for span in spans.iter().filter(|s| !s.text.is_empty()) {
        let run = to_run(span);
        match runs.last_mut() {
            Some(last) if last.same_style(&run) => last.text.push_str(&run.text),
            _ => runs.push(run),
        }
    }
    if runs.is_empty() {
        if let Some(first) = spans.first() {
            runs.push(to_run(first));
        }
    }
    runs
}

fn to_run(span: &StyleSpan) -> TextRun {
    TextRun {
        text: span.text.clone(),
        font_family: span.font_family.clone(),
        size: span.size,
        color: span.color,
        bold: span.bold,
        italic: span.italic,
    }
}

/// Group runs into visual lines at explicit line breaks.
pub fn rows(runs: &[TextRun]) -> Vec<RunRow> {
    let mut rows = vec![RunRow::default()];
    for (index, run) in runs.iter().enumerate() {
        let normalized = run.text.replace("\r\n", "\n").replace('\r', "\n");
        for (line_no, piece) in normalized.split('\n').enumerate() {
            if line_no > 0 {
                rows.push(RunRow::default());
            }
            if !piece.is_empty() {
                if let Some(row) = rows.last_mut() {
                    row.slices.push(RunSlice {
                        run: index,
                        text: piece.to_string(),
                    });
                }
            }
        }
    }
    rows
}

/// Measured size of a block of rows.
///
/// Row width is the sum of its slices; row height is its tallest slice.
/// Empty rows take the height of the run they fall in.
pub fn measure_rows(
    measurer: &dyn TextMeasurer,
    runs: &[TextRun],
    rows: &[RunRow],
    max_width: Option<f64>,
) -> Size {
    let mut width = 0.0_f64;
    let mut height = 0.0;
    let mut last_run = 0;

    for row in rows {
        let mut row_width = 0.0;
        let mut row_height = 0.0_f64;
        let sizes: SmallVec<[Size; 4]> = row
            .slices
            .iter()
            .filter_map(|slice| {
                let run = runs.get(slice.run)?;
                last_run = slice.run;
                let piece = TextRun {
                    text: slice.text.clone(),
                    ..run.clone()
                };
                Some(measurer.measure(&piece, max_width))
            })
            .collect();

        if sizes.is_empty() {
            if let Some(run) = runs.get(last_run) {
                let blank = TextRun {
                    text: String::new(),
                    ..run.clone()
                };
                row_height = measurer.measure(&blank, None).height;
            }
        }
        for size in &sizes {
            row_width += size.width;
            row_height = row_height.max(size.height);
        }

        width = width.max(row_width);
        height += row_height;
    }

    Size::new(width, height)
}

/// Absolute frame of a text layer.
///
/// Point text is sized by its glyphs; paragraph text keeps the declared box.
pub fn resolve_frame(
    layout: &TextLayout,
    measurer: &dyn TextMeasurer,
    runs: &[TextRun],
    rows: &[RunRow],
) -> Frame {
    match *layout {
        TextLayout::Point { origin } => {
            let size = measure_rows(measurer, runs, rows, None);
            Frame::new(origin.x, origin.y, size.width, size.height)
        }
        TextLayout::Paragraph { bounds } => bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Color, Point};

    fn span(text: &str, size: f64) -> StyleSpan {
        StyleSpan::new(text, "Helvetica", size, Color::BLACK)
    }

    #[test]
    fn test_segment_merges_equal_styles() {
        let runs = segment(&[span("Exam", 12.0), span("ple1", 12.0)]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Example1");
    }

    #[test]
    fn test_segment_splits_on_style_change() {
        let runs = segment(&[span("Big", 24.0), span(" small", 12.0), span("", 30.0)]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, " small");
    }

    #[test]
    fn test_segment_splits_on_weight_and_slant() {
        let runs = segment(&[
            span("plain ", 12.0),
            span("bold ", 12.0).bold(),
            span("both", 12.0).bold().italic(),
        ]);
        assert_eq!(runs.len(), 3);
        assert!(!runs[0].bold);
        assert!(runs[1].bold && !runs[1].italic);
        assert!(runs[2].bold && runs[2].italic);
    }

    #[test]
    fn test_line_break_stays_in_run() {
        let runs = segment(&[span("one\n", 12.0), span("two", 12.0)]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "one\ntwo");
    }

    #[test]
    fn test_empty_text_is_one_run() {
        let runs = segment(&[span("", 12.0)]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "");
        assert!(segment(&[]).is_empty());
    }

    #[test]
    fn test_rows_share_a_line_until_break() {
        let runs = segment(&[span("Big", 24.0), span("small\nnext", 12.0)]);
        let rows = rows(&runs);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].slices.len(), 2);
        assert_eq!(rows[0].slices[1].text, "small");
        assert_eq!(rows[1].slices[0].run, 1);
        assert_eq!(rows[1].slices[0].text, "next");
    }

    #[test]
    fn test_point_text_is_measured() {
        let runs = segment(&[span("abcd", 10.0)]);
        let rows = rows(&runs);
        let layout = TextLayout::Point {
            origin: Point::new(5.0, 6.0),
        };
        let frame = resolve_frame(&layout, &EstimatingMeasurer::default(), &runs, &rows);
        assert!((frame.width - 22.0).abs() < 1e-9);
        assert!((frame.height - 12.0).abs() < 1e-9);
        assert_eq!(frame.origin(), Point::new(5.0, 6.0));
    }

    #[test]
    fn test_mixed_sizes_use_tallest_slice() {
        let runs = segment(&[span("A", 20.0), span("b", 10.0)]);
        let rows = rows(&runs);
        let size = measure_rows(&EstimatingMeasurer::default(), &runs, &rows, None);
        assert!((size.height - 24.0).abs() < 1e-9);
        assert!((size.width - 16.5).abs() < 1e-9);
    }

    #[test]
    fn test_paragraph_keeps_declared_box() {
        let runs = segment(&[span("a long paragraph of words", 10.0)]);
        let rows = rows(&runs);
        let bounds = Frame::new(50.0, 80.0, 160.0, 43.0);
        let frame = resolve_frame(
            &TextLayout::Paragraph { bounds },
            &EstimatingMeasurer::default(),
            &runs,
            &rows,
        );
        assert_eq!(frame, bounds);
    }

    #[test]
    fn test_wrapping_estimate() {
        let run = TextRun {
            text: "aa bb cc".into(),
            font_family: "x".into(),
            size: 10.0,
            color: Color::BLACK,
            bold: false,
            italic: false,
        };
        let size = EstimatingMeasurer::default().measure(&run, Some(30.0));
        assert!((size.height - 24.0).abs() < 1e-9);
        assert!((size.width - 27.5).abs() < 1e-9);
    }
}
