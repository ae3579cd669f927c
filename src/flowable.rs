use std::ops::Range;

use crate::canvas::{Surface, TextAlign};
use crate::font::{self, HELVETICA, HELVETICA_BOLD};
use crate::types::{Color, Pt, Rect, Size};

pub const SIZE_HEADER: &str = "Size";
pub const RATE_HEADER: &str = "Rate";

const HEADER_SHADE: Color = Color::grey(0.9);

/// A block the paginator can place into a frame. Blocks never split; one that
/// does not fit moves to the next page whole.
pub trait Flowable {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size;
    fn draw(&self, surface: &mut dyn Surface, x: Pt, y: Pt, avail_width: Pt);

    fn debug_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// One line of text in a fixed-height box.
#[derive(Debug, Clone)]
pub struct Heading {
    text: String,
    font_name: &'static str,
    font_size: Pt,
    height: Pt,
    align: TextAlign,
}

impl Heading {
    pub fn new(text: impl Into<String>, font_size: Pt, height: Pt) -> Self {
        Self {
            text: text.into(),
            font_name: HELVETICA,
            font_size,
            height,
            align: TextAlign::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.font_name = HELVETICA_BOLD;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn align(&self) -> TextAlign {
        self.align
    }

    pub fn text_width(&self) -> Pt {
        font::measure_text_width(self.font_name, self.font_size, &self.text)
    }
}

impl Flowable for Heading {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.height,
        }
    }

    fn draw(&self, surface: &mut dyn Surface, x: Pt, y: Pt, avail_width: Pt) {
        surface.set_font(self.font_name, self.font_size);
        surface.set_fill_color(Color::BLACK);
        surface.draw_text(
            Rect::new(x, y, avail_width, self.height),
            self.align,
            &self.text,
        );
    }

    fn debug_name(&self) -> &'static str {
        "Heading"
    }
}

/// Vertical whitespace.
#[derive(Debug, Clone)]
pub struct Spacer {
    height: Pt,
}

impl Spacer {
    pub fn new(height: Pt) -> Self {
        Self {
            height: height.max(Pt::ZERO),
        }
    }
}

impl Flowable for Spacer {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.height,
        }
    }

    fn draw(&self, _surface: &mut dyn Surface, _x: Pt, _y: Pt, _avail_width: Pt) {}

    fn debug_name(&self) -> &'static str {
        "Spacer"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub header_width: Pt,
    pub column_width: Pt,
    pub row_height: Pt,
    pub font_size: Pt,
}

/// One segment of a size/rate table: a shaded header column ("Size"/"Rate")
/// followed by fixed-width data columns, two rows high.
#[derive(Debug, Clone)]
pub struct SizeRateGrid {
    sizes: Vec<String>,
    rates: Vec<String>,
    metrics: GridMetrics,
}

impl SizeRateGrid {
    pub fn new(columns: Vec<(String, String)>, metrics: GridMetrics) -> Self {
        let (sizes, rates) = columns.into_iter().unzip();
        Self {
            sizes,
            rates,
            metrics,
        }
    }

    pub fn column_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    pub fn width(&self) -> Pt {
        self.metrics.header_width + self.metrics.column_width * self.sizes.len() as i32
    }

    fn draw_row(&self, surface: &mut dyn Surface, y: Pt, header: &str, cells: &[String]) {
        let m = &self.metrics;
        let header_rect = Rect::new(Pt::ZERO, y, m.header_width, m.row_height);
        surface.set_fill_color(HEADER_SHADE);
        surface.fill_rect(header_rect);
        surface.set_fill_color(Color::BLACK);
        surface.draw_rect(header_rect);
        surface.set_font(HELVETICA_BOLD, m.font_size);
        surface.draw_text(header_rect, TextAlign::Center, header);

        surface.set_font(HELVETICA, m.font_size);
        let mut x = m.header_width;
        for cell in cells {
            let rect = Rect::new(x, y, m.column_width, m.row_height);
            surface.draw_rect(rect);
            surface.draw_text(rect, TextAlign::Center, cell);
            x += m.column_width;
        }
    }
}

impl Flowable for SizeRateGrid {
    fn wrap(&self, _avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: self.width(),
            height: self.metrics.row_height * 2,
        }
    }

    fn draw(&self, surface: &mut dyn Surface, x: Pt, y: Pt, _avail_width: Pt) {
        surface.save_state();
        surface.translate(x, y);
        surface.set_stroke_color(Color::BLACK);
        surface.set_line_width(Pt::from_f32(0.5));
        self.draw_row(surface, Pt::ZERO, SIZE_HEADER, &self.sizes);
        self.draw_row(surface, self.metrics.row_height, RATE_HEADER, &self.rates);
        surface.restore_state();
    }

    fn debug_name(&self) -> &'static str {
        "SizeRateGrid"
    }
}

/// Splits `columns` into consecutive ranges of at most `limit` columns.
pub fn segment_columns(columns: usize, limit: usize) -> Vec<Range<usize>> {
    let limit = limit.max(1);
    (0..columns)
        .step_by(limit)
        .map(|start| start..(start + limit).min(columns))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, Command};

    fn metrics() -> GridMetrics {
        GridMetrics {
            header_width: Pt::from_mm(16.0),
            column_width: Pt::from_mm(13.0),
            row_height: Pt::from_mm(7.0),
            font_size: Pt::from_f32(9.0),
        }
    }

    #[test]
    fn segments_respect_the_limit() {
        let lens: Vec<usize> = segment_columns(27, 13).iter().map(|r| r.len()).collect();
        assert_eq!(lens, vec![13, 13, 1]);
        assert_eq!(segment_columns(26, 13), vec![0..13, 13..26]);
        assert!(segment_columns(0, 13).is_empty());
        assert_eq!(segment_columns(3, 0).len(), 3);
    }

    #[test]
    fn grid_draws_two_rows_inside_a_translated_origin() {
        let grid = SizeRateGrid::new(
            vec![
                ("20".to_string(), "100".to_string()),
                ("22".to_string(), "110.5".to_string()),
            ],
            metrics(),
        );
        let size = grid.wrap(Pt::from_mm(190.0), Pt::from_mm(280.0));
        assert_eq!(size.height, Pt::from_mm(7.0) * 2);
        assert_eq!(size.width, Pt::from_mm(16.0) + Pt::from_mm(13.0) * 2);

        let mut canvas = Canvas::new(Size::a4());
        grid.draw(&mut canvas, Pt::from_mm(10.0), Pt::from_mm(50.0), size.width);
        let doc = canvas.finish();
        let page = &doc.pages[0];
        assert_eq!(page.commands[0], Command::SaveState);
        assert_eq!(
            page.commands[1],
            Command::Translate(Pt::from_mm(10.0), Pt::from_mm(50.0))
        );
        assert_eq!(page.commands.last(), Some(&Command::RestoreState));
        let texts: Vec<&str> = page.texts().collect();
        assert_eq!(texts, vec!["Size", "20", "22", "Rate", "100", "110.5"]);
        let outlines = page
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::DrawRect { .. }))
            .count();
        assert_eq!(outlines, 6);
    }

    #[test]
    fn heading_has_fixed_height() {
        let heading = Heading::new("PRICE LIST-(1) Spring", Pt::from_f32(14.0), Pt::from_mm(10.0))
            .bold()
            .with_align(TextAlign::Center);
        let size = heading.wrap(Pt::from_mm(190.0), Pt::from_mm(5.0));
        assert_eq!(size.height, Pt::from_mm(10.0));
        assert_eq!(heading.align(), TextAlign::Center);
        assert!(heading.text_width() > Pt::ZERO);
        assert_eq!(heading.debug_name(), "Heading");
    }
}
