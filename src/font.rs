use crate::types::Pt;

pub const HELVETICA: &str = "Helvetica";
pub const HELVETICA_BOLD: &str = "Helvetica-Bold";

const FIRST_CHAR: u32 = 32;
const LAST_CHAR: u32 = 126;
const MISSING_WIDTH: u16 = 556;

// Advance widths (1/1000 em) for codes 32..=126, from the base-14 AFM files.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48..63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80..95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96..111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112..126
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32..47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48..63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64..79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80..95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96..111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112..126
];

/// Base-14 fonts the printer knows metrics for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base14 {
    Helvetica,
    HelveticaBold,
}

impl Base14 {
    pub fn resolve(name: &str) -> Self {
        let norm = name.trim().to_ascii_lowercase();
        if norm == "helvetica-bold" || norm == "bold" {
            Base14::HelveticaBold
        } else {
            Base14::Helvetica
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Base14::Helvetica => HELVETICA,
            Base14::HelveticaBold => HELVETICA_BOLD,
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            Base14::Helvetica => &HELVETICA_WIDTHS,
            Base14::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    fn advance_for_char(&self, ch: char) -> u16 {
        let code = ch as u32;
        if !(FIRST_CHAR..=LAST_CHAR).contains(&code) {
            return MISSING_WIDTH;
        }
        self.widths()[(code - FIRST_CHAR) as usize]
    }

    pub fn measure_text_width(&self, font_size: Pt, text: &str) -> Pt {
        let total_units: i32 = text
            .chars()
            .map(|ch| self.advance_for_char(ch) as i32)
            .fold(0i32, |acc, adv| acc.saturating_add(adv));
        if total_units <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(total_units, 1000)
    }
}

pub fn measure_text_width(font_name: &str, font_size: Pt, text: &str) -> Pt {
    Base14::resolve(font_name).measure_text_width(font_size, text)
}

// Ascent/descent for Helvetica are 718/-207; the baseline sits this far below
// the top of a line box of height `font_size`.
pub fn baseline_offset(font_size: Pt) -> Pt {
    font_size.mul_ratio(718, 1000)
}
