use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use fixed::types::I32F32;

pub const POINTS_PER_INCH: f32 = 72.0;
pub const MM_PER_INCH: f32 = 25.4;

const FRAC_SCALE: i128 = 1 << 32;

/// A length in PDF points, held as I32F32 and snapped to thousandths of a
/// point so that layout sums come out the same on every run.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pt(I32F32);

impl Pt {
    pub const ZERO: Pt = Pt(I32F32::from_bits(0));

    pub fn from_f32(value: f32) -> Pt {
        if !value.is_finite() {
            return Pt::ZERO;
        }
        Pt::from_milli((value as f64 * 1000.0).round() as i128)
    }

    pub fn from_mm(mm: f32) -> Pt {
        Pt::from_f32(mm * POINTS_PER_INCH / MM_PER_INCH)
    }

    pub fn to_f32(self) -> f32 {
        self.0.to_num()
    }

    pub fn to_mm(self) -> f32 {
        self.to_f32() / POINTS_PER_INCH * MM_PER_INCH
    }

    pub fn to_milli_i64(self) -> i64 {
        self.milli().clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    pub fn max(self, other: Pt) -> Pt {
        if other > self { other } else { self }
    }

    pub fn min(self, other: Pt) -> Pt {
        if other < self { other } else { self }
    }

    /// `self * num / den`, rounded half away from zero. Zero when `den` is zero.
    pub fn mul_ratio(self, num: i32, den: i32) -> Pt {
        Pt::from_milli(rounded_div(self.milli() * num as i128, den as i128))
    }

    fn milli(self) -> i128 {
        rounded_div(self.0.to_bits() as i128 * 1000, FRAC_SCALE)
    }

    fn from_milli(milli: i128) -> Pt {
        let bits = rounded_div(milli * FRAC_SCALE, 1000);
        Pt(I32F32::from_bits(
            bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64,
        ))
    }
}

fn rounded_div(num: i128, den: i128) -> i128 {
    if den == 0 {
        return 0;
    }
    let half = den.abs() / 2;
    if num >= 0 {
        (num + half) / den
    } else {
        -((half - num) / den)
    }
}

macro_rules! milli_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $sym:tt) => {
        impl $op for Pt {
            type Output = Pt;
            fn $method(self, rhs: Pt) -> Pt {
                Pt::from_milli(self.milli() $sym rhs.milli())
            }
        }

        impl $assign for Pt {
            fn $assign_method(&mut self, rhs: Pt) {
                *self = *self $sym rhs;
            }
        }
    };
}

milli_op!(Add, add, AddAssign, add_assign, +);
milli_op!(Sub, sub, SubAssign, sub_assign, -);

impl Mul<i32> for Pt {
    type Output = Pt;
    fn mul(self, rhs: i32) -> Pt {
        Pt::from_milli(self.milli().saturating_mul(rhs as i128))
    }
}

impl Div<i32> for Pt {
    type Output = Pt;
    fn div(self, rhs: i32) -> Pt {
        Pt::from_milli(rounded_div(self.milli(), rhs as i128))
    }
}

impl Neg for Pt {
    type Output = Pt;
    fn neg(self) -> Pt {
        Pt::from_milli(-self.milli())
    }
}

/// Page (or block) extent in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: Pt,
    pub height: Pt,
}

impl Size {
    pub fn from_mm(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width: Pt::from_mm(width_mm),
            height: Pt::from_mm(height_mm),
        }
    }

    pub fn a4() -> Self {
        Self::from_mm(210.0, 297.0)
    }

    pub fn letter() -> Self {
        Self {
            width: Pt::from_f32(8.5 * POINTS_PER_INCH),
            height: Pt::from_f32(11.0 * POINTS_PER_INCH),
        }
    }
}

/// Rectangle with a top-left origin; y grows down the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
}

impl Rect {
    pub fn new(x: Pt, y: Pt, width: Pt, height: Pt) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> Pt {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    pub fn from_mm(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top: Pt::from_mm(top),
            right: Pt::from_mm(right),
            bottom: Pt::from_mm(bottom),
            left: Pt::from_mm(left),
        }
    }

    pub fn all_mm(value: f32) -> Self {
        Self::from_mm(value, value, value, value)
    }

    /// Area of `page` inside the margins. Collapses to zero size instead of
    /// going negative.
    pub fn content_rect(&self, page: Size) -> Rect {
        Rect::new(
            self.left,
            self.top,
            (page.width - self.left - self.right).max(Pt::ZERO),
            (page.height - self.top - self.bottom).max(Pt::ZERO),
        )
    }
}

/// RGB colour with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::grey(0.0);
    pub const WHITE: Color = Color::grey(1.0);

    pub const fn grey(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }
}
