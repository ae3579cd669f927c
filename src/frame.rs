use crate::canvas::Surface;
use crate::flowable::Flowable;
use crate::types::{Pt, Rect};

pub enum AddResult {
    Placed(Rect),
    Overflow(Box<dyn Flowable>),
}

/// Content rectangle with a running cursor measured from its top.
///
/// Every length is snapped to a thousandth of a point on its own, so a run of
/// blocks that fills the frame exactly can sum to a few thousandths more than
/// the frame height. The fit check allows one thousandth per block already
/// placed to absorb that drift.
pub struct Frame {
    rect: Rect,
    cursor_y: Pt,
    gap: Pt,
    placed: i32,
}

impl Frame {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            cursor_y: Pt::ZERO,
            gap: Pt::ZERO,
            placed: 0,
        }
    }

    /// Space reserved before every block except the first.
    pub fn with_gap(mut self, gap: Pt) -> Self {
        self.gap = gap.max(Pt::ZERO);
        self
    }

    pub fn remaining_height(&self) -> Pt {
        (self.rect.height - self.cursor_y).max(Pt::ZERO)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_empty(&self) -> bool {
        self.cursor_y <= Pt::ZERO
    }

    pub fn add(&mut self, flowable: Box<dyn Flowable>, surface: &mut dyn Surface) -> AddResult {
        let gap = if self.is_empty() { Pt::ZERO } else { self.gap };
        let avail_width = self.rect.width;
        let avail_height = self.remaining_height() - gap;
        let size = flowable.wrap(avail_width, avail_height.max(Pt::ZERO));

        if size.height <= avail_height + self.rounding_slack() {
            let y = self.rect.y + self.cursor_y + gap;
            flowable.draw(surface, self.rect.x, y, avail_width);
            self.cursor_y = self.cursor_y + gap + size.height;
            self.placed += 1;
            return AddResult::Placed(Rect::new(self.rect.x, y, size.width, size.height));
        }

        // Taller than a whole empty frame: place it anyway so pagination
        // keeps moving forward.
        if self.is_empty() {
            flowable.draw(surface, self.rect.x, self.rect.y, avail_width);
            self.cursor_y = self.rect.height;
            self.placed += 1;
            return AddResult::Placed(Rect::new(
                self.rect.x,
                self.rect.y,
                size.width,
                size.height,
            ));
        }

        AddResult::Overflow(flowable)
    }

    fn rounding_slack(&self) -> Pt {
        Pt::from_f32(0.001) * self.placed
    }
}
