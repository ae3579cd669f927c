use crate::canvas::{Surface, TextAlign};
use crate::font::{HELVETICA, HELVETICA_BOLD};
use crate::frame::Frame;
use crate::layout::BannerConfig;
use crate::types::{Color, Margins, Pt, Rect, Size};

// Gap between the banner rule and the first block.
const BANNER_SPACING_MM: f32 = 3.0;

#[derive(Debug, Clone)]
pub struct PageTemplate {
    pub name: String,
    pub page_size: Size,
    margins: Margins,
    banner: Option<BannerConfig>,
    block_gap: Pt,
}

impl PageTemplate {
    pub fn new(name: impl Into<String>, page_size: Size, margins: Margins) -> Self {
        Self {
            name: name.into(),
            page_size,
            margins,
            banner: None,
            block_gap: Pt::ZERO,
        }
    }

    pub fn with_banner(mut self, banner: Option<BannerConfig>) -> Self {
        self.banner = banner;
        self
    }

    pub fn with_block_gap(mut self, gap: Pt) -> Self {
        self.block_gap = gap;
        self
    }

    pub fn content_rect(&self) -> Rect {
        self.margins.content_rect(self.page_size)
    }

    fn banner_rect(&self) -> Option<Rect> {
        let banner = self.banner.as_ref()?;
        let content = self.content_rect();
        Some(Rect::new(
            content.x,
            content.y,
            content.width,
            Pt::from_mm(banner.height_mm),
        ))
    }

    /// Where blocks flow: the content rectangle below the banner.
    pub fn frame_rect(&self) -> Rect {
        let content = self.content_rect();
        let Some(banner) = self.banner_rect() else {
            return content;
        };
        let taken = banner.height + Pt::from_mm(BANNER_SPACING_MM);
        Rect::new(
            content.x,
            content.y + taken,
            content.width,
            (content.height - taken).max(Pt::ZERO),
        )
    }

    pub fn instantiate_frame(&self) -> Frame {
        Frame::new(self.frame_rect()).with_gap(self.block_gap)
    }

    /// Draws the fixed page furniture: logo on the left, title and contact
    /// lines centred, a rule underneath.
    pub fn draw_page(&self, surface: &mut dyn Surface) {
        let (Some(banner), Some(rect)) = (self.banner.as_ref(), self.banner_rect()) else {
            return;
        };
        surface.save_state();
        if let Some(logo) = banner.logo.as_deref() {
            let side = Pt::from_mm(banner.logo_width_mm).min(rect.height);
            surface.draw_image(Rect::new(rect.x, rect.y, side, side), logo);
        }

        let title_size = Pt::from_f32(banner.title_font_size);
        let title_height = title_size.mul_ratio(3, 2);
        surface.set_fill_color(Color::BLACK);
        surface.set_font(HELVETICA_BOLD, title_size);
        surface.draw_text(
            Rect::new(rect.x, rect.y, rect.width, title_height),
            TextAlign::Center,
            &banner.title,
        );

        let line_size = Pt::from_f32(banner.contact_font_size);
        let line_height = line_size.mul_ratio(4, 3);
        surface.set_font(HELVETICA, line_size);
        let mut y = rect.y + title_height;
        for line in &banner.contact_lines {
            if y + line_height > rect.bottom() {
                break;
            }
            surface.draw_text(
                Rect::new(rect.x, y, rect.width, line_height),
                TextAlign::Center,
                line,
            );
            y += line_height;
        }

        surface.fill_rect(Rect::new(
            rect.x,
            rect.bottom() - Pt::from_f32(1.0),
            rect.width,
            Pt::from_f32(1.0),
        ));
        surface.restore_state();
    }
}
