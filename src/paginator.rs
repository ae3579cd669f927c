use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use crate::canvas::{Canvas, PrintedDocument, Surface};
use crate::debug::DebugLogger;
use crate::flowable::Flowable;
use crate::frame::{AddResult, Frame};
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::page_template::PageTemplate;

pub const META_PAGE_TEMPLATE_KEY: &str = "page_template";

/// Drives a block queue through page frames, opening a new page whenever the
/// next block does not fit in the space left.
pub struct Paginator {
    template: PageTemplate,
    debug: Option<Arc<DebugLogger>>,
}

struct PageState {
    number: usize,
    frame: Frame,
    blocks: usize,
    started: Instant,
}

impl Paginator {
    pub fn new(template: PageTemplate) -> Self {
        Self {
            template,
            debug: None,
        }
    }

    pub(crate) fn with_debug(mut self, debug: Arc<DebugLogger>) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn template(&self) -> &PageTemplate {
        &self.template
    }

    fn log_page_break(&self, from_page: usize, block: &str, needed: f32, remaining: f32) {
        let Some(logger) = self.debug.as_deref() else {
            return;
        };
        logger.log_event(
            "paginate.page_break",
            json!({
                "reason": "frame_overflow",
                "from_page": from_page,
                "to_page": from_page + 1,
                "block": block,
                "needed_pt": needed,
                "remaining_pt": remaining,
            }),
        );
        logger.increment("paginate.page_break", 1);
    }

    fn open_page(&self, canvas: &mut Canvas, number: usize) -> PageState {
        self.template.draw_page(canvas);
        canvas.meta(META_PAGE_TEMPLATE_KEY, &self.template.name);
        PageState {
            number,
            frame: self.template.instantiate_frame(),
            blocks: 0,
            started: Instant::now(),
        }
    }

    fn finish_page(canvas: &mut Canvas, page: &PageState, metrics: &mut DocumentMetrics) {
        let elapsed = page.started.elapsed().as_secs_f64() * 1000.0;
        metrics.total_render_ms += elapsed;
        metrics.pages.push(PageMetrics {
            page_number: page.number,
            render_ms: elapsed,
            command_count: canvas.current_command_count(),
            block_count: page.blocks,
            free_height: page.frame.remaining_height().to_f32(),
        });
        canvas.new_page();
    }

    pub fn paginate(
        &self,
        mut story: VecDeque<Box<dyn Flowable>>,
    ) -> (PrintedDocument, DocumentMetrics) {
        let mut canvas = Canvas::new(self.template.page_size);
        let mut metrics = DocumentMetrics::default();
        let mut page = self.open_page(&mut canvas, 1);

        while let Some(block) = story.pop_front() {
            let name = block.debug_name();
            match page.frame.add(block, &mut canvas) {
                AddResult::Placed(_) => page.blocks += 1,
                AddResult::Overflow(block) => {
                    // The frame was not empty, so the block gets a fresh page.
                    let frame_rect = page.frame.rect();
                    let needed = block.wrap(frame_rect.width, frame_rect.height).height;
                    self.log_page_break(
                        page.number,
                        name,
                        needed.to_f32(),
                        page.frame.remaining_height().to_f32(),
                    );
                    metrics.page_breaks += 1;
                    Self::finish_page(&mut canvas, &page, &mut metrics);
                    page = self.open_page(&mut canvas, page.number + 1);
                    story.push_front(block);
                }
            }
        }
        Self::finish_page(&mut canvas, &page, &mut metrics);

        if let Some(logger) = self.debug.as_deref() {
            logger.increment("paginate.pages", metrics.pages.len() as u64);
            logger.increment("paginate.blocks", metrics.block_count() as u64);
        }
        (canvas.finish(), metrics)
    }
}
