#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub page_number: usize,
    pub render_ms: f64,
    pub command_count: usize,
    pub block_count: usize,
    /// Height left unused at the bottom of the frame, in points.
    pub free_height: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub total_render_ms: f64,
    pub page_breaks: usize,
}

impl DocumentMetrics {
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|page| page.block_count).sum()
    }

    pub fn blocks_per_page(&self) -> Vec<usize> {
        self.pages.iter().map(|page| page.block_count).collect()
    }
}
