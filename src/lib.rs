mod actions;
mod assets;
mod canvas;
mod debug;
mod document;
mod error;
mod events;
mod flowable;
mod font;
mod frame;
mod layout;
mod manager;
mod metrics;
mod model;
mod ordinal;
mod page_template;
mod paginator;
mod pdf;
mod pdfinspect;
mod renumber;
mod story;
mod types;
mod view_state;

pub use actions::{ActionKind, ActionTable};
pub use assets::{Asset, AssetBundle, AssetKind};
pub use canvas::{Canvas, Command, Page, PrintedDocument, Surface, TextAlign};
use debug::DebugLogger;
pub use document::{Document, Navigation, Prompt};
pub use error::PriceListError;
pub use events::{DocumentEvent, EventQueue, Observer};
pub use flowable::{Flowable, GridMetrics, Heading, SizeRateGrid, Spacer, segment_columns};
pub use font::{HELVETICA, HELVETICA_BOLD, measure_text_width};
pub use frame::{AddResult, Frame};
pub use layout::{BannerConfig, LayoutConfig};
pub use manager::{ActionOutcome, PriceListManager};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use model::{
    Change, ClothId, ClothNode, DEFAULT_RATE, DEFAULT_SIZES, GarmentSize, NodeKey, PriceListId,
    PriceListNode, Rate, SizeRate, SizeRateTable, TypeNode, TypeNodeId, UNTITLED_CLOTH,
    UNTITLED_PRICE_LIST, UNTITLED_TYPE,
};
pub use ordinal::{OrdinalStyle, ROMAN_MAX, from_roman, to_letters, to_roman};
pub use page_template::PageTemplate;
pub use paginator::{META_PAGE_TEMPLATE_KEY, Paginator};
pub use pdf::PDF_VERSION;
pub use pdfinspect::{PdfInspectReport, inspect_pdf_bytes, inspect_pdf_path};
pub use renumber::{RenumberStats, renumber};
pub use story::{build_story, cloth_label, price_list_title, type_label};
pub use types::{Color, Margins, Pt, Rect, Size};
pub use view_state::ViewState;

use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_PDF_TITLE: &str = "Price List";

/// Renders a [`Document`] onto fixed-size pages and encodes them as PDF.
pub struct PriceListPrinter {
    page_size: Size,
    margins: Margins,
    layout: LayoutConfig,
    assets: AssetBundle,
    title: Option<String>,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Clone)]
pub struct PriceListPrinterBuilder {
    page_size: Option<Size>,
    margins: Option<Margins>,
    layout: LayoutConfig,
    layout_path: Option<PathBuf>,
    banner: Option<BannerConfig>,
    asset_bundle: AssetBundle,
    title: Option<String>,
    debug_path: Option<PathBuf>,
}

impl PriceListPrinter {
    pub fn builder() -> PriceListPrinterBuilder {
        PriceListPrinterBuilder::new()
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn assets(&self) -> &AssetBundle {
        &self.assets
    }

    pub(crate) fn debug(&self) -> Option<Arc<DebugLogger>> {
        self.debug.clone()
    }

    fn paginator(&self) -> Paginator {
        let template = PageTemplate::new("price-list", self.page_size, self.margins)
            .with_banner(self.layout.banner.clone())
            .with_block_gap(self.layout.block_gap());
        let paginator = Paginator::new(template);
        match &self.debug {
            Some(debug) => paginator.with_debug(debug.clone()),
            None => paginator,
        }
    }

    /// Runs the paginator once over the whole document.
    pub fn print_with_metrics(&self, document: &Document) -> (PrintedDocument, DocumentMetrics) {
        let story = build_story(document.price_lists(), &self.layout);
        let result = self.paginator().paginate(story);
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary("print");
            logger.flush();
        }
        result
    }

    pub fn print(&self, document: &Document) -> PrintedDocument {
        self.print_with_metrics(document).0
    }

    pub fn render_pdf(&self, printed: &PrintedDocument) -> Result<Vec<u8>, PriceListError> {
        let title = self.title.as_deref().unwrap_or(DEFAULT_PDF_TITLE);
        pdf::render_pdf(printed, &self.assets, Some(title))
    }

    pub fn print_pdf(&self, document: &Document) -> Result<Vec<u8>, PriceListError> {
        self.render_pdf(&self.print(document))
    }

    pub fn write_pdf(
        &self,
        document: &Document,
        path: impl AsRef<Path>,
    ) -> Result<(), PriceListError> {
        let bytes = self.print_pdf(document)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for PriceListPrinterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceListPrinterBuilder {
    pub fn new() -> Self {
        Self {
            page_size: None,
            margins: None,
            layout: LayoutConfig::default(),
            layout_path: None,
            banner: None,
            asset_bundle: AssetBundle::default(),
            title: None,
            debug_path: None,
        }
    }

    /// Overrides the page size given by the layout.
    pub fn page_size(mut self, size: Size) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Overrides the margins given by the layout.
    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = Some(margins);
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// JSON layout read at build time; takes precedence over [`Self::layout`].
    /// A missing file falls back to the defaults.
    pub fn layout_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.layout_path = Some(path.into());
        self
    }

    pub fn banner(mut self, banner: BannerConfig) -> Self {
        self.banner = Some(banner);
        self
    }

    pub fn register_asset(mut self, asset: Asset) -> Self {
        self.asset_bundle.add(asset);
        self
    }

    pub fn register_bundle(mut self, bundle: AssetBundle) -> Self {
        self.asset_bundle = bundle;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Writes JSON-lines debug events to `path`.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<PriceListPrinter, PriceListError> {
        let debug = if let Some(path) = self.debug_path {
            Some(Arc::new(DebugLogger::new(path)?))
        } else {
            None
        };
        let mut layout = match &self.layout_path {
            Some(path) => LayoutConfig::load_or_default(path, debug.as_deref())?,
            None => self.layout,
        };
        if let Some(banner) = self.banner {
            layout.banner = Some(banner);
        }

        let page_size = self.page_size.unwrap_or_else(|| layout.page_size());
        if page_size.width <= Pt::ZERO || page_size.height <= Pt::ZERO {
            return Err(PriceListError::InvalidConfiguration(
                "page size must be positive".to_string(),
            ));
        }
        let margins = self.margins.unwrap_or_else(|| layout.margins());
        layout.validate(margins.content_rect(page_size))?;

        if let Some(logo) = layout.banner.as_ref().and_then(|b| b.logo.as_deref()) {
            let asset = self.asset_bundle.get(logo).ok_or_else(|| {
                PriceListError::Asset(format!("banner logo {logo:?} is not a registered asset"))
            })?;
            assets::decode_image(asset)?;
        }

        Ok(PriceListPrinter {
            page_size,
            margins,
            layout,
            assets: self.asset_bundle,
            title: self.title,
            debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::tests::{read_lines, temp_log_path};

    fn sample_document() -> Document {
        let mut doc = Document::new();
        let pl = doc.add_price_list("Spring");
        let cloth = doc.add_cloth(pl, "Cotton").expect("cloth");
        let round = doc.add_type(cloth, "Round Neck").expect("type");
        doc.add_type(cloth, "V-Neck").expect("type");
        doc.set_rate(round, 0, "250").expect("rate");
        doc.save();
        doc
    }

    #[test]
    fn prints_titles_labels_and_grids() {
        let printer = PriceListPrinter::builder().build().expect("printer");
        let printed = printer.print(&sample_document());
        assert_eq!(printed.page_count(), 1);
        let texts: Vec<&str> = printed.pages[0].texts().collect();
        assert_eq!(texts[0], "PRICE LIST-(1) Spring");
        assert_eq!(texts[1], "[A. Cotton]");
        assert_eq!(texts[2], "I. Round Neck");
        assert_eq!(&texts[3..5], &["Size", "20"]);
        assert!(texts.contains(&"250"));
        assert!(texts.contains(&"II. V-Neck"));
    }

    #[test]
    fn blocks_never_cross_the_bottom_margin() {
        let mut doc = Document::new();
        let pl = doc.add_price_list("Big");
        for c in 0..6 {
            let cloth = doc.add_cloth(pl, format!("cloth {c}")).expect("cloth");
            for t in 0..5 {
                doc.add_type(cloth, format!("type {t}")).expect("type");
            }
        }
        let printer = PriceListPrinter::builder().build().expect("printer");
        let (printed, metrics) = printer.print_with_metrics(&doc);
        assert!(printed.page_count() > 1);
        assert_eq!(metrics.pages.len(), printed.page_count());
        let limit = printer.page_size().height - printer.margins().bottom;
        for (page, page_metrics) in printed.pages.iter().zip(&metrics.pages) {
            // Per-block rounding may overshoot by a thousandth of a point each.
            let limit = limit + Pt::from_f32(0.001) * page_metrics.block_count as i32;
            let mut offset_y = Pt::ZERO;
            for cmd in &page.commands {
                match cmd {
                    Command::Translate(_, y) => offset_y = *y,
                    Command::RestoreState => offset_y = Pt::ZERO,
                    Command::DrawText { y, height, .. } | Command::DrawRect { y, height, .. } => {
                        assert!(offset_y + *y + *height <= limit);
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn pdf_page_count_matches_paginator() {
        let mut doc = Document::new();
        for p in 0..3 {
            let pl = doc.add_price_list(format!("list {p}"));
            for c in 0..4 {
                let cloth = doc.add_cloth(pl, format!("cloth {c}")).expect("cloth");
                for t in 0..4 {
                    doc.add_type(cloth, format!("type {t}")).expect("type");
                }
            }
        }
        let printer = PriceListPrinter::builder().title("Prices").build().expect("printer");
        let printed = printer.print(&doc);
        let bytes = printer.render_pdf(&printed).expect("pdf");
        let report = inspect_pdf_bytes(&bytes).expect("inspect");
        assert_eq!(report.page_count, printed.page_count());
        assert!(report.page_count > 1);
    }

    #[test]
    fn printing_is_deterministic() {
        let printer = PriceListPrinter::builder().build().expect("printer");
        let doc = sample_document();
        assert_eq!(
            printer.print(&doc).fingerprint(),
            printer.print(&doc).fingerprint()
        );
    }

    #[test]
    fn builder_rejects_layout_wider_than_the_page() {
        let err = match PriceListPrinter::builder()
            .layout(LayoutConfig {
                column_width_mm: 20.0,
                ..LayoutConfig::default()
            })
            .build()
        {
            Ok(_) => panic!("13 columns of 20mm cannot fit on A4"),
            Err(err) => err,
        };
        assert!(matches!(err, PriceListError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("content width"));
    }

    #[test]
    fn builder_requires_registered_logo() {
        let banner = BannerConfig {
            title: "Tailors".to_string(),
            logo: Some("logo".to_string()),
            ..BannerConfig::default()
        };
        let err = match PriceListPrinter::builder().banner(banner.clone()).build() {
            Ok(_) => panic!("logo asset is missing"),
            Err(err) => err,
        };
        assert!(matches!(err, PriceListError::Asset(_)));

        let printer = PriceListPrinter::builder()
            .banner(banner)
            .register_asset(Asset::new("logo", AssetKind::Image, assets::tests::tiny_png()))
            .build()
            .expect("printer");
        let bytes = printer.print_pdf(&sample_document()).expect("pdf");
        let report = inspect_pdf_bytes(&bytes).expect("inspect");
        assert_eq!(report.image_count, 1);
    }

    #[test]
    fn explicit_page_size_and_margins_override_layout() {
        let printer = PriceListPrinter::builder()
            .page_size(Size::letter())
            .margins(Margins::all_mm(12.0))
            .build()
            .expect("printer");
        assert_eq!(printer.page_size(), Size::letter());
        assert_eq!(printer.margins(), Margins::all_mm(12.0));
        assert_eq!(printer.print(&Document::new()).page_size, Size::letter());
    }

    #[test]
    fn missing_layout_file_uses_defaults_and_logs() {
        let log_path = temp_log_path("printer_layout");
        let missing = std::env::temp_dir().join("pricelist_missing_layout_for_printer.json");
        let printer = PriceListPrinter::builder()
            .layout_file(&missing)
            .debug_log(&log_path)
            .build()
            .expect("printer");
        assert_eq!(printer.layout(), &LayoutConfig::default());
        printer.print(&sample_document());
        let lines = read_lines(&log_path);
        assert_eq!(lines[0]["type"], "layout.fallback");
        let summary = lines.last().expect("summary");
        assert_eq!(summary["type"], "debug.summary");
        assert_eq!(summary["context"], "print");
        assert_eq!(summary["counts"]["paginate.pages"], 1);
    }

    #[test]
    fn write_pdf_creates_a_readable_file() {
        let path = temp_log_path("write_pdf").with_extension("pdf");
        let printer = PriceListPrinter::builder().build().expect("printer");
        printer.write_pdf(&sample_document(), &path).expect("write");
        let report = inspect_pdf_path(&path).expect("inspect");
        assert_eq!(report.page_count, 1);
        let _ = std::fs::remove_file(&path);
    }
}
