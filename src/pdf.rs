use std::collections::BTreeMap;

use crate::assets::{AssetBundle, ImageData, decode_image};
use crate::canvas::{Command, DEFAULT_FONT, DEFAULT_FONT_SIZE, Page, PrintedDocument, TextAlign};
use crate::error::PriceListError;
use crate::font::{self, Base14, HELVETICA, HELVETICA_BOLD};
use crate::types::{Color, Pt};

pub const PDF_VERSION: &str = "1.4";

struct PageResources {
    fonts: BTreeMap<&'static str, String>,
    images: BTreeMap<String, String>,
}

/// Encodes recorded pages as a PDF. Text uses the base-14 Helvetica faces;
/// images are looked up by resource id in `assets`.
pub fn render_pdf(
    doc: &PrintedDocument,
    assets: &AssetBundle,
    title: Option<&str>,
) -> Result<Vec<u8>, PriceListError> {
    let mut image_ids: Vec<String> = Vec::new();
    for page in &doc.pages {
        for cmd in &page.commands {
            if let Command::DrawImage { resource_id, .. } = cmd {
                if !image_ids.contains(resource_id) {
                    image_ids.push(resource_id.clone());
                }
            }
        }
    }
    let mut images: Vec<ImageData> = Vec::with_capacity(image_ids.len());
    for id in &image_ids {
        let asset = assets
            .get(id)
            .ok_or_else(|| PriceListError::Asset(format!("missing image asset: {id}")))?;
        images.push(decode_image(asset)?);
    }

    // 1 catalog, 2 pages, 3 info, 4-5 fonts, then images, then page/content pairs.
    let catalog_id = 1;
    let pages_id = 2;
    let info_id = 3;
    let font_ids = [(HELVETICA, 4usize), (HELVETICA_BOLD, 5usize)];
    let first_image_id = 6;
    let first_page_id = first_image_id + images.len();

    let resources = PageResources {
        fonts: font_ids
            .iter()
            .enumerate()
            .map(|(index, (name, _))| (*name, format!("F{}", index + 1)))
            .collect(),
        images: image_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), format!("Im{}", index + 1)))
            .collect(),
    };

    let mut objects: Vec<String> = Vec::new();
    objects.push(format!("<< /Type /Catalog /Pages {} 0 R >>", pages_id));
    let kids = (0..doc.pages.len())
        .map(|index| format!("{} 0 R", first_page_id + index * 2))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids,
        doc.pages.len()
    ));
    objects.push(info_object(title));
    for (name, _) in &font_ids {
        objects.push(font_object(name));
    }
    for image in &images {
        objects.push(image_object(image));
    }

    let font_entries = font_ids
        .iter()
        .map(|(name, id)| format!("/{} {} 0 R", resources.fonts[name], id))
        .collect::<Vec<_>>()
        .join(" ");
    let image_entries = image_ids
        .iter()
        .enumerate()
        .map(|(index, id)| format!("/{} {} 0 R", resources.images[id], first_image_id + index))
        .collect::<Vec<_>>()
        .join(" ");
    let xobjects = if image_entries.is_empty() {
        String::new()
    } else {
        format!(" /XObject << {} >>", image_entries)
    };

    for (index, page) in doc.pages.iter().enumerate() {
        let content_id = first_page_id + index * 2 + 1;
        objects.push(format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources << /Font << {} >>{} >> /Contents {} 0 R >>",
            pages_id,
            fmt_pt(doc.page_size.width),
            fmt_pt(doc.page_size.height),
            font_entries,
            xobjects,
            content_id
        ));
        let content = render_page(page, doc.page_size.height, &resources);
        objects.push(stream_object(&content));
    }

    Ok(build_pdf(objects, catalog_id, info_id))
}

// Our coordinates are top-left origin; PDF user space is bottom-left.
fn render_page(page: &Page, page_height: Pt, resources: &PageResources) -> String {
    let mut out = String::new();
    let mut font_name = DEFAULT_FONT.to_string();
    let mut font_size = Pt::from_f32(DEFAULT_FONT_SIZE);
    let mut stack: Vec<(String, Pt)> = Vec::new();

    for cmd in &page.commands {
        match cmd {
            Command::SaveState => {
                stack.push((font_name.clone(), font_size));
                out.push_str("q\n");
            }
            Command::RestoreState => {
                if let Some((name, size)) = stack.pop() {
                    font_name = name;
                    font_size = size;
                }
                out.push_str("Q\n");
            }
            Command::Translate(x, y) => {
                out.push_str(&format!("1 0 0 1 {} {} cm\n", fmt_pt(*x), fmt_pt(-*y)));
            }
            Command::Meta { .. } => {}
            Command::SetFillColor(color) => out.push_str(&color_to_pdf_fill(*color)),
            Command::SetStrokeColor(color) => out.push_str(&color_to_pdf_stroke(*color)),
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetFontName(name) => font_name = name.clone(),
            Command::SetFontSize(size) => font_size = *size,
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nS\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
            Command::FillRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nf\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
            Command::DrawText {
                x,
                y,
                width,
                height,
                align,
                text,
            } => {
                let face = Base14::resolve(&font_name);
                let text_width = face.measure_text_width(font_size, text);
                let slack = (*width - text_width).max(Pt::ZERO);
                let tx = match align {
                    TextAlign::Left => *x,
                    TextAlign::Center => *x + slack.mul_ratio(1, 2),
                    TextAlign::Right => *x + slack,
                };
                let top = *y + (*height - font_size).mul_ratio(1, 2);
                let baseline = top + font::baseline_offset(font_size);
                let resource = resources
                    .fonts
                    .get(face.name())
                    .map(String::as_str)
                    .unwrap_or("F1");
                out.push_str("BT\n");
                out.push_str(&format!("/{} {} Tf\n", resource, fmt_pt(font_size)));
                out.push_str(&format!(
                    "{} {} Td\n",
                    fmt_pt(tx),
                    fmt_pt(page_height - baseline)
                ));
                out.push_str(&format!("({}) Tj\n", encode_winansi_pdf_string(text)));
                out.push_str("ET\n");
            }
            Command::DrawImage {
                x,
                y,
                width,
                height,
                resource_id,
            } => {
                if let Some(name) = resources.images.get(resource_id) {
                    out.push_str(&format!(
                        "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
                        fmt_pt(*width),
                        fmt_pt(*height),
                        fmt_pt(*x),
                        fmt_pt(page_height - *y - *height),
                        name
                    ));
                }
            }
        }
    }
    out
}

fn info_object(title: Option<&str>) -> String {
    let mut entries = vec!["/Producer (pricelist)".to_string()];
    if let Some(title) = title {
        entries.push(format!("/Title ({})", encode_winansi_pdf_string(title)));
    }
    format!("<< {} >>", entries.join(" "))
}

fn font_object(name: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        name
    )
}

fn image_object(image: &ImageData) -> String {
    let stream_data = encode_stream_data(&image.data);
    let filters = match image.filter {
        Some(filter) => format!("[/ASCIIHexDecode {}]", filter),
        None => "/ASCIIHexDecode".to_string(),
    };
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8 /Length {} /Filter {} >>\nstream\n{}\nendstream",
        image.width,
        image.height,
        image.color_space,
        stream_data.len(),
        filters,
        stream_data
    )
}

fn encode_stream_data(data: &[u8]) -> String {
    let mut hex = ascii_hex_encode(data);
    hex.push('>');
    hex
}

fn ascii_hex_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2 + data.len() / 32);
    for (index, byte) in data.iter().enumerate() {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02X}", byte);
        if index % 32 == 31 {
            out.push('\n');
        }
    }
    out
}

fn stream_object(content: &str) -> String {
    format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        content.len(),
        content
    )
}

fn build_pdf(objects: Vec<String>, catalog_id: usize, info_id: usize) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(format!("%PDF-{}\n", PDF_VERSION).as_bytes());
    out.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (index, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(obj.as_bytes());
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF",
            objects.len() + 1,
            catalog_id,
            info_id,
            xref_start
        )
        .as_bytes(),
    );
    out
}

// Maps to cp1252 and escapes for a literal string; unmappable chars become '?'.
fn encode_winansi_pdf_string(input: &str) -> String {
    let mut out = String::new();
    for ch in input.chars() {
        let byte = match ch {
            '\u{0000}'..='\u{007F}' => ch as u8,
            '\u{00A0}'..='\u{00FF}' => ch as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            _ => b'?',
        };
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if !(0x20..0x7f).contains(&b) => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }
    out
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        format!("{}{}", sign, int_part)
    } else {
        let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
        while s.ends_with('0') {
            s.pop();
        }
        s
    }
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn fmt_unit(value: f32) -> String {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    format_milli((clamped * 1000.0).round() as i64)
}

fn color_to_pdf_fill(color: Color) -> String {
    format!(
        "{} {} {} rg\n",
        fmt_unit(color.r),
        fmt_unit(color.g),
        fmt_unit(color.b)
    )
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!(
        "{} {} {} RG\n",
        fmt_unit(color.r),
        fmt_unit(color.g),
        fmt_unit(color.b)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Asset, AssetKind};
    use crate::canvas::{Canvas, Surface};
    use crate::pdfinspect::inspect_pdf_bytes;
    use crate::types::{Rect, Size};

    fn rect_mm(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(Pt::from_mm(x), Pt::from_mm(y), Pt::from_mm(w), Pt::from_mm(h))
    }

    #[test]
    fn numbers_are_formatted_compactly() {
        assert_eq!(format_milli(0), "0");
        assert_eq!(format_milli(12_000), "12");
        assert_eq!(format_milli(-1_250), "-1.25");
        assert_eq!(fmt_unit(0.9), "0.9");
        assert_eq!(color_to_pdf_fill(Color::WHITE), "1 1 1 rg\n");
    }

    #[test]
    fn strings_are_escaped_and_mapped_to_winansi() {
        assert_eq!(encode_winansi_pdf_string("a(b)\\"), "a\\(b\\)\\\\");
        assert_eq!(encode_winansi_pdf_string("\u{00e9}"), "\\351");
        assert_eq!(encode_winansi_pdf_string("\u{4e2d}"), "?");
    }

    #[test]
    fn text_and_rects_flip_to_bottom_left_origin() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_rect(rect_mm(10.0, 10.0, 20.0, 10.0));
        canvas.set_font(HELVETICA, Pt::from_f32(10.0));
        canvas.draw_text(
            Rect::new(Pt::ZERO, Pt::ZERO, Pt::from_f32(100.0), Pt::from_f32(10.0)),
            TextAlign::Right,
            "Size",
        );
        let doc = canvas.finish();
        let resources = PageResources {
            fonts: [(HELVETICA, "F1".to_string())].into_iter().collect(),
            images: BTreeMap::new(),
        };
        let content = render_page(&doc.pages[0], doc.page_size.height, &resources);
        let flipped_y = doc.page_size.height - Pt::from_mm(10.0) - Pt::from_mm(10.0);
        let expected = format!("28.346 {} 56.693 28.346 re\nS", fmt_pt(flipped_y));
        assert!(content.contains(&expected), "{content}");
        // "Size" is 19.45pt wide at 10pt; right-aligned in 100pt.
        assert!(content.contains("80.55 "), "{content}");
        assert!(content.contains("(Size) Tj"));
    }

    #[test]
    fn pdf_parses_with_one_page_per_recorded_page() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_text(rect_mm(10.0, 10.0, 50.0, 7.0), TextAlign::Left, "one");
        canvas.new_page();
        canvas.draw_text(rect_mm(10.0, 10.0, 50.0, 7.0), TextAlign::Left, "two");
        let doc = canvas.finish();
        let bytes = render_pdf(&doc, &AssetBundle::default(), Some("Prices")).expect("pdf");
        let report = inspect_pdf_bytes(&bytes).expect("inspect");
        assert_eq!(report.page_count, 2);
        assert_eq!(report.pdf_version, PDF_VERSION);
        assert_eq!(report.image_count, 0);
    }

    #[test]
    fn images_are_embedded_once() {
        let mut bundle = AssetBundle::default();
        bundle.add(Asset::new(
            "logo",
            AssetKind::Image,
            crate::assets::tests::tiny_png(),
        ));
        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_image(rect_mm(10.0, 10.0, 20.0, 20.0), "logo");
        canvas.new_page();
        canvas.draw_image(rect_mm(10.0, 10.0, 20.0, 20.0), "logo");
        let doc = canvas.finish();
        let bytes = render_pdf(&doc, &bundle, None).expect("pdf");
        let report = inspect_pdf_bytes(&bytes).expect("inspect");
        assert_eq!(report.page_count, 2);
        assert_eq!(report.image_count, 1);
    }

    #[test]
    fn missing_image_asset_is_an_error() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_image(rect_mm(0.0, 0.0, 5.0, 5.0), "logo");
        let doc = canvas.finish();
        assert!(matches!(
            render_pdf(&doc, &AssetBundle::default(), None),
            Err(PriceListError::Asset(_))
        ));
    }
}
