use std::path::Path;

use lopdf::{Document as LoDocument, Object as LoObject};

use crate::error::PriceListError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInspectReport {
    pub pdf_version: String,
    pub page_count: usize,
    pub image_count: usize,
    pub encrypted: bool,
    pub file_size_bytes: usize,
}

pub fn inspect_pdf_bytes(bytes: &[u8]) -> Result<PdfInspectReport, PriceListError> {
    let pdf = LoDocument::load_mem(bytes).map_err(|err| PriceListError::Pdf(err.to_string()))?;

    let image_count = pdf
        .objects
        .values()
        .filter(|object| match object {
            LoObject::Stream(stream) => matches!(
                stream.dict.get(b"Subtype"),
                Ok(LoObject::Name(name)) if name.as_slice() == b"Image"
            ),
            _ => false,
        })
        .count();

    Ok(PdfInspectReport {
        pdf_version: pdf.version.clone(),
        page_count: pdf.get_pages().len(),
        image_count,
        encrypted: pdf.is_encrypted(),
        file_size_bytes: bytes.len(),
    })
}

pub fn inspect_pdf_path(path: &Path) -> Result<PdfInspectReport, PriceListError> {
    let data = std::fs::read(path)?;
    inspect_pdf_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream as LoStream, dictionary};

    fn make_pdf_bytes(pages: usize) -> Vec<u8> {
        let mut doc = LoDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<LoObject> = Vec::new();
        for _ in 0..pages {
            let content_id = doc.add_object(LoStream::new(dictionary! {}, b"".to_vec()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        doc.objects.insert(
            pages_id,
            LoObject::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).expect("save pdf");
        out
    }

    #[test]
    fn reports_version_and_page_count() {
        let bytes = make_pdf_bytes(3);
        let report = inspect_pdf_bytes(&bytes).expect("inspect");
        assert_eq!(report.pdf_version, "1.5");
        assert_eq!(report.page_count, 3);
        assert_eq!(report.image_count, 0);
        assert!(!report.encrypted);
        assert_eq!(report.file_size_bytes, bytes.len());
    }

    #[test]
    fn garbage_is_a_pdf_error() {
        assert!(matches!(
            inspect_pdf_bytes(b"not a pdf"),
            Err(PriceListError::Pdf(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("pricelist_missing_inspect.pdf");
        assert!(matches!(
            inspect_pdf_path(&path),
            Err(PriceListError::Io(_))
        ));
    }
}
