use std::path::Path;

use base64::Engine;
use image::GenericImageView;

use crate::error::PriceListError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Other,
}

impl AssetKind {
    fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|v| v.to_str()) else {
            return AssetKind::Other;
        };
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => AssetKind::Image,
            _ => AssetKind::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub kind: AssetKind,
    pub data: Vec<u8>,
}

impl Asset {
    pub fn new(name: impl Into<String>, kind: AssetKind, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
        }
    }

    pub fn from_file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, PriceListError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(Self::new(name, AssetKind::from_path(path), data))
    }

    /// Accepts `data:image/png;base64,...` style URIs.
    pub fn from_data_uri(name: impl Into<String>, uri: &str) -> Result<Self, PriceListError> {
        let Some(rest) = uri.strip_prefix("data:") else {
            return Err(PriceListError::Asset("not a data: URI".to_string()));
        };
        let Some((header, payload)) = rest.split_once(',') else {
            return Err(PriceListError::Asset("data: URI without payload".to_string()));
        };
        let mime = header.split(';').next().unwrap_or("");
        let data = if header.contains("base64") {
            base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|err| PriceListError::Asset(format!("bad base64 payload: {err}")))?
        } else {
            payload.as_bytes().to_vec()
        };
        let kind = if mime.starts_with("image/") {
            AssetKind::Image
        } else {
            AssetKind::Other
        };
        Ok(Self::new(name, kind, data))
    }

    pub fn bytes_len(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    pub assets: Vec<Asset>,
}

impl AssetBundle {
    // Later assets shadow earlier ones with the same name.
    pub fn add(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().rev().find(|asset| asset.name == name)
    }

    pub fn image_assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets
            .iter()
            .filter(|asset| asset.kind == AssetKind::Image)
    }

    pub fn total_bytes(&self) -> usize {
        self.assets.iter().map(Asset::bytes_len).sum()
    }
}

/// Pixel data ready to embed as a PDF image XObject.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ImageData {
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    pub filter: Option<&'static str>,
    pub data: Vec<u8>,
}

// JPEG passes through untouched; anything else is flattened to 8-bit RGB.
pub(crate) fn decode_image(asset: &Asset) -> Result<ImageData, PriceListError> {
    let format = image::guess_format(&asset.data)
        .map_err(|err| PriceListError::Asset(format!("{}: {err}", asset.name)))?;
    let decoded = image::load_from_memory(&asset.data)
        .map_err(|err| PriceListError::Asset(format!("{}: {err}", asset.name)))?;
    let (width, height) = decoded.dimensions();

    if format == image::ImageFormat::Jpeg {
        let color_space = match decoded.color() {
            image::ColorType::L8 | image::ColorType::La8 => "/DeviceGray",
            _ => "/DeviceRGB",
        };
        return Ok(ImageData {
            width,
            height,
            color_space,
            filter: Some("/DCTDecode"),
            data: asset.data.clone(),
        });
    }

    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity(rgb_buffer_len(&asset.name, width, height)?);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        // Composite onto white; the page background is white.
        let blend = |c: u8| -> u8 {
            ((c as u32 * a as u32 + 255 * (255 - a as u32)) / 255) as u8
        };
        rgb.extend_from_slice(&[blend(r), blend(g), blend(b)]);
    }
    Ok(ImageData {
        width,
        height,
        color_space: "/DeviceRGB",
        filter: None,
        data: rgb,
    })
}

fn rgb_buffer_len(name: &str, width: u32, height: u32) -> Result<usize, PriceListError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or_else(|| {
            PriceListError::Asset(format!("image {name:?} is too large ({width}x{height})"))
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn tiny_png() -> Vec<u8> {
        let mut img = image::RgbaImage::new(2, 2);
        for (x, _y, pixel) in img.enumerate_pixels_mut() {
            *pixel = if x == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 0])
            };
        }
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn data_uri_round_trips_through_base64() {
        let png = tiny_png();
        let uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );
        let asset = Asset::from_data_uri("logo", &uri).expect("asset");
        assert_eq!(asset.kind, AssetKind::Image);
        assert_eq!(asset.data, png);
        assert!(Asset::from_data_uri("x", "http://example.com/logo.png").is_err());
    }

    #[test]
    fn png_decodes_to_rgb_over_white() {
        let asset = Asset::new("logo", AssetKind::Image, tiny_png());
        let image = decode_image(&asset).expect("decode");
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.filter, None);
        assert_eq!(&image.data[0..3], &[255, 0, 0]);
        assert_eq!(&image.data[3..6], &[255, 255, 255]);
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_allocating() {
        assert_eq!(rgb_buffer_len("logo", 2, 2).expect("small"), 12);
        assert!(matches!(
            rgb_buffer_len("logo", u32::MAX, u32::MAX),
            Err(PriceListError::Asset(message)) if message.contains("too large")
        ));
    }

    #[test]
    fn garbage_is_an_asset_error() {
        let asset = Asset::new("logo", AssetKind::Image, b"not an image".to_vec());
        assert!(matches!(decode_image(&asset), Err(PriceListError::Asset(_))));
    }

    #[test]
    fn later_assets_shadow_earlier_ones() {
        let mut bundle = AssetBundle::default();
        bundle.add(Asset::new("logo", AssetKind::Other, vec![1]));
        bundle.add(Asset::new("logo", AssetKind::Image, vec![2, 3]));
        assert_eq!(bundle.get("logo").map(|a| a.data.clone()), Some(vec![2, 3]));
        assert_eq!(bundle.image_assets().count(), 1);
        assert_eq!(bundle.total_bytes(), 3);
        assert!(bundle.get("missing").is_none());
    }
}
