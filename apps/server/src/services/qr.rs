//! QR service - scannable images of a business's public profile URL
//!
//! Pure function of business id and size: no store access. Symbols use
//! error-correction level M and a configurable light margin (2 modules by
//! default), rendered square and centred on a `width x height` canvas.

use crate::{config::QrConfig, Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::{fmt::Write as _, io::Cursor, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrFormat {
    #[default]
    Png,
    Svg,
}

impl FromStr for QrFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(QrFormat::Png),
            "svg" => Ok(QrFormat::Svg),
            other => Err(Error::Validation(format!(
                "Format must be either \"png\" or \"svg\", got \"{other}\""
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrImage {
    Png(Vec<u8>),
    Svg(String),
}

impl QrImage {
    pub fn content_type(&self) -> &'static str {
        match self {
            QrImage::Png(_) => "image/png",
            QrImage::Svg(_) => "image/svg+xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            QrImage::Png(_) => "png",
            QrImage::Svg(_) => "svg",
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            QrImage::Png(bytes) => bytes,
            QrImage::Svg(markup) => markup.into_bytes(),
        }
    }
}

/// True for the canonical lowercase hyphenated UUID shape (8-4-4-4-12 hex).
pub fn is_valid_id(id: &str) -> bool {
    if id.len() != 36 {
        return false;
    }
    id.bytes().enumerate().all(|(i, b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
    })
}

pub struct QrService {
    base_url: String,
    config: QrConfig,
}

impl QrService {
    pub fn new(base_url: impl Into<String>, config: QrConfig) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, config }
    }

    pub fn profile_url(&self, business_id: &str) -> String {
        format!("{}/business/{}", self.base_url, business_id)
    }

    pub fn is_valid_id(&self, business_id: &str) -> bool {
        is_valid_id(business_id)
    }

    /// Render using configured defaults for any size not given.
    pub fn generate(
        &self,
        business_id: &str,
        width: Option<u32>,
        height: Option<u32>,
        format: QrFormat,
    ) -> Result<QrImage> {
        let width = width.unwrap_or(self.config.default_width);
        let height = height.unwrap_or(self.config.default_height);
        self.check_dimension("width", width)?;
        self.check_dimension("height", height)?;

        match format {
            QrFormat::Png => self.generate_png(business_id, width, height).map(QrImage::Png),
            QrFormat::Svg => self.generate_svg(business_id, width, height).map(QrImage::Svg),
        }
    }

    pub fn generate_png(&self, business_id: &str, width: u32, height: u32) -> Result<Vec<u8>> {
        let code = self.encode(business_id)?;
        let canvas = self.rasterize(&code, width, height);

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(canvas)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| Error::QrGeneration(format!("PNG encoding failed: {e}")))?;
        Ok(bytes)
    }

    /// PNG as an embeddable `data:` URL.
    pub fn generate_data_url(&self, business_id: &str, width: u32, height: u32) -> Result<String> {
        let png = self.generate_png(business_id, width, height)?;
        Ok(format!(
            "data:image/png;base64,{}",
            BASE64_STANDARD.encode(png)
        ))
    }

    pub fn generate_svg(&self, business_id: &str, width: u32, height: u32) -> Result<String> {
        let code = self.encode(business_id)?;
        let modules = code.width();
        let margin = self.config.margin as usize;
        let total = modules + 2 * margin;
        let colors = code.to_colors();

        let mut path = String::new();
        for y in 0..modules {
            let row = &colors[y * modules..(y + 1) * modules];
            let mut x = 0;
            while x < modules {
                if row[x] != Color::Dark {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < modules && row[x] == Color::Dark {
                    x += 1;
                }
                let run = x - start;
                // Writing to a String cannot fail.
                let _ = write!(
                    path,
                    "M{} {}h{}v1h-{}z",
                    start + margin,
                    y + margin,
                    run,
                    run
                );
            }
        }

        Ok(format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {t} {t}" shape-rendering="crispEdges">"#,
                r##"<rect width="{t}" height="{t}" fill="#ffffff"/>"##,
                r##"<path fill="#000000" d="{d}"/>"##,
                "</svg>"
            ),
            w = width,
            h = height,
            t = total,
            d = path
        ))
    }

    fn encode(&self, business_id: &str) -> Result<QrCode> {
        let url = self.profile_url(business_id);
        QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M).map_err(|e| {
            Error::QrGeneration(format!("Failed to encode '{url}': {e}"))
        })
    }

    fn check_dimension(&self, name: &str, value: u32) -> Result<()> {
        let (min, max) = (self.config.min_width, self.config.max_width);
        if !(min..=max).contains(&value) {
            return Err(Error::Validation(format!(
                "{name} must be between {min} and {max}"
            )));
        }
        Ok(())
    }

    /// Nearest-neighbour scale of the symbol (plus margin) onto a light canvas.
    ///
    /// The symbol side is `min(width, height)` but never less than one pixel
    /// per module; the canvas grows to fit when that floor applies.
    fn rasterize(&self, code: &QrCode, width: u32, height: u32) -> GrayImage {
        let modules = code.width();
        let margin = self.config.margin as usize;
        let total = (modules + 2 * margin) as u32;
        let colors = code.to_colors();

        let side = width.min(height).max(total);
        let canvas_w = width.max(side);
        let canvas_h = height.max(side);
        let off_x = (canvas_w - side) / 2;
        let off_y = (canvas_h - side) / 2;

        let mut canvas = GrayImage::from_pixel(canvas_w, canvas_h, Luma([255]));
        for py in 0..side {
            let my = (py as usize * total as usize) / side as usize;
            if my < margin || my >= margin + modules {
                continue;
            }
            for px in 0..side {
                let mx = (px as usize * total as usize) / side as usize;
                if mx < margin || mx >= margin + modules {
                    continue;
                }
                if colors[(my - margin) * modules + (mx - margin)] == Color::Dark {
                    canvas.put_pixel(off_x + px, off_y + py, Luma([0]));
                }
            }
        }
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn service() -> QrService {
        QrService::new("https://verify.example.sl/", QrConfig::default())
    }

    fn decode_png(png: &[u8]) -> String {
        let img = image::load_from_memory(png).unwrap().to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            img.width() as usize,
            img.height() as usize,
            |x, y| img.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
        let (_meta, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn id_shape_check() {
        assert!(is_valid_id(VALID_ID));
        assert!(!is_valid_id("not-a-uuid"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("123E4567-E89B-12D3-A456-426614174000"));
        assert!(!is_valid_id("123e4567e89b-12d3-a456-426614174000-"));
        assert!(!is_valid_id("123e4567-e89b-12d3-a456-42661417400g"));
    }

    #[test]
    fn profile_url_joins_base_and_id() {
        assert_eq!(
            service().profile_url(VALID_ID),
            format!("https://verify.example.sl/business/{VALID_ID}")
        );
    }

    #[test]
    fn png_scans_back_to_profile_url() {
        let qr = service();
        let png = qr.generate_png(VALID_ID, 300, 300).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (300, 300));
        assert_eq!(decode_png(&png), qr.profile_url(VALID_ID));
    }

    #[test]
    fn rectangular_canvas_keeps_square_symbol() {
        let qr = service();
        let png = qr.generate_png(VALID_ID, 400, 240).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (400, 240));
        assert_eq!(decode_png(&png), qr.profile_url(VALID_ID));
    }

    #[test]
    fn tiny_sizes_fall_back_to_one_pixel_per_module() {
        let qr = service();
        let png = qr.generate_png(VALID_ID, 8, 8).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert!(img.width() > 8);
        assert_eq!(img.width(), img.height());
    }

    #[test]
    fn svg_markup_has_viewbox_and_path() {
        let svg = service().generate_svg(VALID_ID, 300, 300).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"width="300" height="300""#));
        assert!(svg.contains("viewBox=\"0 0 "));
        assert!(svg.contains("<path fill=\"#000000\" d=\"M"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn data_url_wraps_png() {
        let url = service().generate_data_url(VALID_ID, 300, 300).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBOR"));
    }

    #[test]
    fn dimensions_outside_bounds_are_rejected() {
        let qr = service();
        let err = qr
            .generate(VALID_ID, Some(10_000), None, QrFormat::Png)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let image = qr.generate(VALID_ID, None, None, QrFormat::Svg).unwrap();
        assert_eq!(image.content_type(), "image/svg+xml");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("PNG".parse::<QrFormat>().unwrap(), QrFormat::Png);
        assert_eq!("svg".parse::<QrFormat>().unwrap(), QrFormat::Svg);
        assert!("gif".parse::<QrFormat>().is_err());
    }
}
