//! PNG output.
//!
//! Label maps are palette images: one byte per pixel holding a palette
//! slot, written as colour type 3 with a `tRNS` chunk when a slot is
//! translucent. Charts and concentration maps are RGBA and go through
//! `image`'s encoder.

use crate::gradient::Color;
use crate::{RenderError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};
use std::io::Write;
use std::path::Path;
use tracing::debug;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Largest palette a colour type 3 PNG can carry.
pub const MAX_PALETTE_SIZE: usize = 256;

/// Anything that can be written as a PNG file.
pub trait EncodePng {
    fn encode_png(&self) -> Result<Vec<u8>>;
}

impl EncodePng for RgbaImage {
    fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new_with_quality(&mut bytes, CompressionType::Fast, FilterType::Adaptive)
            .write_image(self.as_raw(), self.width(), self.height(), ColorType::Rgba8)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// Raster of palette slots.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    palette: Vec<Color>,
    indices: Vec<u8>,
}

impl IndexedImage {
    /// `indices` is row-major and every entry must name a palette slot.
    pub fn new(width: u32, height: u32, palette: Vec<Color>, indices: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(RenderError::Encode(format!(
                "{} indices for a {}x{} image",
                indices.len(),
                width,
                height
            )));
        }
        if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
            return Err(RenderError::Palette(format!(
                "{} colours, expected 1..={}",
                palette.len(),
                MAX_PALETTE_SIZE
            )));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(RenderError::Palette(format!(
                "slot {} outside a {} colour palette",
                bad,
                palette.len()
            )));
        }
        Ok(Self {
            width,
            height,
            palette,
            indices,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// Palette slot at pixel `(x, y)`.
    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.indices[y as usize * self.width as usize + x as usize]
    }

    pub fn color_at(&self, x: u32, y: u32) -> Color {
        self.palette[self.index_at(x, y) as usize]
    }

    /// Expand to RGBA, e.g. to draw over the map.
    pub fn to_rgba(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| Rgba::from(self.color_at(x, y)))
    }
}

impl EncodePng for IndexedImage {
    fn encode_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::from(SIGNATURE);

        let mut ihdr = Vec::with_capacity(13);
        ihdr.extend_from_slice(&self.width.to_be_bytes());
        ihdr.extend_from_slice(&self.height.to_be_bytes());
        // 8-bit palette slots, deflate, adaptive filtering, no interlace
        ihdr.extend_from_slice(&[8, 3, 0, 0, 0]);
        write_chunk(&mut png, b"IHDR", &ihdr);

        let plte: Vec<u8> = self.palette.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
        write_chunk(&mut png, b"PLTE", &plte);

        if self.palette.iter().any(|c| c.a < 255) {
            let trns: Vec<u8> = self.palette.iter().map(|c| c.a).collect();
            write_chunk(&mut png, b"tRNS", &trns);
        }

        let width = self.width as usize;
        let mut scanlines = Vec::with_capacity(self.indices.len() + self.height as usize);
        if width > 0 {
            for row in self.indices.chunks_exact(width) {
                scanlines.push(0);
                scanlines.extend_from_slice(row);
            }
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&scanlines)?;
        write_chunk(&mut png, b"IDAT", &encoder.finish()?);

        write_chunk(&mut png, b"IEND", &[]);
        Ok(png)
    }
}

/// Length, type, data and the CRC of type plus data.
fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);
    png.extend_from_slice(&crc.finalize().to_be_bytes());
}

/// Encode `image` and write it to `path`.
pub fn save_png(path: impl AsRef<Path>, image: &impl EncodePng) -> Result<()> {
    let path = path.as_ref();
    let bytes = image.encode_png()?;
    std::fs::write(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote PNG");
    Ok(())
}
