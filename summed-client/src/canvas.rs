use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Size of a surface nothing has been drawn on yet
pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 150;

/// Every overlay is drawn with its baseline starting here, so repeated overlays stack
pub const TEXT_ORIGIN: (f32, f32) = (50.0, 50.0);
pub const FONT_SIZE: f32 = 30.0;
const TEXT_COLOR: [u8; 3] = [0, 0, 0];

const FONT_PATHS: [&str; 5] = [
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Drawable surface for annotating a local image with free text
pub struct ImageCanvas {
    surface: RgbaImage,
    snapshot: Option<String>,
    text: String,
    overlays: Vec<String>,
    font: Option<Font<'static>>,
}

impl ImageCanvas {
    /// Canvas using the first system font found, or placeholder glyphs without one
    pub fn new() -> Self {
        Self::with_font(load_system_font())
    }

    pub fn with_font(font: Option<Font<'static>>) -> Self {
        Self {
            surface: RgbaImage::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            snapshot: None,
            text: String::new(),
            overlays: Vec::new(),
            font,
        }
    }

    /// Decode an image and draw it on a surface of its natural size
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes)?;
        self.surface = image.to_rgba8();
        self.snapshot = Some(to_data_url(&self.surface)?);
        info!(
            "Loaded {}x{} image onto canvas",
            self.surface.width(),
            self.surface.height()
        );
        Ok(())
    }

    pub async fn load_image_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        self.load_image(&bytes)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Draw the text buffer at [`TEXT_ORIGIN`] and clear it.
    ///
    /// There is no layout: every call draws at the same spot, on top of earlier text.
    pub fn overlay_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        match &self.font {
            Some(font) => draw_glyphs(&mut self.surface, font, &text),
            None => draw_placeholder_glyphs(&mut self.surface, &text),
        }
        debug!("Overlaid {} characters", text.chars().count());
        self.overlays.push(text);
    }

    /// Texts drawn so far, in order
    pub fn overlays(&self) -> &[String] {
        &self.overlays
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// PNG data URL of the image as it was loaded, before any overlay
    pub fn data_url(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Current surface, overlays included, as PNG bytes
    pub fn export_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.surface)
    }

    pub async fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.export_png()?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

impl Default for ImageCanvas {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_system_font() -> Option<Font<'static>> {
    for path in FONT_PATHS {
        if let Ok(data) = std::fs::read(path) {
            if let Some(font) = Font::try_from_vec(data) {
                debug!("Loaded canvas font {}", path);
                return Some(font);
            }
        }
    }
    warn!("No system font found, canvas text will be drawn as placeholder boxes");
    None
}

fn encode_png(surface: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(surface.clone())
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

fn to_data_url(surface: &RgbaImage) -> Result<String> {
    let png = encode_png(surface)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

fn draw_glyphs(surface: &mut RgbaImage, font: &Font<'static>, text: &str) {
    let (x, y) = TEXT_ORIGIN;
    let glyphs = font.layout(text, Scale::uniform(FONT_SIZE), point(x, y));

    for glyph in glyphs {
        let Some(bounds) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            blend(
                surface,
                bounds.min.x + gx as i32,
                bounds.min.y + gy as i32,
                coverage,
            );
        });
    }
}

/// One solid box per visible character, sitting on the baseline
fn draw_placeholder_glyphs(surface: &mut RgbaImage, text: &str) {
    let advance = (FONT_SIZE * 0.6) as i32;
    let width = (FONT_SIZE * 0.45) as i32;
    let height = (FONT_SIZE * 0.7) as i32;
    let (x, y) = (TEXT_ORIGIN.0 as i32, TEXT_ORIGIN.1 as i32);

    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        let left = x + i as i32 * advance;
        for px in left..left + width {
            for py in y - height..y {
                blend(surface, px, py, 1.0);
            }
        }
    }
}

/// Paint `TEXT_COLOR` over the pixel with the given coverage, clipping to the surface
fn blend(surface: &mut RgbaImage, x: i32, y: i32, coverage: f32) {
    if x < 0 || y < 0 || x >= surface.width() as i32 || y >= surface.height() as i32 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let Rgba([r, g, b, a]) = *surface.get_pixel(x as u32, y as u32);

    let mix = |dst: u8, src: u8| -> u8 {
        (dst as f32 * (1.0 - coverage) + src as f32 * coverage).round() as u8
    };
    let alpha = (coverage * 255.0 + a as f32 * (1.0 - coverage)).round() as u8;

    surface.put_pixel(
        x as u32,
        y as u32,
        Rgba([
            mix(r, TEXT_COLOR[0]),
            mix(g, TEXT_COLOR[1]),
            mix(b, TEXT_COLOR[2]),
            alpha,
        ]),
    );
}
