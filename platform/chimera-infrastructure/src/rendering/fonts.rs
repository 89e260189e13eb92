//! Font resolution for the dashboard renderer.
//!
//! `FontProvider::resolve` loads the configured TrueType faces once. When any
//! of them is unavailable every role falls back to the built-in 8x8 bitmap
//! set, so layout code only deals with `ResolvedFont` handles.

use super::theme::{FontRole, FontSizes};
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Pixel, Rgba, RgbaImage};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const BITMAP_CELL: u32 = 8;
const BITMAP_ASCENT: u32 = 7;
const BITMAP_BASE_PX: f32 = 12.0;

const BULLET_GLYPH: [u8; 8] = [0x00, 0x00, 0x18, 0x3c, 0x3c, 0x18, 0x00, 0x00];
const CHECK_GLYPH: [u8; 8] = [0x00, 0x80, 0x40, 0x20, 0x11, 0x0a, 0x04, 0x00];
const CROSS_GLYPH: [u8; 8] = [0x00, 0x42, 0x24, 0x18, 0x18, 0x24, 0x42, 0x00];
const MISSING_GLYPH: [u8; 8] = [0x00, 0x7e, 0x42, 0x42, 0x42, 0x42, 0x7e, 0x00];

fn bitmap_glyph(ch: char) -> [u8; 8] {
    match ch {
        '•' => BULLET_GLYPH,
        '✅' | '✓' | '✔' => CHECK_GLYPH,
        '❌' | '✗' | '✘' => CROSS_GLYPH,
        _ => BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .unwrap_or(MISSING_GLYPH),
    }
}

fn bitmap_has_glyph(ch: char) -> bool {
    matches!(ch, '•' | '✅' | '✓' | '✔' | '❌' | '✗' | '✘')
        || BASIC_FONTS.get(ch).is_some()
        || LATIN_FONTS.get(ch).is_some()
}

fn bitmap_scale(px: f32) -> u32 {
    ((px / BITMAP_BASE_PX).floor() as u32).max(1)
}

fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32).round() as u8;
    if alpha == 0 {
        return;
    }
    let src = Rgba([color[0], color[1], color[2], alpha]);
    canvas.get_pixel_mut(x as u32, y as u32).blend(&src);
}

fn draw_bitmap_glyph(canvas: &mut RgbaImage, glyph: [u8; 8], x: i32, y: i32, scale: u32, color: Rgba<u8>) {
    let scale = scale as i32;
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            if bits & (1 << col) == 0 {
                continue;
            }
            let px = x + col * scale;
            let py = y + row as i32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    blend_pixel(canvas, px + dx, py + dy, color, 1.0);
                }
            }
        }
    }
}

/// A font at a fixed pixel size, ready to measure and draw.
#[derive(Clone)]
pub enum ResolvedFont {
    TrueType { font: Arc<FontVec>, px: f32 },
    Bitmap { scale: u32 },
}

impl fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrueType { px, .. } => f.debug_struct("TrueType").field("px", px).finish(),
            Self::Bitmap { scale } => f.debug_struct("Bitmap").field("scale", scale).finish(),
        }
    }
}

impl ResolvedFont {
    pub fn bitmap(px: f32) -> Self {
        Self::Bitmap {
            scale: bitmap_scale(px),
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, Self::Bitmap { .. })
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self) -> i32 {
        match self {
            Self::TrueType { font, px } => font.as_scaled(PxScale::from(*px)).ascent().ceil() as i32,
            Self::Bitmap { scale } => (BITMAP_ASCENT * scale) as i32,
        }
    }

    /// Width and line height of `text` in pixels.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            Self::TrueType { font, px } => {
                let scaled = font.as_scaled(PxScale::from(*px));
                let fallback = bitmap_scale(*px);
                let mut width = 0.0f32;
                let mut prev: Option<GlyphId> = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if id.0 == 0 && bitmap_has_glyph(ch) {
                        width += (BITMAP_CELL * fallback) as f32;
                        prev = None;
                        continue;
                    }
                    if let Some(prev) = prev {
                        width += scaled.kern(prev, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                (width.ceil().max(0.0) as u32, scaled.height().ceil() as u32)
            }
            Self::Bitmap { scale } => {
                let chars = text.chars().count() as u32;
                (chars * BITMAP_CELL * scale, BITMAP_CELL * scale)
            }
        }
    }

    /// Draws `text` with its line box top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        match self {
            Self::TrueType { font, px } => {
                let scale = PxScale::from(*px);
                let scaled = font.as_scaled(scale);
                let fallback = bitmap_scale(*px);
                let baseline = y as f32 + scaled.ascent();
                let mut caret = x as f32;
                let mut prev: Option<GlyphId> = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if id.0 == 0 && bitmap_has_glyph(ch) {
                        let top = baseline.round() as i32 - (BITMAP_ASCENT * fallback) as i32;
                        draw_bitmap_glyph(canvas, bitmap_glyph(ch), caret.round() as i32, top, fallback, color);
                        caret += (BITMAP_CELL * fallback) as f32;
                        prev = None;
                        continue;
                    }
                    if let Some(prev) = prev {
                        caret += scaled.kern(prev, id);
                    }
                    let glyph = id.with_scale_and_position(scale, point(caret, baseline));
                    caret += scaled.h_advance(id);
                    prev = Some(id);
                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        let origin_x = bounds.min.x.floor() as i32;
                        let origin_y = bounds.min.y.floor() as i32;
                        outlined.draw(|gx, gy, coverage| {
                            blend_pixel(canvas, origin_x + gx as i32, origin_y + gy as i32, color, coverage);
                        });
                    }
                }
            }
            Self::Bitmap { scale } => {
                let advance = (BITMAP_CELL * scale) as i32;
                for (index, ch) in text.chars().enumerate() {
                    draw_bitmap_glyph(canvas, bitmap_glyph(ch), x + index as i32 * advance, y, *scale, color);
                }
            }
        }
    }
}

/// One resolved font per role.
#[derive(Debug, Clone)]
pub struct FontSet {
    bold: ResolvedFont,
    medium: ResolvedFont,
    regular: ResolvedFont,
    small: ResolvedFont,
    tiny: ResolvedFont,
}

impl FontSet {
    pub fn builtin(sizes: &FontSizes) -> Self {
        Self {
            bold: ResolvedFont::bitmap(sizes.bold),
            medium: ResolvedFont::bitmap(sizes.medium),
            regular: ResolvedFont::bitmap(sizes.regular),
            small: ResolvedFont::bitmap(sizes.small),
            tiny: ResolvedFont::bitmap(sizes.tiny),
        }
    }

    pub fn get(&self, role: FontRole) -> &ResolvedFont {
        match role {
            FontRole::Bold => &self.bold,
            FontRole::Medium => &self.medium,
            FontRole::Regular => &self.regular,
            FontRole::Small => &self.small,
            FontRole::Tiny => &self.tiny,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.bold.is_bitmap()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontPaths {
    pub bold: PathBuf,
    pub medium: PathBuf,
    pub regular: PathBuf,
}

impl From<[PathBuf; 3]> for FontPaths {
    fn from([bold, medium, regular]: [PathBuf; 3]) -> Self {
        Self {
            bold,
            medium,
            regular,
        }
    }
}

fn load_face(path: &Path) -> Result<Arc<FontVec>, String> {
    let bytes = std::fs::read(path).map_err(|err| format!("failed to read font {}: {err}", path.display()))?;
    FontVec::try_from_vec(bytes)
        .map(Arc::new)
        .map_err(|err| format!("invalid font {}: {err}", path.display()))
}

pub struct FontProvider;

impl FontProvider {
    pub fn resolve(paths: &FontPaths, sizes: &FontSizes) -> FontSet {
        match Self::load_truetype(paths, sizes) {
            Ok(set) => {
                debug!(bold = %paths.bold.display(), "loaded truetype fonts");
                set
            }
            Err(err) => {
                warn!(error = %err, "font assets unavailable, using built-in bitmap fonts");
                FontSet::builtin(sizes)
            }
        }
    }

    fn load_truetype(paths: &FontPaths, sizes: &FontSizes) -> Result<FontSet, String> {
        let bold = load_face(&paths.bold)?;
        let medium = load_face(&paths.medium)?;
        let regular = load_face(&paths.regular)?;
        let face = |font: &Arc<FontVec>, px: f32| ResolvedFont::TrueType {
            font: Arc::clone(font),
            px,
        };
        Ok(FontSet {
            bold: face(&bold, sizes.bold),
            medium: face(&medium, sizes.medium),
            regular: face(&regular, sizes.regular),
            small: face(&regular, sizes.small),
            tiny: face(&regular, sizes.tiny),
        })
    }
}
