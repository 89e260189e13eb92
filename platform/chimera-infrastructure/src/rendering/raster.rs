use super::fonts::FontSet;
use super::scene::{Anchor, DrawOp, Scene};
use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use imageproc::drawing::{draw_filled_ellipse_mut, draw_line_segment_mut};
use std::io::Cursor;

/// Executes the scene's draw operations in order on a fresh canvas.
pub fn rasterize(scene: &Scene, chart: Option<&RgbaImage>, fonts: &FontSet) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(scene.width, scene.height, scene.background.rgba());

    for op in &scene.ops {
        match op {
            DrawOp::Text {
                text,
                at,
                role,
                color,
                anchor,
            } => {
                let font = fonts.get(*role);
                let (width, _) = font.measure(text);
                let (x, y) = match anchor {
                    Anchor::LeftTop => *at,
                    Anchor::RightTop => (at.0 - width as i32, at.1),
                    Anchor::RightBaseline => (at.0 - width as i32, at.1 - font.ascent()),
                };
                font.draw(&mut canvas, color.rgba(), x, y, text);
            }
            DrawOp::FilledEllipse { bounds, color } => {
                let [x0, y0, x1, y1] = *bounds;
                let center = ((x0 + x1) / 2, (y0 + y1) / 2);
                draw_filled_ellipse_mut(&mut canvas, center, (x1 - x0) / 2, (y1 - y0) / 2, color.rgba());
            }
            DrawOp::Line { bounds, color } => {
                let [x0, y0, x1, y1] = *bounds;
                draw_line_segment_mut(
                    &mut canvas,
                    (x0 as f32, y0 as f32),
                    (x1 as f32, y1 as f32),
                    color.rgba(),
                );
            }
            DrawOp::Chart { at } => {
                if let Some(chart) = chart {
                    imageops::overlay(&mut canvas, chart, i64::from(at.0), i64::from(at.1));
                }
            }
        }
    }

    canvas
}

/// Encodes the frame as an 8-bit RGB PNG.
pub fn encode_png(frame: RgbaImage) -> Result<Vec<u8>, String> {
    let rgb = DynamicImage::ImageRgba8(frame).into_rgb8();
    let mut bytes = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| format!("failed to encode dashboard png: {err}"))?;
    Ok(bytes)
}
