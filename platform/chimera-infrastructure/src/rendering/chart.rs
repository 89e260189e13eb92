//! Candlestick chart of the trailing daily bars.

use super::fonts::FontSet;
use super::theme::{FontRole, Theme};
use chimera_domain::services::formatting::group_thousands;
use chimera_domain::value_objects::bar::Bar;
use chrono::DateTime;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

#[derive(Debug, Clone, Copy)]
struct PriceScale {
    low: f64,
    high: f64,
    top: f32,
    bottom: f32,
}

impl PriceScale {
    fn from_bars(bars: &[Bar], top: f32, bottom: f32) -> Self {
        let low = bars.iter().map(|bar| bar.low).fold(f64::INFINITY, f64::min);
        let high = bars.iter().map(|bar| bar.high).fold(f64::NEG_INFINITY, f64::max);
        let span = high - low;
        let pad = if span.abs() < f64::EPSILON {
            (high.abs() * 0.01).max(1.0)
        } else {
            span * 0.05
        };
        Self {
            low: low - pad,
            high: high + pad,
            top,
            bottom,
        }
    }

    fn y(&self, price: f64) -> f32 {
        let ratio = (price - self.low) / (self.high - self.low);
        self.bottom - (ratio as f32) * (self.bottom - self.top)
    }

    fn tick(&self, index: usize, count: usize) -> f64 {
        if count <= 1 {
            return self.low;
        }
        self.low + (self.high - self.low) * index as f64 / (count - 1) as f64
    }
}

/// Bar indices that get an x-axis date label.
fn date_tick_indices(len: usize, ticks: usize) -> Vec<usize> {
    if len <= ticks || ticks < 2 {
        return (0..len).collect();
    }
    let mut indices: Vec<usize> = (0..ticks).map(|i| i * (len - 1) / (ticks - 1)).collect();
    indices.dedup();
    indices
}

/// Draws the chart onto a transparent canvas, or returns `None` when there is
/// nothing to plot.
pub fn render_chart(bars: &[Bar], theme: &Theme, fonts: &FontSet) -> Option<RgbaImage> {
    if bars.is_empty() {
        return None;
    }

    let chart = &theme.chart;
    let palette = &theme.palette;
    let label_font = fonts.get(FontRole::Tiny);
    let mut canvas = RgbaImage::from_pixel(chart.width, chart.height, Rgba([0, 0, 0, 0]));

    let left = chart.margin_left as f32;
    let right = (chart.width as i32 - chart.margin_right) as f32;
    let top = chart.margin_top as f32;
    let bottom = (chart.height as i32 - chart.margin_bottom) as f32;
    let scale = PriceScale::from_bars(bars, top, bottom);
    let slot = (right - left) / bars.len() as f32;
    let center = |index: usize| left + slot * (index as f32 + 0.5);

    let grid = palette.grid.rgba();
    let label = palette.subtext.rgba();
    let (_, label_height) = label_font.measure("0");

    for index in 0..chart.y_ticks {
        let price = scale.tick(index, chart.y_ticks);
        let y = scale.y(price);
        draw_line_segment_mut(&mut canvas, (left, y), (right, y), grid);
        label_font.draw(
            &mut canvas,
            label,
            right as i32 + 8,
            y as i32 - label_height as i32 / 2,
            &group_thousands(price, 0),
        );
    }

    for index in date_tick_indices(bars.len(), chart.x_ticks) {
        let x = center(index);
        draw_line_segment_mut(&mut canvas, (x, top), (x, bottom), grid);
        let Some(date) = DateTime::from_timestamp(bars[index].timestamp, 0) else {
            continue;
        };
        let text = date.format(chart.date_format).to_string();
        let (width, _) = label_font.measure(&text);
        label_font.draw(&mut canvas, label, x as i32 - width as i32 / 2, bottom as i32 + 6, &text);
    }

    label_font.draw(&mut canvas, label, right as i32 + 8, 4, theme.text.price_axis);

    let (green, red) = (palette.green.rgba(), palette.red.rgba());
    let body_width = ((slot * chart.body_ratio).round() as u32).max(1);
    for (index, bar) in bars.iter().enumerate() {
        let color = if bar.is_up() { green } else { red };
        let x = center(index);
        draw_line_segment_mut(&mut canvas, (x, scale.y(bar.high)), (x, scale.y(bar.low)), color);

        let body_top = scale.y(bar.open.max(bar.close));
        let body_bottom = scale.y(bar.open.min(bar.close));
        let body_height = ((body_bottom - body_top).round() as u32).max(1);
        let body_left = (x - body_width as f32 / 2.0).round() as i32;
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(body_left, body_top.round() as i32).of_size(body_width, body_height),
            color,
        );
    }

    Some(canvas)
}
