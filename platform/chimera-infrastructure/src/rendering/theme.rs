//! Every color, font size, coordinate and fixed string of the dashboard.
//!
//! Layout code reads these values and never computes its own, so a frame can
//! be checked against this table.

use image::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    pub fn rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Bold,
    Medium,
    Regular,
    Small,
    Tiny,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub subtext: Color,
    pub gold: Color,
    pub green: Color,
    pub red: Color,
    /// Disclaimer and non-validated scenarios.
    pub muted: Color,
    pub rule: Color,
    pub footer: Color,
    pub grid: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizes {
    pub bold: f32,
    pub medium: f32,
    pub regular: f32,
    pub small: f32,
    pub tiny: f32,
}

impl FontSizes {
    pub fn px(&self, role: FontRole) -> f32 {
        match role {
            FontRole::Bold => self.bold,
            FontRole::Medium => self.medium,
            FontRole::Regular => self.regular,
            FontRole::Small => self.small,
            FontRole::Tiny => self.tiny,
        }
    }
}

pub type Point = (i32, i32);
/// `[x0, y0, x1, y1]`.
pub type Bounds = [i32; 4];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardLayout {
    pub width: u32,
    pub height: u32,

    pub title: Point,
    pub subtitle: Point,
    pub live_dot: Bounds,
    pub live_label: Point,
    /// Right edge, top of the disclaimer line.
    pub disclaimer: Point,

    pub metrics_x: i32,
    pub metrics_top: i32,
    pub metrics_step: i32,
    pub metric_value_offset: i32,

    pub chart: Point,
    pub chart_caption: Point,

    pub analysis_rule: Bounds,
    pub analysis_header: Point,
    pub scenario_x: i32,
    pub scenario_top: i32,
    pub scenario_step: i32,
    pub impact_x: i32,
    pub analysis_placeholder: Point,
    pub max_scenarios: usize,
    pub hypothesis_width: usize,

    pub trades_rule: Bounds,
    pub trades_header: Point,
    pub trades_x: i32,
    pub trades_top: i32,
    pub trades_step: i32,
    pub max_trades: usize,

    /// Right edge, baseline of the footer.
    pub footer: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_top: i32,
    pub margin_bottom: i32,
    /// Candle body width relative to the slot width.
    pub body_ratio: f32,
    pub y_ticks: usize,
    pub x_ticks: usize,
    pub date_format: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardText {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub live: &'static str,
    pub disclaimer: &'static str,
    pub portfolio_label: &'static str,
    pub pnl_label: &'static str,
    pub position_label: &'static str,
    pub risk_label: &'static str,
    pub risk_placeholder: &'static str,
    pub analysis_header: &'static str,
    pub analysis_placeholder: &'static str,
    pub trades_header: &'static str,
    pub valid_mark: &'static str,
    pub invalid_mark: &'static str,
    pub impact_prefix: &'static str,
    pub price_axis: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub palette: Palette,
    pub fonts: FontSizes,
    pub layout: DashboardLayout,
    pub chart: ChartLayout,
    pub text: DashboardText,
}

impl Default for Theme {
    fn default() -> Self {
        THEME
    }
}

pub const THEME: Theme = Theme {
    palette: Palette {
        background: Color::hex(0x0d1117),
        text: Color::hex(0xe0e0e0),
        subtext: Color::hex(0xa0a0a0),
        gold: Color::hex(0xca8a04),
        green: Color::hex(0x22c55e),
        red: Color::hex(0xef4444),
        muted: Color::hex(0x888888),
        rule: Color::hex(0x4a4a4a),
        footer: Color::hex(0x4a4a4a),
        grid: Color::hex(0x2c2c2c),
    },
    fonts: FontSizes {
        bold: 32.0,
        medium: 24.0,
        regular: 18.0,
        small: 14.0,
        tiny: 12.0,
    },
    layout: DashboardLayout {
        width: 1280,
        height: 720,

        title: (50, 40),
        subtitle: (50, 85),
        live_dot: [1140, 52, 1160, 72],
        live_label: (1170, 45),
        disclaimer: (1230, 95),

        metrics_x: 50,
        metrics_top: 180,
        metrics_step: 100,
        metric_value_offset: 30,

        chart: (400, 150),
        chart_caption: (430, 120),

        analysis_rule: [430, 560, 1230, 560],
        analysis_header: (430, 570),
        scenario_x: 450,
        scenario_top: 605,
        scenario_step: 20,
        impact_x: 750,
        analysis_placeholder: (450, 600),
        max_scenarios: 4,
        hypothesis_width: 15,

        trades_rule: [50, 560, 380, 560],
        trades_header: (50, 570),
        trades_x: 50,
        trades_top: 605,
        trades_step: 25,
        max_trades: 3,

        footer: (1230, 700),
    },
    // 10.5 x 4.5 at 80 px per unit.
    chart: ChartLayout {
        width: 840,
        height: 360,
        margin_left: 12,
        margin_right: 96,
        margin_top: 28,
        margin_bottom: 30,
        body_ratio: 0.6,
        y_ticks: 5,
        x_ticks: 6,
        date_format: "%b %d",
    },
    text: DashboardText {
        title: "Project Chimera",
        subtitle: "Live Quant Trading",
        live: "LIVE",
        disclaimer: "This is an experimental research project. All trades are simulated (paper trading). Not financial advice.",
        portfolio_label: "Portfolio Value",
        pnl_label: "Unrealized P&L (Session)",
        position_label: "Current Position",
        risk_label: "Sharpe / Max Drawdown",
        risk_placeholder: "Calculating...",
        analysis_header: "Agent's Last Causal Analysis:",
        analysis_placeholder: "Awaiting first agent analysis...",
        trades_header: "Last Executed Trades:",
        valid_mark: "✅",
        invalid_mark: "❌",
        impact_prefix: "Est. Impact: ",
        price_axis: "Price ($)",
    },
};
