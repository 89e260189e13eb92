pub mod chart;
pub mod dashboard;
pub mod fonts;
pub mod raster;
pub mod scene;
pub mod theme;

use chimera_domain::repositories::frames::FrameRenderer;
use chimera_domain::value_objects::bar::Bar;
use chimera_domain::value_objects::snapshot::PortfolioSnapshot;
use dashboard::{compose_dashboard, DashboardLabels};
use fonts::FontSet;
use image::RgbaImage;
use scene::Scene;
use theme::Theme;

/// Renders snapshots into 1280x720 dashboard frames.
#[derive(Debug, Clone)]
pub struct DashboardRenderer {
    theme: Theme,
    fonts: FontSet,
    labels: DashboardLabels,
}

impl DashboardRenderer {
    pub fn new(theme: Theme, fonts: FontSet, labels: DashboardLabels) -> Self {
        Self { theme, fonts, labels }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn render_chart(&self, bars: &[Bar]) -> Option<RgbaImage> {
        chart::render_chart(bars, &self.theme, &self.fonts)
    }

    pub fn compose(&self, snapshot: &PortfolioSnapshot, has_chart: bool) -> Scene {
        compose_dashboard(snapshot, &self.labels, &self.theme, has_chart)
    }

    pub fn render_dashboard(&self, snapshot: &PortfolioSnapshot, chart: Option<&RgbaImage>) -> RgbaImage {
        let scene = self.compose(snapshot, chart.is_some());
        raster::rasterize(&scene, chart, &self.fonts)
    }
}

impl FrameRenderer for DashboardRenderer {
    fn render_frame(&self, snapshot: &PortfolioSnapshot) -> Result<Vec<u8>, String> {
        let chart = self.render_chart(&snapshot.market_data);
        let frame = self.render_dashboard(snapshot, chart.as_ref());
        raster::encode_png(frame)
    }
}
