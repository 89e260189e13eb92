use super::scene::{Anchor, Scene};
use super::theme::{Color, FontRole, Theme};
use chimera_domain::services::formatting::{format_currency, format_signed_percent, format_signed_pnl};
use chimera_domain::value_objects::analysis::Scenario;
use chimera_domain::value_objects::snapshot::{PortfolioSnapshot, AWAITING_ACTION_PLACEHOLDER};

/// Instance-specific strings that are not part of the theme table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLabels {
    pub asset_label: String,
    pub chart_caption: String,
}

/// Lays out one frame. Pure: the same inputs always produce the same scene.
pub fn compose_dashboard(
    snapshot: &PortfolioSnapshot,
    labels: &DashboardLabels,
    theme: &Theme,
    has_chart: bool,
) -> Scene {
    let layout = &theme.layout;
    let mut scene = Scene::new(layout.width, layout.height, theme.palette.background);

    compose_header(&mut scene, theme);
    compose_metrics(&mut scene, snapshot, labels, theme);
    compose_chart_panel(&mut scene, labels, theme, has_chart);
    compose_analysis(&mut scene, snapshot, theme);
    compose_trades(&mut scene, snapshot, theme);
    compose_footer(&mut scene, snapshot, theme);

    scene
}

fn compose_header(scene: &mut Scene, theme: &Theme) {
    let (palette, layout, text) = (&theme.palette, &theme.layout, &theme.text);
    scene.text(text.title, layout.title, FontRole::Bold, palette.text);
    scene.text(text.subtitle, layout.subtitle, FontRole::Medium, palette.gold);
    scene.ellipse(layout.live_dot, palette.red);
    scene.text(text.live, layout.live_label, FontRole::Medium, palette.text);
    scene.text_anchored(
        text.disclaimer,
        layout.disclaimer,
        FontRole::Small,
        palette.muted,
        Anchor::RightTop,
    );
}

fn pnl_color(pnl: f64, theme: &Theme) -> Color {
    if pnl >= 0.0 {
        theme.palette.green
    } else {
        theme.palette.red
    }
}

fn compose_metrics(scene: &mut Scene, snapshot: &PortfolioSnapshot, labels: &DashboardLabels, theme: &Theme) {
    let (palette, layout, text) = (&theme.palette, &theme.layout, &theme.text);
    let rows = [
        (text.portfolio_label, format_currency(snapshot.equity_value), palette.text),
        (
            text.pnl_label,
            format_signed_pnl(snapshot.unrealized_pnl, snapshot.unrealized_pnl_pct),
            pnl_color(snapshot.unrealized_pnl, theme),
        ),
        (
            text.position_label,
            format!("{:.4} {}", snapshot.position_qty, labels.asset_label),
            palette.text,
        ),
        (text.risk_label, text.risk_placeholder.to_string(), palette.text),
    ];

    for (index, (label, value, value_color)) in rows.into_iter().enumerate() {
        let y = layout.metrics_top + index as i32 * layout.metrics_step;
        scene.text(label, (layout.metrics_x, y), FontRole::Regular, palette.subtext);
        scene.text(
            value,
            (layout.metrics_x, y + layout.metric_value_offset),
            FontRole::Bold,
            value_color,
        );
    }
}

fn compose_chart_panel(scene: &mut Scene, labels: &DashboardLabels, theme: &Theme, has_chart: bool) {
    if has_chart {
        scene.chart(theme.layout.chart);
    }
    scene.text(
        labels.chart_caption.clone(),
        theme.layout.chart_caption,
        FontRole::Medium,
        theme.palette.text,
    );
}

fn impact_color(impact: f64, theme: &Theme) -> Color {
    if impact > 0.0 {
        theme.palette.green
    } else if impact < 0.0 {
        theme.palette.red
    } else {
        theme.palette.gold
    }
}

fn compose_scenario(scene: &mut Scene, scenario: &Scenario, y: i32, theme: &Theme) {
    let (palette, layout, text) = (&theme.palette, &theme.layout, &theme.text);
    let valid = scenario.validation.is_valid();
    let mark = if valid { text.valid_mark } else { text.invalid_mark };
    let row = format!(
        "{:<width$} {}",
        scenario.hypothesis,
        mark,
        width = layout.hypothesis_width
    );
    let row_color = if valid { palette.text } else { palette.muted };
    scene.text(row, (layout.scenario_x, y), FontRole::Small, row_color);

    if let (true, Some(impact)) = (valid, scenario.impact) {
        scene.text(
            format!("{}{}", text.impact_prefix, format_signed_percent(impact)),
            (layout.impact_x, y),
            FontRole::Small,
            impact_color(impact, theme),
        );
    }
}

fn compose_analysis(scene: &mut Scene, snapshot: &PortfolioSnapshot, theme: &Theme) {
    let (palette, layout, text) = (&theme.palette, &theme.layout, &theme.text);
    scene.line(layout.analysis_rule, palette.rule);
    scene.text(text.analysis_header, layout.analysis_header, FontRole::Regular, palette.subtext);

    let scenarios = snapshot
        .agent_analysis
        .as_ref()
        .filter(|analysis| analysis.has_scenarios())
        .map(|analysis| analysis.scenarios.as_slice());

    match scenarios {
        Some(scenarios) => {
            for (index, scenario) in scenarios.iter().take(layout.max_scenarios).enumerate() {
                let y = layout.scenario_top + index as i32 * layout.scenario_step;
                compose_scenario(scene, scenario, y, theme);
            }
        }
        None => scene.text(
            text.analysis_placeholder,
            layout.analysis_placeholder,
            FontRole::Small,
            palette.subtext,
        ),
    }
}

fn compose_trades(scene: &mut Scene, snapshot: &PortfolioSnapshot, theme: &Theme) {
    let (palette, layout, text) = (&theme.palette, &theme.layout, &theme.text);
    scene.line(layout.trades_rule, palette.rule);
    scene.text(text.trades_header, layout.trades_header, FontRole::Regular, palette.subtext);

    if snapshot.last_actions.is_empty() {
        scene.text(
            AWAITING_ACTION_PLACEHOLDER,
            (layout.trades_x, layout.trades_top),
            FontRole::Regular,
            palette.text,
        );
        return;
    }
    for (index, action) in snapshot.last_actions.iter().take(layout.max_trades).enumerate() {
        let y = layout.trades_top + index as i32 * layout.trades_step;
        scene.text(action.clone(), (layout.trades_x, y), FontRole::Regular, palette.text);
    }
}

fn compose_footer(scene: &mut Scene, snapshot: &PortfolioSnapshot, theme: &Theme) {
    scene.text_anchored(
        format!("Last Update: {} (UTC)", snapshot.timestamp),
        theme.layout.footer,
        FontRole::Tiny,
        theme.palette.footer,
        Anchor::RightBaseline,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::scene::DrawOp;
    use crate::rendering::theme::THEME;
    use chimera_domain::value_objects::analysis::{AgentAnalysis, Validation};

    fn labels() -> DashboardLabels {
        DashboardLabels {
            asset_label: "BTC".to_string(),
            chart_caption: "BTC/USD Price Chart (Last 60 Days)".to_string(),
        }
    }

    fn snapshot() -> PortfolioSnapshot {
        PortfolioSnapshot {
            equity_value: 100_000.0,
            unrealized_pnl: 0.0,
            unrealized_pnl_pct: 0.0,
            position_qty: 0.0,
            last_actions: vec!["• SELL 0.5000 @ $60,000.00 (Jan 04, 09:15)".to_string()],
            timestamp: "2024-01-05 15:00:00".to_string(),
            market_data: Vec::new(),
            agent_analysis: None,
        }
    }

    fn scenario(hypothesis: &str, validation: Validation, impact: Option<f64>) -> Scenario {
        Scenario {
            hypothesis: hypothesis.to_string(),
            validation,
            impact,
        }
    }

    #[test]
    fn header_and_footer_use_fixed_positions() {
        let scene = compose_dashboard(&snapshot(), &labels(), &THEME, false);
        assert_eq!(scene.find_text("Project Chimera"), Some(((50, 40), THEME.palette.text)));
        assert_eq!(scene.find_text("Live Quant Trading"), Some(((50, 85), THEME.palette.gold)));
        assert_eq!(
            scene.find_text("Last Update: 2024-01-05 15:00:00 (UTC)"),
            Some(((1230, 700), THEME.palette.footer))
        );
        assert!(scene.ops.contains(&DrawOp::FilledEllipse {
            bounds: [1140, 52, 1160, 72],
            color: THEME.palette.red,
        }));
    }

    #[test]
    fn zero_pnl_is_green_and_flat_position_keeps_asset_label() {
        let scene = compose_dashboard(&snapshot(), &labels(), &THEME, false);
        assert_eq!(scene.find_text("+0.00 (+0.00%)"), Some(((50, 310), THEME.palette.green)));
        assert_eq!(scene.find_text("0.0000 BTC"), Some(((50, 410), THEME.palette.text)));
        assert_eq!(scene.find_text("Calculating..."), Some(((50, 510), THEME.palette.text)));
    }

    #[test]
    fn chart_op_only_when_chart_present_but_caption_always() {
        let without = compose_dashboard(&snapshot(), &labels(), &THEME, false);
        assert!(!without.has_chart());
        assert!(without.find_text("BTC/USD Price Chart (Last 60 Days)").is_some());

        let with = compose_dashboard(&snapshot(), &labels(), &THEME, true);
        assert!(with.ops.contains(&DrawOp::Chart { at: (400, 150) }));
    }

    #[test]
    fn scenario_rows_are_padded_marked_and_colored() {
        let mut snapshot = snapshot();
        snapshot.agent_analysis = Some(AgentAnalysis {
            scenarios: vec![
                scenario("ETF inflows", Validation::Valid, Some(0.0123)),
                scenario("Halving", Validation::Pending, Some(0.5)),
                scenario("Rates", Validation::Valid, Some(-0.02)),
                scenario("Flat", Validation::Valid, Some(0.0)),
            ],
        });
        let scene = compose_dashboard(&snapshot, &labels(), &THEME, false);

        assert_eq!(scene.find_text("ETF inflows     ✅"), Some(((450, 605), THEME.palette.text)));
        assert_eq!(scene.find_text("Est. Impact: +1.23%"), Some(((750, 605), THEME.palette.green)));
        assert_eq!(scene.find_text("Halving         ❌"), Some(((450, 625), THEME.palette.muted)));
        assert!(scene.find_text("Est. Impact: +50.00%").is_none());
        assert_eq!(scene.find_text("Est. Impact: -2.00%"), Some(((750, 645), THEME.palette.red)));
        assert_eq!(scene.find_text("Est. Impact: +0.00%"), Some(((750, 665), THEME.palette.gold)));
        assert!(scene.find_text("Awaiting first agent analysis...").is_none());

        for row in ["ETF inflows     ✅", "Halving         ❌", "Est. Impact: +1.23%", "Est. Impact: -2.00%"] {
            assert_eq!(scene.font_role(row), Some(FontRole::Small), "{row}");
        }
    }

    #[test]
    fn bottom_section_headers_use_regular_subtext() {
        let scene = compose_dashboard(&snapshot(), &labels(), &THEME, false);
        for (header, at) in [
            ("Agent's Last Causal Analysis:", (430, 570)),
            ("Last Executed Trades:", (50, 570)),
        ] {
            assert_eq!(scene.find_text(header), Some((at, THEME.palette.subtext)));
            assert_eq!(scene.font_role(header), Some(FontRole::Regular));
        }
        let trade = "• SELL 0.5000 @ $60,000.00 (Jan 04, 09:15)";
        assert_eq!(scene.find_text(trade), Some(((50, 605), THEME.palette.text)));
        assert_eq!(scene.font_role(trade), Some(FontRole::Regular));
    }

    #[test]
    fn empty_scenario_list_shows_analysis_placeholder() {
        let mut snapshot = snapshot();
        snapshot.agent_analysis = Some(AgentAnalysis::default());
        let scene = compose_dashboard(&snapshot, &labels(), &THEME, false);
        assert_eq!(
            scene.find_text("Awaiting first agent analysis..."),
            Some(((450, 600), THEME.palette.subtext))
        );
        assert_eq!(
            scene.font_role("Awaiting first agent analysis..."),
            Some(FontRole::Small)
        );
    }

    #[test]
    fn long_hypothesis_is_not_truncated() {
        let mut snapshot = snapshot();
        snapshot.agent_analysis = Some(AgentAnalysis {
            scenarios: vec![scenario("A very long hypothesis", Validation::Valid, None)],
        });
        let scene = compose_dashboard(&snapshot, &labels(), &THEME, false);
        assert!(scene.find_text("A very long hypothesis ✅").is_some());
        assert!(!scene.texts().any(|(text, _, _)| text.starts_with("Est. Impact")));
    }
}
