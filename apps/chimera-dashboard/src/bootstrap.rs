use chimera_application::config::{self, Config, OutputTarget};
use chimera_application::fetching::{FetchSettings, SnapshotFetcher};
use chimera_domain::repositories::analysis_report::AnalysisReportRepository;
use chimera_domain::repositories::brokerage::BrokerageRepository;
use chimera_domain::repositories::frames::{FrameRenderer, FrameSink};
use chimera_infrastructure::alpaca::AlpacaClient;
use chimera_infrastructure::artifacts::{FilesystemFrameSink, StdoutFrameSink};
use chimera_infrastructure::rendering::dashboard::DashboardLabels;
use chimera_infrastructure::rendering::fonts::{FontPaths, FontProvider};
use chimera_infrastructure::rendering::theme::THEME;
use chimera_infrastructure::rendering::DashboardRenderer;
use chimera_infrastructure::reports::FilesystemAnalysisReportRepository;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loaded configuration plus the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub struct Startup {
    pub config: Config,
    pub base_dir: PathBuf,
    pub source: Option<PathBuf>,
}

/// Without a config file the built-in defaults apply, anchored at the working
/// directory.
pub fn load_startup(config_path: Option<&Path>) -> Result<Startup, String> {
    match config_path {
        Some(path) => Ok(Startup {
            config: config::load_config(path)?,
            base_dir: config::config_base_dir(path),
            source: Some(path.to_path_buf()),
        }),
        None => {
            let config = Config::default();
            config::validate_config(&config)?;
            Ok(Startup {
                config,
                base_dir: PathBuf::from("."),
                source: None,
            })
        }
    }
}

/// Everything one cycle needs, wired once at startup.
pub struct Services {
    pub brokerage: Box<dyn BrokerageRepository>,
    pub reports: Box<dyn AnalysisReportRepository>,
    pub renderer: Box<dyn FrameRenderer>,
    pub sink: Box<dyn FrameSink>,
    pub settings: FetchSettings,
    pub interval: Duration,
}

impl Services {
    pub fn fetcher(&self) -> SnapshotFetcher<'_> {
        SnapshotFetcher::new(
            self.brokerage.as_ref(),
            self.reports.as_ref(),
            self.settings.clone(),
        )
    }
}

pub fn build_sink(target: OutputTarget) -> Box<dyn FrameSink> {
    match target {
        OutputTarget::Stdout => Box::new(StdoutFrameSink::new()),
        OutputTarget::File(path) => Box::new(FilesystemFrameSink::new(path)),
    }
}

pub fn build_renderer(config: &Config, base_dir: &Path) -> DashboardRenderer {
    let font_paths = FontPaths::from(config.font_paths(base_dir));
    let fonts = FontProvider::resolve(&font_paths, &THEME.fonts);
    DashboardRenderer::new(
        THEME,
        fonts,
        DashboardLabels {
            asset_label: config.market.asset_label.clone(),
            chart_caption: config.chart_caption(),
        },
    )
}

pub fn build_services(startup: &Startup) -> Result<Services, String> {
    let config = &startup.config;
    let credentials = config::resolve_credentials(&config.broker)?;
    let brokerage = AlpacaClient::new(
        config.broker.trading_url.clone(),
        config.broker.data_url.clone(),
        &credentials.api_key,
        &credentials.secret_key,
        config.broker.timeout_ms,
    )?;
    let report_path = config.analysis_report_path(&startup.base_dir);
    let sink = build_sink(config.output_target(&startup.base_dir));

    tracing::info!(
        trading_url = %config.broker.trading_url,
        symbol = %config.market.trading_symbol,
        report = %report_path.display(),
        output = %sink.describe(),
        interval_seconds = config.refresh.interval_seconds,
        "dashboard services ready"
    );

    Ok(Services {
        brokerage: Box::new(brokerage),
        reports: Box::new(FilesystemAnalysisReportRepository::new(report_path)),
        renderer: Box::new(build_renderer(config, &startup.base_dir)),
        sink,
        settings: FetchSettings::from_config(config),
        interval: Duration::from_secs(config.refresh.interval_seconds),
    })
}
