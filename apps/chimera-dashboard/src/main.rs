use chimera_dashboard::{bootstrap, obs, runner};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chimera-dashboard")]
#[command(about = "Renders the Chimera live trading dashboard to a PNG frame.", version)]
struct Cli {
    /// Config file path (TOML). Built-in defaults apply when neither this nor
    /// env CHIMERA_CONFIG is set.
    #[arg(long, env = "CHIMERA_CONFIG")]
    config: Option<PathBuf>,

    /// Render a single frame and exit.
    #[arg(long)]
    once: bool,
}

fn main() {
    let dotenv_path = dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config_path = cli.config.filter(|path| !path.as_os_str().is_empty());
    let startup = match bootstrap::load_startup(config_path.as_deref()) {
        Ok(startup) => startup,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = obs::init_tracing(&startup.config.logging) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    tracing::info!(
        config = ?startup.source,
        dotenv = ?dotenv_path,
        once = cli.once,
        "starting chimera dashboard"
    );

    let services = match bootstrap::build_services(&startup) {
        Ok(services) => services,
        Err(err) => {
            tracing::error!(error = %err, "startup failed");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if cli.once {
        let stats = runner::run_loop(&services, Some(1));
        std::process::exit(if stats.failed == 0 { 0 } else { 1 });
    }

    runner::run_forever(&services);
}
