use clap::Parser;
use snap_info::cli::Cli;
use snap_info::config::Config;
use snap_info::report;
use snap_info::verify;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    let rust_log = std::env::var("RUST_LOG").is_ok();

    // json mode owns stdout and keeps stderr quiet unless asked
    if config.json_output && !rust_log {
        return;
    }

    let default_filter = if config.verbose { "snap_info=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    init_tracing(&config);

    let request = cli.request();
    let report = match verify::run(&cli.database, &request, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("\n[FATAL ERROR] {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = report::print(&report, &config) {
        eprintln!("\n[FATAL ERROR] {e}");
        std::process::exit(2);
    }

    if !report.passed() {
        std::process::exit(1);
    }
}
