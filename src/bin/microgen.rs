use microgen::cli::run_cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = run_cli() {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}
