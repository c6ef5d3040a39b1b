use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so JSON/SVG on stdout stays clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = poi_overlay::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
