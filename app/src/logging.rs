use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let res = if cfg!(test) {
        builder.compact().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = res {
        eprintln!("Tracing subscriber already set: {}", e);
    }
}
