use tracing_subscriber::EnvFilter;

/// Initialize a simple stdout tracing subscriber for development.
///
/// `RUST_LOG` wins when set; otherwise lifecycle debug lines are shown.
pub fn init_stdout_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,loadline::lifecycle=info"));

    // A subscriber may already be installed by the host application.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
