use tracing_subscriber::fmt::format::FmtSpan;

// Logs always go to stderr; stdout is reserved for reports, which may be piped as json or yaml

pub fn setup(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NEW)
        .with_target(false)
        .with_env_filter(env_filter)
        .compact()
        .init();
}

/// Terse output for interactive use: no file/line info, no span lifecycle events.
pub fn setup_for_cli(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_env_filter(env_filter)
        .compact()
        .init();
}
