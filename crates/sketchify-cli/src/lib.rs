use sketchify_core::constants::PROGRESS_COMPLETE;

/// Text progress bar, e.g. `[#####---------------]  25%`.
pub fn progress_bar(progress: u8, width: usize) -> String {
    let progress = progress.min(PROGRESS_COMPLETE);
    let filled = width * progress as usize / PROGRESS_COMPLETE as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        progress
    )
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
