//! Tracing initialization for services embedding this crate.

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to `info` for this crate. Call once at
/// process startup, before spawning the sampler.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "guard_service=info,info".into()),
        )
        .with_target(false)
        .init();
}
