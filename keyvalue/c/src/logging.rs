use tracing_subscriber::EnvFilter;

use crate::ffi::{complete, opendata_kv_status_t};

/// Installs a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls leave the installed subscriber
/// in place and still report success.
#[unsafe(no_mangle)]
pub extern "C" fn opendata_kv_init_logging() -> opendata_kv_status_t {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
    complete(Ok(()))
}
