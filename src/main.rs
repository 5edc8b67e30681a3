//! `starkbench` binary.

use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so command output on stdout stays machine-readable. `RUST_LOG` overrides the `info` default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();

    starkbench::cli::run();
}
