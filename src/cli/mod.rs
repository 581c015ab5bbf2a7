// Command-line front ends (feature `cli`).
//
// Two tools share this module: `romcat` (image catalog: list, tunes,
// byte-level diff) and `romtab` (calibration tables: show, compare, export).
// Both follow the same shape: clap derive definitions, `cmd_*` functions
// returning an exit code, and a `run()` entry point that never returns.

pub mod catalog;
pub mod tables;

/// Shared env_logger setup for both binaries.
pub(crate) fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
