fn main() {
    #[cfg(feature = "cli")]
    romcal::cli::catalog::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("romcat: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
