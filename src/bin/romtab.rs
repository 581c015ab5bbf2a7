fn main() {
    #[cfg(feature = "cli")]
    romcal::cli::tables::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("romtab: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
