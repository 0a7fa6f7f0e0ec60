fn main() {
    #[cfg(feature = "cli")]
    jimdecomp::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("jimdecomp: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
