use clap::Parser;

// ──────────────────────────────────────────────────────────────
//  Entry point
// ──────────────────────────────────────────────────────────────
fn main() {
    let args = nucleo::ui::cli::Cli::parse();
    init_logging(args.verbose);

    #[cfg(feature = "colors")]
    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    if let Err(e) = nucleo::app_controller::run(args) {
        log::debug!("{e:?}");
        eprintln!("Erro: {e:#}");
        std::process::exit(1);
    }
}

/// `NUCLEO_LOG` wins; otherwise `-v` raises the default `warn` level.
#[cfg(feature = "logging")]
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("NUCLEO_LOG", default))
        .format_timestamp(None)
        .init();
}

#[cfg(not(feature = "logging"))]
fn init_logging(_verbose: u8) {}
