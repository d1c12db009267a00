use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

const CRATES: [&str; 3] = ["flexiona", "flexiona_core", "flexiona_extensions"];

/// Filter directives for the given verbosity. Other crates only report warnings.
pub fn filter_directives(verbose: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}

/// Installs the global subscriber writing to stdout. `RUST_LOG` takes precedence over the
/// verbosity flags.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(verbose > 0)
        .with_writer(std::io::stdout)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(
            filter_directives(0, false),
            "warn,flexiona=info,flexiona_core=info,flexiona_extensions=info"
        );
        assert!(filter_directives(1, false).contains("flexiona_core=debug"));
        assert!(filter_directives(5, false).contains("flexiona_extensions=trace"));
        assert_eq!(filter_directives(2, true), "error");
    }
}
