//! Main entry point for the brca-pseudonyms CLI.

use brca_pseudonyms::{built_info, common, pseudonyms};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fill in genomic coordinates and HGVS synonyms of BRCA variants"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// Arguments of the pseudonym generator
    #[command(flatten)]
    args: pseudonyms::Args,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    tracing::subscriber::with_default(collector, || {
        let hgvs_version = common::dependency_version("hgvs").unwrap_or("unknown");
        tracing::info!(
            "brca-pseudonyms {} (hgvs {}, built {}) startup",
            common::version(),
            hgvs_version,
            built_info::BUILT_TIME_UTC,
        );

        pseudonyms::run(&cli.common, &cli.args)?;

        tracing::info!("All done. Have a nice day!");

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
