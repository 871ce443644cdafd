//! Commonly used code.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug, Default)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// The human genome builds that the variant tables carry coordinates for.
///
/// The tables name the columns after the NCBI builds (`hg36`, `hg37`, `hg38`) while the
/// reference files are usually named after the UCSC releases.
#[derive(
    strum::Display,
    strum::EnumString,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
)]
pub enum GenomeBuild {
    #[strum(serialize = "hg18")]
    Hg18,
    #[strum(serialize = "hg19")]
    Hg19,
    #[strum(serialize = "hg38")]
    Hg38,
}

impl GenomeBuild {
    /// Name of the genome release as used by NCBI.
    pub fn name(&self) -> String {
        match self {
            GenomeBuild::Hg18 => String::from("NCBI36"),
            GenomeBuild::Hg19 => String::from("GRCh37"),
            GenomeBuild::Hg38 => String::from("GRCh38"),
        }
    }
}

/// The version of `brca-pseudonyms` package.
#[cfg(not(test))]
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// This allows us to override the version to `0.0.0` in tests.
pub fn version() -> &'static str {
    #[cfg(test)]
    return "0.0.0";
    #[cfg(not(test))]
    return VERSION;
}

/// Version of the dependency `name` as resolved at build time.
pub fn dependency_version(name: &str) -> Option<&'static str> {
    crate::built_info::DEPENDENCIES
        .iter()
        .find(|(dep_name, _)| *dep_name == name)
        .map(|(_, version)| *version)
}
