//! Recompute multi-build coordinates and HGVS names of BRCA1/BRCA2 variants.

pub mod common;
pub mod naming;
pub mod protein;
pub mod pseudonyms;
pub mod reference;
pub mod txs;

/// Information about the build.
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
