//! Projection of cDNA names to the protein level.

pub mod provider;

use std::str::FromStr;
use std::sync::Arc;

use hgvs::mapper::variant::{Config as MapperConfig, Mapper};
use hgvs::parser::{HgvsVariant, ProtLocEdit};

use self::provider::Provider;

/// Outcome of projecting a cDNA name to the protein level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// The protein-level name, e.g., `NP_009225.1:p.(Arg11Trp)`.
    Protein(String),
    /// The name is not on a coding transcript.
    NonCoding,
    /// The cDNA name could not be parsed, with the parser's message.
    Unparseable(String),
}

/// Maps cDNA names to protein names.
///
/// Failures to parse the input are reported as `Projection::Unparseable` so callers can
/// recover; everything else is an error.
pub trait ProteinProjector {
    fn project(&self, hgvs_c: &str) -> Result<Projection, anyhow::Error>;
}

/// Projection through the `hgvs` variant mapper.
pub struct HgvsProjector {
    mapper: Mapper,
}

impl HgvsProjector {
    pub fn new(provider: Arc<Provider>) -> Self {
        Self {
            mapper: Mapper::new(&MapperConfig::default(), provider),
        }
    }
}

impl ProteinProjector for HgvsProjector {
    fn project(&self, hgvs_c: &str) -> Result<Projection, anyhow::Error> {
        let var_c = match HgvsVariant::from_str(hgvs_c) {
            Ok(var_c) => var_c,
            Err(e) => return Ok(Projection::Unparseable(e.to_string())),
        };
        if !matches!(var_c, HgvsVariant::CdsVariant { .. }) {
            return Ok(Projection::NonCoding);
        }

        let var_p = self
            .mapper
            .c_to_p(&var_c, None)
            .map_err(|e| anyhow::anyhow!("could not project {} to protein: {}", hgvs_c, e))?;
        Ok(Projection::Protein(render_inferred(&var_p)))
    }
}

/// Render a protein variant predicted from a cDNA change, marking the change as inferred.
///
/// The position and edit are wrapped together, as in `NP_009225.1:p.(Arg11Trp)`.
fn render_inferred(var_p: &HgvsVariant) -> String {
    match var_p {
        HgvsVariant::ProtVariant {
            accession,
            gene_symbol,
            loc_edit,
        } => {
            let loc_edit = match loc_edit {
                ProtLocEdit::Ordinary { loc, edit } => {
                    format!("({}{})", loc.inner(), edit.inner())
                }
                ProtLocEdit::NoChange => ProtLocEdit::NoChangeUncertain.to_string(),
                ProtLocEdit::NoProtein => ProtLocEdit::NoProteinUncertain.to_string(),
                other => other.to_string(),
            };
            match gene_symbol {
                Some(gene_symbol) => format!("{}({}):p.{}", accession, gene_symbol, loc_edit),
                None => format!("{}:p.{}", accession, loc_edit),
            }
        }
        other => other.to_string(),
    }
}
