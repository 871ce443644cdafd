//! Recomputation of the coordinate and name fields of a single table row.

use anyhow::Context;
use itertools::Itertools;

use super::columns::{Column, ColumnIndex};
use crate::common::GenomeBuild;
use crate::naming::{format_hgvs_name, parse_hgvs_name, VcfVariant, DEFAULT_MAX_ALLELE_LENGTH};
use crate::protein::{Projection, ProteinProjector};
use crate::reference::Genome;
use crate::txs::TranscriptTable;

/// Alternate BRCA1 transcripts that synonyms are generated for.
pub const BRCA1_SYNONYM_TRANSCRIPTS: &[&str] = &[
    "NM_007294.2",
    "NM_007300.3",
    "NM_007299.3",
    "NM_007298.3",
    "NM_007297.3",
    "U14680.1",
];

/// Alternate BRCA2 transcripts that synonyms are generated for.
pub const BRCA2_SYNONYM_TRANSCRIPTS: &[&str] = &["U43746.1"];

/// Canonical transcript accession for the gene symbols handled specially.
pub fn canonical_accession(gene_symbol: &str) -> Option<&'static str> {
    match gene_symbol {
        "BRCA1" => Some("NM_007294.3"),
        "BRCA2" => Some("NM_000059.3"),
        _ => None,
    }
}

fn synonym_transcripts(gene_symbol: &str) -> &'static [&'static str] {
    match gene_symbol {
        "BRCA1" => BRCA1_SYNONYM_TRANSCRIPTS,
        "BRCA2" => BRCA2_SYNONYM_TRANSCRIPTS,
        _ => &[],
    }
}

/// Configuration for the `RowTransformer`.
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(pattern = "immutable")]
pub struct Config {
    /// Whether to fill in the protein-level names.
    #[builder(default)]
    pub calc_protein: bool,

    /// Alleles longer than this are written as their length in cDNA names.
    #[builder(default = "DEFAULT_MAX_ALLELE_LENGTH")]
    pub max_allele_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calc_protein: false,
            max_allele_length: DEFAULT_MAX_ALLELE_LENGTH,
        }
    }
}

/// Genome and transcripts of one genome build.
#[derive(Debug, Clone)]
pub struct BuildReference {
    pub genome: Genome,
    pub transcripts: TranscriptTable,
}

impl BuildReference {
    pub fn new(genome: Genome, transcripts: TranscriptTable) -> Self {
        Self {
            genome,
            transcripts,
        }
    }
}

/// Reference data of all three builds.
#[derive(Debug, Clone)]
pub struct References {
    pub hg18: BuildReference,
    pub hg19: BuildReference,
    pub hg38: BuildReference,
}

impl References {
    pub fn get(&self, build: GenomeBuild) -> &BuildReference {
        match build {
            GenomeBuild::Hg18 => &self.hg18,
            GenomeBuild::Hg19 => &self.hg19,
            GenomeBuild::Hg38 => &self.hg38,
        }
    }
}

/// Rewrites the rows of the variant table one by one.
pub struct RowTransformer<'a> {
    config: Config,
    references: &'a References,
    columns: ColumnIndex,
    projector: Option<Box<dyn ProteinProjector + 'a>>,
    /// Last successfully computed protein name, written for rows whose name cannot be parsed.
    last_protein: Option<String>,
}

impl<'a> RowTransformer<'a> {
    /// Construct new transformer; `projector` is only used if `config.calc_protein` is set.
    pub fn new(
        config: Config,
        references: &'a References,
        columns: ColumnIndex,
        projector: Option<Box<dyn ProteinProjector + 'a>>,
    ) -> Result<Self, anyhow::Error> {
        if config.calc_protein && projector.is_none() {
            anyhow::bail!("protein names requested but no protein projector given");
        }
        Ok(Self {
            config,
            references,
            columns,
            projector,
            last_protein: None,
        })
    }

    fn field<'r>(&self, row: &'r [String], column: Column) -> &'r str {
        &row[self.columns.index(column)]
    }

    fn set_field(&self, row: &mut [String], column: Column, value: String) {
        row[self.columns.index(column)] = value;
    }

    fn format_name(
        &self,
        variant: &VcfVariant,
        accession: &str,
    ) -> Result<String, anyhow::Error> {
        let hg38 = &self.references.hg38;
        let transcript = hg38.transcripts.get_required(accession)?;
        Ok(format_hgvs_name(
            variant,
            &hg38.genome,
            transcript,
            self.config.max_allele_length,
        )?
        .to_string())
    }

    fn resolve(
        &self,
        hgvs_cdna: &str,
        build: GenomeBuild,
    ) -> Result<VcfVariant, anyhow::Error> {
        let reference = self.references.get(build);
        parse_hgvs_name(hgvs_cdna, &reference.genome, &reference.transcripts)
            .with_context(|| format!("could not resolve {} on {}", hgvs_cdna, build))
    }

    /// Compute the protein name, if requested and possible.
    fn protein_name(
        &mut self,
        hgvs_cdna: &str,
        variant38: &VcfVariant,
    ) -> Result<Option<String>, anyhow::Error> {
        let projector = match (&self.projector, self.config.calc_protein) {
            (Some(projector), true) => projector,
            _ => return Ok(None),
        };

        match projector.project(hgvs_cdna)? {
            Projection::Protein(name) => {
                self.last_protein = Some(name.clone());
                Ok(Some(name))
            }
            Projection::NonCoding => Ok(None),
            Projection::Unparseable(message) => {
                tracing::warn!("could not parse {} for protein mapping: {}", hgvs_cdna, message);
                tracing::warn!("GRCh38 genomic change: {}", variant38);
                Ok(self.last_protein.clone())
            }
        }
    }

    /// Recompute the fields of `row` in place.
    pub fn transform(&mut self, row: &mut [String]) -> Result<(), anyhow::Error> {
        if row.len() <= self.columns.max_index() {
            anyhow::bail!(
                "row has {} fields but {} are required",
                row.len(),
                self.columns.max_index() + 1
            );
        }

        let gene_symbol = self.field(row, Column::GeneSymbol).to_string();
        if let Some(accession) = canonical_accession(&gene_symbol) {
            self.set_field(row, Column::ReferenceSequence, accession.to_string());
        }
        let accession = self.field(row, Column::ReferenceSequence).to_string();

        let chr = self.field(row, Column::Chr);
        let pos = self.field(row, Column::Pos);
        let reference = self.field(row, Column::Ref);
        let alternative = self.field(row, Column::Alt);
        tracing::info!(
            "working on variant {} {} {} {}",
            chr,
            pos,
            reference,
            alternative
        );

        let reference = match reference {
            "-" => String::new(),
            _ => reference.to_string(),
        };
        let alternative = match alternative {
            "-" | "None" => String::new(),
            _ => alternative.to_string(),
        };
        for allele in [&reference, &alternative] {
            if !allele
                .bytes()
                .all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
            {
                anyhow::bail!("invalid allele {:?}", allele);
            }
        }

        let variant = VcfVariant {
            chromosome: if chr.starts_with("chr") {
                chr.to_string()
            } else {
                format!("chr{}", chr)
            },
            position: pos
                .parse()
                .with_context(|| format!("invalid position {:?}", pos))?,
            reference,
            alternative,
        };

        let hgvs_cdna = self.format_name(&variant, &accession)?;
        let variant38 = self.resolve(&hgvs_cdna, GenomeBuild::Hg38)?;
        let variant37 = self.resolve(&hgvs_cdna, GenomeBuild::Hg19)?;
        let variant36 = self.resolve(&hgvs_cdna, GenomeBuild::Hg18)?;

        let existing = match self.field(row, Column::Synonyms) {
            "" | "-" => None,
            value => Some(value.to_string()),
        };
        let alternates = synonym_transcripts(&gene_symbol)
            .iter()
            .map(|tx_ac| self.format_name(&variant38, tx_ac))
            .collect::<Result<Vec<_>, _>>()?;
        let synonyms = existing.into_iter().chain(alternates).join(",");

        let protein = self.protein_name(&hgvs_cdna, &variant38)?;

        tracing::debug!(
            "cDNA: {} -> {}",
            self.field(row, Column::HgvsCdna),
            &hgvs_cdna
        );
        if let Some(protein) = &protein {
            tracing::debug!(
                "protein: {} -> {}",
                self.field(row, Column::HgvsProtein),
                protein
            );
        }

        let ref38_len = variant38.reference.len() as i32;
        self.set_field(row, Column::GenomicCoordinateHg36, variant36.to_string());
        self.set_field(row, Column::GenomicCoordinateHg37, variant37.to_string());
        self.set_field(row, Column::GenomicCoordinateHg38, variant38.to_string());
        self.set_field(row, Column::Hg37Start, variant37.position.to_string());
        self.set_field(
            row,
            Column::Hg37End,
            (variant37.position + ref38_len - 1).to_string(),
        );
        self.set_field(row, Column::Hg36Start, variant36.position.to_string());
        self.set_field(
            row,
            Column::Hg36End,
            (variant36.position + ref38_len - 1).to_string(),
        );
        self.set_field(row, Column::HgvsCdna, hgvs_cdna);
        if let Some(protein) = protein {
            self.set_field(row, Column::HgvsProtein, protein);
        }
        self.set_field(row, Column::Synonyms, synonyms);

        Ok(())
    }
}
