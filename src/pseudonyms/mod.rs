//! Fill in multi-build coordinates and cDNA synonyms in a BRCA variant table.

pub mod columns;
pub mod transform;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use thousands::Separable;

use self::columns::ColumnIndex;
use self::transform::{BuildReference, ConfigBuilder, References, RowTransformer};
use crate::common::io::std::{open_read_maybe_gz, open_write_maybe_gz};
use crate::common::GenomeBuild;
use crate::naming::DEFAULT_MAX_ALLELE_LENGTH;
use crate::protein::provider::Provider;
use crate::protein::{HgvsProjector, ProteinProjector};
use crate::reference::Genome;
use crate::txs::TranscriptTable;

/// Command line arguments for the pseudonym generator.
#[derive(Parser, Debug)]
#[command(about = "Recompute genomic coordinates and HGVS names of BRCA variants", long_about = None)]
pub struct Args {
    /// Path to the input variant table (TSV, optionally gzip-compressed).
    #[arg(short = 'i', long)]
    pub in_brca: PathBuf,
    /// Path to the hg18 reference FASTA file.
    #[arg(short = 'j', long)]
    pub in_hg18: PathBuf,
    /// Path to the hg19 reference FASTA file.
    #[arg(short = 'k', long)]
    pub in_hg19: PathBuf,
    /// Path to the hg38 reference FASTA file.
    #[arg(short = 'l', long)]
    pub in_hg38: PathBuf,
    /// Path to the hg18 RefSeq transcripts in genePred format.
    #[arg(short = 'r', long)]
    pub in_refseq18: PathBuf,
    /// Path to the hg19 RefSeq transcripts in genePred format.
    #[arg(short = 's', long)]
    pub in_refseq19: PathBuf,
    /// Path to the hg38 RefSeq transcripts in genePred format.
    #[arg(short = 't', long)]
    pub in_refseq38: PathBuf,
    /// Whether to also recompute the protein-level names.
    #[arg(short = 'p', long, default_value_t = false)]
    pub calc_protein: bool,
    /// Path to the output table, compressed if the name ends in `.gz`.
    #[arg(short = 'o', long)]
    pub out_brca: PathBuf,
    /// Alleles longer than this are written as their length in cDNA names.
    #[arg(long, default_value_t = DEFAULT_MAX_ALLELE_LENGTH)]
    pub max_allele_length: usize,
}

fn load_build(
    build: GenomeBuild,
    path_genome: &Path,
    path_transcripts: &Path,
) -> Result<BuildReference, anyhow::Error> {
    tracing::info!("Loading {} ({}) reference data...", build, build.name());
    let start = Instant::now();
    let genome = Genome::from_path(path_genome)?;
    let transcripts = TranscriptTable::from_path(path_transcripts)?;
    tracing::info!(
        "... done loading {} contigs and {} transcripts in {:?}",
        genome.contigs().len(),
        transcripts.len().separate_with_commas(),
        start.elapsed()
    );
    Ok(BuildReference::new(genome, transcripts))
}

/// Main entry point for the pseudonym generator.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &common);
    tracing::info!("args = {:?}", &args);

    let references = References {
        hg18: load_build(GenomeBuild::Hg18, &args.in_hg18, &args.in_refseq18)?,
        hg19: load_build(GenomeBuild::Hg19, &args.in_hg19, &args.in_refseq19)?,
        hg38: load_build(GenomeBuild::Hg38, &args.in_hg38, &args.in_refseq38)?,
    };

    let projector: Option<Box<dyn ProteinProjector>> = if args.calc_protein {
        let provider = Provider::new(
            references.hg38.genome.clone(),
            references.hg38.transcripts.clone(),
        );
        Some(Box::new(HgvsProjector::new(Arc::new(provider))))
    } else {
        None
    };

    let config = ConfigBuilder::default()
        .calc_protein(args.calc_protein)
        .max_allele_length(args.max_allele_length)
        .build()?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(
            open_read_maybe_gz(&args.in_brca)
                .with_context(|| format!("could not open {:?}", &args.in_brca))?,
        );
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .flexible(true)
        .from_writer(
            open_write_maybe_gz(&args.out_brca)
                .with_context(|| format!("could not create {:?}", &args.out_brca))?,
        );

    let mut records = reader.records();
    let header = records
        .next()
        .ok_or_else(|| anyhow::anyhow!("no header in {:?}", &args.in_brca))??;
    let columns = ColumnIndex::from_header(&header.iter().collect::<Vec<_>>())
        .with_context(|| format!("invalid header in {:?}", &args.in_brca))?;
    writer.write_record(&header)?;

    let mut transformer = RowTransformer::new(config, &references, columns, projector)?;

    let start = Instant::now();
    let mut count = 0usize;
    for (idx, record) in records.enumerate() {
        let record = record?;
        let mut row = record.iter().map(str::to_string).collect::<Vec<_>>();
        transformer
            .transform(&mut row)
            .with_context(|| format!("problem with row {} of {:?}", idx + 2, &args.in_brca))?;
        writer.write_record(&row)?;
        count += 1;
    }
    writer.flush()?;
    tracing::info!(
        "... done processing {} rows in {:?}",
        count.separate_with_commas(),
        start.elapsed()
    );

    Ok(())
}
