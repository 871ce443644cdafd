//! Transcript models and the per-build transcript table.

pub mod genepred;

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{anyhow, Context};

use crate::common::io::std::open_read_maybe_gz;

/// Strand of a transcript on its chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Strand {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
}

impl FromStr for Strand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Plus),
            "-" => Ok(Strand::Minus),
            _ => Err(anyhow!("invalid strand {:?}", s)),
        }
    }
}

/// A transcript with its exon structure on the genome.
///
/// All genomic coordinates are 0-based and half-open as in genePred files.  Transcript
/// positions are 1-based and count exonic bases from the 5' end of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    accession: String,
    gene_name: String,
    chrom: String,
    strand: Strand,
    tx_range: (i32, i32),
    cds_range: (i32, i32),
    /// Exons in genomic order.
    exons: Vec<(i32, i32)>,
}

impl Transcript {
    pub fn new(
        accession: String,
        gene_name: String,
        chrom: String,
        strand: Strand,
        tx_range: (i32, i32),
        cds_range: (i32, i32),
        mut exons: Vec<(i32, i32)>,
    ) -> Self {
        exons.sort();
        Self {
            accession,
            gene_name,
            chrom,
            strand,
            tx_range,
            cds_range,
            exons,
        }
    }

    /// Full accession including the version, e.g., `NM_007294.3`.
    pub fn accession(&self) -> &str {
        &self.accession
    }

    /// Accession without the version, e.g., `NM_007294`.
    pub fn name(&self) -> &str {
        self.accession
            .split_once('.')
            .map(|(name, _)| name)
            .unwrap_or(&self.accession)
    }

    pub fn version(&self) -> Option<&str> {
        self.accession.split_once('.').map(|(_, version)| version)
    }

    pub fn gene_name(&self) -> &str {
        &self.gene_name
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn tx_range(&self) -> (i32, i32) {
        self.tx_range
    }

    pub fn cds_range(&self) -> (i32, i32) {
        self.cds_range
    }

    pub fn exons(&self) -> &[(i32, i32)] {
        &self.exons
    }

    pub fn is_coding(&self) -> bool {
        self.cds_range.0 < self.cds_range.1
    }

    /// Exons in transcript order, i.e., reversed for minus strand transcripts.
    pub fn exons_tx_order(&self) -> Vec<(i32, i32)> {
        match self.strand {
            Strand::Plus => self.exons.clone(),
            Strand::Minus => self.exons.iter().rev().cloned().collect(),
        }
    }

    /// Exons in transcript order as 0-based, half-open transcript intervals.
    pub fn exons_tx_intervals(&self) -> Vec<(i32, i32)> {
        let mut cum = 0;
        self.exons_tx_order()
            .into_iter()
            .map(|(start, end)| {
                let interval = (cum, cum + end - start);
                cum = interval.1;
                interval
            })
            .collect()
    }

    /// Number of exonic bases.
    pub fn tx_length(&self) -> i32 {
        self.exons.iter().map(|(start, end)| end - start).sum()
    }

    /// Map 1-based genomic position to transcript position and intronic offset.
    ///
    /// Intronic positions are anchored at the closest exon boundary; on ties, the exon
    /// upstream in transcript order wins.  Positions outside of the transcript are
    /// extrapolated without an offset.
    pub fn genomic_to_tx(&self, pos: i32) -> (i32, i32) {
        let exons = self.exons_tx_order();

        let mut cum = 0;
        for (start, end) in &exons {
            if *start < pos && pos <= *end {
                return match self.strand {
                    Strand::Plus => (cum + pos - start, 0),
                    Strand::Minus => (cum + end - pos + 1, 0),
                };
            }
            cum += end - start;
        }

        let mut best: Option<(i32, (i32, i32))> = None;
        let mut cum = 0;
        for (start, end) in &exons {
            let len = end - start;
            let (distance, before_exon) = if pos <= *start {
                (start + 1 - pos, true)
            } else {
                (pos - end, false)
            };
            let upstream = match self.strand {
                Strand::Plus => before_exon,
                Strand::Minus => !before_exon,
            };
            let candidate = if upstream {
                (cum + 1, -distance)
            } else {
                (cum + len, distance)
            };
            if best.map(|(d, _)| distance < d).unwrap_or(true) {
                best = Some((distance, candidate));
            }
            cum += len;
        }

        let (tx_pos, offset) = best.map(|(_, candidate)| candidate).unwrap_or((0, 0));
        if pos <= self.tx_range.0 || pos > self.tx_range.1 {
            (tx_pos + offset, 0)
        } else {
            (tx_pos, offset)
        }
    }

    /// Map transcript position and intronic offset to 1-based genomic position.
    pub fn tx_to_genomic(&self, tx_pos: i32, offset: i32) -> i32 {
        let exons = self.exons_tx_order();
        let tx_length = self.tx_length();

        let pos = if tx_pos < 1 {
            let (start, end) = exons[0];
            match self.strand {
                Strand::Plus => start + 1 - (1 - tx_pos),
                Strand::Minus => end + (1 - tx_pos),
            }
        } else if tx_pos > tx_length {
            let (start, end) = exons[exons.len() - 1];
            match self.strand {
                Strand::Plus => end + (tx_pos - tx_length),
                Strand::Minus => start + 1 - (tx_pos - tx_length),
            }
        } else {
            let mut cum = 0;
            let mut result = 0;
            for (start, end) in &exons {
                if tx_pos <= cum + (end - start) {
                    let k = tx_pos - cum;
                    result = match self.strand {
                        Strand::Plus => start + k,
                        Strand::Minus => end - k + 1,
                    };
                    break;
                }
                cum += end - start;
            }
            result
        };

        match self.strand {
            Strand::Plus => pos + offset,
            Strand::Minus => pos - offset,
        }
    }

    /// Transcript positions of the first and last CDS base (including the stop codon).
    ///
    /// Returns `None` for non-coding transcripts.
    pub fn cds_tx_range(&self) -> Option<(i32, i32)> {
        if !self.is_coding() {
            return None;
        }
        let (cds_start, cds_end) = self.cds_range;
        let first = self.genomic_to_tx(cds_start + 1).0;
        let last = self.genomic_to_tx(cds_end).0;
        Some(match self.strand {
            Strand::Plus => (first, last),
            Strand::Minus => (last, first),
        })
    }
}

/// Transcripts of one genome build, looked up by accession.
///
/// Each transcript is registered under its full accession and its accession without version.
#[derive(Debug, Clone, Default)]
pub struct TranscriptTable {
    transcripts: Vec<Transcript>,
    tx_map: HashMap<String, usize>,
}

impl TranscriptTable {
    pub fn new(transcripts: Vec<Transcript>) -> Self {
        let mut tx_map = HashMap::new();
        for (idx, tx) in transcripts.iter().enumerate() {
            tx_map.insert(tx.name().to_string(), idx);
            tx_map.insert(tx.accession().to_string(), idx);
        }
        Self {
            transcripts,
            tx_map,
        }
    }

    /// Load transcripts from genePred file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        tracing::debug!("Loading transcripts from {:?}", path);
        let start = Instant::now();
        let transcripts = genepred::read_transcripts(open_read_maybe_gz(path)?)
            .with_context(|| format!("could not read transcripts from {:?}", path))?;
        tracing::debug!(
            "loading {} transcripts took {:?}",
            transcripts.len(),
            start.elapsed()
        );
        Ok(Self::new(transcripts))
    }

    pub fn get(&self, accession: &str) -> Option<&Transcript> {
        self.tx_map.get(accession).map(|idx| &self.transcripts[*idx])
    }

    /// Like `get` but failing if there is no transcript for `accession`.
    pub fn get_required(&self, accession: &str) -> Result<&Transcript, anyhow::Error> {
        self.get(accession)
            .ok_or_else(|| anyhow!("no transcript found for accession {:?}", accession))
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transcript> {
        self.transcripts.iter()
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}
