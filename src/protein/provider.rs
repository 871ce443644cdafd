//! Implementation of `hgvs` Provider interface based on a FASTA genome and genePred transcripts.

use biocommons_bioutils::assemblies::ASSEMBLY_INFOS;
use hgvs::{
    data::error::Error,
    data::{
        cdot::json::NCBI_ALN_METHOD,
        interface::{
            Provider as ProviderInterface, TxExonsRecord, TxForRegionRecord, TxIdentityInfo,
            TxInfoRecord, TxMappingOptionsRecord,
        },
    },
    sequences::{seq_md5, TranslationTable},
};

use crate::reference::Genome;
use crate::txs::{Strand, Transcript, TranscriptTable};

/// Protein accessions of the canonical transcripts.
const PROTEIN_ACCESSIONS: &[(&str, &str)] = &[
    ("NM_007294.3", "NP_009225.1"), // BRCA1
    ("NM_000059.3", "NP_000050.2"), // BRCA2
];

/// Chromosome names that use the mitochondrial translation table.
const MITOCHONDRIAL_CONTIGS: &[&str] = &["chrM", "MT", "chrMT"];

/// Alignment method reported for the genePred exon structures.
const ALT_ALN_METHOD: &str = "splign";

fn strand_value<T: From<i8>>(strand: Strand) -> T {
    match strand {
        Strand::Plus => T::from(1),
        Strand::Minus => T::from(-1),
    }
}

/// Provider serving transcripts of one genome build.
pub struct Provider {
    genome: Genome,
    transcripts: TranscriptTable,
    /// The data version.
    data_version: String,
    /// The schema version.
    schema_version: String,
}

impl Provider {
    pub fn new(genome: Genome, transcripts: TranscriptTable) -> Self {
        Self {
            genome,
            transcripts,
            data_version: format!("brca-pseudonyms {}", crate::common::version()),
            schema_version: String::from("1.1"),
        }
    }

    fn transcript(&self, tx_ac: &str) -> Result<&Transcript, Error> {
        self.transcripts
            .get(tx_ac)
            .ok_or(Error::NoTranscriptFound(tx_ac.to_string()))
    }

    /// Whether `alt_ac` names the contig that `tx` is located on.
    fn is_on_contig(&self, tx: &Transcript, alt_ac: &str) -> bool {
        match (self.genome.contig(tx.chrom()), self.genome.contig(alt_ac)) {
            (Ok(lhs), Ok(rhs)) => lhs.name() == rhs.name(),
            _ => tx.chrom() == alt_ac,
        }
    }

    /// Splice the transcript sequence from the genome.
    fn transcript_sequence(&self, tx: &Transcript) -> Result<String, anyhow::Error> {
        let mut seq = String::with_capacity(tx.tx_length() as usize);
        for (start, end) in tx.exons() {
            seq.push_str(&self.genome.fetch(tx.chrom(), start + 1, *end)?);
        }
        Ok(match tx.strand() {
            Strand::Plus => seq,
            Strand::Minus => String::from_utf8_lossy(&bio::alphabets::dna::revcomp(
                seq.as_bytes(),
            ))
            .into_owned(),
        })
    }

    fn sequence(&self, ac: &str) -> Result<String, Error> {
        let result = if let Some(tx) = self.transcripts.get(ac) {
            self.transcript_sequence(tx)
        } else {
            self.genome
                .contig_length(ac)
                .and_then(|length| self.genome.fetch(ac, 1, length))
        };
        result.map_err(|e| {
            tracing::debug!("could not load sequence for {}: {}", ac, e);
            Error::NoSequenceRecord(ac.to_string())
        })
    }
}

impl ProviderInterface for Provider {
    fn data_version(&self) -> &str {
        &self.data_version
    }

    fn schema_version(&self) -> &str {
        &self.schema_version
    }

    fn get_assembly_map(
        &self,
        assembly: biocommons_bioutils::assemblies::Assembly,
    ) -> indexmap::IndexMap<String, String> {
        indexmap::IndexMap::from_iter(
            ASSEMBLY_INFOS[assembly]
                .sequences
                .iter()
                .map(|record| (record.refseq_ac.clone(), record.name.clone())),
        )
    }

    fn get_gene_info(&self, hgnc: &str) -> Result<hgvs::data::interface::GeneInfoRecord, Error> {
        Err(Error::NoGeneFound(hgnc.to_string()))
    }

    fn get_pro_ac_for_tx_ac(&self, tx_ac: &str) -> Result<Option<String>, Error> {
        let tx = self.transcript(tx_ac)?;
        Ok(PROTEIN_ACCESSIONS
            .iter()
            .find(|(ac, _)| *ac == tx.accession())
            .map(|(_, pro_ac)| pro_ac.to_string()))
    }

    fn get_seq_part(
        &self,
        ac: &str,
        begin: Option<usize>,
        end: Option<usize>,
    ) -> Result<String, Error> {
        let seq = self.sequence(ac)?;
        let begin = std::cmp::min(begin.unwrap_or_default(), seq.len());
        let end = std::cmp::min(end.unwrap_or(seq.len()), seq.len());
        if begin >= end {
            Ok(String::new())
        } else {
            Ok(seq[begin..end].to_string())
        }
    }

    fn get_acs_for_protein_seq(&self, seq: &str) -> Result<Vec<String>, Error> {
        Ok(vec![format!("MD5_{}", seq_md5(seq, true)?)])
    }

    fn get_similar_transcripts(
        &self,
        tx_ac: &str,
    ) -> Result<Vec<hgvs::data::interface::TxSimilarityRecord>, Error> {
        Err(Error::NoTranscriptFound(tx_ac.to_string()))
    }

    fn get_tx_exons(
        &self,
        tx_ac: &str,
        alt_ac: &str,
        _alt_aln_method: &str,
    ) -> Result<Vec<TxExonsRecord>, Error> {
        let tx = self.transcript(tx_ac)?;
        if !self.is_on_contig(tx, alt_ac) {
            return Err(Error::NoAlignmentFound(
                tx_ac.to_string(),
                alt_ac.to_string(),
            ));
        }

        let mut result = tx
            .exons_tx_order()
            .into_iter()
            .zip(tx.exons_tx_intervals())
            .enumerate()
            .map(
                |(ord, ((alt_start_i, alt_end_i), (tx_start_i, tx_end_i)))| TxExonsRecord {
                    hgnc: tx.gene_name().to_string(),
                    tx_ac: tx_ac.to_string(),
                    alt_ac: alt_ac.to_string(),
                    alt_aln_method: ALT_ALN_METHOD.to_string(),
                    alt_strand: strand_value(tx.strand()),
                    ord: ord as i32,
                    tx_start_i,
                    tx_end_i,
                    alt_start_i,
                    alt_end_i,
                    cigar: format!("{}M", alt_end_i - alt_start_i),
                    tx_aseq: None,
                    alt_aseq: None,
                    tx_exon_set_id: i32::MAX,
                    alt_exon_set_id: i32::MAX,
                    tx_exon_id: i32::MAX,
                    alt_exon_id: i32::MAX,
                    exon_aln_id: i32::MAX,
                },
            )
            .collect::<Vec<_>>();
        result.sort_by_key(|exon| exon.alt_start_i);

        Ok(result)
    }

    fn get_tx_for_gene(&self, gene: &str) -> Result<Vec<TxInfoRecord>, Error> {
        let result = self
            .transcripts
            .iter()
            .filter(|tx| tx.gene_name() == gene)
            .map(|tx| TxInfoRecord {
                hgnc: tx.gene_name().to_string(),
                cds_start_i: tx.is_coding().then(|| tx.cds_range().0),
                cds_end_i: tx.is_coding().then(|| tx.cds_range().1),
                tx_ac: tx.accession().to_string(),
                alt_ac: tx.chrom().to_string(),
                alt_aln_method: ALT_ALN_METHOD.to_string(),
            })
            .collect::<Vec<_>>();
        if result.is_empty() {
            tracing::warn!("no transcripts found for gene: {}", gene);
        }
        Ok(result)
    }

    fn get_tx_for_region(
        &self,
        alt_ac: &str,
        _alt_aln_method: &str,
        start_i: i32,
        end_i: i32,
    ) -> Result<Vec<TxForRegionRecord>, Error> {
        let contig = self
            .genome
            .contig(alt_ac)
            .map_err(|_| Error::NoTranscriptFound(alt_ac.to_string()))?;

        Ok(self
            .transcripts
            .iter()
            .filter(|tx| {
                let (tx_start, tx_end) = tx.tx_range();
                tx_start < end_i
                    && start_i < tx_end
                    && self
                        .genome
                        .contig(tx.chrom())
                        .is_ok_and(|tx_contig| tx_contig.name() == contig.name())
            })
            .map(|tx| TxForRegionRecord {
                tx_ac: tx.accession().to_string(),
                alt_ac: alt_ac.to_string(),
                alt_strand: strand_value(tx.strand()),
                alt_aln_method: ALT_ALN_METHOD.to_string(),
                start_i,
                end_i,
            })
            .collect())
    }

    fn get_tx_identity_info(&self, tx_ac: &str) -> Result<TxIdentityInfo, Error> {
        let tx = self.transcript(tx_ac)?;
        let (cds_start_i, cds_end_i) = tx
            .cds_tx_range()
            .map(|(first, last)| (first - 1, last))
            .unwrap_or_default();
        let lengths = tx
            .exons_tx_intervals()
            .into_iter()
            .map(|(start, end)| end - start)
            .collect();

        Ok(TxIdentityInfo {
            tx_ac: tx_ac.to_string(),
            alt_ac: tx_ac.to_string(), // sic(!)
            alt_aln_method: String::from("transcript"),
            cds_start_i,
            cds_end_i,
            lengths,
            hgnc: tx.gene_name().to_string(),
            translation_table: if MITOCHONDRIAL_CONTIGS.contains(&tx.chrom()) {
                TranslationTable::VertebrateMitochondrial
            } else {
                TranslationTable::Standard
            },
        })
    }

    fn get_tx_info(
        &self,
        tx_ac: &str,
        alt_ac: &str,
        _alt_aln_method: &str,
    ) -> Result<TxInfoRecord, Error> {
        let tx = self.transcript(tx_ac)?;
        if !self.is_on_contig(tx, alt_ac) {
            return Err(Error::NoAlignmentFound(
                tx_ac.to_string(),
                alt_ac.to_string(),
            ));
        }

        Ok(TxInfoRecord {
            hgnc: tx.gene_name().to_string(),
            cds_start_i: tx.is_coding().then(|| tx.cds_range().0),
            cds_end_i: tx.is_coding().then(|| tx.cds_range().1),
            tx_ac: tx.accession().to_string(),
            alt_ac: alt_ac.to_string(),
            alt_aln_method: ALT_ALN_METHOD.to_string(),
        })
    }

    fn get_tx_mapping_options(&self, tx_ac: &str) -> Result<Vec<TxMappingOptionsRecord>, Error> {
        let tx = self.transcript(tx_ac)?;
        Ok(vec![TxMappingOptionsRecord {
            tx_ac: tx_ac.to_string(),
            alt_ac: tx.chrom().to_string(),
            alt_aln_method: NCBI_ALN_METHOD.to_string(),
        }])
    }
}
