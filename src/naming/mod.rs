//! Formatting and parsing of cDNA-level HGVS names for genomic variants.
//!
//! Names are formatted from a genomic variant in the style of the `pyhgvs` library:
//! indels are shifted 3' in transcript direction, insertions of repeated sequence become
//! duplications, and long alleles are written as their length.  Parsing goes the other way
//! and yields left-normalized, VCF-style variants.

pub mod coord;
pub mod name;
pub mod normalize;

use std::str::FromStr;

use anyhow::{anyhow, Context};

use self::name::{Allele, Edit, HgvsName, Kind};
use self::normalize::{find_duplication, justify, left_normalize, trim_common, Direction};
use crate::reference::Genome;
use crate::txs::{Strand, Transcript, TranscriptTable};

/// Default ceiling for spelling out alleles in names.
pub const DEFAULT_MAX_ALLELE_LENGTH: usize = 100;

/// A variant description how VCF would do it.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct VcfVariant {
    /// Chromosome name.
    pub chromosome: String,
    /// 1-based position on the chromosome of first base of `reference`.
    pub position: i32,
    /// Reference bases.
    pub reference: String,
    /// Alternative bases.
    pub alternative: String,
}

impl VcfVariant {
    pub fn new(chromosome: String, position: i32, reference: String, alternative: String) -> Self {
        Self {
            chromosome,
            position,
            reference,
            alternative,
        }
    }
}

/// Formats as `chrom:pos:ref>alt`, as written into the per-build coordinate columns.
impl std::fmt::Display for VcfVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}>{}",
            self.chromosome, self.position, self.reference, self.alternative
        )
    }
}

fn revcomp(seq: &str) -> String {
    String::from_utf8_lossy(&bio::alphabets::dna::revcomp(seq.as_bytes())).into_owned()
}

/// Orient `seq` from genomic into transcript direction and back.
fn orient(seq: &str, strand: Strand) -> String {
    match strand {
        Strand::Plus => seq.to_string(),
        Strand::Minus => revcomp(seq),
    }
}

/// Kind of the genomic change after normalization.
enum Change {
    Substitution,
    Identity,
    Deletion,
    Duplication,
    Insertion,
    DelIns,
}

/// Compute the HGVS name of `variant` on `transcript`.
///
/// Alleles longer than `max_allele_length` are written as their length.
pub fn format_hgvs_name(
    variant: &VcfVariant,
    genome: &Genome,
    transcript: &Transcript,
    max_allele_length: usize,
) -> Result<HgvsName, anyhow::Error> {
    let variant = VcfVariant {
        reference: variant.reference.to_ascii_uppercase(),
        alternative: variant.alternative.to_ascii_uppercase(),
        ..variant.clone()
    };

    let (change, span, reference, alternative) = if variant.reference == variant.alternative {
        if variant.reference.is_empty() {
            anyhow::bail!("variant {} has neither reference nor alternative allele", variant);
        }
        let span = (
            variant.position,
            variant.position + variant.reference.len() as i32 - 1,
        );
        (Change::Identity, span, variant.reference, variant.alternative)
    } else {
        let variant = trim_common(variant);
        let direction = match transcript.strand() {
            Strand::Plus => Direction::Right,
            Strand::Minus => Direction::Left,
        };
        match (variant.reference.len(), variant.alternative.len()) {
            (0, _) => {
                let variant = justify(genome, variant, direction)?;
                match find_duplication(genome, &variant)? {
                    Some(span) => (
                        Change::Duplication,
                        span,
                        variant.alternative.clone(),
                        variant.alternative,
                    ),
                    None => (
                        Change::Insertion,
                        (variant.position - 1, variant.position),
                        variant.reference,
                        variant.alternative,
                    ),
                }
            }
            (_, 0) => {
                let variant = justify(genome, variant, direction)?;
                let span = (
                    variant.position,
                    variant.position + variant.reference.len() as i32 - 1,
                );
                (Change::Deletion, span, variant.reference, variant.alternative)
            }
            (ref_len, alt_len) => {
                let span = (variant.position, variant.position + ref_len as i32 - 1);
                let change = if ref_len == 1 && alt_len == 1 {
                    Change::Substitution
                } else {
                    Change::DelIns
                };
                (change, span, variant.reference, variant.alternative)
            }
        }
    };

    let strand = transcript.strand();
    let reference = orient(&reference, strand);
    let alternative = orient(&alternative, strand);
    let (start, end) = match strand {
        Strand::Plus => (
            transcript.genomic_to_cdna(span.0),
            transcript.genomic_to_cdna(span.1),
        ),
        Strand::Minus => (
            transcript.genomic_to_cdna(span.1),
            transcript.genomic_to_cdna(span.0),
        ),
    };

    let allele = |seq: &str| Allele::with_max_length(seq, max_allele_length);
    let edit = match change {
        Change::Substitution => Edit::Substitution {
            reference,
            alternative,
        },
        Change::Identity => Edit::Identity {
            reference: Allele::Sequence(reference),
        },
        Change::Deletion => Edit::Deletion {
            reference: allele(&reference),
        },
        Change::Duplication => Edit::Duplication {
            reference: allele(&reference),
        },
        Change::Insertion => Edit::Insertion {
            alternative: allele(&alternative),
        },
        Change::DelIns => Edit::DelIns {
            reference: allele(&reference),
            alternative: allele(&alternative),
        },
    };

    Ok(HgvsName {
        accession: transcript.accession().to_string(),
        gene: None,
        kind: if transcript.is_coding() {
            Kind::Coding
        } else {
            Kind::NonCoding
        },
        start,
        end,
        edit,
    })
}

/// Resolve the HGVS name `name` to a left-normalized, VCF-style variant.
pub fn parse_hgvs_name(
    name: &str,
    genome: &Genome,
    transcripts: &TranscriptTable,
) -> Result<VcfVariant, anyhow::Error> {
    let hgvs = HgvsName::from_str(name)?;
    let transcript = transcripts.get_required(&hgvs.accession)?;
    resolve_hgvs_name(&hgvs, genome, transcript)
        .with_context(|| format!("could not resolve {} on the genome", name))
}

fn resolve_hgvs_name(
    hgvs: &HgvsName,
    genome: &Genome,
    transcript: &Transcript,
) -> Result<VcfVariant, anyhow::Error> {
    let chrom = transcript.chrom().to_string();
    let strand = transcript.strand();
    let pos_start = transcript.cdna_to_genomic(&hgvs.start)?;
    let pos_end = transcript.cdna_to_genomic(&hgvs.end)?;
    let (start, end) = (pos_start.min(pos_end), pos_start.max(pos_end));

    let sequence = |allele: &Allele| {
        allele
            .sequence()
            .map(|seq| orient(seq, strand))
            .ok_or_else(|| anyhow!("allele {:?} in {} is not a sequence", allele, hgvs))
    };

    let (pos, reference, alternative) = match &hgvs.edit {
        Edit::Substitution { alternative, .. } => (
            start,
            genome.fetch(&chrom, start, end)?,
            orient(alternative, strand),
        ),
        Edit::Identity { .. } => {
            let reference = genome.fetch(&chrom, start, end)?;
            (start, reference.clone(), reference)
        }
        Edit::Deletion { .. } => (start, genome.fetch(&chrom, start, end)?, String::new()),
        Edit::Duplication { .. } => (
            end + 1,
            String::new(),
            genome.fetch(&chrom, start, end)?,
        ),
        Edit::Insertion { alternative } => {
            if end != start + 1 {
                anyhow::bail!("insertion {} must be between adjacent positions", hgvs);
            }
            (end, String::new(), sequence(alternative)?)
        }
        Edit::DelIns { alternative, .. } => (
            start,
            genome.fetch(&chrom, start, end)?,
            sequence(alternative)?,
        ),
    };

    left_normalize(genome, VcfVariant::new(chrom, pos, reference, alternative))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{format_hgvs_name, parse_hgvs_name, VcfVariant, DEFAULT_MAX_ALLELE_LENGTH};
    use crate::reference::Genome;
    use crate::txs::TranscriptTable;

    struct Fixture {
        genome: Genome,
        transcripts: TranscriptTable,
    }

    impl Fixture {
        fn new(build: &str) -> Result<Self, anyhow::Error> {
            Ok(Self {
                genome: Genome::from_path(format!("tests/data/genomes/{}.fa", build))?,
                transcripts: TranscriptTable::from_path(format!(
                    "tests/data/txs/refseq_annotation.{}.gp",
                    build
                ))?,
            })
        }

        fn format(
            &self,
            accession: &str,
            variant: &VcfVariant,
            max_allele_length: usize,
        ) -> Result<String, anyhow::Error> {
            let tx = self.transcripts.get_required(accession)?;
            Ok(format_hgvs_name(variant, &self.genome, tx, max_allele_length)?.to_string())
        }

        fn parse(&self, name: &str) -> Result<VcfVariant, anyhow::Error> {
            parse_hgvs_name(name, &self.genome, &self.transcripts)
        }
    }

    fn var(chrom: &str, pos: i32, reference: &str, alternative: &str) -> VcfVariant {
        VcfVariant::new(
            chrom.to_string(),
            pos,
            reference.to_string(),
            alternative.to_string(),
        )
    }

    #[test]
    fn display_vcf_variant() {
        assert_eq!(var("chr17", 350, "G", "A").to_string(), "chr17:350:G>A");
        assert_eq!(var("chr13", 103, "GT", "G").to_string(), "chr13:103:GT>G");
    }

    #[rstest::rstest]
    #[case("NM_007294.3", var("chr17", 350, "G", "A"), "NM_007294.3:c.31C>T")]
    #[case("NM_007294.3", var("chr17", 385, "C", "A"), "NM_007294.3:c.-5G>T")]
    #[case("NM_007294.3", var("chr17", 118, "A", "C"), "NM_007294.3:c.*3T>G")]
    #[case("NM_007294.3", var("chr17", 280, "A", "C"), "NM_007294.3:c.81-20T>G")]
    #[case("NM_007294.3", var("chr17", 362, "", "T"), "NM_007294.3:c.20dupA")]
    #[case("NM_007294.3", var("chr17", 361, "T", "TT"), "NM_007294.3:c.20dupA")]
    #[case("NM_007294.3", var("chr17", 366, "", "G"), "NM_007294.3:c.15dupC")]
    #[case("NM_007294.3", var("chr17", 340, "TCACT", ""), "NM_007294.3:c.38_42delGTGAA")]
    #[case("NM_007294.3", var("chr17", 350, "GA", "T"), "NM_007294.3:c.30_31delTCinsA")]
    #[case("NM_007294.3", var("chr17", 345, "A", "ACCC"), "NM_007294.3:c.35_36insGGG")]
    #[case("NM_000059.3", var("chr13", 105, "T", ""), "NM_000059.3:c.29delT")]
    #[case("NM_000059.3", var("chr13", 103, "GT", "G"), "NM_000059.3:c.29delT")]
    #[case("NM_000059.3", var("chr13", 104, "", "T"), "NM_000059.3:c.29dupT")]
    #[case("NM_000059.3", var("chr13", 110, "", "GGG"), "NM_000059.3:c.29_30insGGG")]
    #[case("NM_000059.3", var("chr13", 130, "G", "G"), "NM_000059.3:c.40+10G=")]
    #[case("NM_000059.3", var("chr13", 115, "GGA", "AT"), "NM_000059.3:c.35_37delGGAinsAT")]
    fn format(
        #[case] accession: &str,
        #[case] variant: VcfVariant,
        #[case] expected: &str,
    ) -> Result<(), anyhow::Error> {
        let fixture = Fixture::new("hg38")?;

        assert_eq!(
            fixture.format(accession, &variant, DEFAULT_MAX_ALLELE_LENGTH)?,
            expected
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case("NM_007294.3", var("chr17", 340, "TCACT", ""), "NM_007294.3:c.38_42del5")]
    #[case("NM_000059.3", var("chr13", 115, "GGA", "AT"), "NM_000059.3:c.35_37del3insAT")]
    fn format_long_alleles(
        #[case] accession: &str,
        #[case] variant: VcfVariant,
        #[case] expected: &str,
    ) -> Result<(), anyhow::Error> {
        let fixture = Fixture::new("hg38")?;

        assert_eq!(fixture.format(accession, &variant, 2)?, expected);

        Ok(())
    }

    #[rstest::rstest]
    #[case("NM_007294.2", "NM_007294.2:c.31C>T")]
    #[case("NM_007300.3", "NM_007300.3:c.31C>T")]
    #[case("NM_007299.3", "NM_007299.3:c.31C>T")]
    #[case("NM_007298.3", "NM_007298.3:c.21C>T")]
    #[case("NM_007297.3", "NM_007297.3:c.31C>T")]
    #[case("U14680.1", "U14680.1:c.31C>T")]
    fn format_alternate_transcripts(
        #[case] accession: &str,
        #[case] expected: &str,
    ) -> Result<(), anyhow::Error> {
        let fixture = Fixture::new("hg38")?;

        assert_eq!(
            fixture.format(accession, &var("chr17", 350, "G", "A"), DEFAULT_MAX_ALLELE_LENGTH)?,
            expected
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case("NM_007294.3:c.31C>T", var("chr17", 350, "G", "A"))]
    #[case("NM_007294.3(BRCA1):c.31C>T", var("chr17", 350, "G", "A"))]
    #[case("NM_007294.3:c.20dupA", var("chr17", 360, "C", "CT"))]
    #[case("NM_007294.3:c.15dupC", var("chr17", 365, "T", "TG"))]
    #[case("NM_007294.3:c.38_42delGTGAA", var("chr17", 338, "ATTCAC", "A"))]
    #[case("NM_007294.3:c.38_42del5", var("chr17", 338, "ATTCAC", "A"))]
    #[case("NM_007294.3:c.35_36insGGG", var("chr17", 345, "A", "ACCC"))]
    #[case("NM_007294.3:c.30_31delTCinsA", var("chr17", 350, "GA", "T"))]
    #[case("NM_000059.3:c.29delT", var("chr13", 103, "GT", "G"))]
    #[case("NM_000059.3:c.29dupT", var("chr13", 103, "G", "GT"))]
    #[case("NM_000059.3:c.29_30insGGG", var("chr13", 109, "T", "TGGG"))]
    #[case("NM_000059.3:c.40+10G=", var("chr13", 130, "G", "G"))]
    fn parse(#[case] name: &str, #[case] expected: VcfVariant) -> Result<(), anyhow::Error> {
        let fixture = Fixture::new("hg38")?;

        assert_eq!(fixture.parse(name)?, expected);

        Ok(())
    }

    #[rstest::rstest]
    #[case("hg38", var("chr17", 350, "G", "A"))]
    #[case("hg19", var("chr17", 387, "G", "A"))]
    #[case("hg18", var("chr17", 361, "G", "A"))]
    fn parse_other_builds(
        #[case] build: &str,
        #[case] expected: VcfVariant,
    ) -> Result<(), anyhow::Error> {
        let fixture = Fixture::new(build)?;

        assert_eq!(fixture.parse("NM_007294.3:c.31C>T")?, expected);

        Ok(())
    }

    #[rstest::rstest]
    #[case("NM_000059.3:c.29_31insT")]
    #[case("NM_000059.3:c.29_30ins5")]
    #[case("NM_000059.3:c.29_30del3ins5")]
    #[case("NM_000059.9:c.29delT")]
    #[case("NM_000059.3:c.29xyz")]
    fn parse_errors(#[case] name: &str) -> Result<(), anyhow::Error> {
        let fixture = Fixture::new("hg38")?;

        assert!(fixture.parse(name).is_err());

        Ok(())
    }

    #[rstest::rstest]
    #[case("NM_007294.3", var("chr17", 350, "G", "A"))]
    #[case("NM_007294.3", var("chr17", 360, "C", "CT"))]
    #[case("NM_007294.3", var("chr17", 338, "ATTCAC", "A"))]
    #[case("NM_000059.3", var("chr13", 103, "GT", "G"))]
    #[case("NM_000059.3", var("chr13", 109, "T", "TGGG"))]
    #[case("NM_000059.3", var("chr13", 115, "GGA", "AT"))]
    fn parse_inverts_format(
        #[case] accession: &str,
        #[case] variant: VcfVariant,
    ) -> Result<(), anyhow::Error> {
        let fixture = Fixture::new("hg38")?;

        let name = fixture.format(accession, &variant, DEFAULT_MAX_ALLELE_LENGTH)?;
        assert_eq!(fixture.parse(&name)?, variant);

        Ok(())
    }

    #[test]
    fn empty_variant() -> Result<(), anyhow::Error> {
        let fixture = Fixture::new("hg38")?;

        assert!(fixture
            .format("NM_000059.3", &var("chr13", 110, "", ""), DEFAULT_MAX_ALLELE_LENGTH)
            .is_err());

        Ok(())
    }
}
