//! Reading of UCSC genePred files.
//!
//! The RefSeq annotation is distributed as `refGene` tables with the following 16 columns;
//! the 15-column `genePredExt` variant lacks the leading `bin` column.
//!
//! 1. bin
//! 2. name (transcript accession)
//! 3. chrom
//! 4. strand
//! 5. txStart, txEnd (0-based, half-open)
//! 6. cdsStart, cdsEnd (0-based, half-open; equal for non-coding transcripts)
//! 7. exonCount
//! 8. exonStarts, exonEnds (comma-terminated lists)
//! 9. score
//! 10. name2 (gene symbol)
//! 11. cdsStartStat, cdsEndStat, exonFrames

use std::io::BufRead;
use std::str::FromStr;

use anyhow::{anyhow, Context};

use super::{Strand, Transcript};

/// Number of columns in a `refGene` line.
const REFGENE_COLUMNS: usize = 16;
/// Number of columns in a `genePredExt` line.
const GENEPRED_EXT_COLUMNS: usize = 15;

fn parse_list(value: &str) -> Result<Vec<i32>, anyhow::Error> {
    value
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i32>()
                .map_err(|e| anyhow!("invalid coordinate {:?}: {}", token, e))
        })
        .collect()
}

fn parse_int(value: &str, column: &str) -> Result<i32, anyhow::Error> {
    value
        .parse::<i32>()
        .map_err(|e| anyhow!("invalid {} {:?}: {}", column, value, e))
}

/// Parse a single genePred line.
///
/// Returns `Ok(None)` for comment lines and lines with an unexpected number of columns.
pub fn parse_line(line: &str) -> Result<Option<Transcript>, anyhow::Error> {
    if line.starts_with('#') || line.trim().is_empty() {
        return Ok(None);
    }
    let fields = line.trim_end_matches(['\r', '\n']).split('\t').collect::<Vec<_>>();
    let fields = match fields.len() {
        REFGENE_COLUMNS => &fields[1..],
        GENEPRED_EXT_COLUMNS => &fields[..],
        _ => {
            tracing::trace!("skipping line with {} columns", fields.len());
            return Ok(None);
        }
    };

    let exon_starts = parse_list(fields[8])?;
    let exon_ends = parse_list(fields[9])?;
    if exon_starts.len() != exon_ends.len() || exon_starts.is_empty() {
        anyhow::bail!(
            "transcript {} has {} exon starts but {} exon ends",
            fields[0],
            exon_starts.len(),
            exon_ends.len()
        );
    }

    Ok(Some(Transcript::new(
        fields[0].to_string(),
        fields[11].to_string(),
        fields[1].to_string(),
        Strand::from_str(fields[2])?,
        (parse_int(fields[3], "txStart")?, parse_int(fields[4], "txEnd")?),
        (
            parse_int(fields[5], "cdsStart")?,
            parse_int(fields[6], "cdsEnd")?,
        ),
        exon_starts.into_iter().zip(exon_ends).collect(),
    )))
}

/// Read all transcripts from a genePred file.
pub fn read_transcripts<R: BufRead>(reader: R) -> Result<Vec<Transcript>, anyhow::Error> {
    let mut result = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(tx) =
            parse_line(&line).with_context(|| format!("problem in line {}", lineno + 1))?
        {
            result.push(tx);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::txs::Strand;

    #[test]
    fn parse_refgene_line() -> Result<(), anyhow::Error> {
        let line = "585\tNM_007294.3\tchr17\t-\t100\t400\t120\t380\t3\t100,200,300,\t\
                    160,260,400,\t0\tBRCA1\tcmpl\tcmpl\t0,0,0,";
        let tx = super::parse_line(line)?.expect("line should yield transcript");

        assert_eq!(tx.accession(), "NM_007294.3");
        assert_eq!(tx.name(), "NM_007294");
        assert_eq!(tx.version(), Some("3"));
        assert_eq!(tx.gene_name(), "BRCA1");
        assert_eq!(tx.chrom(), "chr17");
        assert_eq!(tx.strand(), Strand::Minus);
        assert_eq!(tx.tx_range(), (100, 400));
        assert_eq!(tx.cds_range(), (120, 380));
        assert_eq!(tx.exons(), &[(100, 160), (200, 260), (300, 400)]);

        Ok(())
    }

    #[test]
    fn parse_genepred_ext_line() -> Result<(), anyhow::Error> {
        let line = "U43746.1\tchr13\t+\t60\t400\t80\t350\t3\t60,180,320,\t120,260,400,\t\
                    0\tBRCA2\tcmpl\tcmpl\t0,0,0,";
        let tx = super::parse_line(line)?.expect("line should yield transcript");

        assert_eq!(tx.accession(), "U43746.1");
        assert_eq!(tx.strand(), Strand::Plus);
        assert_eq!(tx.exons().len(), 3);

        Ok(())
    }

    #[rstest::rstest]
    #[case("#bin\tname\tchrom")]
    #[case("")]
    #[case("NM_1\tchr1\t+")]
    fn skipped_lines(#[case] line: &str) -> Result<(), anyhow::Error> {
        assert!(super::parse_line(line)?.is_none());

        Ok(())
    }

    #[test]
    fn broken_exon_lists() {
        let line = "585\tNM_1.1\tchr1\t+\t100\t400\t120\t380\t3\t100,200,300,\t\
                    160,260,\t0\tGENE\tcmpl\tcmpl\t0,0,0,";
        assert!(super::parse_line(line).is_err());
    }

    #[test]
    fn read_transcripts() -> Result<(), anyhow::Error> {
        let txs = super::read_transcripts(std::io::BufReader::new(std::fs::File::open(
            "tests/data/txs/refseq_annotation.hg38.gp",
        )?))?;

        assert_eq!(txs.len(), 9);

        Ok(())
    }
}
