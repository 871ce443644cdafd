//! cDNA coordinates and their mapping to the genome.

use std::str::FromStr;

use anyhow::anyhow;
use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map_res, opt},
    IResult, Parser,
};

use crate::txs::Transcript;

/// Landmark that a cDNA coordinate is counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Landmark {
    /// The first base of the start codon; the transcript start for non-coding transcripts.
    #[default]
    Start,
    /// The last base of the stop codon, written with a `*` prefix.
    CdsStop,
}

/// A position in cDNA coordinates, e.g., `-20`, `123+5`, or `*30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CdnaCoord {
    pub coord: i32,
    pub offset: i32,
    pub landmark: Landmark,
}

impl CdnaCoord {
    pub fn new(coord: i32, offset: i32, landmark: Landmark) -> Self {
        Self {
            coord,
            offset,
            landmark,
        }
    }

    fn parse_number(input: &str) -> IResult<&str, i32> {
        map_res(digit1, str::parse::<i32>).parse(input)
    }

    fn parse_offset(input: &str) -> IResult<&str, i32> {
        (one_of("+-"), Self::parse_number)
            .map(|(sign, num)| if sign == '-' { -num } else { num })
            .parse(input)
    }

    /// Parse a coordinate as in `*12-3`.
    pub fn parse(input: &str) -> IResult<&str, Self> {
        (
            opt(char('*')),
            opt(char('-')),
            Self::parse_number,
            opt(Self::parse_offset),
        )
            .map(|(star, minus, num, offset)| CdnaCoord {
                coord: if minus.is_some() { -num } else { num },
                offset: offset.unwrap_or_default(),
                landmark: if star.is_some() {
                    Landmark::CdsStop
                } else {
                    Landmark::Start
                },
            })
            .parse(input)
    }
}

impl std::fmt::Display for CdnaCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.landmark == Landmark::CdsStop {
            write!(f, "*")?;
        }
        write!(f, "{}", self.coord)?;
        match self.offset {
            0 => Ok(()),
            offset if offset > 0 => write!(f, "+{}", offset),
            offset => write!(f, "{}", offset),
        }
    }
}

impl FromStr for CdnaCoord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(Self::parse)
            .parse(s)
            .map(|(_, value)| value)
            .map_err(|e| anyhow!("invalid cDNA coordinate {:?}: {}", s, e))
    }
}

impl Transcript {
    /// Convert the 1-based genomic `pos` into a cDNA coordinate.
    ///
    /// There is no `c.0`: the base before `c.1` is `c.-1`.
    pub fn genomic_to_cdna(&self, pos: i32) -> CdnaCoord {
        let (tx_pos, offset) = self.genomic_to_tx(pos);
        match self.cds_tx_range() {
            None => CdnaCoord::new(
                if tx_pos < 1 { tx_pos - 1 } else { tx_pos },
                offset,
                Landmark::Start,
            ),
            Some((cds_start, _)) if tx_pos < cds_start => {
                CdnaCoord::new(tx_pos - cds_start, offset, Landmark::Start)
            }
            Some((_, cds_end)) if tx_pos > cds_end => {
                CdnaCoord::new(tx_pos - cds_end, offset, Landmark::CdsStop)
            }
            Some((cds_start, _)) => {
                CdnaCoord::new(tx_pos - cds_start + 1, offset, Landmark::Start)
            }
        }
    }

    /// Convert the cDNA coordinate back into a 1-based genomic position.
    pub fn cdna_to_genomic(&self, coord: &CdnaCoord) -> Result<i32, anyhow::Error> {
        if coord.coord == 0 {
            anyhow::bail!("invalid cDNA coordinate {} on {}", coord, self.accession());
        }
        let tx_pos = match (self.cds_tx_range(), coord.landmark) {
            (None, Landmark::Start) => {
                if coord.coord < 0 {
                    coord.coord + 1
                } else {
                    coord.coord
                }
            }
            (None, Landmark::CdsStop) => anyhow::bail!(
                "coordinate {} relative to stop codon on non-coding transcript {}",
                coord,
                self.accession()
            ),
            (Some((_, cds_end)), Landmark::CdsStop) => cds_end + coord.coord,
            (Some((cds_start, _)), Landmark::Start) => {
                if coord.coord > 0 {
                    cds_start + coord.coord - 1
                } else {
                    cds_start + coord.coord
                }
            }
        };
        Ok(self.tx_to_genomic(tx_pos, coord.offset))
    }
}
