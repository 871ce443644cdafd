//! Representation and grammar of transcript-level HGVS names.
use std::str::FromStr;

use anyhow::anyhow;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map_res, opt},
    sequence::{delimited, preceded},
    IResult, Parser,
};

use super::coord::CdnaCoord;

mod parse {
    use nom::{bytes::complete::take_while1, IResult, Parser};

    pub static NA: &str = "ACGTNacgtn";

    pub fn na1(input: &str) -> IResult<&str, &str> {
        take_while1(|c: char| NA.contains(c)).parse(input)
    }
}

/// An allele as written in a name: spelled out, given as a length, or left out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Allele {
    #[default]
    Unspecified,
    Sequence(String),
    Length(usize),
}

impl Allele {
    /// Spell out `sequence` unless it is longer than `max_length`.
    pub fn with_max_length(sequence: &str, max_length: usize) -> Self {
        if sequence.len() > max_length {
            Allele::Length(sequence.len())
        } else {
            Allele::Sequence(sequence.to_string())
        }
    }

    /// The spelled-out sequence, if any.
    pub fn sequence(&self) -> Option<&str> {
        match self {
            Allele::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    fn parse(input: &str) -> IResult<&str, Self> {
        opt(alt((
            map_res(digit1, str::parse::<usize>).map(Allele::Length),
            parse::na1.map(|sequence: &str| Allele::Sequence(sequence.to_ascii_uppercase())),
        )))
        .map(Option::unwrap_or_default)
        .parse(input)
    }
}

impl std::fmt::Display for Allele {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Allele::Unspecified => Ok(()),
            Allele::Sequence(sequence) => write!(f, "{}", sequence),
            Allele::Length(length) => write!(f, "{}", length),
        }
    }
}

/// The change described by a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// `A>G`
    Substitution {
        reference: String,
        alternative: String,
    },
    /// `A=`
    Identity { reference: Allele },
    /// `delAG`
    Deletion { reference: Allele },
    /// `dupC`
    Duplication { reference: Allele },
    /// `insT`
    Insertion { alternative: Allele },
    /// `delATinsG`
    DelIns {
        reference: Allele,
        alternative: Allele,
    },
}

impl Edit {
    fn parse_delins(input: &str) -> IResult<&str, Self> {
        (tag("del"), Allele::parse, tag("ins"), Allele::parse)
            .map(|(_, reference, _, alternative)| Edit::DelIns {
                reference,
                alternative,
            })
            .parse(input)
    }

    fn parse_del(input: &str) -> IResult<&str, Self> {
        preceded(tag("del"), Allele::parse)
            .map(|reference| Edit::Deletion { reference })
            .parse(input)
    }

    fn parse_dup(input: &str) -> IResult<&str, Self> {
        preceded(tag("dup"), Allele::parse)
            .map(|reference| Edit::Duplication { reference })
            .parse(input)
    }

    fn parse_ins(input: &str) -> IResult<&str, Self> {
        preceded(tag("ins"), Allele::parse)
            .map(|alternative| Edit::Insertion { alternative })
            .parse(input)
    }

    fn parse_substitution(input: &str) -> IResult<&str, Self> {
        (parse::na1, char('>'), parse::na1)
            .map(|(reference, _, alternative): (&str, _, &str)| Edit::Substitution {
                reference: reference.to_ascii_uppercase(),
                alternative: alternative.to_ascii_uppercase(),
            })
            .parse(input)
    }

    fn parse_identity(input: &str) -> IResult<&str, Self> {
        (Allele::parse, char('='))
            .map(|(reference, _)| Edit::Identity { reference })
            .parse(input)
    }

    pub fn parse(input: &str) -> IResult<&str, Self> {
        alt((
            Self::parse_delins,
            Self::parse_del,
            Self::parse_dup,
            Self::parse_ins,
            Self::parse_substitution,
            Self::parse_identity,
        ))
        .parse(input)
    }
}

impl std::fmt::Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edit::Substitution {
                reference,
                alternative,
            } => write!(f, "{}>{}", reference, alternative),
            Edit::Identity { reference } => write!(f, "{}=", reference),
            Edit::Deletion { reference } => write!(f, "del{}", reference),
            Edit::Duplication { reference } => write!(f, "dup{}", reference),
            Edit::Insertion { alternative } => write!(f, "ins{}", alternative),
            Edit::DelIns {
                reference,
                alternative,
            } => write!(f, "del{}ins{}", reference, alternative),
        }
    }
}

/// Coding (`c.`) or non-coding (`n.`) transcript name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum Kind {
    #[strum(serialize = "c")]
    Coding,
    #[strum(serialize = "n")]
    NonCoding,
}

/// A transcript-level HGVS name such as `NM_007294.3(BRCA1):c.68_69delAG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HgvsName {
    pub accession: String,
    pub gene: Option<String>,
    pub kind: Kind,
    pub start: CdnaCoord,
    pub end: CdnaCoord,
    pub edit: Edit,
}

impl HgvsName {
    fn parse_accession(input: &str) -> IResult<&str, &str> {
        take_till1(|c: char| c == ':' || c == '(' || c.is_whitespace()).parse(input)
    }

    fn parse_gene(input: &str) -> IResult<&str, &str> {
        delimited(
            char('('),
            take_while1(|c: char| c != ')' && !c.is_whitespace()),
            char(')'),
        )
        .parse(input)
    }

    fn parse_kind(input: &str) -> IResult<&str, Kind> {
        map_res(one_of("cn"), |c: char| Kind::from_str(&c.to_string())).parse(input)
    }

    pub fn parse(input: &str) -> IResult<&str, Self> {
        all_consuming((
            Self::parse_accession,
            opt(Self::parse_gene),
            char(':'),
            Self::parse_kind,
            char('.'),
            CdnaCoord::parse,
            opt(preceded(char('_'), CdnaCoord::parse)),
            Edit::parse,
        ))
        .map(
            |(accession, gene, _, kind, _, start, end, edit)| HgvsName {
                accession: accession.to_string(),
                gene: gene.map(str::to_string),
                kind,
                start,
                end: end.unwrap_or(start),
                edit,
            },
        )
        .parse(input)
    }
}

impl std::fmt::Display for HgvsName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.accession)?;
        if let Some(gene) = &self.gene {
            write!(f, "({})", gene)?;
        }
        write!(f, ":{}.{}", self.kind, self.start)?;
        if self.end != self.start {
            write!(f, "_{}", self.end)?;
        }
        write!(f, "{}", self.edit)
    }
}

impl FromStr for HgvsName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .map(|(_, value)| value)
            .map_err(|e| anyhow!("invalid HGVS name {:?}: {}", s, e))
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::{Allele, Edit, HgvsName, Kind};
    use crate::naming::coord::{CdnaCoord, Landmark};

    #[rstest::rstest]
    #[case("NM_007294.3:c.31C>T")]
    #[case("NM_007294.3:c.68_69delAG")]
    #[case("NM_007294.3:c.38_42del5")]
    #[case("NM_000059.3:c.5266dupC")]
    #[case("NM_000059.3:c.100_101insT")]
    #[case("NM_000059.3:c.10_11delATinsG")]
    #[case("NM_007294.3:c.-20A>G")]
    #[case("NM_007294.3:c.*5G=")]
    #[case("NM_007294.3:c.81-20T>G")]
    #[case("NM_007294.3(BRCA1):c.140+2del")]
    #[case("NR_027676.1:n.5delinsAA")]
    fn display_roundtrip(#[case] text: &str) -> Result<(), anyhow::Error> {
        assert_eq!(HgvsName::from_str(text)?.to_string(), text);

        Ok(())
    }

    #[test]
    fn parse_fields() -> Result<(), anyhow::Error> {
        let name = HgvsName::from_str("NM_007294.3(BRCA1):c.*3-1_*5dupac")?;

        insta::assert_debug_snapshot!(name, @r#"
        HgvsName {
            accession: "NM_007294.3",
            gene: Some(
                "BRCA1",
            ),
            kind: Coding,
            start: CdnaCoord {
                coord: 3,
                offset: -1,
                landmark: CdsStop,
            },
            end: CdnaCoord {
                coord: 5,
                offset: 0,
                landmark: CdsStop,
            },
            edit: Duplication {
                reference: Sequence(
                    "AC",
                ),
            },
        }
        "#);

        Ok(())
    }

    #[test]
    fn single_position() -> Result<(), anyhow::Error> {
        let name = HgvsName::from_str("NM_000059.3:c.29delT")?;

        assert_eq!(name.kind, Kind::Coding);
        assert_eq!(name.start, CdnaCoord::new(29, 0, Landmark::Start));
        assert_eq!(name.end, name.start);
        assert_eq!(
            name.edit,
            Edit::Deletion {
                reference: Allele::Sequence(String::from("T"))
            }
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case("")]
    #[case("NM_000059.3")]
    #[case("NM_000059.3:g.29delT")]
    #[case("NM_000059.3:c.29")]
    #[case("NM_000059.3:c.29delT extra")]
    #[case("NM_000059.3:c.29_30insGGG)")]
    #[case(":c.29delT")]
    #[case("NM_000059.3:c.29C>")]
    fn parse_invalid(#[case] text: &str) {
        assert!(HgvsName::from_str(text).is_err());
    }

    #[rstest::rstest]
    #[case("ACGT", 4, Allele::Sequence(String::from("ACGT")))]
    #[case("ACGT", 3, Allele::Length(4))]
    fn allele_max_length(#[case] sequence: &str, #[case] max: usize, #[case] expected: Allele) {
        assert_eq!(Allele::with_max_length(sequence, max), expected);
    }
}
