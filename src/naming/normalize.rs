//! Normalization of genomic variants against the reference sequence.
//!
//! Variants handled here may have empty alleles.  An insertion at `position` goes between
//! `position - 1` and `position`; a deletion at `position` starts with the deleted base.

use super::VcfVariant;
use crate::reference::Genome;

/// Direction to shift indels into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards smaller coordinates.
    Left,
    /// Towards larger coordinates.
    Right,
}

/// Remove the common suffix and then the common prefix of the two alleles.
pub fn trim_common(variant: VcfVariant) -> VcfVariant {
    let VcfVariant {
        chromosome,
        position,
        reference,
        alternative,
    } = variant;

    let suffix = reference
        .bytes()
        .rev()
        .zip(alternative.bytes().rev())
        .take_while(|(r, a)| r == a)
        .count();
    let reference = &reference[..reference.len() - suffix];
    let alternative = &alternative[..alternative.len() - suffix];

    let prefix = reference
        .bytes()
        .zip(alternative.bytes())
        .take_while(|(r, a)| r == a)
        .count();

    VcfVariant {
        chromosome,
        position: position + prefix as i32,
        reference: reference[prefix..].to_string(),
        alternative: alternative[prefix..].to_string(),
    }
}

/// Shift a pure insertion or deletion as far as possible into `direction`.
///
/// Variants that are not pure indels are returned unchanged.
pub fn justify(
    genome: &Genome,
    variant: VcfVariant,
    direction: Direction,
) -> Result<VcfVariant, anyhow::Error> {
    let is_insertion = variant.reference.is_empty() && !variant.alternative.is_empty();
    let is_deletion = !variant.reference.is_empty() && variant.alternative.is_empty();
    if !is_insertion && !is_deletion {
        return Ok(variant);
    }

    let mut pos = variant.position;
    let mut seq = if is_insertion {
        variant.alternative.into_bytes()
    } else {
        variant.reference.into_bytes()
    };
    let len = seq.len() as i32;

    match direction {
        Direction::Right => {
            let contig_length = genome.contig_length(&variant.chromosome)?;
            loop {
                let next = if is_insertion { pos } else { pos + len };
                if next > contig_length {
                    break;
                }
                let base = genome.base(&variant.chromosome, next)? as u8;
                if base != seq[0] {
                    break;
                }
                seq.rotate_left(1);
                pos += 1;
            }
        }
        Direction::Left => {
            while pos > 1 {
                let base = genome.base(&variant.chromosome, pos - 1)? as u8;
                if base != seq[seq.len() - 1] {
                    break;
                }
                seq.rotate_right(1);
                pos -= 1;
            }
        }
    }

    let seq = String::from_utf8_lossy(&seq).into_owned();
    Ok(if is_insertion {
        VcfVariant::new(variant.chromosome, pos, String::new(), seq)
    } else {
        VcfVariant::new(variant.chromosome, pos, seq, String::new())
    })
}

/// Return the genomic interval duplicated by the insertion, if any.
///
/// The inserted sequence is compared to the bases before the insertion point first and then
/// to the bases after it.
pub fn find_duplication(
    genome: &Genome,
    insertion: &VcfVariant,
) -> Result<Option<(i32, i32)>, anyhow::Error> {
    let len = insertion.alternative.len() as i32;
    let pos = insertion.position;

    if pos - len >= 1
        && genome.fetch(&insertion.chromosome, pos - len, pos - 1)? == insertion.alternative
    {
        return Ok(Some((pos - len, pos - 1)));
    }
    if pos + len - 1 <= genome.contig_length(&insertion.chromosome)?
        && genome.fetch(&insertion.chromosome, pos, pos + len - 1)? == insertion.alternative
    {
        return Ok(Some((pos, pos + len - 1)));
    }
    Ok(None)
}

/// Bring the variant into the VCF representation.
///
/// Alleles are trimmed, indels are shifted left and padded with the preceding base (or the
/// following base for indels at the start of the contig).  Variants with equal alleles are
/// returned as they are.
pub fn left_normalize(genome: &Genome, variant: VcfVariant) -> Result<VcfVariant, anyhow::Error> {
    if variant.reference == variant.alternative {
        return Ok(variant);
    }

    let variant = justify(genome, trim_common(variant), Direction::Left)?;
    if !variant.reference.is_empty() && !variant.alternative.is_empty() {
        return Ok(variant);
    }

    let VcfVariant {
        chromosome,
        position,
        reference,
        alternative,
    } = variant;
    if position > 1 {
        let base = genome.base(&chromosome, position - 1)?;
        Ok(VcfVariant::new(
            chromosome,
            position - 1,
            format!("{}{}", base, reference),
            format!("{}{}", base, alternative),
        ))
    } else {
        let base = genome.base(&chromosome, position + reference.len() as i32)?;
        Ok(VcfVariant::new(
            chromosome,
            position,
            format!("{}{}", reference, base),
            format!("{}{}", alternative, base),
        ))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{find_duplication, justify, left_normalize, trim_common, Direction};
    use crate::naming::VcfVariant;
    use crate::reference::Genome;

    fn genome() -> Result<Genome, anyhow::Error> {
        Genome::from_path("tests/data/genomes/hg38.fa")
    }

    fn var(chrom: &str, pos: i32, reference: &str, alternative: &str) -> VcfVariant {
        VcfVariant::new(
            chrom.to_string(),
            pos,
            reference.to_string(),
            alternative.to_string(),
        )
    }

    #[rstest::rstest]
    #[case(var("chr13", 104, "GT", "G"), var("chr13", 105, "T", ""))]
    #[case(var("chr13", 104, "G", "GTT"), var("chr13", 105, "", "TT"))]
    #[case(var("chr13", 104, "ACGT", "AGGT"), var("chr13", 105, "C", "G"))]
    #[case(var("chr13", 104, "AC", "AC"), var("chr13", 104, "", ""))]
    fn trim(#[case] variant: VcfVariant, #[case] expected: VcfVariant) {
        assert_eq!(trim_common(variant), expected);
    }

    #[rstest::rstest]
    // GACG|TTTTTT|CGC at chr13:100-112
    #[case(var("chr13", 105, "T", ""), Direction::Right, var("chr13", 109, "T", ""))]
    #[case(var("chr13", 107, "T", ""), Direction::Left, var("chr13", 104, "T", ""))]
    #[case(var("chr13", 106, "", "T"), Direction::Right, var("chr13", 110, "", "T"))]
    #[case(var("chr13", 106, "", "T"), Direction::Left, var("chr13", 104, "", "T"))]
    #[case(var("chr13", 106, "T", "G"), Direction::Left, var("chr13", 106, "T", "G"))]
    fn justify_indels(
        #[case] variant: VcfVariant,
        #[case] direction: Direction,
        #[case] expected: VcfVariant,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(justify(&genome()?, variant, direction)?, expected);

        Ok(())
    }

    #[rstest::rstest]
    #[case(var("chr13", 110, "", "T"), Some((109, 109)))]
    #[case(var("chr13", 104, "", "T"), Some((104, 104)))]
    #[case(var("chr13", 110, "", "GGG"), None)]
    fn duplication(
        #[case] insertion: VcfVariant,
        #[case] expected: Option<(i32, i32)>,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(find_duplication(&genome()?, &insertion)?, expected);

        Ok(())
    }

    #[rstest::rstest]
    #[case(var("chr13", 107, "T", ""), var("chr13", 103, "GT", "G"))]
    #[case(var("chr13", 110, "", "GGG"), var("chr13", 109, "T", "TGGG"))]
    #[case(var("chr13", 104, "G", "GT"), var("chr13", 103, "G", "GT"))]
    #[case(var("chr13", 130, "G", "G"), var("chr13", 130, "G", "G"))]
    #[case(var("chr13", 105, "T", "A"), var("chr13", 105, "T", "A"))]
    fn vcf_normalization(
        #[case] variant: VcfVariant,
        #[case] expected: VcfVariant,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(left_normalize(&genome()?, variant)?, expected);

        Ok(())
    }
}
