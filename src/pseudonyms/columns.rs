//! Columns of the variant table that are read or rewritten.

use strum::{EnumCount, IntoEnumIterator};

/// A column that must be present in the header of the variant table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
)]
pub enum Column {
    #[strum(serialize = "Genomic_Coordinate_hg36")]
    GenomicCoordinateHg36,
    #[strum(serialize = "Genomic_Coordinate_hg37")]
    GenomicCoordinateHg37,
    #[strum(serialize = "Genomic_Coordinate_hg38")]
    GenomicCoordinateHg38,
    #[strum(serialize = "Reference_Sequence")]
    ReferenceSequence,
    #[strum(serialize = "HGVS_cDNA")]
    HgvsCdna,
    #[strum(serialize = "HGVS_Protein")]
    HgvsProtein,
    #[strum(serialize = "Gene_Symbol")]
    GeneSymbol,
    #[strum(serialize = "Synonyms")]
    Synonyms,
    #[strum(serialize = "Chr")]
    Chr,
    #[strum(serialize = "Pos")]
    Pos,
    #[strum(serialize = "Ref")]
    Ref,
    #[strum(serialize = "Alt")]
    Alt,
    #[strum(serialize = "Hg36_Start")]
    Hg36Start,
    #[strum(serialize = "Hg36_End")]
    Hg36End,
    #[strum(serialize = "Hg37_Start")]
    Hg37Start,
    #[strum(serialize = "Hg37_End")]
    Hg37End,
}

/// Field indices of the columns, resolved from the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    indices: [usize; Column::COUNT],
}

impl ColumnIndex {
    /// Locate all columns in `header`; the first occurrence of a name wins.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self, anyhow::Error> {
        let mut indices = [0; Column::COUNT];
        let mut missing = Vec::new();
        for column in Column::iter() {
            let name = column.to_string();
            match header.iter().position(|field| field.as_ref() == name) {
                Some(idx) => indices[column as usize] = idx,
                None => missing.push(name),
            }
        }

        if !missing.is_empty() {
            anyhow::bail!("missing columns in header: {}", missing.join(", "));
        }
        Ok(Self { indices })
    }

    pub fn index(&self, column: Column) -> usize {
        self.indices[column as usize]
    }

    /// Largest index of any column, a row needs more fields than this.
    pub fn max_index(&self) -> usize {
        self.indices.iter().copied().max().unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::{Column, ColumnIndex};

    fn header() -> Vec<String> {
        let mut header = vec![String::from("Source")];
        header.extend(Column::iter().rev().map(|c| c.to_string()));
        header
    }

    #[test]
    fn resolve_indices() -> Result<(), anyhow::Error> {
        let index = ColumnIndex::from_header(&header())?;

        assert_eq!(index.index(Column::Hg37End), 1);
        assert_eq!(index.index(Column::GenomicCoordinateHg36), 16);
        assert_eq!(index.max_index(), 16);

        Ok(())
    }

    #[test]
    fn missing_columns() {
        let header = header()
            .into_iter()
            .filter(|name| name != "Synonyms" && name != "Pos")
            .collect::<Vec<_>>();

        let err = ColumnIndex::from_header(&header).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing columns in header: Synonyms, Pos"
        );
    }
}
