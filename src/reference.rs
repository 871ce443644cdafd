//! Random access to reference genome sequence.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Error};
use noodles::fasta::repository::Repository;

use crate::common::io::std::open_read_maybe_gz;

#[derive(Debug, Clone)]
pub struct Contig {
    name: String,
    length: u64,
}

impl Contig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> u64 {
        self.length
    }
}

/// A reference genome backed by a `noodles` FASTA repository.
///
/// Sequences are loaded per contig on first access and cached by the repository.
#[derive(Clone)]
pub struct Genome {
    repository: Repository,
    contigs: Vec<Contig>,
    /// Mapping from contig name and its `chr`-toggled alias to the name in the FASTA file.
    aliases: HashMap<String, usize>,
}

impl std::fmt::Debug for Genome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Genome")
            .field("contigs", &self.contigs)
            .finish()
    }
}

impl Genome {
    fn new(repository: Repository, contigs: Vec<Contig>) -> Self {
        let mut aliases = HashMap::new();
        for (idx, contig) in contigs.iter().enumerate() {
            let alias = if let Some(stripped) = contig.name.strip_prefix("chr") {
                stripped.to_string()
            } else {
                format!("chr{}", contig.name)
            };
            aliases.entry(alias).or_insert(idx);
        }
        // Exact names take precedence over aliases.
        for (idx, contig) in contigs.iter().enumerate() {
            aliases.insert(contig.name.clone(), idx);
        }

        Self {
            repository,
            contigs,
            aliases,
        }
    }

    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Load genome from FASTA file at `path`.
    ///
    /// If a `.fai` index is next to the file then sequences are read lazily through it.
    /// Otherwise, the whole (possibly gzip-compressed) file is read into memory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let path_fai = format!("{}.fai", path.display());
        if Path::new(&path_fai).exists() {
            indexed_genome(path)
        } else {
            tracing::debug!("no index at {}, reading {:?} into memory", &path_fai, path);
            in_memory_genome(path)
        }
        .with_context(|| format!("could not load reference genome from {:?}", path))
    }

    /// Resolve `chrom` to the contig as named in the FASTA file.
    pub fn contig(&self, chrom: &str) -> Result<&Contig, Error> {
        self.aliases
            .get(chrom)
            .map(|idx| &self.contigs[*idx])
            .ok_or_else(|| anyhow!("unknown chromosome {:?} in reference genome", chrom))
    }

    /// Length of the contig named `chrom`.
    pub fn contig_length(&self, chrom: &str) -> Result<i32, Error> {
        Ok(self.contig(chrom)?.length() as i32)
    }

    /// Fetch the upper-case sequence of `chrom` at the 1-based, inclusive `start..=end`.
    ///
    /// An empty string is returned if `end < start`.
    pub fn fetch(&self, chrom: &str, start: i32, end: i32) -> Result<String, Error> {
        if end < start {
            return Ok(String::new());
        }
        let contig = self.contig(chrom)?;
        if start < 1 || end as u64 > contig.length() {
            anyhow::bail!(
                "interval {}:{}-{} is outside of contig with length {}",
                chrom,
                start,
                end,
                contig.length()
            );
        }

        let sequence = self
            .repository
            .get(contig.name().as_bytes())
            .transpose()?
            .ok_or_else(|| anyhow!("no sequence for contig {:?}", contig.name()))?;
        let bytes = &sequence.as_ref()[(start - 1) as usize..end as usize];

        Ok(String::from_utf8_lossy(bytes).to_ascii_uppercase())
    }

    /// Fetch the single upper-case base at the 1-based `pos`.
    pub fn base(&self, chrom: &str, pos: i32) -> Result<char, Error> {
        self.fetch(chrom, pos, pos)?
            .chars()
            .next()
            .ok_or_else(|| anyhow!("no base at {}:{}", chrom, pos))
    }
}

fn contig_name(name: &[u8]) -> Result<String, Error> {
    Ok(std::str::from_utf8(name)
        .map_err(|e| anyhow!("failed parsing contig name {:?}: {}", name, e))?
        .to_string())
}

fn indexed_genome(path: &Path) -> Result<Genome, Error> {
    let reader = noodles::fasta::io::indexed_reader::Builder::default().build_from_path(path)?;
    let contigs = reader
        .index()
        .as_ref()
        .iter()
        .map(|record| {
            Ok(Contig {
                name: contig_name(record.name())?,
                length: record.length(),
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    let adapter = noodles::fasta::repository::adapters::IndexedReader::new(reader);
    Ok(Genome::new(Repository::new(adapter), contigs))
}

fn in_memory_genome(path: &Path) -> Result<Genome, Error> {
    let mut reader = noodles::fasta::io::Reader::new(open_read_maybe_gz(path)?);
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    let contigs = records
        .iter()
        .map(|record| {
            Ok(Contig {
                name: contig_name(record.name())?,
                length: record.sequence().len() as u64,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(Genome::new(Repository::new(records), contigs))
}
