use crate::error::{Error, Result as CoreResult};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Names of the mandatory SAM columns after QNAME, in file order.
pub const SAM_FIELDS: [&str; 10] = [
    "FLAG", "RNAME", "POS", "MAPQ", "CIGAR", "RNEXT", "PNEXT", "TLEN", "SEQ", "QUAL",
];

pub const MD_TAG: &str = "MD:Z";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignedRead {
    pub qname: String,
    pub flag: String,
    pub rname: String,
    pub pos: String,
    pub mapq: String,
    pub cigar: String,
    pub rnext: String,
    pub pnext: String,
    pub tlen: String,
    pub seq: String,
    pub qual: String,
    /// Optional fields keyed by `TAG:TYPE`, in file order.
    pub annotation: IndexMap<String, String>,
}

impl AlignedRead {
    /// Parses one tab-separated SAM alignment line.
    pub fn from_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(&['\r', '\n'][..]).split('\t').collect();
        if fields.len() < SAM_FIELDS.len() + 1 {
            anyhow::bail!(
                "SAM line has {} fields, expected at least {}",
                fields.len(),
                SAM_FIELDS.len() + 1
            );
        }

        let annotation = read_annotation(&fields[SAM_FIELDS.len() + 1..])
            .context(format!("Failed to parse optional fields of read {}", fields[0]))?;

        Ok(AlignedRead {
            qname: fields[0].to_string(),
            flag: fields[1].to_string(),
            rname: fields[2].to_string(),
            pos: fields[3].to_string(),
            mapq: fields[4].to_string(),
            cigar: fields[5].to_string(),
            rnext: fields[6].to_string(),
            pnext: fields[7].to_string(),
            tlen: fields[8].to_string(),
            seq: fields[9].to_string(),
            qual: fields[10].to_string(),
            annotation,
        })
    }

    /// Builds a read from a field-name to value mapping. Keys containing a
    /// colon are taken as `TAG:TYPE` annotations; every name in
    /// [`SAM_FIELDS`] is required, `QNAME` is optional.
    pub fn from_fields<'a, I>(fields: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut read = AlignedRead::default();
        let mut seen = [false; SAM_FIELDS.len()];
        for (name, value) in fields {
            if name.contains(':') {
                read.annotation.insert(name.to_string(), value.to_string());
                continue;
            }
            if name == "QNAME" {
                read.qname = value.to_string();
                continue;
            }
            match SAM_FIELDS.iter().position(|f| *f == name) {
                Some(idx) => {
                    *read.field_mut(idx) = value.to_string();
                    seen[idx] = true;
                }
                None => debug!("Ignoring unknown field {}", name),
            }
        }
        if let Some(idx) = seen.iter().position(|s| !s) {
            return Err(Error::Precondition(format!(
                "field {} is missing",
                SAM_FIELDS[idx]
            )));
        }
        Ok(read)
    }

    /// Adds or replaces an annotation, e.g. `with_annotation("MD:Z", "0A3")`.
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotation.insert(key.to_string(), value.to_string());
        self
    }

    /// Looks up a mandatory column by its SAM name, or an annotation by `TAG:TYPE`.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "QNAME" => &self.qname,
            "FLAG" => &self.flag,
            "RNAME" => &self.rname,
            "POS" => &self.pos,
            "MAPQ" => &self.mapq,
            "CIGAR" => &self.cigar,
            "RNEXT" => &self.rnext,
            "PNEXT" => &self.pnext,
            "TLEN" => &self.tlen,
            "SEQ" => &self.seq,
            "QUAL" => &self.qual,
            _ => return self.annotation.get(name).map(String::as_str),
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, idx: usize) -> &mut String {
        match idx {
            0 => &mut self.flag,
            1 => &mut self.rname,
            2 => &mut self.pos,
            3 => &mut self.mapq,
            4 => &mut self.cigar,
            5 => &mut self.rnext,
            6 => &mut self.pnext,
            7 => &mut self.tlen,
            8 => &mut self.seq,
            _ => &mut self.qual,
        }
    }

    /// The `MD:Z` annotation, required for reference reconstruction.
    pub fn md(&self) -> CoreResult<&str> {
        self.annotation
            .get(MD_TAG)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Precondition(format!("read {:?} has no {} annotation", self.qname, MD_TAG))
            })
    }
}

/// Turns `TAG:TYPE:VALUE` columns into a map keyed by `TAG:TYPE`. The value is
/// everything after the second colon.
pub fn read_annotation(columns: &[&str]) -> Result<IndexMap<String, String>> {
    let mut annotation = IndexMap::new();
    for column in columns {
        let mut parts = column.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(tag), Some(kind), Some(value)) => {
                annotation.insert(format!("{}:{}", tag, kind), value.to_string());
            }
            _ => anyhow::bail!("Optional field {:?} is not TAG:TYPE:VALUE", column),
        }
    }
    Ok(annotation)
}

/// Reads every alignment of a SAM text file in file order. Header lines and
/// blank lines are skipped.
pub fn read_sam_records<P: AsRef<Path>>(path: P) -> Result<Vec<AlignedRead>> {
    let file = File::open(&path)
        .context(format!("Failed to open SAM file: {:?}", path.as_ref()))?;
    let reader = BufReader::new(file);

    let mut reads = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read SAM line")?;
        if line.starts_with('@') || line.trim().is_empty() {
            continue;
        }
        let read = AlignedRead::from_line(&line).context(format!(
            "Failed to parse SAM record at line {}",
            line_number + 1
        ))?;
        reads.push(read);
    }
    Ok(reads)
}

/// Like [`read_sam_records`] but keyed by read name; a repeated name replaces
/// the earlier record.
pub fn read_sam<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, AlignedRead>> {
    let mut reads = IndexMap::new();
    for read in read_sam_records(path)? {
        if reads.contains_key(&read.qname) {
            debug!("Read {} appears more than once, keeping the last", read.qname);
        }
        reads.insert(read.qname.clone(), read);
    }
    Ok(reads)
}
