use crate::sam_parser::AlignedRead;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use rust_htslib::bam::{self, record::Aux, HeaderView, Read};
use std::path::Path;

/// Reads SAM, BAM or CRAM through htslib and yields [`AlignedRead`]s with every
/// column rendered as SAM text.
pub struct HtsAlignmentReader {
    reader: bam::Reader,
    header: HeaderView,
}

impl HtsAlignmentReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = bam::Reader::from_path(&path)
            .context(format!("Failed to open alignment file: {:?}", path.as_ref()))?;
        let header = reader.header().clone();
        Ok(HtsAlignmentReader { reader, header })
    }

    pub fn read_all(&mut self) -> Result<Vec<AlignedRead>> {
        let mut reads = Vec::new();
        let mut record = bam::Record::new();
        while let Some(result) = self.reader.read(&mut record) {
            result.context("Failed to read alignment record")?;
            reads.push(self.convert(&record)?);
        }
        Ok(reads)
    }

    fn reference_name(&self, tid: i32) -> String {
        if tid < 0 {
            "*".to_string()
        } else {
            String::from_utf8_lossy(self.header.tid2name(tid as u32)).into_owned()
        }
    }

    fn convert(&self, record: &bam::Record) -> Result<AlignedRead> {
        let qname = String::from_utf8_lossy(record.qname()).into_owned();

        let cigar = record.cigar().to_string();
        let rname = self.reference_name(record.tid());
        let rnext = if record.mtid() >= 0 && record.mtid() == record.tid() {
            "=".to_string()
        } else {
            self.reference_name(record.mtid())
        };

        let seq = String::from_utf8(record.seq().as_bytes())
            .context(format!("Read {} has a non-ASCII sequence", qname))?;
        let qual = record.qual();
        let qual = if qual.first().map_or(true, |q| *q == 0xff) {
            "*".to_string()
        } else {
            qual.iter().map(|q| q.saturating_add(33) as char).collect()
        };

        let mut annotation = IndexMap::new();
        for aux in record.aux_iter() {
            let (tag, value) = aux.context(format!("Failed to read aux data of read {}", qname))?;
            let tag = String::from_utf8_lossy(tag);
            let (kind, value) = match value {
                Aux::Char(c) => ("A", (c as char).to_string()),
                Aux::I8(v) => ("i", v.to_string()),
                Aux::U8(v) => ("i", v.to_string()),
                Aux::I16(v) => ("i", v.to_string()),
                Aux::U16(v) => ("i", v.to_string()),
                Aux::I32(v) => ("i", v.to_string()),
                Aux::U32(v) => ("i", v.to_string()),
                Aux::Float(v) => ("f", v.to_string()),
                Aux::Double(v) => ("f", v.to_string()),
                Aux::String(v) => ("Z", v.to_string()),
                Aux::HexByteArray(v) => ("H", v.to_string()),
                _ => {
                    debug!("Skipping array tag {} of read {}", tag, qname);
                    continue;
                }
            };
            annotation.insert(format!("{}:{}", tag, kind), value);
        }

        Ok(AlignedRead {
            flag: record.flags().to_string(),
            rname,
            pos: (record.pos() + 1).to_string(),
            mapq: record.mapq().to_string(),
            cigar: if cigar.is_empty() { "*".to_string() } else { cigar },
            rnext,
            pnext: (record.mpos() + 1).to_string(),
            tlen: record.insert_size().to_string(),
            seq: if seq.is_empty() { "*".to_string() } else { seq },
            qual,
            annotation,
            qname,
        })
    }
}

/// Reads all records of a SAM/BAM/CRAM file.
pub fn read_alignments<P: AsRef<Path>>(path: P) -> Result<Vec<AlignedRead>> {
    HtsAlignmentReader::from_path(path)?.read_all()
}
