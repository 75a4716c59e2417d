use crate::hts_reader::read_alignments;
use crate::sam_parser::{read_sam_records, AlignedRead};
use crate::triplets::{count_triplets_naive, count_triplets_smart, MutationTally};
use anyhow::Result;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMode {
    Naive,
    Smart,
}

impl FromStr for CounterMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "naive" => Ok(CounterMode::Naive),
            "smart" => Ok(CounterMode::Smart),
            _ => anyhow::bail!("Unknown counter mode: {}", s),
        }
    }
}

/// How failed reads are surfaced. Failed reads are skipped and counted in
/// both modes; `Report` also logs each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    Omit,
    Report,
}

impl FromStr for ErrorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "omit" => Ok(ErrorMode::Omit),
            "report" => Ok(ErrorMode::Report),
            _ => anyhow::bail!("Unknown error mode: {}", s),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub tally: MutationTally,
    pub total_reads: usize,
    pub counted_reads: usize,
    pub unmapped_reads: usize,
    /// Failed reads per error kind, e.g. `LengthMismatchError`.
    pub error_types: BTreeMap<&'static str, usize>,
}

impl BatchSummary {
    pub fn error_count(&self) -> usize {
        self.error_types.values().sum()
    }
}

/// Loads a `.sam` file as plain text and anything else through htslib.
pub fn load_reads<P: AsRef<Path>>(input: P) -> Result<Vec<AlignedRead>> {
    let is_plain_sam = input
        .as_ref()
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("sam"));
    if is_plain_sam {
        read_sam_records(input)
    } else {
        read_alignments(input)
    }
}

/// Accumulates every read into one tally. A read that fails is left out of the
/// tally and counted by kind; the batch carries on with the next read.
pub fn tally_reads(reads: &[AlignedRead], mode: CounterMode, error_mode: ErrorMode) -> BatchSummary {
    let counter: fn(&AlignedRead, &mut MutationTally) -> crate::Result<()> = match mode {
        CounterMode::Naive => count_triplets_naive,
        CounterMode::Smart => count_triplets_smart,
    };

    let mut summary = BatchSummary {
        total_reads: reads.len(),
        ..Default::default()
    };

    for read in reads {
        if read.cigar == "*" {
            debug!("Skipping unmapped read {}", read.qname);
            summary.unmapped_reads += 1;
            continue;
        }
        match counter(read, &mut summary.tally) {
            Ok(()) => {
                debug!("Counted read {}", read.qname);
                summary.counted_reads += 1;
            }
            Err(e) => {
                match error_mode {
                    ErrorMode::Report => warn!("Skipping read {}: {}", read.qname, e),
                    ErrorMode::Omit => debug!("Skipping read {}: {}", read.qname, e),
                }
                *summary.error_types.entry(e.kind()).or_insert(0) += 1;
            }
        }
    }

    if summary.error_count() > 0 {
        warn!(
            "{} of {} reads were skipped:",
            summary.error_count(),
            summary.total_reads
        );
        for (error_type, count) in &summary.error_types {
            warn!("  - {}: {} reads", error_type, count);
        }
    }
    info!(
        "Counted {} triplet windows over {} reference triplets",
        summary.tally.total(),
        summary.tally.len()
    );
    summary
}

pub fn tally_file<P: AsRef<Path>>(input: P, mode: CounterMode, error_mode: ErrorMode) -> Result<BatchSummary> {
    let reads = load_reads(&input)?;
    info!("Read {} alignments from {:?}", reads.len(), input.as_ref());
    Ok(tally_reads(&reads, mode, error_mode))
}
