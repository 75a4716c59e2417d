use crate::cigar_parser::{has_indel, parse_cigar};
use crate::error::{Error, Result};
use crate::md_parser::{parse_md, MdOp};
use crate::reference::get_ref;
use crate::sam_parser::AlignedRead;
use indexmap::IndexMap;

/// Reference triplet -> observed triplet -> count, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationTally {
    counts: IndexMap<String, IndexMap<String, u64>>,
}

impl MutationTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, reference: &str, observed: &str) {
        self.add(reference, observed, 1);
    }

    fn add(&mut self, reference: &str, observed: &str, count: u64) {
        *self
            .counts
            .entry(reference.to_string())
            .or_default()
            .entry(observed.to_string())
            .or_insert(0) += count;
    }

    pub fn get(&self, reference: &str, observed: &str) -> u64 {
        self.counts
            .get(reference)
            .and_then(|inner| inner.get(observed))
            .copied()
            .unwrap_or(0)
    }

    pub fn observed(&self, reference: &str) -> Option<&IndexMap<String, u64>> {
        self.counts.get(reference)
    }

    /// Number of distinct reference triplets.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, u64>)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sum of every count in the tally.
    pub fn total(&self) -> u64 {
        self.counts.values().flat_map(|inner| inner.values()).sum()
    }

    /// Adds every count of `other` into `self`. New keys are appended in
    /// `other`'s order.
    pub fn merge(&mut self, other: &MutationTally) {
        for (reference, inner) in &other.counts {
            for (observed, count) in inner {
                self.add(reference, observed, *count);
            }
        }
    }
}

impl<'a, const N: usize, const M: usize> From<[(&'a str, [(&'a str, u64); M]); N]> for MutationTally {
    fn from(entries: [(&'a str, [(&'a str, u64); M]); N]) -> Self {
        let mut tally = MutationTally::new();
        for (reference, inner) in entries {
            for (observed, count) in inner {
                tally.add(reference, observed, count);
            }
        }
        tally
    }
}

/// All length-3 windows of `seq`, left to right.
pub fn get_triplets(seq: &str) -> Vec<&str> {
    if seq.len() < 3 {
        return Vec::new();
    }
    (0..=seq.len() - 3).filter_map(|i| seq.get(i..i + 3)).collect()
}

/// Reconstructed reference and read sequence of an indel-free read, or `None`
/// when the CIGAR holds an insertion or deletion.
fn indel_free_pair(read: &AlignedRead) -> Result<Option<(String, &str)>> {
    let cigar_ops = parse_cigar(&read.cigar)?;
    if has_indel(&cigar_ops) {
        return Ok(None);
    }
    let reference = get_ref(read)?;
    if reference.len() != read.seq.len() {
        return Err(Error::LengthMismatch {
            reference: reference.len(),
            read: read.seq.len(),
        });
    }
    Ok(Some((reference, read.seq.as_str())))
}

/// Tallies every reference window against the read window at the same offset.
/// Reads with insertions or deletions add nothing.
pub fn count_triplets_naive(read: &AlignedRead, tally: &mut MutationTally) -> Result<()> {
    let (reference, query) = match indel_free_pair(read)? {
        Some(pair) => pair,
        None => return Ok(()),
    };
    for (r, q) in get_triplets(&reference).into_iter().zip(get_triplets(query)) {
        tally.increment(r, q);
    }
    Ok(())
}

pub fn get_triplets_mutations(read: &AlignedRead) -> Result<MutationTally> {
    let mut tally = MutationTally::new();
    count_triplets_naive(read, &mut tally)?;
    Ok(tally)
}

/// Walks the `MD:Z` ops instead of the whole read: matched stretches add
/// self-transitions for their internal triplets, and each mismatch adds the
/// windows from two bases before it to two bases after it. A window start is
/// counted at most once, so neighbouring ops never tally the same window twice.
///
/// Every window is visited exactly once, and inside matched stretches the
/// reconstructed reference is copied from the read, so for any indel-free read
/// that passes the length check the result equals [`count_triplets_naive`],
/// first-seen order included.
pub fn count_triplets_smart(read: &AlignedRead, tally: &mut MutationTally) -> Result<()> {
    let (reference, query) = match indel_free_pair(read)? {
        Some(pair) => pair,
        None => return Ok(()),
    };
    let md_ops = parse_md(read.md()?)?;

    let mut window = TripletWindow {
        reference: &reference,
        query,
        next_start: 0,
    };
    let mut pos = 0usize;
    for op in &md_ops {
        match op {
            MdOp::Match(run) => {
                let run = *run as usize;
                let end = pos + run;
                if end >= 3 {
                    for start in pos..=end - 3 {
                        window.tally(start, true, tally);
                    }
                }
                pos = end;
            }
            MdOp::Mismatch(bases) => {
                let last = pos + bases.len().saturating_sub(1);
                for start in pos.saturating_sub(2)..=last + 2 {
                    window.tally(start, false, tally);
                }
                pos += bases.len();
            }
            // Deleted bases have no read counterpart, so nothing is compared.
            MdOp::ReadGap(_) => {}
        }
    }
    Ok(())
}

pub fn get_triplets_mutations_smart(read: &AlignedRead) -> Result<MutationTally> {
    let mut tally = MutationTally::new();
    count_triplets_smart(read, &mut tally)?;
    Ok(tally)
}

struct TripletWindow<'a> {
    reference: &'a str,
    query: &'a str,
    next_start: usize,
}

impl TripletWindow<'_> {
    fn tally(&mut self, start: usize, self_transition: bool, tally: &mut MutationTally) {
        if start < self.next_start {
            return;
        }
        let (r, q) = match (
            self.reference.get(start..start + 3),
            self.query.get(start..start + 3),
        ) {
            (Some(r), Some(q)) => (r, q),
            _ => return,
        };
        if self_transition {
            tally.increment(r, r);
        } else {
            tally.increment(r, q);
        }
        self.next_start = start + 1;
    }
}
