use crate::cigar_parser::{parse_cigar, CigarOp};
use crate::error::{Error, Grammar, Result};
use crate::md_parser::{parse_md, MdOp};
use crate::sam_parser::AlignedRead;

/// Marks the site of one insertion operation in a reconstructed reference.
pub const INSERTION_PLACEHOLDER: u8 = b'-';

/// Rebuilds the reference bases a read was aligned against from its CIGAR,
/// `MD:Z` annotation and sequence.
pub fn get_ref(read: &AlignedRead) -> Result<String> {
    let cigar_ops = parse_cigar(&read.cigar)?;
    let md_ops = parse_md(read.md()?)?;
    reconstruct_reference(&cigar_ops, &md_ops, &read.seq)
}

/// Three passes: drop inserted read bases, patch in the reference bases named
/// by the `MD:Z` ops, then mark each insertion with a single placeholder.
///
/// Runs that reach past the end of a buffer are cut at the buffer end.
pub fn reconstruct_reference(cigar_ops: &[CigarOp], md_ops: &[MdOp], seq: &str) -> Result<String> {
    if !seq.is_ascii() {
        return Err(Error::parse(Grammar::Seq, seq, "contains non-ASCII bytes"));
    }

    let projected = strip_insertions(cigar_ops, seq.as_bytes());
    let corrected = apply_md(md_ops, &projected);
    let reference = mark_insertions(cigar_ops, &corrected);

    // Every byte comes from the ASCII read, ASCII MD bases or the placeholder.
    Ok(String::from_utf8_lossy(&reference).into_owned())
}

fn clamped(buf: &[u8], start: usize, len: usize) -> &[u8] {
    let start = start.min(buf.len());
    let end = start.saturating_add(len).min(buf.len());
    &buf[start..end]
}

fn strip_insertions(cigar_ops: &[CigarOp], seq: &[u8]) -> Vec<u8> {
    let mut projected = Vec::with_capacity(seq.len());
    let mut q_idx = 0usize;
    for op in cigar_ops {
        let len = op.len();
        if let CigarOp::AlignedOrMismatch(..) | CigarOp::Deletion(_) = op {
            projected.extend_from_slice(clamped(seq, q_idx, len));
        }
        // Deleted runs copy read bytes as stand-ins; the MD pass replaces them.
        q_idx += len;
    }
    projected
}

fn apply_md(md_ops: &[MdOp], projected: &[u8]) -> Vec<u8> {
    let mut corrected = Vec::with_capacity(projected.len());
    let mut idx = 0usize;
    for op in md_ops {
        match op {
            MdOp::Match(run) => {
                let run = *run as usize;
                corrected.extend_from_slice(clamped(projected, idx, run));
                idx += run;
            }
            MdOp::Mismatch(bases) => {
                corrected.extend_from_slice(bases.as_bytes());
                idx += bases.len();
            }
            MdOp::ReadGap(bases) => {
                corrected.extend_from_slice(bases.as_bytes());
            }
        }
    }
    corrected
}

fn mark_insertions(cigar_ops: &[CigarOp], corrected: &[u8]) -> Vec<u8> {
    let mut reference = Vec::with_capacity(corrected.len() + cigar_ops.len());
    let mut r_idx = 0usize;
    for op in cigar_ops {
        match op {
            CigarOp::AlignedOrMismatch(..) | CigarOp::Deletion(_) => {
                let len = op.len();
                reference.extend_from_slice(clamped(corrected, r_idx, len));
                r_idx += len;
            }
            CigarOp::Insertion(_) => reference.push(INSERTION_PLACEHOLDER),
            CigarOp::Skip(_) | CigarOp::SoftClip(_) | CigarOp::HardClip(_) | CigarOp::Padding(_) => {}
        }
    }
    reference
}
