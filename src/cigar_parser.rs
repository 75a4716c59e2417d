use crate::error::{Error, Grammar, Result};
use std::fmt;

/// One CIGAR operation and its run length.
///
/// `AlignedOrMismatch` covers `M`, `=` and `X`; the letter is kept so that the
/// parsed sequence serialises back to its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    AlignedOrMismatch(u32, char),
    Insertion(u32),
    Deletion(u32),
    Skip(u32),
    SoftClip(u32),
    HardClip(u32),
    Padding(u32),
}

impl CigarOp {
    pub fn len(&self) -> usize {
        let run = match self {
            CigarOp::AlignedOrMismatch(run, _)
            | CigarOp::Insertion(run)
            | CigarOp::Deletion(run)
            | CigarOp::Skip(run)
            | CigarOp::SoftClip(run)
            | CigarOp::HardClip(run)
            | CigarOp::Padding(run) => *run,
        };
        run as usize
    }

    pub fn code(&self) -> char {
        match self {
            CigarOp::AlignedOrMismatch(_, code) => *code,
            CigarOp::Insertion(_) => 'I',
            CigarOp::Deletion(_) => 'D',
            CigarOp::Skip(_) => 'N',
            CigarOp::SoftClip(_) => 'S',
            CigarOp::HardClip(_) => 'H',
            CigarOp::Padding(_) => 'P',
        }
    }

    pub fn is_indel(&self) -> bool {
        matches!(self, CigarOp::Insertion(_) | CigarOp::Deletion(_))
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len(), self.code())
    }
}

pub fn parse_cigar(cigar: &str) -> Result<Vec<CigarOp>> {
    if cigar.is_empty() {
        return Err(Error::parse(Grammar::Cigar, cigar, "empty string"));
    }

    let mut ops = Vec::new();
    let mut run: u32 = 0;
    let mut digits = 0usize;

    for c in cigar.chars() {
        if let Some(digit) = c.to_digit(10) {
            run = run
                .checked_mul(10)
                .and_then(|r| r.checked_add(digit))
                .ok_or_else(|| Error::parse(Grammar::Cigar, cigar, "run length overflow"))?;
            digits += 1;
            continue;
        }
        if digits == 0 {
            return Err(Error::parse(
                Grammar::Cigar,
                cigar,
                format!("operation '{}' has no run length", c),
            ));
        }
        let op = match c {
            'M' | '=' | 'X' => CigarOp::AlignedOrMismatch(run, c),
            'I' => CigarOp::Insertion(run),
            'D' => CigarOp::Deletion(run),
            'N' => CigarOp::Skip(run),
            'S' => CigarOp::SoftClip(run),
            'H' => CigarOp::HardClip(run),
            'P' => CigarOp::Padding(run),
            _ => {
                return Err(Error::parse(
                    Grammar::Cigar,
                    cigar,
                    format!("unknown operation '{}'", c),
                ))
            }
        };
        ops.push(op);
        run = 0;
        digits = 0;
    }

    if digits > 0 {
        return Err(Error::parse(
            Grammar::Cigar,
            cigar,
            "trailing run length without an operation",
        ));
    }
    Ok(ops)
}

/// Renders an operation sequence back to CIGAR text.
pub fn cigar_to_string(ops: &[CigarOp]) -> String {
    ops.iter().map(|op| op.to_string()).collect()
}

pub fn has_indel(ops: &[CigarOp]) -> bool {
    ops.iter().any(CigarOp::is_indel)
}
