use crate::error::{Error, Grammar, Result};
use std::fmt;

/// One operation of an `MD:Z` annotation.
///
/// `Mismatch` and `ReadGap` carry the reference bases; their run length is the
/// length of that string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdOp {
    Match(u32),
    Mismatch(String),
    ReadGap(String),
}

impl MdOp {
    pub fn len(&self) -> usize {
        match self {
            MdOp::Match(run) => *run as usize,
            MdOp::Mismatch(bases) | MdOp::ReadGap(bases) => bases.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for MdOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MdOp::Match(run) => write!(f, "{}", run),
            MdOp::Mismatch(bases) => write!(f, "{}", bases),
            MdOp::ReadGap(bases) => write!(f, "^{}", bases),
        }
    }
}

/// Parses an `MD:Z` value. Zero-length match runs are dropped, so "0A3"
/// yields `[Mismatch("A"), Match(3)]`.
pub fn parse_md(md: &str) -> Result<Vec<MdOp>> {
    let bytes = md.as_bytes();
    let mut ops = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_digit() {
            let mut run: u32 = 0;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                run = run
                    .checked_mul(10)
                    .and_then(|r| r.checked_add(u32::from(bytes[i] - b'0')))
                    .ok_or_else(|| Error::parse(Grammar::Md, md, "match run overflow"))?;
                i += 1;
            }
            if run > 0 {
                ops.push(MdOp::Match(run));
            }
        } else if c.is_ascii_alphabetic() {
            let bases = take_letters(bytes, &mut i);
            ops.push(MdOp::Mismatch(bases));
        } else if c == b'^' {
            i += 1;
            let bases = take_letters(bytes, &mut i);
            if bases.is_empty() {
                return Err(Error::parse(
                    Grammar::Md,
                    md,
                    format!("'^' at offset {} is not followed by a base", i - 1),
                ));
            }
            ops.push(MdOp::ReadGap(bases));
        } else {
            return Err(Error::parse(
                Grammar::Md,
                md,
                format!("unexpected character '{}' at offset {}", c as char, i),
            ));
        }
    }
    Ok(ops)
}

fn take_letters(bytes: &[u8], i: &mut usize) -> String {
    let start = *i;
    while *i < bytes.len() && bytes[*i].is_ascii_alphabetic() {
        *i += 1;
    }
    // ASCII letters only, so the slice is valid UTF-8.
    String::from_utf8_lossy(&bytes[start..*i]).into_owned()
}

pub fn md_to_string(ops: &[MdOp]) -> String {
    ops.iter().map(|op| op.to_string()).collect()
}
