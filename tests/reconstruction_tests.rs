use anyhow::Result;
use samtriplet::cigar_parser::parse_cigar;
use samtriplet::error::{Error, Grammar};
use samtriplet::md_parser::parse_md;
use samtriplet::reference::{get_ref, reconstruct_reference};
use samtriplet::sam_parser::AlignedRead;

fn aligned_read(seq: &str, cigar: &str, md: &str) -> AlignedRead {
    AlignedRead {
        qname: "read1".to_string(),
        seq: seq.to_string(),
        cigar: cigar.to_string(),
        ..Default::default()
    }
    .with_annotation("MD:Z", md)
}

#[test]
fn test_single_leading_mismatch() -> Result<()> {
    let read = aligned_read("CAAAAAGATTTAAGCAAATATAAAAAAAGACAATGGTTTC", "40M", "0A39");
    assert_eq!(get_ref(&read)?, "AAAAAAGATTTAAGCAAATATAAAAAAAGACAATGGTTTC");
    Ok(())
}

#[test]
fn test_consecutive_mismatches() -> Result<()> {
    let read = aligned_read("CGATACGGGGACATCCGGCCTGCTCCTTCTCACATG", "36M", "1A0C0C0C1T0C0T27");
    assert_eq!(get_ref(&read)?, "CACCCCTCTGACATCCGGCCTGCTCCTTCTCACATG");
    Ok(())
}

#[test]
fn test_insertion_placeholder() -> Result<()> {
    let read = aligned_read("GAGACGGGGTGACATCCGGCCTGCTCCTTCTCACAT", "6M1I29M", "0C1C0C1C0T0C27");
    assert_eq!(get_ref(&read)?, "CACCCC-TCTGACATCCGGCCTGCTCCTTCTCACAT");
    Ok(())
}

#[test]
fn test_deletion_restores_reference_bases() -> Result<()> {
    let read = aligned_read("AGTGATGGGGGGGTTCCAGGTGGAGACGAGGACTCC", "9M9D27M", "2G0A5^ATGATGTCA27");
    assert_eq!(get_ref(&read)?, "AGGAATGGGATGATGTCAGGGGTTCCAGGTGGAGACGAGGACTCC");
    Ok(())
}

#[test]
fn test_insertion_and_deletion() -> Result<()> {
    let read = aligned_read("AGTGATGGGAGGATGTCTCGTCTGTGAGTTACAGCA", "2M1I7M6D26M", "3C3T1^GCTCAG26");
    assert_eq!(get_ref(&read)?, "AG-GCTGGTAGCTCAGGGATGTCTCGTCTGTGAGTTACAGCA");
    Ok(())
}

#[test]
fn test_pure_match_reproduces_read() -> Result<()> {
    let read = aligned_read("ACGTNACGTA", "10M", "10");
    assert_eq!(get_ref(&read)?, "ACGTNACGTA");
    Ok(())
}

#[test]
fn test_one_placeholder_per_insertion_operation() -> Result<()> {
    // 3 inserted bases, then 1 more: two operations, two placeholders.
    let seq = "AAAACCCGGGGTGGGG";
    let reference = reconstruct_reference(
        &parse_cigar("4M3I4M1I4M")?,
        &parse_md("12")?,
        seq,
    )?;
    assert_eq!(reference, "AAAA-GGGG-GGGG");
    assert_eq!(reference.matches('-').count(), 2);
    Ok(())
}

#[test]
fn test_no_indel_length_matches_read() -> Result<()> {
    let read = aligned_read("TTGACCATGA", "10M", "2C3A3");
    let reference = get_ref(&read)?;
    assert_eq!(reference.len(), read.seq.len());
    assert_eq!(reference, "TTCACCATGA");
    Ok(())
}

#[test]
fn test_reconstruction_is_deterministic() -> Result<()> {
    let read = aligned_read("AGTGATGGGAGGATGTCTCGTCTGTGAGTTACAGCA", "2M1I7M6D26M", "3C3T1^GCTCAG26");
    let first = get_ref(&read)?;
    for _ in 0..5 {
        assert_eq!(get_ref(&read)?, first);
    }
    Ok(())
}

#[test]
fn test_missing_md_is_a_precondition_error() {
    let read = AlignedRead {
        seq: "ACGT".to_string(),
        cigar: "4M".to_string(),
        ..Default::default()
    };
    match get_ref(&read) {
        Err(Error::Precondition(msg)) => assert!(msg.contains("MD:Z"), "Unexpected message: {}", msg),
        other => panic!("Expected a precondition error, got {:?}", other),
    }
}

#[test]
fn test_malformed_strings_are_parse_errors() {
    let bad_cigar = aligned_read("ACGT", "4Q", "4");
    assert!(matches!(get_ref(&bad_cigar), Err(Error::Parse { .. })));

    let bad_md = aligned_read("ACGT", "4M", "2^");
    assert!(matches!(get_ref(&bad_md), Err(Error::Parse { .. })));
}

#[test]
fn test_non_ascii_sequence_is_a_parse_error() {
    let read = aligned_read("CAÄA", "4M", "4");
    match get_ref(&read) {
        Err(Error::Parse { grammar, .. }) => assert_eq!(grammar, Grammar::Seq),
        other => panic!("Expected a SEQ parse error, got {:?}", other),
    }
}
