use anyhow::Result;
use samtriplet::cigar_parser::{cigar_to_string, has_indel, parse_cigar, CigarOp};
use samtriplet::error::{Error, Grammar};
use samtriplet::md_parser::{md_to_string, parse_md, MdOp};

#[test]
fn test_parse_cigar_all_operations() -> Result<()> {
    let ops = parse_cigar("5S10M2I3D1N4=1X2P3H")?;
    assert_eq!(
        ops,
        vec![
            CigarOp::SoftClip(5),
            CigarOp::AlignedOrMismatch(10, 'M'),
            CigarOp::Insertion(2),
            CigarOp::Deletion(3),
            CigarOp::Skip(1),
            CigarOp::AlignedOrMismatch(4, '='),
            CigarOp::AlignedOrMismatch(1, 'X'),
            CigarOp::Padding(2),
            CigarOp::HardClip(3),
        ]
    );
    Ok(())
}

#[test]
fn test_parse_cigar_multi_digit_run() -> Result<()> {
    let ops = parse_cigar("150M")?;
    assert_eq!(ops, vec![CigarOp::AlignedOrMismatch(150, 'M')]);
    assert_eq!(ops[0].len(), 150);
    Ok(())
}

#[test]
fn test_cigar_round_trip() -> Result<()> {
    for cigar in ["40M", "6M1I29M", "9M9D27M", "2M1I7M6D26M", "3S12=1X20=4H", "10M500N10M"] {
        let ops = parse_cigar(cigar)?;
        assert_eq!(cigar_to_string(&ops), cigar);
    }
    Ok(())
}

#[test]
fn test_parse_cigar_errors() {
    for cigar in ["", "M", "10M5", "10Q", "4M*", "99999999999M"] {
        match parse_cigar(cigar) {
            Err(Error::Parse { grammar, .. }) => assert_eq!(grammar, Grammar::Cigar),
            other => panic!("Expected a CIGAR parse error for {:?}, got {:?}", cigar, other),
        }
    }
}

#[test]
fn test_has_indel() -> Result<()> {
    assert!(!has_indel(&parse_cigar("40M")?));
    assert!(!has_indel(&parse_cigar("5S35M")?));
    assert!(has_indel(&parse_cigar("6M1I29M")?));
    assert!(has_indel(&parse_cigar("9M9D27M")?));
    Ok(())
}

#[test]
fn test_parse_md_drops_zero_matches() -> Result<()> {
    assert_eq!(
        parse_md("0A3")?,
        vec![MdOp::Mismatch("A".to_string()), MdOp::Match(3)]
    );
    assert_eq!(parse_md("4")?, vec![MdOp::Match(4)]);
    assert!(parse_md("0")?.is_empty());
    Ok(())
}

#[test]
fn test_parse_md_read_gap() -> Result<()> {
    let ops = parse_md("2G0A5^ATGATGTCA27")?;
    assert_eq!(
        ops,
        vec![
            MdOp::Match(2),
            MdOp::Mismatch("G".to_string()),
            MdOp::Mismatch("A".to_string()),
            MdOp::Match(5),
            MdOp::ReadGap("ATGATGTCA".to_string()),
            MdOp::Match(27),
        ]
    );
    assert_eq!(ops[4].len(), 9);
    Ok(())
}

#[test]
fn test_md_round_trip_without_zero_runs() -> Result<()> {
    assert_eq!(md_to_string(&parse_md("3C3T1^GCTCAG26")?), "3C3T1^GCTCAG26");
    // Zero runs are not kept, so they vanish on the way back.
    assert_eq!(md_to_string(&parse_md("0C1C0C1C0T0C27")?), "C1CC1CTC27");
    Ok(())
}

#[test]
fn test_parse_md_errors() {
    for md in ["3^", "3^4", "3-A", "12 3", "^"] {
        match parse_md(md) {
            Err(Error::Parse { grammar, .. }) => assert_eq!(grammar, Grammar::Md),
            other => panic!("Expected an MD:Z parse error for {:?}, got {:?}", md, other),
        }
    }
}
