use crate::triplets::MutationTally;

pub const BASES: [char; 5] = ['A', 'C', 'G', 'T', 'N'];

/// Header of the per-position mutation spectrum table.
pub fn report_header() -> String {
    let mut header = String::from("X--\t-X-\t--X\tSubset");
    for position in 0..3 {
        for base in BASES {
            let mut template = ['-'; 3];
            template[position] = base;
            header.push('\t');
            header.extend(template);
        }
    }
    header
}

/// Renders a tally as a tab-separated table: one row per reference triplet
/// with, for each triplet position and base, how many observed triplets carry
/// that base there.
pub fn format_triplet_mutations(tally: &MutationTally) -> String {
    let mut content = report_header();
    content.push('\n');

    for (ref_triplet, observed) in tally.iter() {
        let mut cells: Vec<String> = ref_triplet.chars().map(String::from).collect();
        cells.push("Read 1".to_string());

        for position in 0..3 {
            for base in BASES {
                let count: u64 = observed
                    .iter()
                    .filter(|(triplet, _)| triplet.chars().nth(position) == Some(base))
                    .map(|(_, count)| *count)
                    .sum();
                cells.push(count.to_string());
            }
        }

        content.push_str(cells.join("\t").trim_end());
        content.push('\n');
    }
    content
}
