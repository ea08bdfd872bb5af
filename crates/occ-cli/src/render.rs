//! Plain-text rendering of occurrence tables and word counts.

use unicode_width::UnicodeWidthStr;

use occ_core::aggregate::{WordCounts, WordRef};
use occ_core::rank::OccurrenceTable;

const GAP: &str = "  ";

fn pad_right(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(w)))
}

fn pad_left(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{s}", " ".repeat(width.saturating_sub(w)))
}

/// Render `table` with one line per deck, a header of spellings and a
/// footer of column sums. Spellings outside the ranked columns are listed
/// after the row total.
pub fn render_table(table: &OccurrenceTable) -> String {
    if table.is_empty() {
        return "(no occurrences in the counted decks)\n".to_string();
    }

    let mut header: Vec<String> = vec!["Deck".to_string()];
    header.extend(table.columns.iter().map(|c| c.spelling.clone()));
    header.push("Total".to_string());

    let mut lines: Vec<Vec<String>> = vec![header];
    let mut sums = vec![0u64; table.columns.len()];
    for row in &table.rows {
        let mut line = vec![row.deck_name.clone()];
        for (i, cell) in row.cells.iter().enumerate() {
            match cell {
                Some(n) => {
                    sums[i] += n;
                    line.push(n.to_string());
                }
                None => line.push(String::new()),
            }
        }
        line.push(row.total.to_string());
        lines.push(line);
    }
    let mut footer = vec!["Total".to_string()];
    footer.extend(sums.iter().map(u64::to_string));
    footer.push(table.total.to_string());
    lines.push(footer);

    let columns = lines[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            lines
                .iter()
                .map(|l| UnicodeWidthStr::width(l[i].as_str()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (n, line) in lines.iter().enumerate() {
        let mut cells = Vec::with_capacity(columns);
        cells.push(pad_right(&line[0], widths[0]));
        for i in 1..columns {
            cells.push(pad_left(&line[i], widths[i]));
        }
        out.push_str(cells.join(GAP).trim_end());
        if let Some(row) = n.checked_sub(1).and_then(|r| table.rows.get(r)) {
            if !row.extra.is_empty() {
                let extra: Vec<String> = row
                    .extra
                    .iter()
                    .map(|(spelling, count)| format!("{spelling}×{count}"))
                    .collect();
                out.push_str(GAP);
                out.push_str(&extra.join(", "));
            }
        }
        out.push('\n');
    }
    out
}

/// `this (all)` when other spellings contribute, `this` otherwise.
pub fn count_label(counts: &WordCounts) -> String {
    if counts.total_all_spellings == counts.total_this_spelling {
        counts.total_this_spelling.to_string()
    } else {
        format!(
            "{} ({})",
            counts.total_this_spelling, counts.total_all_spellings
        )
    }
}

/// One line per word: reference, counts, summary.
pub fn render_counts(items: &[(WordRef, WordCounts)]) -> String {
    let labels: Vec<String> = items
        .iter()
        .map(|(w, _)| format!("{}/{}", w.vid, w.spelling))
        .collect();
    let counts: Vec<String> = items.iter().map(|(_, c)| count_label(c)).collect();
    let label_width = labels.iter().map(|l| UnicodeWidthStr::width(l.as_str())).max().unwrap_or(0);
    let count_width = counts.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    for (((word, c), label), count) in items.iter().zip(&labels).zip(&counts) {
        out.push_str(&pad_right(label, label_width));
        out.push_str(GAP);
        out.push_str(&pad_left(count, count_width));
        out.push_str(GAP);
        out.push_str(&c.summary(&word.spelling));
        out.push('\n');
    }
    out
}
