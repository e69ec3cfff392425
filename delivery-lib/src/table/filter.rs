use super::Column;
use super::TableRow;

/// Returns the indices of `rows` matching `term`, in source order.
///
/// A blank term keeps every row. Otherwise a row is kept when the string
/// form of any listed column contains the lowercased, trimmed term. Null
/// cells never match.
pub fn filter_indices<R: TableRow>(rows: &[R], columns: &[Column], term: &str) -> Vec<usize> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return (0..rows.len()).collect();
    }

    rows.iter()
        .enumerate()
        .filter(|(_, row)| matches(*row, columns, &term))
        .map(|(idx, _)| idx)
        .collect()
}

fn matches<R: TableRow>(row: &R, columns: &[Column], term: &str) -> bool {
    columns.iter().any(|column| {
        let value = row.value(&column.field);
        !value.is_null() && value.to_string().to_lowercase().contains(term)
    })
}
