//! Plain-text table output.

use std::fmt::Write;

use delivery_lib::table::TableRow;
use delivery_lib::table::TableView;

const MAX_CELL_WIDTH: usize = 40;

/// Renders the current page of `view` with a `page X of Y` footer.
pub fn table<R: TableRow>(view: &TableView<R>) -> String {
    let columns = view.columns();
    let rows: Vec<Vec<String>> = view
        .visible_rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| truncate(&row.value(&c.field).to_string()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header(view, i, &c.header).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let headers: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| header(view, i, &c.header))
        .collect();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);

    if rows.is_empty() {
        out.push_str("(no rows)\n");
    }
    for row in &rows {
        push_line(&mut out, row, &widths);
    }

    let _ = writeln!(
        out,
        "\npage {} of {} ({} rows)",
        view.current_page(),
        view.total_pages(),
        view.filtered_len()
    );
    out
}

/// Header text, marked with the sort direction when sorted on.
fn header<R: TableRow>(view: &TableView<R>, index: usize, text: &str) -> String {
    let field = &view.columns()[index].field;
    match view.sort_state() {
        Some(state) if &state.field == field => {
            let arrow = if state.direction.is_ascending() { "^" } else { "v" };
            format!("{} {}", text, arrow)
        }
        _ => text.to_string(),
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn truncate(cell: &str) -> String {
    let cell = cell.replace('\n', " ");
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell;
    }
    let mut short: String = cell.chars().take(MAX_CELL_WIDTH - 3).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use delivery_lib::model::Record;
    use delivery_lib::table::Column;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_renders_page_with_sort_marker() {
        let rows = vec![
            Record::new().set("name", "Pizza").set("price", 12.5),
            Record::new().set("name", "Burger").set("price", 9),
        ];
        let mut view = TableView::new(
            rows,
            vec![Column::new("name", "Name"), Column::new("price", "Price")],
        );
        view.sort_by("price");

        assert_eq!(
            table(&view),
            "Name    Price ^\n\
             ------  -------\n\
             Burger  9\n\
             Pizza   12.5\n\
             \n\
             page 1 of 1 (2 rows)\n"
        );
    }

    #[test]
    fn test_empty_view() {
        let view: TableView<Record> = TableView::new(Vec::new(), vec![Column::new("name", "Name")]);
        let out = table(&view);
        assert!(out.contains("(no rows)"));
        assert!(out.ends_with("page 1 of 1 (0 rows)\n"));
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let long = "x".repeat(60);
        assert_eq!(truncate(&long).chars().count(), MAX_CELL_WIDTH);
        assert!(truncate(&long).ends_with("..."));
    }
}
