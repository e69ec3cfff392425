use std::fmt;

use super::Column;
use super::SortState;
use super::TableRow;
use super::filter::filter_indices;
use super::page::DEFAULT_PAGE_SIZE;
use super::page::page_range;
use super::page::total_pages;
use super::sort::sort_indices;

type RowHandler<R> = Box<dyn Fn(&R) + Send + Sync>;

/// Search, sort and pagination state for one list view.
///
/// The view owns its source rows and never mutates them; [`edit`] and
/// [`delete`] only notify the registered handlers, and the owner supplies
/// refreshed rows through [`replace_rows`].
///
/// Every mutation except [`go_to_page`] resets the current page to 1.
///
/// [`edit`]: TableView::edit
/// [`delete`]: TableView::delete
/// [`replace_rows`]: TableView::replace_rows
/// [`go_to_page`]: TableView::go_to_page
pub struct TableView<R> {
    rows: Vec<R>,
    columns: Vec<Column>,
    page_size: usize,
    search_placeholder: String,
    search_term: String,
    sort: Option<SortState>,
    current_page: usize,
    /// Indices into `rows` after filter and sort.
    filtered: Vec<usize>,
    on_edit: Option<RowHandler<R>>,
    on_delete: Option<RowHandler<R>>,
}

impl<R: TableRow> TableView<R> {
    pub fn new(rows: Vec<R>, columns: Vec<Column>) -> Self {
        let mut view = Self {
            rows,
            columns,
            page_size: DEFAULT_PAGE_SIZE,
            search_placeholder: "Search...".to_string(),
            search_term: String::new(),
            sort: None,
            current_page: 1,
            filtered: Vec::new(),
            on_edit: None,
            on_delete: None,
        };
        view.rebuild();
        view
    }

    /// Set the number of rows per page. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self.current_page = 1;
        self
    }

    pub fn with_search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }

    /// Register the handler fired by [`TableView::edit`].
    pub fn on_edit(mut self, handler: impl Fn(&R) + Send + Sync + 'static) -> Self {
        self.on_edit = Some(Box::new(handler));
        self
    }

    /// Register the handler fired by [`TableView::delete`].
    pub fn on_delete(mut self, handler: impl Fn(&R) + Send + Sync + 'static) -> Self {
        self.on_delete = Some(Box::new(handler));
        self
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Replace the search term and return to page 1.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
        self.rebuild();
    }

    /// Sort by `field`, or flip the direction if it is already active.
    ///
    /// Unknown or unsortable columns are ignored and leave the page as is.
    pub fn sort_by(&mut self, field: &str) {
        let sortable = self
            .columns
            .iter()
            .any(|column| column.field == field && column.sortable);
        if !sortable {
            log::trace!("Ignoring sort on non-sortable field {}", field);
            return;
        }

        self.sort = Some(SortState::toggled(self.sort.as_ref(), field));
        self.current_page = 1;
        self.rebuild();
    }

    /// Navigate to `page` (1-based).
    ///
    /// Returns `false` and leaves the state untouched when `page` is outside
    /// `1..=total_pages()`.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            log::trace!("Rejecting page {} of {}", page, self.total_pages());
            return false;
        }
        self.current_page = page;
        true
    }

    /// Swap in a new set of source rows and return to page 1.
    pub fn replace_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.current_page = 1;
        self.rebuild();
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Fire the edit handler for the row at `index` on the current page.
    ///
    /// Returns `false` if there is no such row.
    pub fn edit(&self, index: usize) -> bool {
        Self::emit(self.on_edit.as_ref(), self.page_row(index))
    }

    /// Fire the delete handler for the row at `index` on the current page.
    ///
    /// Returns `false` if there is no such row.
    pub fn delete(&self, index: usize) -> bool {
        Self::emit(self.on_delete.as_ref(), self.page_row(index))
    }

    fn emit(handler: Option<&RowHandler<R>>, row: Option<&R>) -> bool {
        match row {
            Some(row) => {
                if let Some(handler) = handler {
                    handler(row);
                }
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Rows on the current page.
    pub fn visible_rows(&self) -> Vec<&R> {
        self.page_indices()
            .iter()
            .map(|&idx| &self.rows[idx])
            .collect()
    }

    /// Number of pages, at least 1 so an empty table renders one empty page.
    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page_size).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Page numbers for the pagination bar.
    pub fn page_numbers(&self) -> Vec<usize> {
        (1..=self.total_pages()).collect()
    }

    /// Number of rows matching the search term.
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// All rows matching the search term, sorted.
    pub fn filtered_rows(&self) -> Vec<&R> {
        self.filtered.iter().map(|&idx| &self.rows[idx]).collect()
    }

    /// The unfiltered source rows.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_placeholder(&self) -> &str {
        &self.search_placeholder
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn rebuild(&mut self) {
        let mut indices = filter_indices(&self.rows, &self.columns, &self.search_term);
        if let Some(sort) = &self.sort {
            sort_indices(&self.rows, &mut indices, sort);
        }
        self.filtered = indices;
    }

    fn page_indices(&self) -> &[usize] {
        &self.filtered[page_range(self.filtered.len(), self.page_size, self.current_page)]
    }

    fn page_row(&self, index: usize) -> Option<&R> {
        self.page_indices().get(index).map(|&idx| &self.rows[idx])
    }
}

impl<R> fmt::Debug for TableView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableView")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("page_size", &self.page_size)
            .field("search_term", &self.search_term)
            .field("sort", &self.sort)
            .field("current_page", &self.current_page)
            .field("filtered", &self.filtered.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Record;
    use crate::table::SortDirection;

    fn products(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::new().set("id", i as i64).set("name", format!("Product {}", i)))
            .collect()
    }

    fn names(view: &TableView<Record>) -> Vec<String> {
        view.visible_rows()
            .iter()
            .map(|r| r.value("name").to_string())
            .collect()
    }

    fn name_columns() -> Vec<Column> {
        vec![Column::new("name", "Name")]
    }

    #[test]
    fn test_twelve_rows_two_pages() {
        let mut view = TableView::new(products(12), name_columns());
        assert_eq!(view.total_pages(), 2);
        assert_eq!(view.visible_rows().len(), 10);

        assert!(!view.go_to_page(3));
        assert_eq!(view.current_page(), 1);

        assert!(view.go_to_page(2));
        assert_eq!(view.visible_rows().len(), 2);

        assert!(!view.go_to_page(3));
        assert!(!view.go_to_page(0));
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn test_twenty_five_rows_last_page_has_five() {
        let mut view = TableView::new(products(25), name_columns());
        assert_eq!(view.total_pages(), 3);
        assert!(view.go_to_page(3));
        assert_eq!(view.visible_rows().len(), 5);
        assert_eq!(view.page_numbers(), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_toggles_direction() {
        let rows = vec![Record::new().set("name", "B"), Record::new().set("name", "A")];
        let mut view = TableView::new(rows, name_columns());

        view.sort_by("name");
        assert_eq!(names(&view), vec!["A", "B"]);

        view.sort_by("name");
        assert_eq!(names(&view), vec!["B", "A"]);
        assert_eq!(
            view.sort_state().map(|s| s.direction),
            Some(SortDirection::Descending)
        );
    }

    #[test]
    fn test_double_toggle_restores_order() {
        let rows = vec![
            Record::new().set("name", "C"),
            Record::new().set("name", "A"),
            Record::new().set("name", "B"),
        ];
        let mut view = TableView::new(rows, name_columns());
        view.sort_by("name");
        let first = names(&view);
        view.sort_by("name");
        view.sort_by("name");
        assert_eq!(names(&view), first);
    }

    #[test]
    fn test_search_keeps_matching_rows() {
        let rows = vec![Record::new().set("name", "Pizza"), Record::new().set("name", "Taco")];
        let mut view = TableView::new(rows, name_columns());
        view.set_search_term("piz");
        assert_eq!(names(&view), vec!["Pizza"]);

        view.set_search_term("");
        assert_eq!(names(&view), vec!["Pizza", "Taco"]);
    }

    #[test]
    fn test_mutations_reset_page() {
        let mut view = TableView::new(products(30), name_columns());
        assert!(view.go_to_page(3));
        view.set_search_term("product");
        assert_eq!(view.current_page(), 1);

        assert!(view.go_to_page(2));
        view.sort_by("name");
        assert_eq!(view.current_page(), 1);

        assert!(view.go_to_page(2));
        view.replace_rows(products(15));
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_back_to_back_mutations_last_write_wins() {
        let columns = vec![Column::new("id", "ID"), Column::new("name", "Name")];
        let mut view = TableView::new(products(8), columns.clone());
        view.set_search_term("product 1");
        view.replace_rows(products(40));
        view.sort_by("id");
        view.set_search_term("3");
        view.replace_rows(products(35));
        view.sort_by("name");
        view.set_search_term("1");
        view.sort_by("id");
        view.sort_by("id");

        let mut fresh = TableView::new(products(35), columns);
        fresh.set_search_term("1");
        fresh.sort_by("id");
        fresh.sort_by("id");

        let ids = |v: &TableView<Record>| -> Vec<String> {
            v.filtered_rows()
                .iter()
                .map(|r| r.value("id").to_string())
                .collect()
        };
        assert_eq!(ids(&view), ids(&fresh));
        assert_eq!(names(&view), names(&fresh));
        assert_eq!(view.sort_state(), fresh.sort_state());
        assert_eq!(view.total_pages(), fresh.total_pages());
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.search_term(), "1");
    }

    #[test]
    fn test_unsortable_column_is_noop() {
        let columns = vec![Column::new("name", "Name").fixed()];
        let mut view = TableView::new(products(15), columns);
        assert!(view.go_to_page(2));

        view.sort_by("name");
        view.sort_by("unknown");
        assert_eq!(view.sort_state(), None);
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn test_sort_survives_search_and_refresh() {
        let columns = vec![Column::new("id", "ID"), Column::new("name", "Name")];
        let mut view = TableView::new(products(5), columns);
        view.sort_by("id");
        view.sort_by("id");

        view.set_search_term("product");
        assert_eq!(view.visible_rows()[0].value("id"), 5.into());

        view.replace_rows(products(3));
        assert_eq!(view.visible_rows()[0].value("id"), 3.into());
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let mut view = TableView::<Record>::new(Vec::new(), name_columns());
        assert_eq!(view.total_pages(), 1);
        assert!(view.visible_rows().is_empty());
        assert!(view.go_to_page(1));
        assert!(!view.go_to_page(2));
    }

    #[test]
    fn test_zero_page_size_is_coerced() {
        let view = TableView::new(products(3), name_columns()).with_page_size(0);
        assert_eq!(view.page_size(), 1);
        assert_eq!(view.total_pages(), 3);
    }

    #[test]
    fn test_edit_and_delete_emit_page_rows() {
        let edited = Arc::new(Mutex::new(Vec::new()));
        let deleted = Arc::new(Mutex::new(Vec::new()));
        let (e, d) = (edited.clone(), deleted.clone());

        let mut view = TableView::new(products(12), name_columns())
            .on_edit(move |row: &Record| e.lock().unwrap().push(row.value("id")))
            .on_delete(move |row: &Record| d.lock().unwrap().push(row.value("id")));

        assert!(view.go_to_page(2));
        assert!(view.edit(1));
        assert!(view.delete(0));
        assert!(!view.delete(2));

        assert_eq!(*edited.lock().unwrap(), vec![12.into()]);
        assert_eq!(*deleted.lock().unwrap(), vec![11.into()]);
        assert_eq!(view.rows().len(), 12);
    }
}
