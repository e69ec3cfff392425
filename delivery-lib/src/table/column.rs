/// Column descriptor.
///
/// Columns are sortable unless marked [`fixed`](Column::fixed).
///
/// # Examples
///
/// ```
/// use delivery_lib::table::Column;
///
/// let columns = vec![
///     Column::new("id", "ID"),
///     Column::new("name", "Name"),
///     Column::new("image_url", "Image").fixed(),
/// ];
/// assert!(!columns[2].sortable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Row field read through [`TableRow::value`](super::TableRow::value).
    pub field: String,
    /// Header text.
    pub header: String,
    /// Whether `sort_by(field)` has any effect.
    pub sortable: bool,
}

impl Column {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            sortable: true,
        }
    }

    /// Make the column unsortable.
    pub fn fixed(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Set whether the column is sortable.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }
}
