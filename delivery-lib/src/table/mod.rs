//! Client-side list engine: search, sort and paginate a set of rows.
//!
//! A [`TableView`] owns its source rows and recomputes the visible page
//! synchronously after every mutation. The pipeline is always
//! filter, then stable sort, then paginate, so an active sort survives a
//! new search term or a row refresh.
//!
//! # Examples
//!
//! ```
//! use delivery_lib::model::Record;
//! use delivery_lib::table::{Column, TableView};
//!
//! let rows = vec![
//!     Record::new().set("name", "Pizza"),
//!     Record::new().set("name", "Taco"),
//! ];
//! let mut view = TableView::new(rows, vec![Column::new("name", "Name")]);
//! view.set_search_term("piz");
//! assert_eq!(view.visible_rows().len(), 1);
//! ```

mod column;
mod filter;
mod page;
mod sort;
mod view;

pub use column::Column;
pub use filter::filter_indices;
pub use page::DEFAULT_PAGE_SIZE;
pub use page::total_pages;
pub use sort::SortDirection;
pub use sort::SortState;
pub use view::TableView;

use crate::model::Value;

/// A row the table engine can read cells from.
///
/// Unknown fields return [`Value::Null`]; the engine treats them like a
/// missing value (never matched by search, sorted last).
pub trait TableRow {
    fn value(&self, field: &str) -> Value;
}

impl<T: TableRow + ?Sized> TableRow for &T {
    fn value(&self, field: &str) -> Value {
        (**self).value(field)
    }
}
