use std::fmt;

use super::TableRow;

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// The active sort column and its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Applies a click on `field`: the active column flips direction, any
    /// other column becomes active ascending.
    pub fn toggled(current: Option<&SortState>, field: &str) -> SortState {
        match current {
            Some(state) if state.field == field => SortState {
                field: state.field.clone(),
                direction: state.direction.reversed(),
            },
            _ => SortState::ascending(field),
        }
    }
}

/// Stable sort of `indices` by `rows[i].value(field)`.
///
/// Nulls go last in both directions.
pub(super) fn sort_indices<R: TableRow>(rows: &[R], indices: &mut [usize], state: &SortState) {
    let ascending = state.direction.is_ascending();
    let mut keyed: Vec<_> = indices
        .iter()
        .map(|&idx| (rows[idx].value(&state.field), idx))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.sort_cmp_directed(b, ascending));
    for (slot, (_, idx)) in indices.iter_mut().zip(keyed) {
        *slot = idx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn names(rows: &[Record], indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| rows[i].value("name").to_string())
            .collect()
    }

    #[test]
    fn test_toggle_rule() {
        let first = SortState::toggled(None, "name");
        assert_eq!(first, SortState::ascending("name"));

        let second = SortState::toggled(Some(&first), "name");
        assert_eq!(second.direction, SortDirection::Descending);

        let other = SortState::toggled(Some(&second), "price");
        assert_eq!(other, SortState::ascending("price"));
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let rows = vec![
            Record::new().set("name", "b1").set("rank", 1),
            Record::new().set("name", "a2").set("rank", 2),
            Record::new().set("name", "a1").set("rank", 1),
            Record::new().set("name", "b2").set("rank", 2),
        ];
        let mut indices = vec![0, 1, 2, 3];
        sort_indices(&rows, &mut indices, &SortState::ascending("rank"));
        assert_eq!(names(&rows, &indices), vec!["b1", "a1", "a2", "b2"]);

        let mut indices = vec![0, 1, 2, 3];
        let desc = SortState {
            field: "rank".into(),
            direction: SortDirection::Descending,
        };
        sort_indices(&rows, &mut indices, &desc);
        assert_eq!(names(&rows, &indices), vec!["a2", "b2", "b1", "a1"]);
    }

    #[test]
    fn test_nulls_last_both_directions() {
        let rows = vec![
            Record::new().set("name", "x"),
            Record::new().set("name", "b").set("price", 2),
            Record::new().set("name", "a").set("price", 1.5),
        ];
        let mut indices = vec![0, 1, 2];
        sort_indices(&rows, &mut indices, &SortState::ascending("price"));
        assert_eq!(names(&rows, &indices), vec!["a", "b", "x"]);

        let mut indices = vec![0, 1, 2];
        let desc = SortState {
            field: "price".into(),
            direction: SortDirection::Descending,
        };
        sort_indices(&rows, &mut indices, &desc);
        assert_eq!(names(&rows, &indices), vec!["b", "a", "x"]);
    }
}
