//! Cursors over composed fixtures.

use std::fmt;

use pgmock_client::{CommandTag, Error, FieldDescription, Result, Row, Rows};
use pgmock_types::{Scannable, SqlValue, assign};

use crate::rows::{MockRows, describe_sets};

/// Copy `row` into `dest` positionally.
///
/// A destination count that differs from the column count fails before any
/// destination is touched.
pub(crate) fn scan_row(
    columns: &[FieldDescription],
    row: &[SqlValue],
    dest: &mut [&mut dyn Scannable],
) -> Result<()> {
    if dest.len() != columns.len() {
        return Err(Error::ArgumentCount {
            given: dest.len(),
            expected: columns.len(),
        });
    }

    for ((slot, value), column) in dest.iter_mut().zip(row).zip(columns) {
        assign(&mut **slot, value, column.name())?;
    }
    Ok(())
}

struct ResultSet {
    fixture: MockRows,
    // 0 is before the first row, len + 1 is past the last.
    position: usize,
}

/// A cursor over one or more [`MockRows`] result sets.
///
/// Created by [`MockRows::compose`] or [`compose_rows`](crate::compose_rows).
pub struct ComposedRows {
    sets: Vec<ResultSet>,
    current: usize,
}

impl ComposedRows {
    pub(crate) fn new(fixtures: Vec<MockRows>) -> Self {
        tracing::trace!(
            result_sets = fixtures.len(),
            rows = fixtures.iter().map(MockRows::len).sum::<usize>(),
            "composed row cursor"
        );
        Self {
            sets: fixtures
                .into_iter()
                .map(|fixture| ResultSet {
                    fixture,
                    position: 0,
                })
                .collect(),
            current: 0,
        }
    }

    fn set(&self) -> Option<&ResultSet> {
        self.sets.get(self.current)
    }

    /// The current set and the index and values of its current row.
    fn current_row(&self) -> Result<(&MockRows, usize, &[SqlValue])> {
        let set = self.set().ok_or(Error::NoCurrentRow)?;
        let index = set.position.checked_sub(1).ok_or(Error::NoCurrentRow)?;
        let row = set.fixture.rows.get(index).ok_or(Error::NoCurrentRow)?;
        Ok((&set.fixture, index, row))
    }
}

impl Rows for ComposedRows {
    fn next(&mut self) -> bool {
        let Some(set) = self.sets.get_mut(self.current) else {
            return false;
        };
        let len = set.fixture.len();
        if set.position <= len {
            set.position += 1;
        }
        set.position <= len
    }

    fn scan(&mut self, dest: &mut [&mut dyn Scannable]) -> Result<()> {
        let (fixture, index, row) = self.current_row()?;
        if let Some(err) = fixture.row_errors.get(&index) {
            return Err(err.clone());
        }
        scan_row(&fixture.columns, row, dest)
    }

    fn values(&self) -> Result<(Vec<SqlValue>, Option<Error>)> {
        let (fixture, index, row) = self.current_row()?;
        Ok((row.to_vec(), fixture.row_errors.get(&index).cloned()))
    }

    fn raw_values(&self) -> Result<Vec<Option<Vec<u8>>>> {
        let (fixture, _, row) = self.current_row()?;
        row.iter()
            .zip(&fixture.columns)
            .map(|(value, column)| match value {
                SqlValue::Null => Ok(None),
                SqlValue::Bytes(b) => Ok(Some(b.to_vec())),
                other => Err(Error::RawValue {
                    column: column.name.clone(),
                    kind: other.kind_name(),
                }),
            })
            .collect()
    }

    fn command_tag(&self) -> CommandTag {
        self.set()
            .map(|s| s.fixture.command_tag.clone())
            .unwrap_or_default()
    }

    fn field_descriptions(&self) -> &[FieldDescription] {
        self.set().map_or(&[][..], |s| s.fixture.columns.as_slice())
    }

    fn close(&mut self) -> Result<()> {
        match self.sets.iter().find_map(|s| s.fixture.close_error.as_ref()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn err(&self) -> Option<Error> {
        let set = self.set()?;
        let index = set.position.checked_sub(1)?;
        set.fixture.row_errors.get(&index).cloned()
    }

    fn next_result_set(&mut self) -> bool {
        if self.current + 1 < self.sets.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for ComposedRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets: Vec<&MockRows> = self.sets.iter().map(|s| &s.fixture).collect();
        describe_sets(f, &sets)
    }
}

impl fmt::Debug for ComposedRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedRows")
            .field("result_sets", &self.sets.len())
            .field("current", &self.current)
            .field("position", &self.set().map(|s| s.position))
            .finish()
    }
}

/// A single-row result composed from a [`MockRow`](crate::MockRow).
#[derive(Debug)]
pub struct ComposedRow {
    columns: Vec<FieldDescription>,
    row: Option<Vec<SqlValue>>,
    error: Option<Error>,
    command_tag: CommandTag,
}

impl ComposedRow {
    pub(crate) fn new(
        columns: Vec<FieldDescription>,
        row: Option<Vec<SqlValue>>,
        error: Option<Error>,
        command_tag: CommandTag,
    ) -> Self {
        Self {
            columns,
            row,
            error,
            command_tag,
        }
    }

    /// A row whose `scan` always fails with `err`.
    pub(crate) fn failed(err: Error) -> Self {
        Self::new(Vec::new(), None, Some(err), CommandTag::default())
    }

    /// Completion tag of the statement.
    #[must_use]
    pub fn command_tag(&self) -> &CommandTag {
        &self.command_tag
    }

    /// Column metadata.
    #[must_use]
    pub fn field_descriptions(&self) -> &[FieldDescription] {
        &self.columns
    }
}

impl Row for ComposedRow {
    fn scan(&mut self, dest: &mut [&mut dyn Scannable]) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let row = self.row.as_ref().ok_or(Error::NoRows)?;
        scan_row(&self.columns, row, dest)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::row;

    fn users() -> MockRows {
        MockRows::new(["id", "username"])
            .add_row(row![1u32, "johndoe"])
            .add_row(row![2u32, "janedoe"])
    }

    #[test]
    fn test_next_sequence() {
        let mut rows = users().compose();
        assert!(rows.next());
        assert!(rows.next());
        assert!(!rows.next());
        assert!(!rows.next());
    }

    #[test]
    fn test_scan_before_next() {
        let mut rows = users().compose();
        let (mut id, mut name) = (0u32, String::new());
        let err = rows.scan(&mut [&mut id, &mut name]).unwrap_err();
        assert_eq!(err, Error::NoCurrentRow);
    }

    #[test]
    fn test_scan_after_exhaustion() {
        let mut rows = users().compose();
        while rows.next() {}
        let (mut id, mut name) = (0u32, String::new());
        assert_eq!(
            rows.scan(&mut [&mut id, &mut name]).unwrap_err(),
            Error::NoCurrentRow
        );
    }

    #[test]
    fn test_argument_count_leaves_destinations() {
        let mut rows = users().compose();
        assert!(rows.next());
        let mut id = 77u32;
        let err = rows.scan(&mut [&mut id]).unwrap_err();
        assert_eq!(
            err,
            Error::ArgumentCount {
                given: 1,
                expected: 2
            }
        );
        assert_eq!(id, 77);
    }

    #[test]
    fn test_err_tracks_consumed_row() {
        let boom = Error::database("XX000", "boom");
        let mut rows = users().row_error(1, boom.clone()).compose();
        assert_eq!(rows.err(), None);
        assert!(rows.next());
        assert_eq!(rows.err(), None);
        assert!(rows.next());
        assert_eq!(rows.err(), Some(boom));
    }

    #[test]
    fn test_row_error_past_last_row() {
        let late = Error::database("57014", "canceling statement");
        let mut rows = users().row_error(2, late.clone()).compose();
        while rows.next() {}
        assert_eq!(rows.err(), Some(late));
    }

    #[test]
    fn test_raw_values() {
        let mut rows = MockRows::new(["blob", "missing", "name"])
            .add_row(row![vec![1u8, 2], SqlValue::Null, "x"])
            .compose();
        assert!(rows.next());
        let err = rows.raw_values().unwrap_err();
        assert!(matches!(err, Error::RawValue { ref column, kind: "string" } if column == "name"));

        let mut rows = MockRows::new(["blob", "missing"])
            .add_row(row![vec![1u8, 2], SqlValue::Null])
            .compose();
        assert!(rows.next());
        assert_eq!(rows.raw_values().unwrap(), vec![Some(vec![1, 2]), None]);
    }

    #[test]
    fn test_empty_composition() {
        let mut rows = crate::compose_rows(Vec::new());
        assert!(!rows.next());
        assert!(!rows.next_result_set());
        assert!(rows.field_descriptions().is_empty());
        assert_eq!(rows.command_tag(), CommandTag::default());
        assert!(rows.close().is_ok());
    }

    #[test]
    fn test_composed_row_without_data() {
        let mut row = crate::MockRow::new(["id"]).compose();
        let mut id = 0u32;
        assert_eq!(row.scan(&mut [&mut id]).unwrap_err(), Error::NoRows);
    }
}
