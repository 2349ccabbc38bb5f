use ahash::AHashMap;
use ndarray::{Array2, ArrayView1};

use crate::error::{Error, Result};

/// Named numeric columns aligned with the rows of a tessellation.
/// Missing values are stored as NaN and surfaced as `None`.
#[derive(Clone, Debug)]
pub struct AttributeTable {
    columns: Vec<String>,
    index: AHashMap<String, usize>,
    values: Array2<f64>, // (n_rows, n_columns)
}

impl AttributeTable {
    /// An empty table with `num_rows` rows and no columns.
    pub fn new(num_rows: usize) -> Self {
        Self { columns: Vec::new(), index: AHashMap::new(), values: Array2::zeros((num_rows, 0)) }
    }

    /// Build a table from (name, values) columns, each of length `num_rows`.
    pub fn from_columns<S: Into<String>>(num_rows: usize, columns: impl IntoIterator<Item = (S, Vec<Option<f64>>)>) -> Result<Self> {
        let mut table = Self::new(num_rows);
        for (name, values) in columns {
            table.set_column(name, values)?;
        }
        Ok(table)
    }

    #[inline] pub fn num_rows(&self) -> usize { self.values.nrows() }

    #[inline] pub fn num_columns(&self) -> usize { self.columns.len() }

    /// Column names in insertion order.
    #[inline] pub fn columns(&self) -> &[String] { &self.columns }

    #[inline] pub fn contains(&self, name: &str) -> bool { self.index.contains_key(name) }

    /// Raw column view (NaN for missing), or `None` if there is no such column.
    pub fn column_view(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.index.get(name).map(|&c| self.values.column(c))
    }

    /// Column values, or `None` if there is no such column.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column_view(name).map(|col| col.iter().map(|&v| present(v)).collect())
    }

    /// Value at (`name`, `row`); `None` if missing or there is no such column.
    pub fn get(&self, name: &str, row: usize) -> Option<f64> {
        self.index.get(name).and_then(|&c| present(self.values[[row, c]]))
    }

    /// Sum of the present values of a column.
    pub fn sum(&self, name: &str) -> Option<f64> {
        self.column_view(name).map(|col| col.iter().filter(|v| !v.is_nan()).sum())
    }

    /// Insert or replace a column.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.num_rows() {
            return Err(Error::RowCountMismatch { expected: self.num_rows(), found: values.len() })
        }
        let name = name.into();
        let values = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect::<Vec<_>>();

        match self.index.get(&name) {
            Some(&c) => self.values.column_mut(c).iter_mut().zip(values).for_each(|(slot, v)| *slot = v),
            None => {
                let old = std::mem::replace(&mut self.values, Array2::zeros((0, 0)));
                let width = old.ncols();
                self.values = Array2::from_shape_fn((old.nrows(), width + 1), |(r, c)| {
                    if c < width { old[[r, c]] } else { values[r] }
                });
                self.index.insert(name.clone(), width);
                self.columns.push(name);
            }
        }
        Ok(())
    }
}

#[inline]
fn present(value: f64) -> Option<f64> { (!value.is_nan()).then_some(value) }
