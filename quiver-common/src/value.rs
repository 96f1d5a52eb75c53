use serde::{Deserialize, Serialize};

/// Numeric attribute data, either a single series or one series per row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataArray {
    Flat(Vec<f32>),
    Rows(Vec<Vec<f32>>),
}

impl DataArray {
    /// Number of top level entries
    pub fn len(&self) -> usize {
        match self {
            DataArray::Flat(values) => values.len(),
            DataArray::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of a flat array, or the first row of a 2-D one
    pub fn as_flat(&self) -> &[f32] {
        match self {
            DataArray::Flat(values) => values,
            DataArray::Rows(rows) => rows.first().map(|r| r.as_slice()).unwrap_or(&[]),
        }
    }

    /// Series as rows. A flat array is a single row.
    pub fn rows(&self) -> Vec<&[f32]> {
        match self {
            DataArray::Flat(values) => vec![values.as_slice()],
            DataArray::Rows(rows) => rows.iter().map(|r| r.as_slice()).collect(),
        }
    }

    pub fn iter_values(&self) -> Box<dyn Iterator<Item = f32> + '_> {
        match self {
            DataArray::Flat(values) => Box::new(values.iter().copied()),
            DataArray::Rows(rows) => Box::new(rows.iter().flat_map(|r| r.iter().copied())),
        }
    }

    /// Finite `[min, max]` over every value
    pub fn extent(&self) -> Option<(f32, f32)> {
        self.iter_values()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Copy of a flat array with `index` replaced
    pub fn with_value(&self, index: usize, value: f32) -> DataArray {
        let mut values = self.as_flat().to_vec();
        if let Some(slot) = values.get_mut(index) {
            *slot = value;
        }
        DataArray::Flat(values)
    }

    /// Copy of a flat array with `value` appended
    pub fn with_pushed(&self, value: f32) -> DataArray {
        let mut values = self.as_flat().to_vec();
        values.push(value);
        DataArray::Flat(values)
    }

    /// Copy of a flat array without `index`
    pub fn without(&self, index: usize) -> DataArray {
        let mut values = self.as_flat().to_vec();
        if index < values.len() {
            values.remove(index);
        }
        DataArray::Flat(values)
    }
}

impl Default for DataArray {
    fn default() -> Self {
        DataArray::Flat(Vec::new())
    }
}

impl From<Vec<f32>> for DataArray {
    fn from(values: Vec<f32>) -> Self {
        DataArray::Flat(values)
    }
}

impl From<Vec<Vec<f32>>> for DataArray {
    fn from(rows: Vec<Vec<f32>>) -> Self {
        DataArray::Rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_ignores_non_finite() {
        let data = DataArray::from(vec![3.0, f32::NAN, -1.0, 2.0]);
        assert_eq!(data.extent(), Some((-1.0, 3.0)));
        assert_eq!(DataArray::default().extent(), None);
    }

    #[test]
    fn test_copy_on_write_helpers() {
        let data = DataArray::from(vec![1.0, 2.0, 3.0]);
        assert_eq!(data.with_value(1, 9.0), DataArray::from(vec![1.0, 9.0, 3.0]));
        assert_eq!(data.without(0), DataArray::from(vec![2.0, 3.0]));
        assert_eq!(data.with_pushed(4.0).len(), 4);
        assert_eq!(data, DataArray::from(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_rows() {
        let data = DataArray::from(vec![vec![0.0, 1.0], vec![2.0, 3.0]]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows()[1], &[2.0, 3.0]);
        assert_eq!(data.extent(), Some((0.0, 3.0)));
    }
}
