use std::fmt;

use ndarray::{Array1, Array2, s};

/// Errors produced while accessing dataset records.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// The requested record index is out of bounds.
    OutOfBounds { index: usize, len: usize },

    /// A record was requested from a source without records.
    EmptySource,

    /// The source could not provide a valid record due to domain constraints.
    InvalidSample(&'static str),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::OutOfBounds { index, len } => {
                write!(f, "record index {index} is out of bounds for {len} records")
            }
            DataError::EmptySource => write!(f, "the source has no records"),
            DataError::InvalidSample(msg) => write!(f, "invalid sample: {msg}"),
        }
    }
}

impl std::error::Error for DataError {}

/// A reusable buffer holding a single training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub input: Vec<f32>,
    pub target: Vec<f32>,
    pub significance: f32,
}

impl Record {
    /// Creates a zeroed `Record` with room for `x_size` inputs and `y_size` targets.
    pub fn new(x_size: usize, y_size: usize) -> Self {
        Self {
            input: vec![0.; x_size],
            target: vec![0.; y_size],
            significance: 1.0,
        }
    }
}

/// An indexable, record-oriented collection of examples.
///
/// Fetching a record may move internal cursors or reuse internal buffers, hence `get_record`
/// takes `&mut self`: sources shared between threads must be put behind a lock.
pub trait SampleSource: Send {
    /// Returns the total amount of addressable records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the record at `index` into `record`.
    ///
    /// # Errors
    /// Returns `DataError::OutOfBounds` if `index` is invalid.
    fn get_record(&mut self, index: usize, record: &mut Record) -> Result<(), DataError>;
}

/// A `SampleSource` kept entirely in memory.
///
/// Rows are stored as `x_size` inputs followed by `y_size` targets, every row has a
/// significance of `1.0` unless set through `with_significance`.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    rows: Array2<f32>,
    significance: Array1<f32>,
    x_size: usize,
}

impl InMemorySource {
    /// Creates a new `InMemorySource` from a row-major buffer.
    ///
    /// # Arguments
    /// * `data` - The rows, each one `x_size + y_size` long.
    /// * `x_size` - The amount of inputs per row.
    /// * `y_size` - The amount of targets per row.
    ///
    /// # Returns
    /// The source or an `InvalidSample` error if `data` can't be split in rows.
    pub fn new(data: Vec<f32>, x_size: usize, y_size: usize) -> Result<Self, DataError> {
        if x_size == 0 || y_size == 0 {
            return Err(DataError::InvalidSample(
                "rows need at least one input and one target",
            ));
        }

        let row_size = x_size
            .checked_add(y_size)
            .ok_or(DataError::InvalidSample("the row size overflows"))?;

        if data.len() % row_size != 0 {
            return Err(DataError::InvalidSample(
                "the data length is not a multiple of the row size",
            ));
        }

        let nrows = data.len() / row_size;
        let rows = Array2::from_shape_vec((nrows, row_size), data)
            .map_err(|_| DataError::InvalidSample("the data can't be laid out in rows"))?;

        Ok(Self {
            rows,
            significance: Array1::ones(nrows),
            x_size,
        })
    }

    /// Sets a per-row significance.
    ///
    /// # Returns
    /// The source or an `InvalidSample` error if there isn't exactly one value per row.
    pub fn with_significance(mut self, significance: Vec<f32>) -> Result<Self, DataError> {
        if significance.len() != self.rows.nrows() {
            return Err(DataError::InvalidSample(
                "significance needs exactly one value per row",
            ));
        }

        self.significance = Array1::from_vec(significance);
        Ok(self)
    }

}

impl SampleSource for InMemorySource {
    fn len(&self) -> usize {
        self.rows.nrows()
    }

    fn get_record(&mut self, index: usize, record: &mut Record) -> Result<(), DataError> {
        let len = self.len();

        if index >= len {
            return Err(DataError::OutOfBounds { index, len });
        }

        let row = self.rows.row(index);

        record.input.clear();
        record.input.extend(row.slice(s![..self.x_size]));
        record.target.clear();
        record.target.extend(row.slice(s![self.x_size..]));
        record.significance = self.significance[index];

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_split_into_inputs_and_targets() {
        let mut src = InMemorySource::new(vec![1., 2., 3., 4., 5., 6.], 2, 1).unwrap();
        let mut record = Record::new(2, 1);

        assert_eq!(src.len(), 2);
        src.get_record(1, &mut record).unwrap();

        assert_eq!(record.input, [4., 5.]);
        assert_eq!(record.target, [6.]);
        assert_eq!(record.significance, 1.0);
    }

    #[test]
    fn record_buffers_are_resized_to_the_row_layout() {
        let mut src = InMemorySource::new(vec![1., 2., 3.], 1, 2).unwrap();
        let mut record = Record::new(0, 0);

        src.get_record(0, &mut record).unwrap();
        assert_eq!(record.input, [1.]);
        assert_eq!(record.target, [2., 3.]);
    }

    #[test]
    fn significance_is_per_row() {
        let mut src = InMemorySource::new(vec![1., 2., 3., 4.], 1, 1)
            .unwrap()
            .with_significance(vec![0.5, 2.0])
            .unwrap();
        let mut record = Record::new(1, 1);

        src.get_record(1, &mut record).unwrap();
        assert_eq!(record.significance, 2.0);
    }

    #[test]
    fn out_of_bounds_index_is_reported() {
        let mut src = InMemorySource::new(vec![1., 2.], 1, 1).unwrap();
        let mut record = Record::new(1, 1);

        assert_eq!(
            src.get_record(1, &mut record),
            Err(DataError::OutOfBounds { index: 1, len: 1 })
        );
    }

    #[test]
    fn ragged_data_is_rejected() {
        assert!(InMemorySource::new(vec![1., 2., 3.], 1, 1).is_err());
        assert!(InMemorySource::new(vec![1., 2.], 2, 0).is_err());
        assert_eq!(
            InMemorySource::new(vec![1., 2.], usize::MAX, 1).unwrap_err(),
            DataError::InvalidSample("the row size overflows")
        );
        assert!(
            InMemorySource::new(vec![1., 2.], 1, 1)
                .unwrap()
                .with_significance(vec![1., 1.])
                .is_err()
        );
    }
}
