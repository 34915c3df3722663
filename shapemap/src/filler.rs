use shapemap_core::{ArrayValue, Value};

use crate::MapError;

/// Writes a flat stream of values into an array of any rank, row-major:
/// the last dimension varies fastest.
///
/// ```
/// use shapemap::{ArrayValue, MultidimensionalFiller, Shape, Value};
///
/// let mut array = ArrayValue::new(Shape::i64(), vec![2, 2]);
/// let mut filler = MultidimensionalFiller::new(&mut array);
/// for n in 1..=4 {
///     filler.accept_next(Value::Int(n)).unwrap();
/// }
/// assert!(filler.accept_next(Value::Int(5)).is_err());
/// assert_eq!(array.to_string(), "[[1, 2], [3, 4]]");
/// ```
pub struct MultidimensionalFiller<'a> {
    indices: Vec<usize>,
    destination: &'a mut ArrayValue,
}

impl<'a> MultidimensionalFiller<'a> {
    /// A filler positioned on the first slot of `destination`.
    pub fn new(destination: &'a mut ArrayValue) -> Self {
        Self {
            indices: vec![0; destination.rank()],
            destination,
        }
    }

    /// The cursor. The innermost index may sit one past its extent until
    /// the next value carries it outward.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Writes `value` at the cursor, then advances the innermost index.
    ///
    /// An exhausted dimension is reset and carries into the next outer one.
    /// Fails with [`MapError::Capacity`] once the outermost dimension is
    /// exhausted; nothing is written in that case.
    pub fn accept_next(&mut self, value: Value) -> Result<(), MapError> {
        if self.destination.is_empty() {
            return Err(self.capacity_error());
        }
        let Some(innermost) = self.indices.len().checked_sub(1) else {
            return Err(self.capacity_error());
        };

        let mut dim = innermost;
        while dim > 0 && self.indices[dim] == self.destination.extent(dim) {
            self.indices[dim] = 0;
            dim -= 1;
            self.indices[dim] += 1;
        }
        // an exhausted outermost dimension stays exhausted
        if self.indices[0] == self.destination.extent(0) {
            return Err(self.capacity_error());
        }

        self.destination.set(&self.indices, value)?;
        self.indices[innermost] += 1;
        Ok(())
    }

    fn capacity_error(&self) -> MapError {
        MapError::Capacity {
            dims: self.destination.dims().to_vec(),
        }
    }
}
