//! Typed, dimensioned views over the flat numeric buffers that cross the
//! runtime boundary.
//!
//! The runtime hands back contiguous buffers with explicit dimension
//! metadata; this module turns them into checked rank-1/rank-2 read-only
//! views. A rank mismatch is a data-contract violation, never a silent
//! reshape.

use crate::error::{BridgeError, Result};
use pyo3::buffer::{Element, PyBuffer};
use pyo3::prelude::*;

/// An owned, contiguous numeric buffer with explicit shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBuffer<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T> TensorBuffer<T> {
    /// Create a buffer from flat data and a shape.
    ///
    /// The element count must equal the product of the dimension sizes.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(BridgeError::contract(
                "tensor.new",
                format!(
                    "buffer holds {} elements but shape {:?} implies {}",
                    data.len(),
                    shape,
                    numel
                ),
            ));
        }
        Ok(Self { data, shape })
    }

    /// Number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Dimension sizes.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// The underlying flat data, row-major.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// A 1-D read-only view. Any other rank is a contract error.
    pub fn view1(&self) -> Result<&[T]> {
        if self.shape.len() != 1 {
            return Err(BridgeError::contract(
                "tensor.view1",
                format!("expected rank 1, got rank {} {:?}", self.rank(), self.shape),
            ));
        }
        Ok(&self.data)
    }

    /// A 2-D read-only view where `at(i, j)` addresses row `i`, column `j`,
    /// row-major. Any other rank is a contract error.
    pub fn view2(&self) -> Result<TensorView2<'_, T>> {
        match self.shape.as_slice() {
            &[rows, cols] => Ok(TensorView2 {
                data: &self.data,
                rows,
                cols,
            }),
            _ => Err(BridgeError::contract(
                "tensor.view2",
                format!("expected rank 2, got rank {} {:?}", self.rank(), self.shape),
            )),
        }
    }
}

impl<T: Element + Copy> TensorBuffer<T> {
    /// Extract a buffer from a runtime object through the buffer protocol.
    ///
    /// Requires a C-contiguous (row-major) source; anything else is a
    /// contract violation on the runtime's side.
    pub fn from_object(py: Python<'_>, obj: &Bound<'_, PyAny>, operation: &str) -> Result<Self> {
        let buffer = PyBuffer::<T>::get(obj).map_err(|e| {
            BridgeError::contract(operation, format!("result is not a numeric buffer: {e}"))
        })?;
        if !buffer.is_c_contiguous() {
            return Err(BridgeError::contract(
                operation,
                "result buffer is not C-contiguous",
            ));
        }
        let shape = buffer.shape().to_vec();
        let data = buffer.to_vec(py)?;
        Self::new(data, shape)
    }
}

/// Non-owning 2-D view over a contiguous buffer. Rows are the batch
/// dimension where one exists.
#[derive(Debug, Clone, Copy)]
pub struct TensorView2<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
}

impl<'a, T> TensorView2<'a, T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at row `i`, column `j`, or `None` out of bounds.
    pub fn at(&self, i: usize, j: usize) -> Option<&'a T> {
        if i >= self.rows || j >= self.cols {
            return None;
        }
        self.data.get(i * self.cols + j)
    }

    /// Row `i` as a contiguous slice, or `None` out of bounds.
    pub fn row(&self, i: usize) -> Option<&'a [T]> {
        if i >= self.rows {
            return None;
        }
        Some(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }
}

/// Checked narrowing from the runtime's wide integers into a native field
/// type. Overflow is reported, never truncated.
pub fn narrow<T: TryFrom<i64>>(field: &'static str, value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| BridgeError::NarrowingOverflow {
        field,
        value,
        target: std::any::type_name::<T>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_must_match_element_count() {
        let err = TensorBuffer::new(vec![1.0f32; 5], vec![2, 3]).unwrap_err();
        assert!(matches!(err, BridgeError::Contract { .. }));
    }

    #[test]
    fn view2_addresses_row_major() {
        let t = TensorBuffer::new(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let v = t.view2().unwrap();
        assert_eq!(v.rows(), 2);
        assert_eq!(v.cols(), 3);
        assert_eq!(v.at(0, 0), Some(&1.0));
        assert_eq!(v.at(1, 2), Some(&6.0));
        assert_eq!(v.at(2, 0), None);
        assert_eq!(v.row(1), Some(&[4.0f32, 5.0, 6.0][..]));

        let rows: Vec<&[f32]> = v.iter_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn rank_mismatch_is_a_contract_error() {
        let t = TensorBuffer::new(vec![0i64; 6], vec![6]).unwrap();
        assert!(t.view1().is_ok());
        assert!(matches!(
            t.view2().unwrap_err(),
            BridgeError::Contract { .. }
        ));

        let t3 = TensorBuffer::new(vec![0i64; 8], vec![2, 2, 2]).unwrap();
        assert!(t3.view1().is_err());
        assert!(t3.view2().is_err());
    }

    #[test]
    fn narrowing_is_checked() {
        assert_eq!(narrow::<i32>("xmin", 42).unwrap(), 42);
        assert_eq!(narrow::<u32>("sampling_rate", 16_000).unwrap(), 16_000);

        let err = narrow::<i32>("xmax", i64::from(i32::MAX) + 1).unwrap_err();
        assert!(matches!(err, BridgeError::NarrowingOverflow { .. }));

        assert!(narrow::<u32>("sampling_rate", -1).is_err());
    }
}
