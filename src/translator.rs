//! This module contains the typed device objects a statement leaf can point to
//!
//! Its responsibility is to translate common host types (slices, [`ndarray::Array2`]) into
//! the padded layout the kernels expect, and to expose the sizes the generator and the
//! kernel argument binding need.

use crate::variable::{MemHandle, Numeric, Variable};
use ndarray::Array2;

/// Every padded dimension is a multiple of this number of elements
pub const ALIGNMENT: usize = 128;

/// Rounds `size` up to the next multiple of [`ALIGNMENT`]
///
/// # Panics
/// If the padded size doesn't fit in a `usize`
fn padded(size: usize) -> usize {
    size.checked_next_multiple_of(ALIGNMENT)
        .unwrap_or_else(|| panic!("padding {size} elements overflows usize"))
}

/// Size in bytes of `count` elements of `T`
///
/// # Panics
/// If the size doesn't fit in a `u64`
fn bytes_of<T: Numeric>(count: usize) -> u64 {
    count
        .checked_mul(std::mem::size_of::<T>())
        .and_then(|bytes| u64::try_from(bytes).ok())
        .unwrap_or_else(|| panic!("{count} elements of {} overflow the byte size", T::NAME))
}

/// Storage order of a dense matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    RowMajor,
    ColumnMajor,
}

/// A scalar living in device memory
#[derive(Debug, Clone)]
pub struct Scalar<T: Numeric> {
    name: String,
    value: T,
    handle: MemHandle,
}

impl<T: Numeric> Scalar<T> {
    pub fn new(name: &str, value: T) -> Self {
        Scalar {
            name: name.to_string(),
            value,
            handle: MemHandle::new(name, bytes_of::<T>(1)),
        }
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn handle(&self) -> &MemHandle {
        &self.handle
    }
}

/// A dense vector, padded to a multiple of [`ALIGNMENT`] elements
#[derive(Debug, Clone)]
pub struct Vector<T: Numeric> {
    name: String,
    size: usize,
    data: Vec<T>,
    handle: MemHandle,
}

impl<T: Numeric> Vector<T> {
    /// Creates a vector of `size` zeros
    ///
    /// # Panics
    /// If the padded storage size overflows
    pub fn zeros(name: &str, size: usize) -> Self {
        let internal_size = padded(size);
        let handle = MemHandle::new(name, bytes_of::<T>(internal_size));
        Vector {
            name: name.to_string(),
            size,
            data: vec![T::zeroed(); internal_size],
            handle,
        }
    }

    /// Creates a vector holding a copy of `values`, the padding is filled with zeros
    ///
    /// # Example
    /// ```
    /// use wgpu_kernelgen::translator::Vector;
    ///
    /// let x = Vector::from_slice("x", &[1.0f32, 2.0, 3.0]);
    /// assert_eq!(x.size(), 3);
    /// assert_eq!(x.internal_size(), 128);
    /// ```
    pub fn from_slice(name: &str, values: &[T]) -> Self {
        let mut vector = Vector::zeros(name, values.len());
        vector.data[..values.len()].copy_from_slice(values);
        vector
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn internal_size(&self) -> usize {
        self.data.len()
    }

    /// The logical content, padding excluded
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.size]
    }

    pub fn handle(&self) -> &MemHandle {
        &self.handle
    }
}

/// A vector whose entries all hold the same value, it has no storage of its own
#[derive(Debug, Clone)]
pub struct ImplicitVector<T: Numeric> {
    name: String,
    size: usize,
    value: T,
}

impl<T: Numeric> ImplicitVector<T> {
    pub fn new(name: &str, size: usize, value: T) -> Self {
        ImplicitVector {
            name: name.to_string(),
            size,
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn value(&self) -> T {
        self.value
    }
}

/// A dense matrix, each dimension padded to a multiple of [`ALIGNMENT`] elements
#[derive(Debug, Clone)]
pub struct Matrix<T: Numeric> {
    name: String,
    size1: usize,
    size2: usize,
    internal_size1: usize,
    internal_size2: usize,
    layout: Layout,
    data: Vec<T>,
    handle: MemHandle,
}

impl<T: Numeric> Matrix<T> {
    /// Creates a `rows` x `cols` matrix of zeros
    ///
    /// # Panics
    /// If the padded storage size overflows
    pub fn zeros(name: &str, rows: usize, cols: usize, layout: Layout) -> Self {
        let (internal_size1, internal_size2) = (padded(rows), padded(cols));
        let internal_size = internal_size1
            .checked_mul(internal_size2)
            .unwrap_or_else(|| {
                panic!("a padded {internal_size1}x{internal_size2} matrix overflows usize")
            });
        let handle = MemHandle::new(name, bytes_of::<T>(internal_size));
        Matrix {
            name: name.to_string(),
            size1: rows,
            size2: cols,
            internal_size1,
            internal_size2,
            layout,
            data: vec![T::zeroed(); internal_size],
            handle,
        }
    }

    /// This function creates a matrix from a borrowed [`ndarray::Array2`]
    ///
    /// The logical content is copied in the padded buffer following `layout`, the
    /// padding is filled with zeros.
    ///
    /// # Example
    /// ```
    /// use ndarray::array;
    /// use wgpu_kernelgen::translator::{Layout, Matrix};
    ///
    /// let a = array![[0., 0., 0.], [1., 1., 1.]];
    /// let gpu_a = Matrix::<f64>::from_ndarray("a", &a, Layout::RowMajor);
    /// assert_eq!(gpu_a.dim(), (2, 3));
    /// assert_eq!(gpu_a.to_ndarray(), a);
    /// ```
    pub fn from_ndarray(name: &str, array: &Array2<T>, layout: Layout) -> Self {
        let (rows, cols) = array.dim();
        let mut matrix = Matrix::zeros(name, rows, cols, layout);
        for ((row, col), value) in array.indexed_iter() {
            let position = matrix.position(row, col);
            matrix.data[position] = *value;
        }
        matrix
    }

    /// Reads the logical content back into an [`ndarray::Array2`]
    pub fn to_ndarray(&self) -> Array2<T> {
        Array2::from_shape_fn((self.size1, self.size2), |(row, col)| {
            self.data[self.position(row, col)]
        })
    }

    fn position(&self, row: usize, col: usize) -> usize {
        match self.layout {
            Layout::RowMajor => row * self.internal_size2 + col,
            Layout::ColumnMajor => row + col * self.internal_size1,
        }
    }

    /// Logical dimensions as (rows, columns)
    pub fn dim(&self) -> (usize, usize) {
        (self.size1, self.size2)
    }

    pub fn internal_size1(&self) -> usize {
        self.internal_size1
    }

    pub fn internal_size2(&self) -> usize {
        self.internal_size2
    }

    pub fn internal_size(&self) -> usize {
        self.internal_size1 * self.internal_size2
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn is_row_major(&self) -> bool {
        self.layout == Layout::RowMajor
    }

    pub fn handle(&self) -> &MemHandle {
        &self.handle
    }
}

/// A matrix whose entries all hold the same value, it has no storage of its own
#[derive(Debug, Clone)]
pub struct ImplicitMatrix<T: Numeric> {
    name: String,
    size1: usize,
    size2: usize,
    value: T,
}

impl<T: Numeric> ImplicitMatrix<T> {
    pub fn new(name: &str, rows: usize, cols: usize, value: T) -> Self {
        ImplicitMatrix {
            name: name.to_string(),
            size1: rows,
            size2: cols,
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.size1, self.size2)
    }

    pub fn value(&self) -> T {
        self.value
    }
}

impl<T: Numeric> Variable for Scalar<T> {
    fn get_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn byte_size(&self) -> u64 {
        self.handle.byte_size()
    }

    fn byte_data(&self) -> &[u8] {
        bytemuck::bytes_of(&self.value)
    }
}

impl<T: Numeric> Variable for Vector<T> {
    fn get_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn byte_size(&self) -> u64 {
        self.handle.byte_size()
    }

    fn byte_data(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T: Numeric> Variable for Matrix<T> {
    fn get_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn byte_size(&self) -> u64 {
        self.handle.byte_size()
    }

    fn byte_data(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

#[cfg(test)]
mod inputs_tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn vector_is_padded_with_zeros() {
        let x = Vector::from_slice("x", &[1.0f64, 2.0]);
        assert_eq!(x.internal_size(), ALIGNMENT);
        assert_eq!(x.as_slice(), &[1.0, 2.0]);
        assert_eq!(x.byte_size(), (ALIGNMENT * 8) as u64);
        assert_eq!(x.byte_data().len(), ALIGNMENT * 8);
    }

    #[test]
    fn empty_vector_has_no_padding() {
        let x = Vector::<f32>::zeros("x", 0);
        assert_eq!(x.internal_size(), 0);
    }

    #[test]
    fn handles_describe_the_padded_buffer() {
        let s = Scalar::new("s", 1.0f64);
        assert_eq!(s.handle(), &MemHandle::new("s", 8));
        let m = Matrix::<f32>::zeros("m", 2, 129, Layout::RowMajor);
        assert_eq!(m.handle().byte_size(), (128 * 256 * 4) as u64);
        assert_eq!(m.byte_size(), m.byte_data().len() as u64);
    }

    #[test]
    fn padding_rounds_up_to_the_alignment() {
        assert_eq!(padded(1), ALIGNMENT);
        assert_eq!(padded(ALIGNMENT), ALIGNMENT);
        assert_eq!(padded(ALIGNMENT + 1), 2 * ALIGNMENT);
        assert_eq!(padded(usize::MAX - ALIGNMENT + 1), usize::MAX - ALIGNMENT + 1);
    }

    #[test]
    #[should_panic(expected = "overflows usize")]
    fn padding_past_usize_panics() {
        padded(usize::MAX - 1);
    }

    #[test]
    #[should_panic(expected = "overflows usize")]
    fn huge_matrices_panic_before_allocating() {
        Matrix::<f32>::zeros("m", usize::MAX / 2, 256, Layout::RowMajor);
    }

    #[test]
    fn matrix_layouts_place_elements_differently() {
        let a = array![[1.0f32, 2.0], [3.0, 4.0]];
        let row_major = Matrix::from_ndarray("a", &a, Layout::RowMajor);
        let col_major = Matrix::from_ndarray("a", &a, Layout::ColumnMajor);

        let row_data: &[f32] = bytemuck::cast_slice(row_major.byte_data());
        let col_data: &[f32] = bytemuck::cast_slice(col_major.byte_data());
        assert_eq!(row_data[1], 2.0);
        assert_eq!(col_data[1], 3.0);
        assert_eq!(row_data[ALIGNMENT], 3.0);
        assert_eq!(col_data[ALIGNMENT], 2.0);

        assert_eq!(row_major.to_ndarray(), a);
        assert_eq!(col_major.to_ndarray(), a);
    }

    #[test]
    fn buffer_descriptor_covers_padding() {
        let m = Matrix::<f32>::zeros("m", 130, 3, Layout::ColumnMajor);
        let descriptor = m.to_buffer_descriptor();
        assert_eq!(descriptor.label, Some("m"));
        assert_eq!(descriptor.size, (256 * 128 * 4) as u64);
        assert!(descriptor.usage.contains(wgpu::BufferUsages::STORAGE));
        assert!(!descriptor.mapped_at_creation);
    }
}
