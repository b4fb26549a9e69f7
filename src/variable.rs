use crate::statement::NumericType;
use core::fmt::Debug;
use wgpu::BufferDescriptor;

/// The precisions a leaf can be generated for.
///
/// It's implemented only for [`f32`] and [`f64`], which are the two types the kernels are
/// written for. Everything the generator needs to know about a precision is kept here as
/// associated constants so the dispatch stays resolved at compile time.
pub trait Numeric: bytemuck::Pod + Debug + PartialEq + Send + Sync + 'static {
    /// Tag used in the statement leaves
    const NUMERIC_TYPE: NumericType;
    /// Type name in the kernel source
    const NAME: &'static str;
}

impl Numeric for f32 {
    const NUMERIC_TYPE: NumericType = NumericType::Float;
    const NAME: &'static str = "float";
}

impl Numeric for f64 {
    const NUMERIC_TYPE: NumericType = NumericType::Double;
    const NAME: &'static str = "double";
}

/// Handle to the device memory of an object
///
/// The memory itself is allocated and bound outside of the generator, the handle only
/// describes the buffer to create: its label and its size in bytes, padding included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemHandle {
    label: String,
    byte_size: u64,
}

impl MemHandle {
    pub fn new(label: &str, byte_size: u64) -> Self {
        MemHandle {
            label: label.to_string(),
            byte_size,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }
}

/// This trait is the entry point to make a device object GPU compatible
///
/// It contains what the kernel argument binding step needs to create the buffers backing
/// the leaves of a statement and to upload their content.
pub trait Variable
where
    Self: Debug + Send,
{
    /// This gets a buffer descriptor from the [`Variable`] itself
    ///
    /// It is useful to create the buffer, the bind group layouts and the pipelines which will be executed
    /// on the GPU
    fn to_buffer_descriptor(&self) -> BufferDescriptor {
        let label = self.get_name();
        BufferDescriptor {
            label,
            mapped_at_creation: false,
            size: self.byte_size(),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        }
    }

    /// Gets an optional name associated with the [`Variable`]
    fn get_name(&self) -> Option<&str>;

    /// This function calculates the byte size of the object, padding included
    ///
    /// The size needs to be valid and true, as it will be used to calculate the dimension
    /// of the buffer.
    fn byte_size(&self) -> u64;

    /// The host content of the object as an ordered stream of bytes, ready for the upload
    fn byte_data(&self) -> &[u8];
}
