//! Assembly of kernel source text
//!
//! [`KernelStream`] collects the lines of a kernel body and keeps them indented,
//! [`KernelSource`] holds a finished kernel or a template whose tokens are replaced with
//! generated fragments before the source is handed to the device compiler.

use anyhow::Context;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;

/// Text appended at the start of a line for each indentation level
pub const INDENT_UNIT: &str = "    ";

/// Write only accumulator of kernel lines
///
/// Every line starts with [`INDENT_UNIT`] repeated as many times as the current depth.
/// The stream implements [`fmt::Write`], so `write!`/`writeln!` can be used with it.
///
/// # Example
/// ```
/// use wgpu_kernelgen::coding::KernelStream;
///
/// let mut stream = KernelStream::new();
/// stream.write_line("for(unsigned int i = 0; i < N; ++i){");
/// {
///     let mut body = stream.scope();
///     body.write_line("y[i] = x[i];");
/// }
/// stream.write_line("}");
/// assert_eq!(stream.as_str(), "for(unsigned int i = 0; i < N; ++i){\n    y[i] = x[i];\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct KernelStream {
    buffer: String,
    depth: usize,
    at_line_start: bool,
}

impl KernelStream {
    pub fn new() -> Self {
        KernelStream {
            buffer: String::new(),
            depth: 0,
            at_line_start: true,
        }
    }

    /// Appends `text`, indenting every line it starts
    pub fn write(&mut self, text: &str) {
        for piece in text.split_inclusive('\n') {
            if self.at_line_start {
                for _ in 0..self.depth {
                    self.buffer.push_str(INDENT_UNIT);
                }
            }
            self.buffer.push_str(piece);
            self.at_line_start = piece.ends_with('\n');
        }
    }

    /// Appends `line` followed by a line break
    pub fn write_line(&mut self, line: &str) {
        self.write(line);
        self.write("\n");
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn unindent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Indents the stream until the returned guard is dropped
    pub fn scope(&mut self) -> IndentGuard<'_> {
        self.indent();
        IndentGuard { stream: self }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl Default for KernelStream {
    fn default() -> Self {
        KernelStream::new()
    }
}

impl fmt::Write for KernelStream {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}

/// One indentation level of a [`KernelStream`], released on drop
pub struct IndentGuard<'a> {
    stream: &'a mut KernelStream,
}

impl Deref for IndentGuard<'_> {
    type Target = KernelStream;

    fn deref(&self) -> &KernelStream {
        self.stream
    }
}

impl DerefMut for IndentGuard<'_> {
    fn deref_mut(&mut self) -> &mut KernelStream {
        self.stream
    }
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        self.stream.unindent();
    }
}

/// The [`KernelSource`] is a struct containing kernel code
///
/// This struct is not able to read or check the code, it's only purpose is to
/// hold the content of it and eventually manipulate it.
/// All the code checking is done by the device compiler, never through this stage of the
/// program: a wrong kernel is only caught when it's compiled, but templates with tokens which
/// aren't valid code yet can be loaded and completed at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSource {
    content: String,
}

impl KernelSource {
    /// This method creates a kernel source from a string literal.
    ///
    /// # Example
    /// ```
    /// use wgpu_kernelgen::coding::KernelSource;
    ///
    /// let source = KernelSource::from_content("__kernel void noop() {}");
    /// assert_eq!(source.get_content(), "__kernel void noop() {}");
    /// ```
    pub fn from_content(content: &str) -> Self {
        KernelSource {
            content: content.to_string(),
        }
    }

    /// Takes the text assembled in a [`KernelStream`]
    pub fn from_stream(stream: KernelStream) -> Self {
        KernelSource {
            content: stream.into_string(),
        }
    }

    /// This functions reads a template file to the source content.
    ///
    /// # Errors
    /// - if the file is not existent or not readable
    pub fn from_file_path(path_to_module: &str) -> anyhow::Result<Self> {
        let path = Path::new(path_to_module);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading kernel template {}", path.display()))?;

        Ok(KernelSource { content })
    }

    /// This function replaces the `from` string with the `to` string inside the [`KernelSource`]
    ///
    /// It replaces all the instances of the `from` string, so use this with caution, since no check
    /// on correctness of the final code is done in this function.
    ///
    /// # Examples
    /// ```
    /// use wgpu_kernelgen::coding::KernelSource;
    ///
    /// // Notice the €expr token which will be overwritten
    /// let mut source = KernelSource::from_content("y[i] = €expr;");
    /// source.replace("€expr", "(a[i]+b[i])");
    /// assert_eq!(source.get_content(), "y[i] = (a[i]+b[i]);");
    /// ```
    pub fn replace(&mut self, from: &str, to: &str) {
        self.content = self.content.replace(from, to);
    }

    /// This methods gets the content of the [`KernelSource`] as a string reference
    pub fn get_content(&self) -> &str {
        &self.content
    }
}
