/*!
This crate generates the source code of fused compute kernels from linear algebra expressions.

An expression arrives as a [`statement::Statement`]: a small DAG of operation nodes whose leaves
point to typed device objects (scalars, vectors, matrices, in float or double precision).
A mapping pass, run by the caller, names every leaf in a [`mapping::MappingTable`].
From these two, [`codegen::generate_expression`] walks the statement and writes one fully
parenthesized expression, ready to be spliced into a kernel body assembled with a
[`coding::KernelStream`].

The generation is a pure function: identical inputs always give identical text, nothing is
cached and nothing is shared between calls, so different statements can be generated on
different threads at the same time. Any unsupported operator or type, or any leaf the mapping
doesn't cover, fails the whole expression with a [`errors::GeneratorError`]; the caller is then
expected to fall back to a non fused execution path.

The kernel template, the allocation of the device buffers and the compilation of the final
source are not part of this crate. The objects it exposes to the kernel argument binding step
(buffer descriptors, padded sizes, memory handles) are based on [`wgpu`].

```
use wgpu_kernelgen::codegen::generate_expression;
use wgpu_kernelgen::config::ExpressionFormat;
use wgpu_kernelgen::mapping::{MappedObject, MappingTable};
use wgpu_kernelgen::statement::{Leaf, OperationKind, StatementBuilder};
use wgpu_kernelgen::traverse::Role;

let mut builder = StatementBuilder::new();
let sum = builder.binary(OperationKind::Add, Leaf::host_scalar(1.0f32), Leaf::host_scalar(2.0f32));
let root = builder.binary(OperationKind::Mult, sum, Leaf::host_scalar(3.0f32));
let statement = builder.build();

let mapping: MappingTable = [
    ((sum, Role::Lhs), MappedObject::symbol("a")),
    ((sum, Role::Rhs), MappedObject::symbol("b")),
    ((root, Role::Rhs), MappedObject::symbol("c")),
]
.into_iter()
.collect();

let text = generate_expression(&statement, root, &mapping, &ExpressionFormat::default()).unwrap();
assert_eq!(text, "((a+b)*c)");
```
*/

pub mod codegen;
pub mod coding;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod mapping;
pub mod operators;
pub mod statement;
pub mod translator;
pub mod traverse;
pub mod variable;

pub use errors::{GeneratorError, Result};

#[cfg(test)]
mod tests;
