pub mod assign;
pub mod binary;
pub mod unary;

// Operator evaluation is added to `Interpreter` through `impl` blocks in the
// submodules; `assign` also exports the resolved-place type.
