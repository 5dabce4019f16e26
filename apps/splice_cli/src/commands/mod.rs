pub mod assemble;
pub mod probe;
