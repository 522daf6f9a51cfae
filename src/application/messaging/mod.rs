//! Message handling - Text-to-invocation parsing for line-based adapters

pub mod parser;

pub use parser::InvocationParser;
