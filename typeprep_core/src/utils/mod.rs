//! Shared utility types for the preprocessing pipeline

mod span;

pub use span::{Position, Span, Spanned};
