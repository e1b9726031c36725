//! Text normalization and input validation helpers.

pub mod text;
pub mod validation;
