//! Core math modules.

pub mod beta;
pub mod conjugate;
pub mod sample;
pub mod stable;
pub mod summary;
