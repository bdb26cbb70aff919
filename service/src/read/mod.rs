//! Read entities definitions.

pub mod income;
