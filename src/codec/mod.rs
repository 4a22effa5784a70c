//! Stateless conversions between buffers and text.

pub mod hex;
