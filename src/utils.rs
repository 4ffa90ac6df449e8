//! Numeric helpers shared by the dispatcher and the backends.

pub mod safe_cast;

pub use safe_cast::{f64_to_i32_trunc, i32_to_i16_clamp, i32_to_u32};
