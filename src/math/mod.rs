//! Numerical core: dense matrices, kernel operations, QR and back substitution.

pub mod kernel;
pub mod matrix;
pub mod qr;
pub mod solve;

pub use kernel::*;
pub use matrix::*;
pub use qr::*;
pub use solve::*;
