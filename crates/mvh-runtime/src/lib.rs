#![forbid(unsafe_code)]

//! Runtime: the observable viewport-unit cell and the resize synchronizer.

pub mod reactive;
pub mod viewport;
