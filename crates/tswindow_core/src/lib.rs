//! # tswindow_core
//!
//! Core types shared by the tswindow crates.
//!
//! This crate provides:
//! - [`Split`] for tagging a partition as train/valid/test
//! - [`BatchShape`] for describing windowed batch tensors
//!
//! ## Shape Convention
//!
//! Windowed batches follow the convention `(B, S, D)`:
//! - `B`: Batch size (number of windows)
//! - `S`: Steps kept per window
//! - `D`: Dimensions (features or targets) per step
//!
//! ## Example
//!
//! ```rust
//! use tswindow_core::{BatchShape, Split};
//!
//! let shape = BatchShape::new(4, 5, 3); // 4 windows, 5 steps, 3 features
//! assert_eq!(shape.dims(), 3);
//! assert_eq!(Split::Valid.partition_name("ett"), "ett_valid");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod shape;
mod split;

pub use shape::BatchShape;
pub use split::Split;
