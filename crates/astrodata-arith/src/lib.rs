#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod binary;
pub mod broadcast;
pub mod dataset;
pub mod dtype;
pub mod error;
pub mod operator;
pub mod select;
pub mod unary;

pub use binary::apply_binary;
pub use dataset::{ArrayStore, Dataset};
pub use dtype::DataType;
pub use error::{Error, Result};
pub use operator::{Flags, Operator};
pub use select::apply_where;
pub use unary::apply_unary;

#[cfg(feature = "array")]
pub mod ndarray_compat;
