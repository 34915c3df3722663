#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod scalar;
pub use scalar::*;

mod def;
pub use def::*;

mod vtable;
pub use vtable::*;

mod shape;
pub use shape::*;

mod value;
pub use value::*;

mod type_pair;
pub use type_pair::*;

mod error;
pub use error::*;
