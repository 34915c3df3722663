#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use shapemap_core::*;

mod error;
pub use error::*;

mod classify;
pub use classify::*;

mod filler;
pub use filler::*;

mod context;
pub use context::*;

mod collab;
pub use collab::*;

mod plan;
pub use plan::*;

mod cache;
pub use cache::*;

mod mapper;
pub use mapper::*;
