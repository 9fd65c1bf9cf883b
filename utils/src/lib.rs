// A set of helper structs for common operations
//
// Austin Shafer - 2020
#[macro_use]
extern crate lazy_static;
extern crate anyhow;

pub mod timing;
#[macro_use]
pub mod logging;
pub mod log;

pub use anyhow::{anyhow, bail, Context, Error, Result};
