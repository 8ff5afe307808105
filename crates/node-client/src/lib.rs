mod client;
mod errors;
mod reqwest;
mod types;


pub use client::*;
pub use errors::*;
pub use crate::reqwest::*;
pub use types::*;
