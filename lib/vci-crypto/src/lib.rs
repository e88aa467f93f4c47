pub mod hasher;
pub mod utilities;

pub use hasher::{Hasher, HasherError};
