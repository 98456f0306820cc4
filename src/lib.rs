mod depth;
mod error;
mod llrb;

pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::llrb::{Iter, Keys, LeftRb, Node, Range, Reverse, Stats};

#[cfg(test)]
mod llrb_test;
