//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.

mod map;
mod node;
mod tree;

pub use self::map::{Keys, RedBlackMap, Values};
pub use self::tree::{IntoIter, Iter, PreOrderIter, RedBlackTree, Violation};

use std::error;
use std::fmt;
use std::result;

/// Errors returned by `RedBlackMap`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The key passed to `RedBlackMap::remove` does not exist in the map.
    KeyNotFound,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::KeyNotFound => write!(f, "there is no element with that key"),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
