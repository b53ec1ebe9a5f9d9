//! An ordered map backed by a red black tree.
//!
//! The tree keeps its nodes in a [`TypedArena`](arena/struct.TypedArena.html) and links them with
//! copyable handles, so every node can point back at its parent without reference counting or
//! unsafe code.
//!
//! # Examples
//!
//! ```
//! use red_black_map::red_black_tree::RedBlackMap;
//!
//! let mut map = RedBlackMap::new();
//! map.insert("b", 2);
//! map.insert("a", 1);
//!
//! assert_eq!(map.get("a"), Some(&1));
//! assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&"a", &1), (&"b", &2)]);
//! assert!(map.remove("c").is_err());
//! ```

mod entry;
pub mod arena;
pub mod red_black_tree;
