use crate::arena::{Handle, TypedArena, DEFAULT_CHUNK_SIZE};
use crate::red_black_tree::node::{Color, Node, Side};
use log::trace;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::error;
use std::fmt;
use std::mem;

/// A property of a red black tree that `RedBlackTree::check_invariants` found broken.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Violation {
    /// The root is red.
    RedRoot,
    /// A red node has a red child.
    RedChildOfRed,
    /// Two paths from the same node to a nil child cross a different number of black nodes.
    BlackHeightMismatch,
    /// A node's parent handle does not point at the node holding it as a child.
    StaleParent,
    /// The in-order key sequence is not strictly increasing.
    OutOfOrder,
    /// The recorded node count differs from the number of reachable nodes.
    LenMismatch { recorded: usize, reachable: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Violation::RedRoot => write!(f, "root is red"),
            Violation::RedChildOfRed => write!(f, "red node has a red child"),
            Violation::BlackHeightMismatch => write!(f, "black height differs between paths"),
            Violation::StaleParent => write!(f, "parent link does not match child link"),
            Violation::OutOfOrder => write!(f, "keys are not in increasing order"),
            Violation::LenMismatch {
                recorded,
                reachable,
            } => write!(f, "recorded {} nodes but {} are reachable", recorded, reachable),
        }
    }
}

impl error::Error for Violation {}

/// A red black tree whose nodes live in an arena and link to each other through handles.
///
/// The tree maintains the standard red black properties after every insertion and removal:
/// the root is black, a red node never has a red child, and every path from a node to a nil child
/// crosses the same number of black nodes. Consequently, the height of the tree is logarithmic in
/// the number of nodes and `insert`, `remove`, and `get` all run in `O(log N)`.
///
/// # Examples
///
/// ```
/// use red_black_map::red_black_tree::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// tree.insert(10, "a");
/// tree.insert(20, "b");
/// tree.insert(30, "c");
///
/// assert_eq!(tree.get(&20), Some(&"b"));
/// assert_eq!(tree.pre_order().map(|(key, _)| *key).collect::<Vec<u32>>(), vec![20, 10, 30]);
///
/// assert_eq!(tree.remove(&20), Some("b"));
/// assert_eq!(tree.remove(&20), None);
/// assert!(tree.check_invariants().is_ok());
/// ```
pub struct RedBlackTree<T, U> {
    arena: TypedArena<Node<T, U>>,
    root: Option<Handle>,
    len: usize,
}

impl<T, U> RedBlackTree<T, U> {
    /// Constructs a new, empty `RedBlackTree<T, U>`.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `RedBlackTree<T, U>` whose nodes are allocated `chunk_size` at a
    /// time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        RedBlackTree {
            arena: TypedArena::new(chunk_size),
            root: None,
            len: 0,
        }
    }

    fn is_red(&self, handle: Option<Handle>) -> bool {
        match handle {
            None => false,
            Some(handle) => self.arena[handle].color == Color::Red,
        }
    }

    fn set_color(&mut self, handle: Handle, color: Color) {
        self.arena[handle].color = color;
    }

    fn side_of(&self, child: Handle, parent: Handle) -> Side {
        if self.arena[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    // Puts `new` in the slot of `parent` that currently holds `old`, or at the root if `parent` is
    // `None`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(old, parent);
                self.arena[parent].set_child(side, new);
            },
        }
        if let Some(new) = new {
            self.arena[new].parent = parent;
        }
    }

    fn rotate_left(&mut self, handle: Handle) {
        trace!("rotating left at {:?}", handle);
        let pivot = self.arena[handle]
            .right
            .expect("Expected right child node to be `Some`.");
        let inner = self.arena[pivot].left;
        self.arena[handle].right = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }

        let parent = self.arena[handle].parent;
        self.replace_child(parent, handle, Some(pivot));
        self.arena[pivot].left = Some(handle);
        self.arena[handle].parent = Some(pivot);
    }

    fn rotate_right(&mut self, handle: Handle) {
        trace!("rotating right at {:?}", handle);
        let pivot = self.arena[handle]
            .left
            .expect("Expected left child node to be `Some`.");
        let inner = self.arena[pivot].right;
        self.arena[handle].left = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }

        let parent = self.arena[handle].parent;
        self.replace_child(parent, handle, Some(pivot));
        self.arena[pivot].right = Some(handle);
        self.arena[handle].parent = Some(pivot);
    }

    // Rotates so that `handle` moves down into its `side` child slot.
    fn rotate(&mut self, handle: Handle, side: Side) {
        match side {
            Side::Left => self.rotate_left(handle),
            Side::Right => self.rotate_right(handle),
        }
    }

    fn insert_fixup(&mut self, mut handle: Handle) {
        loop {
            let parent = match self.arena[handle].parent {
                Some(parent) => parent,
                None => {
                    self.set_color(handle, Color::Black);
                    return;
                },
            };
            if !self.is_red(Some(parent)) {
                return;
            }

            // a red node is never the root, so the grandparent exists
            let grandparent = self.arena[parent]
                .parent
                .expect("Expected red node to have a parent.");
            let parent_side = self.side_of(parent, grandparent);
            let uncle = self.arena[grandparent].child(parent_side.opposite());

            if let Some(uncle) = uncle.filter(|uncle| self.is_red(Some(*uncle))) {
                trace!("insert fixup: recoloring below {:?}", grandparent);
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                handle = grandparent;
                continue;
            }

            let mut parent = parent;
            if self.side_of(handle, parent) != parent_side {
                trace!("insert fixup: straightening zig-zag at {:?}", parent);
                self.rotate(parent, parent_side);
                handle = parent;
                parent = self.arena[handle]
                    .parent
                    .expect("Expected rotated node to have a parent.");
            }

            trace!("insert fixup: rotating at {:?}", grandparent);
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, parent_side.opposite());
            return;
        }
    }

    fn remove_fixup(&mut self, mut handle: Handle) {
        while Some(handle) != self.root && !self.is_red(Some(handle)) {
            let parent = self.arena[handle]
                .parent
                .expect("Expected non-root node to have a parent.");
            let side = self.side_of(handle, parent);
            let mut sibling = self.arena[parent]
                .child(side.opposite())
                .expect("Expected doubly black node to have a sibling.");

            if self.is_red(Some(sibling)) {
                trace!("remove fixup: rotating red sibling {:?}", sibling);
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.arena[parent]
                    .child(side.opposite())
                    .expect("Expected doubly black node to have a sibling.");
            }

            let near = self.arena[sibling].child(side);
            let far = self.arena[sibling].child(side.opposite());
            if !self.is_red(near) && !self.is_red(far) {
                trace!("remove fixup: pushing deficiency up to {:?}", parent);
                self.set_color(sibling, Color::Red);
                handle = parent;
                continue;
            }

            if !self.is_red(far) {
                trace!("remove fixup: rotating near nephew of {:?}", handle);
                let near = near.expect("Expected red nephew to be `Some`.");
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = self.arena[parent]
                    .child(side.opposite())
                    .expect("Expected doubly black node to have a sibling.");
            }

            trace!("remove fixup: rotating at {:?}", parent);
            let parent_color = self.arena[parent].color;
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            if let Some(far) = self.arena[sibling].child(side.opposite()) {
                self.set_color(far, Color::Black);
            }
            self.rotate(parent, side);
            handle = self.root.expect("Expected non-empty tree.");
        }
        self.set_color(handle, Color::Black);
    }

    fn find<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    fn max_handle(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.arena[handle].right {
            handle = right;
        }
        handle
    }

    fn min_handle(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.arena[handle].left {
            handle = left;
        }
        handle
    }

    /// Inserts a key-value pair into the tree. If the key already exists, its value is replaced in
    /// place and the old value is returned; the shape and colors of the tree are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert_eq!(tree.insert(1, 1), None);
    /// assert_eq!(tree.insert(1, 2), Some(1));
    /// assert_eq!(tree.get(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: T, value: U) -> Option<U>
    where
        T: Ord,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &mut self.arena[handle];
            match key.cmp(&node.entry.key) {
                Ordering::Less => {
                    side = Side::Left;
                    curr = node.left;
                },
                Ordering::Greater => {
                    side = Side::Right;
                    curr = node.right;
                },
                Ordering::Equal => return Some(mem::replace(&mut node.entry.value, value)),
            }
            parent = Some(handle);
        }

        let handle = self.arena.allocate(Node::new(key, value, parent));
        match parent {
            None => self.root = Some(handle),
            Some(parent) => self.arena[parent].set_child(side, Some(handle)),
        }
        self.len += 1;
        self.insert_fixup(handle);
        None
    }

    /// Removes a key from the tree and returns its value. Removing a key that does not exist is a
    /// no-op that returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, 1);
    /// assert_eq!(tree.remove(&1), Some(1));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> Option<U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let target = self.find(key)?;

        // a node with two children trades places with its in-order predecessor, which has at most
        // one child
        let removed = match (self.arena[target].left, self.arena[target].right) {
            (Some(left), Some(_)) => self.max_handle(left),
            _ => target,
        };

        let is_black = !self.is_red(Some(removed));
        let child = {
            let node = &self.arena[removed];
            node.left.or(node.right)
        };
        match child {
            Some(child) => {
                let parent = self.arena[removed].parent;
                self.replace_child(parent, removed, Some(child));
                if is_black {
                    self.remove_fixup(child);
                }
            },
            None if self.root == Some(removed) => self.root = None,
            None => {
                if is_black {
                    self.remove_fixup(removed);
                }
                // the fixup may have rotated `removed` under a different parent
                let parent = self.arena[removed].parent;
                self.replace_child(parent, removed, None);
            },
        }

        let mut node = self.arena.free(removed);
        if removed != target {
            mem::swap(&mut self.arena[target].entry, &mut node.entry);
        }
        self.len -= 1;
        Some(node.entry.value)
    }

    /// Returns an immutable reference to the value associated with a particular key, or `None` if
    /// the key does not exist in the tree.
    pub fn get<V>(&self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.find(key).map(|handle| &self.arena[handle].entry.value)
    }

    /// Returns a mutable reference to the value associated with a particular key, or `None` if
    /// the key does not exist in the tree.
    pub fn get_mut<V>(&mut self, key: &V) -> Option<&mut U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.find(key) {
            Some(handle) => Some(&mut self.arena[handle].entry.value),
            None => None,
        }
    }

    /// Checks if a key exists in the tree.
    pub fn contains_key<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every node in the tree.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the minimum key of the tree, or `None` if the tree is empty.
    pub fn min(&self) -> Option<&T> {
        self.root
            .map(|root| &self.arena[self.min_handle(root)].entry.key)
    }

    /// Returns the maximum key of the tree, or `None` if the tree is empty.
    pub fn max(&self) -> Option<&T> {
        self.root
            .map(|root| &self.arena[self.max_handle(root)].entry.key)
    }

    /// Returns an iterator that walks the tree in pre-order: a node, then its left subtree, then
    /// its right subtree. The sequence depends on the shape of the tree and is not sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// for key in 1..=4 {
    ///     tree.insert(key, ());
    /// }
    ///
    /// let keys: Vec<&u32> = tree.pre_order().map(|(key, _)| key).collect();
    /// assert_eq!(keys, vec![&2, &1, &3, &4]);
    /// ```
    pub fn pre_order(&self) -> PreOrderIter<T, U> {
        PreOrderIter {
            arena: &self.arena,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Returns an iterator that yields key-value pairs in increasing key order.
    pub fn iter(&self) -> Iter<T, U> {
        Iter {
            arena: &self.arena,
            current: self.root,
            stack: Vec::new(),
        }
    }

    /// Walks the whole tree and verifies the red black properties, the consistency of parent
    /// links, the ordering of keys, and the node count. Returns the number of black nodes on every
    /// path from the root to a nil child.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert_eq!(tree.check_invariants(), Ok(0));
    /// tree.insert(1, ());
    /// assert_eq!(tree.check_invariants(), Ok(1));
    /// ```
    pub fn check_invariants(&self) -> Result<usize, Violation>
    where
        T: Ord,
    {
        if self.is_red(self.root) {
            return Err(Violation::RedRoot);
        }

        let mut reachable = 0;
        let black_height = self.check_subtree(self.root, None, &mut reachable)?;
        if reachable != self.len || self.arena.len() != self.len {
            return Err(Violation::LenMismatch {
                recorded: self.len,
                reachable,
            });
        }

        let keys: Vec<&T> = self.iter().map(|(key, _)| key).collect();
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Violation::OutOfOrder);
        }

        Ok(black_height)
    }

    fn check_subtree(
        &self,
        handle: Option<Handle>,
        parent: Option<Handle>,
        reachable: &mut usize,
    ) -> Result<usize, Violation> {
        let handle = match handle {
            Some(handle) => handle,
            None => return Ok(0),
        };
        let node = &self.arena[handle];
        *reachable += 1;

        if node.parent != parent {
            return Err(Violation::StaleParent);
        }
        if node.color == Color::Red && (self.is_red(node.left) || self.is_red(node.right)) {
            return Err(Violation::RedChildOfRed);
        }

        let left_height = self.check_subtree(node.left, Some(handle), reachable)?;
        let right_height = self.check_subtree(node.right, Some(handle), reachable)?;
        if left_height != right_height {
            return Err(Violation::BlackHeightMismatch);
        }

        match node.color {
            Color::Black => Ok(left_height + 1),
            Color::Red => Ok(left_height),
        }
    }
}

impl<T, U> Default for RedBlackTree<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, U> fmt::Debug for RedBlackTree<T, U>
where
    T: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T, U> IntoIterator for RedBlackTree<T, U> {
    type IntoIter = IntoIter<T, U>;
    type Item = (T, U);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            arena: self.arena,
            current: self.root,
            stack: Vec::new(),
        }
    }
}

impl<'a, T, U> IntoIterator for &'a RedBlackTree<T, U>
where
    T: 'a,
    U: 'a,
{
    type IntoIter = Iter<'a, T, U>;
    type Item = (&'a T, &'a U);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A pre-order iterator for `RedBlackTree<T, U>`.
///
/// This iterator yields a node before its left subtree and its left subtree before its right
/// subtree.
pub struct PreOrderIter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    arena: &'a TypedArena<Node<T, U>>,
    stack: Vec<Handle>,
}

impl<'a, T, U> Iterator for PreOrderIter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    type Item = (&'a T, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        self.stack.pop().map(|handle| {
            let node = &arena[handle];
            self.stack.extend(node.right);
            self.stack.extend(node.left);
            node.entry.as_pair()
        })
    }
}

/// An iterator for `RedBlackTree<T, U>`.
///
/// This iterator traverses the elements of the tree in-order and yields immutable references.
pub struct Iter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    arena: &'a TypedArena<Node<T, U>>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<'a, T, U> Iterator for Iter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    type Item = (&'a T, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = arena[handle].left;
        }
        self.stack.pop().map(|handle| {
            let node = &arena[handle];
            self.current = node.right;
            node.entry.as_pair()
        })
    }
}

/// An owning iterator for `RedBlackTree<T, U>`.
///
/// This iterator traverses the elements of the tree in-order and yields owned entries.
pub struct IntoIter<T, U> {
    arena: TypedArena<Node<T, U>>,
    current: Option<Handle>,
    stack: Vec<Handle>,
}

impl<T, U> Iterator for IntoIter<T, U> {
    type Item = (T, U);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.current {
            self.stack.push(handle);
            self.current = self.arena[handle].left;
        }
        self.stack.pop().map(|handle| {
            // the left subtree is already freed, the right one is still linked
            let node = self.arena.free(handle);
            self.current = node.right;
            node.entry.into_pair()
        })
    }
}
