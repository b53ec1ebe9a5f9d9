use crate::red_black_tree::tree::{IntoIter, Iter, PreOrderIter, RedBlackTree};
use crate::red_black_tree::{Error, Result};
use log::debug;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::result;

/// An ordered map implemented using a red black tree.
///
/// A red black tree is a self-balancing binary search tree that colors every node red or black
/// and rebalances with rotations and recolorings so that no path from the root to a leaf is more
/// than twice as long as any other.
///
/// The map keeps its own count of distinct keys. Unlike the tree underneath it, the map is strict
/// about removal: removing a key that is not present is an error.
///
/// # Examples
///
/// ```
/// use red_black_map::red_black_tree::{Error, RedBlackMap};
///
/// let mut map = RedBlackMap::new();
/// map.insert(0, 1);
/// map.insert(3, 4);
///
/// assert_eq!(map[&0], 1);
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.min(), Some(&0));
///
/// map[&0] = 2;
/// assert_eq!(map.remove(&0), Ok(2));
/// assert_eq!(map.remove(&1), Err(Error::KeyNotFound));
/// ```
pub struct RedBlackMap<T, U> {
    tree: RedBlackTree<T, U>,
    len: usize,
}

impl<T, U> RedBlackMap<T, U> {
    /// Constructs a new, empty `RedBlackMap<T, U>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let map: RedBlackMap<u32, u32> = RedBlackMap::new();
    /// ```
    pub fn new() -> Self {
        RedBlackMap {
            tree: RedBlackTree::new(),
            len: 0,
        }
    }

    /// Constructs a new, empty `RedBlackMap<T, U>` whose nodes are allocated `chunk_size` at a
    /// time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let map: RedBlackMap<u32, u32> = RedBlackMap::with_chunk_size(64);
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        RedBlackMap {
            tree: RedBlackTree::with_chunk_size(chunk_size),
            len: 0,
        }
    }

    /// Inserts a key-value pair into the map. If the key already exists in the map, it will replace
    /// and return the old value. Replacing a value does not change the length of the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// assert_eq!(map.insert(1, 1), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.insert(1, 2), Some(1));
    /// assert_eq!(map.get(&1), Some(&2));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: T, value: U) -> Option<U>
    where
        T: Ord,
    {
        let RedBlackMap {
            ref mut tree,
            ref mut len,
        } = self;
        *len += 1;
        tree.insert(key, value).map(|old_value| {
            *len -= 1;
            old_value
        })
    }

    /// Removes a key-value pair from the map and returns the associated value. Returns
    /// `Error::KeyNotFound` if the key does not exist, in which case the map is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::{Error, RedBlackMap};
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.remove(&1), Ok(1));
    /// assert_eq!(map.remove(&1), Err(Error::KeyNotFound));
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> Result<U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.tree.remove(key) {
            Some(value) => {
                self.len -= 1;
                Ok(value)
            },
            None => {
                debug!("attempted to remove a key that is not in the map");
                Err(Error::KeyNotFound)
            },
        }
    }

    /// Checks if a key exists in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn get<V>(&self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns a mutable reference to the value associated with a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// *map.get_mut(&1).unwrap() = 2;
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn get_mut<V>(&mut self, key: &V) -> Option<&mut U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.get_mut(key)
    }

    /// Copies every key-value pair of `other` into the map. Keys that already exist have their
    /// values overwritten. Pairs are visited in the pre-order of `other`'s tree and cloned, so no
    /// node is shared between the two maps.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert("key1", 0);
    /// map.insert("key2", 1);
    ///
    /// let mut other = RedBlackMap::new();
    /// other.insert("key1", 10);
    /// other.insert("key6", 5);
    ///
    /// map.insert_all(&other);
    /// assert_eq!(map.get("key1"), Some(&10));
    /// assert_eq!(map.get("key6"), Some(&5));
    /// assert_eq!(map.len(), 3);
    /// ```
    pub fn insert_all(&mut self, other: &RedBlackMap<T, U>)
    where
        T: Ord + Clone,
        U: Clone,
    {
        for (key, value) in other.tree.pre_order() {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let map: RedBlackMap<u32, u32> = RedBlackMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the map, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.clear();
    /// assert_eq!(map.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing map of {} elements", self.len);
        self.tree.clear();
        self.len = 0;
    }

    /// Returns the minimum key of the map. Returns `None` if the map is empty.
    pub fn min(&self) -> Option<&T> {
        self.tree.min()
    }

    /// Returns the maximum key of the map. Returns `None` if the map is empty.
    pub fn max(&self) -> Option<&T> {
        self.tree.max()
    }

    /// Returns an iterator over the keys of the map in the pre-order of the underlying tree. The
    /// order is not sorted; it matches the order of `values`.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 10);
    /// map.insert(2, 20);
    /// map.insert(3, 30);
    ///
    /// assert_eq!(map.keys().collect::<Vec<&u32>>(), vec![&2, &1, &3]);
    /// ```
    pub fn keys(&self) -> Keys<T, U> {
        Keys {
            inner: self.tree.pre_order(),
        }
    }

    /// Returns an iterator over the values of the map in the pre-order of the underlying tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 10);
    /// map.insert(2, 20);
    /// map.insert(3, 30);
    ///
    /// assert_eq!(map.values().collect::<Vec<&u32>>(), vec![&20, &10, &30]);
    /// ```
    pub fn values(&self) -> Values<T, U> {
        Values {
            inner: self.tree.pre_order(),
        }
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use red_black_map::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(2, 2);
    /// map.insert(1, 1);
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&2, &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<T, U> {
        self.tree.iter()
    }

    /// Returns the tree backing the map.
    pub fn as_tree(&self) -> &RedBlackTree<T, U> {
        &self.tree
    }
}

/// An iterator over the keys of a `RedBlackMap<T, U>` in pre-order.
pub struct Keys<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    inner: PreOrderIter<'a, T, U>,
}

impl<'a, T, U> Iterator for Keys<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// An iterator over the values of a `RedBlackMap<T, U>` in pre-order.
pub struct Values<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    inner: PreOrderIter<'a, T, U>,
}

impl<'a, T, U> Iterator for Values<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    type Item = &'a U;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

impl<T, U> IntoIterator for RedBlackMap<T, U> {
    type IntoIter = IntoIter<T, U>;
    type Item = (T, U);

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, T, U> IntoIterator for &'a RedBlackMap<T, U>
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

impl<T, U> Default for RedBlackMap<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, U> Extend<(T, U)> for RedBlackMap<T, U>
where
    T: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (T, U)>,
    {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<T, U> FromIterator<(T, U)> for RedBlackMap<T, U>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
    {
        let mut map = RedBlackMap::new();
        map.extend(iter);
        map
    }
}

impl<T, U> PartialEq for RedBlackMap<T, U>
where
    T: PartialEq,
    U: PartialEq,
{
    fn eq(&self, other: &RedBlackMap<T, U>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T, U> Eq for RedBlackMap<T, U>
where
    T: Eq,
    U: Eq,
{
}

impl<T, U> fmt::Debug for RedBlackMap<T, U>
where
    T: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

impl<'a, T, U, V> Index<&'a V> for RedBlackMap<T, U>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    type Output = U;

    fn index(&self, key: &V) -> &Self::Output {
        self.get(key).expect("Error: key does not exist.")
    }
}

impl<'a, T, U, V> IndexMut<&'a V> for RedBlackMap<T, U>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    fn index_mut(&mut self, key: &V) -> &mut Self::Output {
        self.get_mut(key).expect("Error: key does not exist.")
    }
}

impl<T, U> Serialize for RedBlackMap<T, U>
where
    T: Serialize,
    U: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct RedBlackMapVisitor<T, U> {
    marker: PhantomData<RedBlackMap<T, U>>,
}

impl<'de, T, U> Visitor<'de> for RedBlackMapVisitor<T, U>
where
    T: Deserialize<'de> + Ord,
    U: Deserialize<'de>,
{
    type Value = RedBlackMap<T, U>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = RedBlackMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, T, U> Deserialize<'de> for RedBlackMap<T, U>
where
    T: Deserialize<'de> + Ord,
    U: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RedBlackMapVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RedBlackMap;
    use crate::red_black_tree::Error;
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    fn sample_map() -> RedBlackMap<&'static str, u32> {
        let mut map = RedBlackMap::new();
        map.insert("key1", 0);
        map.insert("key2", 1);
        map.insert("key3", 2);
        map.insert("key4", 3);
        map.insert("key5", 4);
        map
    }

    #[test]
    fn test_len_empty() {
        let map: RedBlackMap<u32, u32> = RedBlackMap::new();
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_is_empty() {
        let map: RedBlackMap<u32, u32> = RedBlackMap::new();
        assert!(map.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let map: RedBlackMap<u32, u32> = RedBlackMap::new();
        assert_eq!(map.min(), None);
        assert_eq!(map.max(), None);
    }

    #[test]
    fn test_insert() {
        let mut map = RedBlackMap::new();
        assert_eq!(map.insert(1, 1), None);
        assert!(map.contains_key(&1));
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn test_insert_replace() {
        let mut map = RedBlackMap::new();
        assert_eq!(map.insert(1, 1), None);
        assert_eq!(map.insert(1, 3), Some(1));
        assert_eq!(map.get(&1), Some(&3));
    }

    #[test]
    fn test_insert_replace_keeps_len() {
        let mut map = RedBlackMap::new();
        map.insert(1, 1);
        map.insert(1, 2);
        map.insert(1, 3);
        assert_eq!(map.len(), 1);
        assert_eq!(map.as_tree().len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut map = RedBlackMap::new();
        map.insert(1, 1);
        assert_eq!(map.remove(&1), Ok(1));
        assert!(!map.contains_key(&1));
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_missing() {
        let mut map = RedBlackMap::new();
        map.insert(1, 1);
        map.insert(2, 2);
        let keys: Vec<u32> = map.keys().cloned().collect();

        assert_eq!(map.remove(&3), Err(Error::KeyNotFound));
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().cloned().collect::<Vec<u32>>(), keys);
    }

    #[test]
    fn test_len() {
        let mut map = sample_map();
        assert_eq!(map.len(), 5);

        map.remove("key1").unwrap();
        map.remove("key2").unwrap();
        map.remove("key3").unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut map = sample_map();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.get("key1"), None);
    }

    #[test]
    fn test_keys_values_line_up() {
        let map = sample_map();
        let keys: Vec<&&str> = map.keys().collect();
        let values: Vec<&u32> = map.values().collect();

        assert_eq!(keys.len(), 5);
        for (key, value) in keys.iter().zip(values) {
            assert_eq!(map.get(**key), Some(value));
        }
    }

    #[test]
    fn test_insert_all() {
        let mut map = sample_map();
        let mut other = RedBlackMap::new();
        other.insert("key1", 10);
        other.insert("key6", 5);

        map.insert_all(&other);
        assert_eq!(map.get("key1"), Some(&10));
        assert_eq!(map.get("key6"), Some(&5));
        assert_eq!(map.len(), 6);
        assert_eq!(other.len(), 2);
        assert!(map.as_tree().check_invariants().is_ok());
    }

    #[test]
    fn test_get_mut() {
        let mut map = RedBlackMap::new();
        map.insert(1, 1);
        {
            let value = map.get_mut(&1);
            *value.unwrap() = 3;
        }
        assert_eq!(map.get(&1), Some(&3));
    }

    #[test]
    fn test_index() {
        let mut map = RedBlackMap::new();
        map.insert(1, 1);
        map[&1] += 1;
        assert_eq!(map[&1], 2);
    }

    #[test]
    #[should_panic]
    fn test_index_missing() {
        let map: RedBlackMap<u32, u32> = RedBlackMap::new();
        let _value = map[&1];
    }

    #[test]
    fn test_iter() {
        let mut map = RedBlackMap::new();
        map.insert(1, 2);
        map.insert(5, 6);
        map.insert(3, 4);

        assert_eq!(
            map.iter().collect::<Vec<(&u32, &u32)>>(),
            vec![(&1, &2), (&3, &4), (&5, &6)],
        );
    }

    #[test]
    fn test_into_iter() {
        let mut map = RedBlackMap::new();
        map.insert(1, 2);
        map.insert(5, 6);
        map.insert(3, 4);

        assert_eq!(
            map.into_iter().collect::<Vec<(u32, u32)>>(),
            vec![(1, 2), (3, 4), (5, 6)],
        );
    }

    #[test]
    fn test_from_iter_and_eq() {
        let map: RedBlackMap<u32, u32> = vec![(3, 3), (1, 1), (2, 2), (1, 4)].into_iter().collect();
        let mut expected = RedBlackMap::new();
        expected.insert(1, 4);
        expected.insert(2, 2);
        expected.insert(3, 3);

        assert_eq!(map.len(), 3);
        assert_eq!(map, expected);
    }

    #[test]
    fn test_debug() {
        let mut map = RedBlackMap::new();
        map.insert(2, "b");
        map.insert(1, "a");
        assert_eq!(format!("{:?}", map), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn test_serde_tokens() {
        let mut map: RedBlackMap<u32, u32> = RedBlackMap::new();
        map.insert(3, 4);
        map.insert(1, 2);

        assert_tokens(
            &map,
            &[
                Token::Map { len: Some(2) },
                Token::U32(1),
                Token::U32(2),
                Token::U32(3),
                Token::U32(4),
                Token::MapEnd,
            ],
        );
    }

    #[test]
    fn test_deserialize_duplicate_keys() {
        let mut map: RedBlackMap<u32, u32> = RedBlackMap::new();
        map.insert(1, 3);

        assert_de_tokens(
            &map,
            &[
                Token::Map { len: Some(2) },
                Token::U32(1),
                Token::U32(2),
                Token::U32(1),
                Token::U32(3),
                Token::MapEnd,
            ],
        );
    }
}
