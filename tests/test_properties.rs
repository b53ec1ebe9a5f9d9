use proptest::collection::vec;
use proptest::prelude::*;
use red_black_map::red_black_tree::{Error, RedBlackMap, RedBlackTree};
use std::collections::BTreeMap;

proptest! {
    #[test]
    fn insert_keeps_invariants(keys in vec(any::<u16>(), 0..200)) {
        let mut tree = RedBlackTree::new();
        for key in keys {
            tree.insert(key, ());
            prop_assert!(tree.check_invariants().is_ok());
        }
    }

    #[test]
    fn removed_keys_are_absent(
        keys in vec(0u16..500, 0..200),
        removals in vec(0u16..500, 0..200),
    ) {
        let mut map = RedBlackMap::new();
        let mut expected = BTreeMap::new();
        for key in keys {
            map.insert(key, u32::from(key));
            expected.insert(key, u32::from(key));
        }

        for key in removals {
            prop_assert_eq!(map.remove(&key), expected.remove(&key).ok_or(Error::KeyNotFound));
            prop_assert_eq!(map.get(&key), None);
            prop_assert_eq!(map.len(), expected.len());
            prop_assert!(map.as_tree().check_invariants().is_ok());
        }
    }

    #[test]
    fn last_write_wins(pairs in vec((0u8..50, any::<u32>()), 0..300)) {
        let mut map = RedBlackMap::new();
        let mut expected = BTreeMap::new();
        for (key, val) in pairs {
            prop_assert_eq!(map.insert(key, val), expected.insert(key, val));
        }

        prop_assert_eq!(map.len(), expected.len());
        for (key, val) in &expected {
            prop_assert_eq!(map.get(key), Some(val));
        }
    }

    #[test]
    fn keys_and_values_cover_contents(pairs in vec((any::<i32>(), any::<i32>()), 0..200)) {
        let map: RedBlackMap<i32, i32> = pairs.iter().cloned().collect();
        let expected: BTreeMap<i32, i32> = pairs.into_iter().collect();

        let mut keys: Vec<i32> = map.keys().cloned().collect();
        keys.sort();
        prop_assert_eq!(keys, expected.keys().cloned().collect::<Vec<i32>>());

        for (key, val) in map.keys().zip(map.values()) {
            prop_assert_eq!(expected.get(key), Some(val));
        }
    }

    #[test]
    fn insert_all_merges(
        left in vec((0u8..100, any::<u8>()), 0..100),
        right in vec((0u8..100, any::<u8>()), 0..100),
    ) {
        let mut map: RedBlackMap<u8, u8> = left.iter().cloned().collect();
        let other: RedBlackMap<u8, u8> = right.iter().cloned().collect();
        let mut expected: BTreeMap<u8, u8> = left.into_iter().collect();
        expected.extend(right);

        map.insert_all(&other);
        prop_assert_eq!(map.len(), expected.len());
        prop_assert!(map.iter().eq(expected.iter()));
        prop_assert!(map.as_tree().check_invariants().is_ok());
    }
}
