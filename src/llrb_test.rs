use std::ops::Bound;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::prelude::random;
use rand::seq::SliceRandom;
use rand::{rngs::SmallRng, SeedableRng};

use crate::error::Error;
use crate::llrb::LeftRb;

#[test]
fn test_id() {
    let tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    assert_eq!(tree.id(), "test-leftrb".to_string());
}

#[test]
fn test_len() {
    let tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    assert_eq!(tree.len(), 0);
    assert!(tree.is_empty());
}

#[test]
fn test_empty_tree() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");

    assert_eq!(tree.min(), Err(Error::EmptyTree));
    assert_eq!(tree.max(), Err(Error::EmptyTree));
    assert_eq!(tree.delete_min(), Err(Error::EmptyTree));
    assert_eq!(tree.delete_max(), Err(Error::EmptyTree));
    assert_eq!(tree.select(0), Err(Error::IndexOutOfRange(0, 0)));

    assert_eq!(tree.get(&10), None);
    assert_eq!(tree.floor(&10), None);
    assert_eq!(tree.ceiling(&10), None);
    assert_eq!(tree.delete(&10), None);
    assert_eq!(tree.rank(&10), 0);
    assert_eq!(tree.height(), 0);
    assert!(tree.iter().next().is_none());
}

#[test]
fn test_create() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    let mut refns = RefNodes::new(10);

    for key in [2, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        assert!(tree.create(*key, 10).is_ok());
        refns.create(*key, 10);
    }

    assert_eq!(tree.len(), 10);
    assert!(tree.validate().is_ok());
    assert!(tree.root_is_black());

    // error case
    assert_eq!(tree.create(7, 20), Err(Error::OverwriteKey));
    assert_eq!(tree.get(&7), Some(10));
    assert_eq!(tree.len(), 10);

    // test get
    for i in 0..10 {
        let val = tree.get(&i);
        let refval = refns.get(i);
        assert_eq!(val, refval);
    }
    // test iter
    let (mut iter, mut iter_ref) = (tree.iter(), refns.iter());
    loop {
        match (iter.next(), iter_ref.next()) {
            (Some(item), Some(ref_item)) => {
                assert_eq!(item.0, ref_item.0);
                assert_eq!(item.1, ref_item.1);
            }
            (None, None) => break,
            (_, _) => panic!("invalid"),
        }
    }
}

#[test]
fn test_set() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    let mut refns = RefNodes::new(10);

    for key in [2, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        assert!(tree.set(*key, 10).is_none());
        refns.set(*key, 10);
        assert!(tree.root_is_black());
    }

    assert_eq!(tree.len(), 10);
    assert!(tree.validate().is_ok());

    // replace value in place, size must not change.
    assert_eq!(tree.set(5, 20), Some(10));
    assert_eq!(tree.get(&5), Some(20));
    assert_eq!(tree.len(), 10);
    refns.set(5, 20);

    // test get
    for i in 0..10 {
        let val = tree.get(&i);
        let refval = refns.get(i);
        assert_eq!(val, refval);
    }
    // test iter
    let (mut iter, mut iter_ref) = (tree.iter(), refns.iter());
    loop {
        match (iter.next(), iter_ref.next()) {
            (Some(item), Some(ref_item)) => {
                assert_eq!(item.0, ref_item.0);
                assert_eq!(item.1, ref_item.1);
            }
            (None, None) => break,
            (_, _) => panic!("invalid"),
        }
    }
}

#[test]
fn test_delete() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    let mut refns = RefNodes::new(11);

    for key in [2, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        assert!(tree.set(*key, 100).is_none());
        refns.set(*key, 100);
    }

    // delete a missing node.
    assert!(tree.delete(&10).is_none());
    assert!(refns.delete(10).is_none());

    assert_eq!(tree.len(), 10);
    assert!(tree.validate().is_ok());

    // test iter
    {
        let (mut iter, mut iter_ref) = (tree.iter(), refns.iter());
        loop {
            match (iter.next(), iter_ref.next()) {
                (Some(item), Some(ref_item)) => {
                    assert_eq!(item.0, ref_item.0);
                    assert_eq!(item.1, ref_item.1);
                }
                (None, None) => break,
                (_, _) => panic!("invalid"),
            }
        }
    }

    // delete all entries.
    for i in 0..10 {
        let val = tree.delete(&i);
        let refval = refns.delete(i);
        assert_eq!(val, refval);
        assert!(tree.validate().is_ok());
        assert!(tree.root_is_black());
    }
    assert_eq!(tree.len(), 0);
    // test iter
    assert!(tree.iter().next().is_none());
}

#[test]
fn test_delete_min() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    for key in [2, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        tree.set(*key, *key * 10);
    }

    for i in 0..10 {
        assert_eq!(tree.delete_min(), Ok((i, i * 10)));
        assert_eq!(tree.len(), (9 - i) as usize);
        assert!(tree.validate().is_ok());
        assert!(tree.root_is_black());
    }
    assert_eq!(tree.delete_min(), Err(Error::EmptyTree));
}

#[test]
fn test_delete_max() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    for key in [2, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        tree.set(*key, *key * 10);
    }

    for i in (0..10).rev() {
        assert_eq!(tree.delete_max(), Ok((i, i * 10)));
        assert_eq!(tree.len(), i as usize);
        assert!(tree.validate().is_ok());
        assert!(tree.root_is_black());
    }
    assert_eq!(tree.delete_max(), Err(Error::EmptyTree));
}

#[test]
fn test_min_max() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    for key in [5, 1, 3, 6].iter() {
        tree.set(*key, *key);
    }
    assert_eq!(tree.min(), Ok((1, 1)));
    assert_eq!(tree.max(), Ok((6, 6)));
}

#[test]
fn test_floor_ceiling() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    let mut refns = RefNodes::new(100);
    for key in [10, 30, 50, 70, 90].iter() {
        tree.set(*key, *key * 2);
        refns.set(*key, *key * 2);
    }

    // below the smallest key and above the largest key.
    assert_eq!(tree.floor(&9), None);
    assert_eq!(tree.ceiling(&91), None);
    // exact hits.
    assert_eq!(tree.floor(&50), Some((50, 100)));
    assert_eq!(tree.ceiling(&50), Some((50, 100)));
    // between keys.
    assert_eq!(tree.floor(&69), Some((50, 100)));
    assert_eq!(tree.ceiling(&69), Some((70, 140)));

    for key in 0..100 {
        assert_eq!(tree.floor(&key), refns.floor(key), "floor {}", key);
        assert_eq!(tree.ceiling(&key), refns.ceiling(key), "ceiling {}", key);
    }
}

#[test]
fn test_rank_select() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    let mut refns = RefNodes::new(1000);
    for _ in 0..500 {
        let key: i64 = (random::<i64>() % 1000).abs();
        tree.set(key, key * 10);
        refns.set(key, key * 10);
    }

    let len = tree.len();
    assert_eq!(len, refns.len());

    // select is the inverse of rank.
    for k in 0..len {
        let (key, value) = tree.select(k).unwrap();
        assert_eq!(tree.rank(&key), k);
        assert_eq!(Some((key, value)), refns.select(k));
    }
    // rank against direct enumeration, present or not.
    for key in 0..1000 {
        assert_eq!(tree.rank(&key), refns.rank(key), "rank {}", key);
    }
    // out of range.
    assert_eq!(tree.select(len), Err(Error::IndexOutOfRange(len, len)));
    assert_eq!(
        tree.select(len + 100),
        Err(Error::IndexOutOfRange(len + 100, len))
    );
}

#[test]
fn test_height_bound() {
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());
    for n in 1..=256_i64 {
        let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
        let mut keys: Vec<i64> = (0..n).collect();
        keys.shuffle(&mut rng);
        for key in keys.into_iter() {
            tree.set(key, key);
        }
        let bound = 2 * (((n + 1) as f64).log2().ceil() as usize);
        assert!(
            tree.height() <= bound,
            "height {} bound {} n {}",
            tree.height(),
            bound,
            n
        );
    }
}

#[test]
fn test_round_trip() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());

    let mut keys: Vec<i64> = (0..500).collect();
    keys.shuffle(&mut rng);
    for key in keys.iter() {
        assert!(tree.set(*key, *key).is_none());
    }
    assert_eq!(tree.len(), 500);

    keys.shuffle(&mut rng);
    for key in keys.iter() {
        assert_eq!(tree.delete(key), Some(*key));
        assert!(tree.validate().is_ok());
    }
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.min(), Err(Error::EmptyTree));
    assert_eq!(tree.max(), Err(Error::EmptyTree));
}

#[test]
fn test_scenario_ordered() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    for key in [5, 3, 8, 1, 4, 7, 9].iter() {
        tree.set(*key, *key * 10);
    }

    let keys: Vec<i64> = tree.keys().collect();
    assert_eq!(keys, vec![1, 3, 4, 5, 7, 8, 9]);
    assert!(tree.height() <= 6); // 2 * log2(8)
    assert_eq!(tree.rank(&7), 4);
    assert_eq!(tree.select(4), Ok((7, 70)));
    assert!(tree.validate().is_ok());

    // pop the minimum.
    assert_eq!(tree.delete_min(), Ok((1, 10)));
    let keys: Vec<i64> = tree.keys().collect();
    assert_eq!(keys, vec![3, 4, 5, 7, 8, 9]);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_scenario_delete_root_key() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    for key in [5, 3, 8, 1, 4, 7, 9].iter() {
        tree.set(*key, *key * 10);
    }

    assert_eq!(tree.delete(&5), Some(50));
    let keys: Vec<i64> = tree.keys().collect();
    assert_eq!(keys, vec![1, 3, 4, 7, 8, 9]);
    assert_eq!(tree.len(), 6);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_load_from() {
    let entries: Vec<(i64, i64)> = vec![(1, 10), (2, 20), (3, 30)];
    let tree = LeftRb::load_from("test-leftrb", entries.into_iter()).unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.get(&2), Some(20));
    assert!(tree.validate().is_ok());

    // duplicate keys are refused.
    let entries: Vec<(i64, i64)> = vec![(1, 10), (1, 20)];
    let res: Result<LeftRb<i64, i64>, Error<i64>> =
        LeftRb::load_from("test-leftrb", entries.into_iter());
    assert_eq!(res.err(), Some(Error::OverwriteKey));
}

#[test]
fn test_random() {
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());

    assert_eq!(tree.random(&mut rng), None);

    tree.set(0, 0);
    assert_eq!(tree.random(&mut rng), Some((0, 0)));

    for key in 1..10_000 {
        assert!(tree.set(key, key * 10).is_none());
    }
    for _i in 0..20_000 {
        let (key, value) = tree.random(&mut rng).unwrap();
        assert!(key >= 0 && key < 10_000);
        assert_eq!(value, key * 10);
    }
}

#[test]
fn test_crud() {
    let size = 500;
    let mut tree: LeftRb<i64, i64> = LeftRb::new("test-leftrb");
    let mut refns = RefNodes::new(size);

    for _ in 0..20_000 {
        let key: i64 = (random::<i64>() % (size as i64)).abs();
        let value: i64 = random();
        let op: i64 = (random::<i64>() % 6).abs();
        match op {
            0 => {
                let ok1 = tree.get(&key).is_none();
                let ok2 = tree.create(key, value).is_ok();
                refns.create(key, value);
                assert_eq!(ok1, ok2);
            }
            1 => {
                let val = tree.set(key, value);
                let refval = refns.set(key, value);
                assert_eq!(val, refval);
            }
            2 => {
                let val = tree.delete(&key);
                let refval = refns.delete(key);
                assert_eq!(val, refval);
            }
            3 => {
                let val = tree.get(&key);
                let refval = refns.get(key);
                assert_eq!(val, refval);
            }
            4 => {
                let val = tree.delete_min().ok();
                let refval = refns.delete_min();
                assert_eq!(val, refval);
            }
            5 => {
                let val = tree.delete_max().ok();
                let refval = refns.delete_max();
                assert_eq!(val, refval);
            }
            op => panic!("unreachable {}", op),
        };

        assert_eq!(tree.len(), refns.len());
        assert!(tree.validate().is_ok());
        assert!(tree.root_is_black());
    }

    println!("index-length {}", tree.len());

    // order statistics against the reference.
    for k in 0..tree.len() {
        let item = tree.select(k).ok();
        assert_eq!(item, refns.select(k));
        assert_eq!(tree.rank(&item.unwrap().0), k);
    }
    for key in 0..(size as i64) {
        assert_eq!(tree.rank(&key), refns.rank(key));
        assert_eq!(tree.floor(&key), refns.floor(key));
        assert_eq!(tree.ceiling(&key), refns.ceiling(key));
    }

    // test iter
    let (mut iter, mut iter_ref) = (tree.iter(), refns.iter());
    loop {
        match (iter.next(), iter_ref.next()) {
            (Some(item), Some(ref_item)) => {
                assert_eq!(item.0, ref_item.0);
                assert_eq!(item.1, ref_item.1);
            }
            (None, None) => break,
            (_, _) => panic!("invalid"),
        }
    }

    // ranges and reverses
    for _ in 0..1_000 {
        let (low, high) = random_low_high(size);

        let mut iter = tree.range((low, high));
        let mut iter_ref = refns.range(low, high);
        loop {
            match (iter.next(), iter_ref.next()) {
                (Some(item), Some(ref_item)) => {
                    assert_eq!(item.0, ref_item.0);
                    assert_eq!(item.1, ref_item.1);
                }
                (None, None) => break,
                (Some(item), None) => panic!("invalid item: {:?}", item),
                (None, Some(ref_item)) => panic!("invalid none: {:?}", ref_item),
            }
        }

        let mut iter = tree.range((low, high)).rev();
        let mut iter_ref = refns.reverse(low, high);
        loop {
            match (iter.next(), iter_ref.next()) {
                (Some(item), Some(ref_item)) => {
                    assert_eq!(item.0, ref_item.0);
                    assert_eq!(item.1, ref_item.1);
                }
                (None, None) => break,
                (_, _) => panic!("invalid"),
            }
        }
    }
}

fn make_seed() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

include!("./ref_test.rs");
