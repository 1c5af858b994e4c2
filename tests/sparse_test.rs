use rand::seq::SliceRandom;
use rand::Rng;
use scenevm::mem::SparseStore;
use std::collections::BTreeSet;

#[test]
fn test_empty_store_has_nothing_allocated() {
    for size in [0, 1, 63, 64, 65, 2000].iter() {
        let store: SparseStore<i32> = SparseStore::new(*size);
        assert_eq!(store.full().count(), *size);
        assert!(store.full().all(|slot| !slot.allocated && *slot.value == 0));
        assert_eq!(store.allocated().count(), 0);
    }
}

#[test]
fn test_allocated_view_matches_written_indices() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let size = rng.gen_range(1..3000);
        let mut store = SparseStore::new(size);
        let mut written = BTreeSet::new();
        for _ in 0..rng.gen_range(0..200) {
            let index = rng.gen_range(0..size);
            store.set(index, index as i32 * 3).unwrap();
            written.insert(index);
            assert!(store.is_allocated(index));
        }
        let seen: Vec<usize> = store.allocated().map(|(i, _)| i).collect();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen, written.iter().copied().collect::<Vec<usize>>());
        assert!(store.allocated().all(|(i, v)| *v == i as i32 * 3));
        assert_eq!(store.allocated_len(), written.len());
        let valid = store.full().filter(|slot| slot.allocated).count();
        assert_eq!(valid, written.len());
    }
}

#[test]
fn test_allocation_survives_other_writes() {
    let mut rng = rand::thread_rng();
    let mut order: Vec<usize> = (0..500).collect();
    order.shuffle(&mut rng);
    let mut store = SparseStore::new(500);
    for (n, index) in order.iter().enumerate() {
        store.set(*index, String::from("x")).unwrap();
        for earlier in &order[..=n] {
            assert!(store.is_allocated(*earlier));
        }
    }
    assert_eq!(store.allocated().count(), 500);
}

#[test]
fn test_views_restart() {
    let mut store = SparseStore::new(100);
    store.set(70, 1u8).unwrap();
    store.set(3, 2).unwrap();
    let first: Vec<(usize, u8)> = store.allocated().map(|(i, v)| (i, *v)).collect();
    let second: Vec<(usize, u8)> = store.allocated().map(|(i, v)| (i, *v)).collect();
    assert_eq!(first, vec![(3, 2), (70, 1)]);
    assert_eq!(first, second);
}
