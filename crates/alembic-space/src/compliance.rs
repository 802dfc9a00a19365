//! SpatialIndex trait compliance test helpers.
//!
//! These functions verify that an index backend satisfies the contract
//! documented on [`SpatialIndex`]. Reused by every backend test module.

use crate::bbox::BoundingBox;
use crate::brute::BruteForceIndex;
use crate::index::SpatialIndex;

fn sorted(mut v: Vec<u32>) -> Vec<u32> {
    v.sort_unstable();
    v
}

/// Assert that inserted elements are found by a box around them and
/// vanish after removal.
pub fn assert_insert_query_remove<I: SpatialIndex<u32>>(mut index: I) {
    assert!(index.is_empty());
    assert!(index.insert(1, &[0.0, 0.0]));
    assert!(index.insert(2, &[1.0, 1.0]));
    assert!(index.insert(3, &[10.0, -10.0]));
    assert_eq!(index.len(), 3);

    let near = BoundingBox::new(&[-0.5, -0.5], &[1.0, 1.0]).unwrap();
    assert_eq!(sorted(index.query(&near)), vec![1, 2]);

    assert!(index.remove(2, &[1.0, 1.0]));
    assert_eq!(sorted(index.query(&near)), vec![1]);
    assert_eq!(index.len(), 2);
}

/// Assert that duplicates, absent removes and stale `from` coordinates
/// are rejected without changing the index.
pub fn assert_rejects_inconsistent_mutations<I: SpatialIndex<u32>>(mut index: I) {
    assert!(index.insert(1, &[0.0, 0.0]));
    assert!(!index.insert(1, &[5.0, 5.0]), "duplicate insert accepted");
    assert!(!index.remove(9, &[0.0, 0.0]), "absent remove accepted");
    assert!(!index.remove(1, &[0.5, 0.0]), "remove at wrong coords accepted");
    assert!(
        !index.move_element(1, &[0.5, 0.0], &[2.0, 2.0]),
        "move from wrong coords accepted"
    );
    assert!(!index.move_element(9, &[0.0, 0.0], &[2.0, 2.0]));
    assert_eq!(index.len(), 1);
    let origin = BoundingBox::new(&[0.0, 0.0], &[0.0, 0.0]).unwrap();
    assert_eq!(index.query(&origin), vec![1]);
}

/// Assert that wrong-dimension and non-finite coordinates are rejected.
pub fn assert_rejects_bad_coordinates<I: SpatialIndex<u32>>(mut index: I) {
    assert_eq!(index.dimensions(), 2);
    assert!(!index.insert(1, &[0.0]));
    assert!(!index.insert(1, &[0.0, 0.0, 0.0]));
    assert!(!index.insert(1, &[f64::NAN, 0.0]));
    assert!(!index.insert(1, &[0.0, f64::INFINITY]));
    assert!(index.is_empty());
    assert!(index.insert(1, &[0.0, 0.0]));
    assert!(!index.move_element(1, &[0.0, 0.0], &[f64::NAN, 0.0]));
    let three_d = BoundingBox::new(&[-1.0; 3], &[1.0; 3]).unwrap();
    assert!(index.query(&three_d).is_empty());
}

/// Assert that a moved element is found at its new location only.
pub fn assert_move_relocates<I: SpatialIndex<u32>>(mut index: I) {
    assert!(index.insert(4, &[0.0, 0.0]));
    assert!(index.move_element(4, &[0.0, 0.0], &[100.0, 100.0]));
    let old = BoundingBox::new(&[-1.0, -1.0], &[1.0, 1.0]).unwrap();
    let new = BoundingBox::new(&[99.0, 99.0], &[101.0, 101.0]).unwrap();
    assert!(index.query(&old).is_empty());
    assert_eq!(index.query(&new), vec![4]);
    assert!(index.remove(4, &[100.0, 100.0]));
}

/// Assert that `index` returns the same result set as the brute-force
/// reference for every box, after the same sequence of inserts.
pub fn assert_matches_reference<I: SpatialIndex<u32>>(
    mut index: I,
    points: &[[f64; 2]],
    boxes: &[BoundingBox],
) {
    let mut reference = BruteForceIndex::new(2).unwrap();
    for (i, p) in points.iter().enumerate() {
        let id = i as u32;
        assert_eq!(index.insert(id, p), reference.insert(id, p));
    }
    for b in boxes {
        assert_eq!(
            sorted(index.query(b)),
            sorted(reference.query(b)),
            "query mismatch for {b:?}"
        );
    }
}

/// Run the full compliance suite against a 2D backend constructor.
pub fn run_full_compliance<I, F>(make: F)
where
    I: SpatialIndex<u32>,
    F: Fn(usize) -> I,
{
    assert_insert_query_remove(make(2));
    assert_rejects_inconsistent_mutations(make(2));
    assert_rejects_bad_coordinates(make(2));
    assert_move_relocates(make(2));
    let points: Vec<[f64; 2]> = (0..40)
        .map(|i| {
            let f = i as f64;
            [(f * 1.7).sin() * 5.0, (f * 0.3).cos() * 5.0]
        })
        .collect();
    let boxes = [
        BoundingBox::new(&[-1.0, -1.0], &[1.0, 1.0]).unwrap(),
        BoundingBox::new(&[-5.0, 0.0], &[0.0, 5.0]).unwrap(),
        BoundingBox::new(&[-10.0, -10.0], &[10.0, 10.0]).unwrap(),
        BoundingBox::new(&[2.0, 2.0], &[2.0, 2.0]).unwrap(),
    ];
    assert_matches_reference(make(2), &points, &boxes);
}
