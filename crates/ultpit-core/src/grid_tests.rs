//! Tests for grid indexing.

use super::*;

#[test]
fn test_index_coords_round_trip() {
    let grid = Grid::unit(5, 4, 3);
    for k in 0..grid.block_count() {
        let (ix, iy, iz) = grid.coords(k);
        assert_eq!(grid.index(ix, iy, iz), k);
    }
}

#[test]
fn test_offset_matches_index_delta() {
    let grid = Grid::unit(5, 4, 3);
    let from = grid.index(2, 1, 0);
    let to = grid.index(1, 2, 1);
    assert_eq!(grid.offset(-1, 1, 1), to as isize - from as isize);
}

#[test]
fn test_contains_rejects_negative_and_overflow() {
    let grid = Grid::unit(2, 2, 2);
    assert!(grid.contains(0, 0, 0));
    assert!(grid.contains(1, 1, 1));
    assert!(!grid.contains(-1, 0, 0));
    assert!(!grid.contains(0, 2, 0));
    assert!(!grid.contains(0, 0, 2));
}

#[test]
fn test_centroid_and_point_in_block() {
    let grid = Grid::new([2, 2, 2], [100.0, 200.0, 0.0], [10.0, 10.0, 5.0]);
    let k = grid.index(1, 0, 1);
    assert_eq!(grid.block_centroid(k), [115.0, 205.0, 7.5]);
    assert!(grid.point_in_block(k, 110.0, 200.0, 5.0));
    assert!(!grid.point_in_block(k, 120.0, 200.0, 5.0));
    assert_eq!(grid.block_aabb(k), [110.0, 200.0, 5.0, 120.0, 210.0, 10.0]);
}

#[test]
fn test_gslib_origin() {
    let grid = Grid::new([3, 3, 3], [0.0; 3], [20.0, 20.0, 10.0]).with_gslib_origin();
    assert_eq!((grid.min_x, grid.min_y, grid.min_z), (10.0, 10.0, 5.0));
    assert_eq!(grid.aabb()[3], 70.0);
}
