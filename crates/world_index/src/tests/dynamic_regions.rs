use super::{empty_world, rect, world_with_root};
use crate::{Point4D, StaticRegionDef, WorldError};

fn at(x: i32, y: i32) -> Point4D {
    Point4D::new(x, y, 0, 0)
}

#[test]
fn test_overlapping_dynamic_region_stays_unplaced() {
    let (mut world, root) = world_with_root();
    let d1 = world.create_dynamic_region(vec![rect(10, 10, 20, 20)]);
    let d2 = world.create_dynamic_region(vec![rect(15, 15, 25, 25)]);

    assert!(world.place(d1, at(15, 15)).unwrap());
    assert!(!world.place(d2, at(22, 22)).unwrap());

    let placed = world.region(d1).unwrap();
    assert!(placed.is_placed());
    assert_eq!(placed.parent(), Some(root));
    assert_eq!(placed.hierarchy_index(), Some(1));

    let refused = world.region(d2).unwrap();
    assert!(!refused.is_placed());
    assert_eq!(refused.parent(), None);
    assert_eq!(world.region_for(at(24, 24)), Some(root));
    assert_eq!(world.region_for(at(12, 12)), Some(d1));

    // somewhere else it fits
    assert!(!world.check_dyn_rect_intersection(0, &rect(18, 18, 30, 30)));
    assert!(world.check_dyn_rect_intersection(0, &rect(21, 21, 30, 30)));
}

#[test]
fn test_place_twice_and_move_unplaced_are_errors() {
    let (mut world, _) = world_with_root();
    let boat = world.create_dynamic_region(vec![rect(10, 10, 20, 20)]);

    assert!(matches!(world.step(boat, 1, 0), Err(WorldError::NotPlaced(id)) if id == boat));
    assert!(matches!(
        world.set_position(boat, at(50, 50)),
        Err(WorldError::NotPlaced(_))
    ));

    assert!(world.place(boat, at(15, 15)).unwrap());
    assert!(matches!(
        world.place(boat, at(15, 15)),
        Err(WorldError::AlreadyPlaced(id)) if id == boat
    ));
    assert!(matches!(
        world.place(boat, at(-5, 15)),
        Err(WorldError::AlreadyPlaced(_))
    ));
}

#[test]
fn test_static_regions_are_not_dynamic() {
    let (mut world, root) = world_with_root();
    assert!(matches!(
        world.place(root, at(15, 15)),
        Err(WorldError::WrongRegionKind(id, "dynamic")) if id == root
    ));
    assert!(matches!(
        world.delete_dynamic_region(root),
        Err(WorldError::WrongRegionKind(_, _))
    ));
}

#[test]
fn test_place_outside_the_map_is_rejected() {
    let mut world = empty_world();
    let boat = world.create_dynamic_region(vec![rect(10, 10, 20, 20)]);
    assert!(matches!(
        world.place(boat, at(7000, 15)),
        Err(WorldError::InvalidPosition { x: 7000, y: 15, plane: 0 })
    ));
    assert!(!world.region(boat).unwrap().is_placed());
}

#[test]
fn test_step_moves_or_rolls_back_exactly() {
    let (mut world, _) = world_with_root();
    let boat = world.create_dynamic_region(vec![rect(10, 10, 20, 20), rect(21, 12, 24, 18)]);
    let dock = world.create_dynamic_region(vec![rect(40, 10, 50, 20)]);
    assert!(world.place(boat, at(15, 15)).unwrap());
    assert!(world.place(dock, at(45, 15)).unwrap());

    assert!(world.step(boat, 5, 0).unwrap());
    let moved = world.region(boat).unwrap();
    assert_eq!(moved.rectangles(), &[rect(15, 10, 25, 20), rect(26, 12, 29, 18)]);
    assert_eq!(moved.spawn_point(), Some(at(20, 15)));
    assert_eq!(world.region_for(at(27, 15)), Some(boat));
    assert_ne!(world.region_for(at(12, 15)), Some(boat));

    // the bow would hit the dock
    assert!(!world.step(boat, 12, 0).unwrap());
    let kept = world.region(boat).unwrap();
    assert_eq!(kept.rectangles(), &[rect(15, 10, 25, 20), rect(26, 12, 29, 18)]);
    assert_eq!(kept.spawn_point(), Some(at(20, 15)));
    assert_eq!(world.region_for(at(27, 15)), Some(boat));
    assert_eq!(world.region_for(at(45, 15)), Some(dock));
    assert!(!world.check_dyn_rect_intersection(0, &rect(27, 14, 28, 16)));
}

#[test]
fn test_set_position_changes_plane_in_one_move() {
    let (mut world, root) = world_with_root();
    let boat = world.create_dynamic_region(vec![rect(10, 10, 20, 20)]);
    assert!(world.place(boat, at(15, 15)).unwrap());

    let below = Point4D::new(115, 115, 0, 1);
    assert!(world.set_position(boat, below).unwrap());
    let region = world.region(boat).unwrap();
    assert_eq!(region.plane(), 1);
    assert_eq!(region.rectangles(), &[rect(110, 110, 120, 120)]);
    // nothing static covers plane 1 here, the world region adopts it
    assert_eq!(region.parent(), Some(root));
    assert_eq!(world.region_for(below), Some(boat));
    assert_eq!(world.region_for(at(15, 15)), Some(root));
    assert!(world.check_dyn_rect_intersection(0, &rect(10, 10, 20, 20)));
    assert!(!world.check_dyn_rect_intersection(1, &rect(118, 118, 130, 130)));
}

#[test]
fn test_refused_set_position_leaves_everything_in_place() {
    let (mut world, root) = world_with_root();
    let harbor = world
        .create_static_region(
            StaticRegionDef::new("a_harbor").child_of(root).with_rect(rect(0, 0, 100, 100)),
        )
        .unwrap();
    let boat = world.create_dynamic_region(vec![rect(10, 10, 20, 20)]);
    let wreck = world.create_dynamic_region(vec![rect(200, 200, 210, 210)]);
    assert!(world.place(boat, at(15, 15)).unwrap());
    assert!(world.place(wreck, at(205, 205)).unwrap());
    assert_eq!(world.region(boat).unwrap().parent(), Some(harbor));
    assert_eq!(world.region(boat).unwrap().hierarchy_index(), Some(2));

    assert!(!world.set_position(boat, at(200, 200)).unwrap());
    let region = world.region(boat).unwrap();
    assert_eq!(region.rectangles(), &[rect(10, 10, 20, 20)]);
    assert_eq!(region.spawn_point(), Some(at(15, 15)));
    assert_eq!(region.parent(), Some(harbor));
    assert_eq!(world.region_for(at(15, 15)), Some(boat));

    assert!(world.set_position(boat, at(300, 300)).unwrap());
    let region = world.region(boat).unwrap();
    assert_eq!(region.parent(), Some(root));
    assert_eq!(region.hierarchy_index(), Some(1));
    assert_eq!(world.region_for(at(15, 15)), Some(harbor));
}

#[test]
fn test_delete_frees_the_area() {
    let (mut world, root) = world_with_root();
    let boat = world.create_dynamic_region(vec![rect(10, 10, 20, 20)]);
    assert!(world.place(boat, at(15, 15)).unwrap());
    assert!(!world.check_dyn_rect_intersection(0, &rect(12, 12, 14, 14)));

    world.delete_dynamic_region(boat).unwrap();
    assert!(world.region(boat).is_none());
    assert!(world.check_dyn_rect_intersection(0, &rect(12, 12, 14, 14)));
    assert_eq!(world.region_for(at(15, 15)), Some(root));
    assert!(matches!(
        world.delete_dynamic_region(boat),
        Err(WorldError::UnknownRegion(_))
    ));

    let raft = world.create_dynamic_region(vec![rect(12, 12, 18, 18)]);
    assert!(world.place(raft, at(15, 15)).unwrap());
}

#[test]
fn test_clear_regions_drops_dynamic_rectangles() {
    let (mut world, _) = world_with_root();
    let boat = world.create_dynamic_region(vec![rect(10, 10, 20, 20)]);
    assert!(world.place(boat, at(15, 15)).unwrap());

    world.clear_regions();
    assert_eq!(world.region_count(), 0);
    assert_eq!(world.region_for(at(15, 15)), None);
    assert!(world.check_dyn_rect_intersection(0, &rect(10, 10, 20, 20)));
}
