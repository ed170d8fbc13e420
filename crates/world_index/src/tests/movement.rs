use super::world_on;
use crate::{
    CanFitOptions, Capabilities, Direction, LandTile, MemoryTerrain, MovementScratch, Occupant,
    Point4D, ThingId, TileData, TileFlags, WorldIndex,
};

const GRASS: u16 = 0x3;
const SHALLOWS: u16 = 0xA9;
const DEEP_WATER: u16 = 0xA8;
const LAVA: u16 = 0x1F4;
const TABLE: u16 = 0xB34;

/// A strip of shore running east: grass, shallows, deep water, lava.
fn shore() -> WorldIndex {
    let mut terrain = MemoryTerrain::new(LandTile::new(GRASS, 0));
    terrain
        .set_land(0, 11, 10, LandTile::new(SHALLOWS, 0))
        .set_land(0, 12, 10, LandTile::new(DEEP_WATER, 0))
        .set_land(0, 11, 20, LandTile::new(LAVA, 0));

    let mut tiles = TileData::new();
    tiles
        .set_land_flags(SHALLOWS, TileFlags::WET)
        .set_land_flags(DEEP_WATER, TileFlags::WET | TileFlags::IMPASSABLE)
        .set_land_flags(LAVA, TileFlags::IMPASSABLE)
        .mark_lava_land(LAVA)
        .set_item(TABLE, TileFlags::SURFACE, 6);
    world_on(terrain, tiles)
}

fn step(world: &WorldIndex, from: Point4D, dir: Direction, caps: &Capabilities) -> (bool, i32) {
    let mut scratch = MovementScratch::new();
    let outcome = world.check_movement(from, caps, dir, false, &mut scratch);
    (outcome.accepted, outcome.z)
}

#[test]
fn test_walkers_wade_through_shallows_only() {
    let world = shore();
    let walker = Capabilities::walker();
    let swimmer = Capabilities {
        can_swim: true,
        ..walker
    };

    assert_eq!(step(&world, Point4D::new(10, 10, 0, 0), Direction::East, &walker), (true, 0));
    assert!(!step(&world, Point4D::new(11, 10, 0, 0), Direction::East, &walker).0);
    assert_eq!(step(&world, Point4D::new(11, 10, 0, 0), Direction::East, &swimmer), (true, 0));
}

#[test]
fn test_lava_needs_the_matching_capability() {
    let world = shore();
    let walker = Capabilities::walker();
    let fire_walker = Capabilities {
        can_cross_lava: true,
        ..walker
    };
    let flyer = Capabilities {
        can_fly: true,
        ..walker
    };

    let start = Point4D::new(10, 20, 0, 0);
    assert!(!step(&world, start, Direction::East, &walker).0);
    assert!(step(&world, start, Direction::East, &fire_walker).0);
    assert!(step(&world, start, Direction::East, &flyer).0);
}

#[test]
fn test_items_on_the_ground_take_part() {
    let mut world = shore();
    let table = Occupant::item(ThingId(1), Point4D::new(11, 30, 0, 0), TABLE);
    world.add_thing(&table).unwrap();

    let walker = Capabilities::walker();
    let climber = Capabilities {
        climb_power: 10,
        ..walker
    };
    let start = Point4D::new(10, 30, 0, 0);
    assert!(!step(&world, start, Direction::East, &walker).0);
    assert_eq!(step(&world, start, Direction::East, &climber), (true, 6));

    assert!(world.remove_thing(&table));
    assert_eq!(step(&world, start, Direction::East, &walker), (true, 0));
}

#[test]
fn test_can_fit_on_the_plane_of_the_point() {
    let mut world = shore();
    let spot = Point4D::new(40, 40, 0, 0);
    assert!(world.can_fit(spot, 16, CanFitOptions::default()));

    world
        .add_thing(&Occupant::character(ThingId(2), spot))
        .unwrap();
    assert!(!world.can_fit(spot, 16, CanFitOptions::default()));
    assert!(world.can_fit(Point4D::new(40, 40, 0, 1), 16, CanFitOptions::default()));

    // impassable land offers nothing to stand on
    let deep = Point4D::new(12, 10, 0, 0);
    assert!(!world.can_fit(deep, 16, CanFitOptions::default()));
}
