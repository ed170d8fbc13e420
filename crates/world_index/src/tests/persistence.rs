use super::{empty_world, rect, world_with_root};
use crate::{Point4D, WorldError, WorldIndex};

const BRITAIN: &str = r#"
// Static Regions

[StaticRegion a_world]
name="World"
rect=0,0,6143,4095

[StaticRegion a_britain]
name="Britain"
p=1495,1629,10,0
parent=(a_world)
triggergroup=t_guards
events=t_town_music
rect=1296,1480,1640,1620
rect=1380,1620,1640,1788
rect=1200,1500,1296,1560
flags=0x1234
music=3

[StaticRegion a_britain_bank]
parent=#a_britain
rect=1420,1680,1440,1696

[EOF]
ignored=after eof
"#;

fn loaded() -> WorldIndex {
    let mut world = empty_world();
    world.load_regions_str(BRITAIN, "britain.scp").unwrap();
    world.finish_loading().unwrap();
    world
}

#[test]
fn test_region_file_round_trip() {
    let world = loaded();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regions.scp");
    world.save_region_file(&path).unwrap();

    let mut reloaded = empty_world();
    let ids = reloaded.load_region_file(&path).unwrap();
    assert_eq!(ids.len(), 3);
    reloaded.finish_loading().unwrap();

    let britain = reloaded.get_by_defname("a_britain").unwrap();
    let region = reloaded.region(britain).unwrap();
    assert_eq!(region.name(), "Britain");
    assert_eq!(region.spawn_point(), Some(Point4D::new(1495, 1629, 10, 0)));
    assert_eq!(
        region.rectangles(),
        &[
            rect(1296, 1480, 1640, 1620),
            rect(1380, 1620, 1640, 1788),
            rect(1200, 1500, 1296, 1560),
        ]
    );
    assert_eq!(region.trigger_groups(), &["t_guards", "t_town_music"]);
    let data = region.static_data().unwrap();
    assert_eq!(
        data.tags,
        vec![
            ("flags".to_string(), "0x1234".to_string()),
            ("music".to_string(), "3".to_string()),
        ]
    );

    let bank = reloaded.get_by_defname("a_britain_bank").unwrap();
    assert_eq!(reloaded.region(bank).unwrap().parent(), Some(britain));
    assert_eq!(reloaded.region(bank).unwrap().hierarchy_index(), Some(2));
    assert_eq!(reloaded.region_for(Point4D::new(1430, 1690, 0, 0)), Some(bank));

    // saving again is stable
    assert_eq!(reloaded.save_regions(), world.save_regions());
}

#[test]
fn test_saved_section_layout() {
    let world = loaded();
    let bank = world.get_by_defname("a_britain_bank").unwrap();
    let mut out = String::new();
    world.save_region(bank, &mut out).unwrap();
    assert_eq!(
        out,
        "[StaticRegion a_britain_bank]\nparent=(a_britain)\nrect=1420,1680,1440,1696\n\n"
    );

    let text = world.save_regions();
    assert!(text.starts_with("// Static Regions\n\n[StaticRegion a_world]\nname=\"World\"\n"));
    assert!(text.ends_with("[EOF]\n"));
    assert!(!text.contains("ignored"));
}

#[test]
fn test_dynamic_regions_are_never_persisted() {
    let (mut world, _) = world_with_root();
    let boat = world.create_dynamic_region(vec![rect(10, 10, 20, 20)]);

    let mut out = String::new();
    assert!(matches!(
        world.save_region(boat, &mut out),
        Err(WorldError::DynamicRegionPersistence)
    ));
    assert!(out.is_empty());
    assert!(!world.save_regions().contains("DynamicRegion"));

    assert!(matches!(
        world.load_region_line(boat, "rect", "1,1,2,2", "live.scp", 1),
        Err(WorldError::DynamicRegionPersistence)
    ));
    assert_eq!(world.region(boat).unwrap().rectangles(), &[rect(10, 10, 20, 20)]);

    let mut fresh = empty_world();
    let err = fresh
        .load_regions_str("[DynamicRegion boat]\nrect=1,1,2,2\n", "boats.scp")
        .unwrap_err();
    assert!(matches!(err, WorldError::DynamicRegionPersistence));
}

#[test]
fn test_parse_errors_name_the_line() {
    let text = "[StaticRegion a_world]\nname=\"World\"\nrect=0,0,nope,10\n";
    let mut world = empty_world();
    let err = world.load_regions_str(text, "broken.scp").unwrap_err();
    match err {
        WorldError::Parse { file, line, message } => {
            assert_eq!(file, "broken.scp");
            assert_eq!(line, 3);
            assert!(message.contains("0,0,nope,10"), "{message}");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(world.region_count(), 0);

    let err = world
        .load_regions_str("rect=0,0,10,10\n", "orphan.scp")
        .unwrap_err();
    assert!(matches!(err, WorldError::Parse { line: 1, .. }));

    let err = world
        .load_regions_str("[StaticRegion a_world]\n[Spawn x]\n", "mixed.scp")
        .unwrap_err();
    assert!(matches!(err, WorldError::Parse { line: 2, .. }));
}

#[test]
fn test_mapplane_wins_over_spawn_point() {
    let text = r#"
[StaticRegion a_world]
rect=0,0,6143,4095

[StaticRegion a_ilshenar]
parent=(a_world)
p=100,100,0,2
rect=50,50,150,150

[StaticRegion a_lost]
parent=(a_world)
p=100,100,0,2
mapplane=3
rect=50,50,150,150
"#;
    let mut world = empty_world();
    world.load_regions_str(text, "planes.scp").unwrap();
    world.finish_loading().unwrap();

    let ilshenar = world.get_by_defname("a_ilshenar").unwrap();
    let lost = world.get_by_defname("a_lost").unwrap();
    assert_eq!(world.region(ilshenar).unwrap().plane(), 2);
    assert_eq!(world.region(lost).unwrap().plane(), 3);

    let mut out = String::new();
    world.save_region(lost, &mut out).unwrap();
    assert!(out.contains("mapplane=3\n"));
}
