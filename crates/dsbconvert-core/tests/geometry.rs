use approx::assert_relative_eq;
use dsbconvert_core::accessor::Polygon;
use dsbconvert_core::geom::{is_closed_shell, signed_volume6, Point, Vector};
use dsbconvert_core::geometry::{
    reverse_loop, CoordinateMode, FragmentKind, GeometryEncoder, GeometryEntity, StoryFrame,
    Winding,
};
use dsbconvert_core::TranslateError;

fn poly(id: &str, pts: &[[f64; 3]]) -> Polygon {
    Polygon {
        identifier: id.to_string(),
        points: pts.iter().map(|p| Point::new(p[0], p[1], p[2])).collect(),
    }
}

fn square_at(z: f64) -> Polygon {
    poly(
        "Square",
        &[[0.0, 0.0, z], [2.0, 0.0, z], [2.0, 2.0, z], [0.0, 2.0, z]],
    )
}

fn encoder() -> GeometryEncoder {
    GeometryEncoder::new(0.01, CoordinateMode::StoryRelative)
}

fn reason(result: Result<Vec<Point>, TranslateError>) -> String {
    match result {
        Err(TranslateError::InvalidGeometry { reason, .. }) => reason,
        other => panic!("expected InvalidGeometry, got {other:?}"),
    }
}

#[test]
fn closing_vertex_is_dropped() {
    let closed = poly(
        "Closed",
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
        ],
    );
    assert_eq!(4, encoder().validate(&closed).expect("valid").len());
}

#[test]
fn degenerate_loops_are_rejected() {
    let enc = encoder();

    let two_points = poly("Two", &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
    assert!(reason(enc.validate(&two_points)).contains("distinct"));

    let repeated = poly(
        "Repeated",
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
        ],
    );
    assert!(reason(enc.validate(&repeated)).contains("coincide"));

    let collinear = poly("Line", &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
    assert!(reason(enc.validate(&collinear)).contains("area"));

    let bowtie = poly(
        "Bowtie",
        &[[0.0, 0.0, 0.0], [2.0, 2.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    );
    assert!(reason(enc.validate(&bowtie)).contains("intersects"));

    let warped = poly(
        "Warped",
        &[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.5], [0.0, 2.0, 0.0]],
    );
    assert!(reason(enc.validate(&warped)).contains("planar"));

    let nan = poly("Nan", &[[0.0, 0.0, 0.0], [f64::NAN, 0.0, 0.0], [1.0, 1.0, 0.0]]);
    assert!(reason(enc.validate(&nan)).contains("non-finite"));
}

#[test]
fn invalid_geometry_names_the_entity() {
    let bad = poly("Wall_7", &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
    match encoder().encode(GeometryEntity::Face(&bad), None, Winding::Keep) {
        Err(TranslateError::InvalidGeometry { entity, .. }) => assert_eq!("Wall_7", entity),
        other => panic!("expected InvalidGeometry, got {other:?}"),
    }
}

#[test]
fn reversal_keeps_the_first_vertex() {
    let mut pts = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
    ];
    reverse_loop(&mut pts);
    assert_eq!(
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
        ],
        pts
    );
}

#[test]
fn story_relative_mode_subtracts_the_base_elevation() {
    let frame = StoryFrame {
        base_elevation: 3.0,
    };
    let fragment = encoder()
        .encode(GeometryEntity::Face(&square_at(3.0)), Some(&frame), Winding::Keep)
        .expect("encode");
    assert_eq!(FragmentKind::Surface, fragment.kind);
    assert!(fragment.vertices.iter().all(|p| p.z == 0.0));
    assert_relative_eq!(4.0, fragment.area);
    assert_relative_eq!(1.0, fragment.normal.z);

    let absolute = GeometryEncoder::new(0.01, CoordinateMode::Absolute)
        .encode(GeometryEntity::Face(&square_at(3.0)), Some(&frame), Winding::Keep)
        .expect("encode");
    assert!(absolute.vertices.iter().all(|p| p.z == 3.0));
}

#[test]
fn reverse_winding_flips_the_normal() {
    let fragment = encoder()
        .encode(GeometryEntity::Aperture(&square_at(0.0)), None, Winding::Reverse)
        .expect("encode");
    assert_eq!(FragmentKind::Window, fragment.kind);
    assert!(fragment.reversed);
    assert_relative_eq!(-1.0, fragment.normal.z);
    assert_eq!(Point::new(0.0, 0.0, 0.0), fragment.vertices[0]);
}

#[test]
fn shades_are_never_reversed() {
    let fragment = encoder()
        .encode(GeometryEntity::Shade(&square_at(0.0)), None, Winding::Reverse)
        .expect("encode");
    assert_eq!(FragmentKind::Shade, fragment.kind);
    assert!(!fragment.reversed);
    assert_relative_eq!(1.0, fragment.normal.z);
}

#[test]
fn room_winding_follows_the_enclosed_volume() {
    // Unit cube, every face counter-clockwise seen from outside.
    let cube: Vec<Vec<Point>> = [
        [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
        [[1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
        [[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0]],
        [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
    ]
    .iter()
    .map(|face| face.iter().map(|p| Point::new(p[0], p[1], p[2])).collect())
    .collect();

    assert_relative_eq!(6.0, signed_volume6(cube.iter().map(Vec::as_slice)));
    let enc = encoder();
    assert_eq!(Winding::Keep, enc.room_winding(cube.iter().map(Vec::as_slice)));

    let inverted: Vec<Vec<Point>> = cube
        .iter()
        .map(|face| face.iter().rev().copied().collect())
        .collect();
    assert_eq!(
        Winding::Reverse,
        enc.room_winding(inverted.iter().map(Vec::as_slice))
    );
}

#[test]
fn sub_faces_are_turned_to_match_their_parent() {
    let enc = encoder();
    let up = Vector::new(0.0, 0.0, 1.0);
    assert_eq!(Winding::Keep, enc.sub_face_winding(&up, &square_at(0.0)));
    assert_eq!(Winding::Reverse, enc.sub_face_winding(&-up, &square_at(0.0)));
}

/// Axis-aligned box, every face counter-clockwise seen from outside.
fn box_loops(min: [f64; 3], max: [f64; 3]) -> Vec<Vec<Point>> {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;
    [
        [[x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [x1, y0, z0]],
        [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
        [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
        [[x1, y1, z0], [x0, y1, z0], [x0, y1, z1], [x1, y1, z1]],
        [[x0, y1, z0], [x0, y0, z0], [x0, y0, z1], [x0, y1, z1]],
        [[x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1]],
    ]
    .iter()
    .map(|face| face.iter().map(|p| Point::new(p[0], p[1], p[2])).collect())
    .collect()
}

#[test]
fn open_rooms_keep_their_winding_wherever_they_sit() {
    let enc = encoder();
    for z in [-3.0, 0.5, 3.0] {
        let mut room = box_loops([0.0, 0.0, z], [5.0, 4.0, z + 3.0]);
        room.truncate(1);
        let slices: Vec<&[Point]> = room.iter().map(Vec::as_slice).collect();
        assert!(!is_closed_shell(&slices));
        assert_eq!(Winding::Keep, enc.room_winding(slices.iter().copied()));

        room[0].reverse();
        assert_eq!(Winding::Keep, enc.room_winding(room.iter().map(Vec::as_slice)));
    }

    let closed = box_loops([0.0, 0.0, -3.0], [5.0, 4.0, 0.0]);
    let slices: Vec<&[Point]> = closed.iter().map(Vec::as_slice).collect();
    assert!(is_closed_shell(&slices));
}

#[test]
fn extrusions_are_closed_and_upright() {
    let enc = encoder();
    let upright = box_loops([0.0, 0.0, 0.0], [5.0, 4.0, 3.0]);
    assert!(enc.is_extrusion(upright.iter().map(Vec::as_slice)));

    let mut open = upright.clone();
    open.pop();
    assert!(!enc.is_extrusion(open.iter().map(Vec::as_slice)));

    // Wedge: a sloped roof over a triangular section.
    let wedge: Vec<Vec<Point>> = [
        vec![[0.0, 0.0, 0.0], [0.0, 4.0, 0.0], [4.0, 4.0, 0.0], [4.0, 0.0, 0.0]],
        vec![[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 0.0, 3.0], [0.0, 0.0, 3.0]],
        vec![[4.0, 4.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 3.0], [4.0, 0.0, 3.0]],
        vec![[0.0, 4.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 3.0]],
        vec![[4.0, 0.0, 0.0], [4.0, 4.0, 0.0], [4.0, 0.0, 3.0]],
    ]
    .iter()
    .map(|face| face.iter().map(|p| Point::new(p[0], p[1], p[2])).collect())
    .collect();
    let slices: Vec<&[Point]> = wedge.iter().map(Vec::as_slice).collect();
    assert!(is_closed_shell(&slices));
    assert!(!enc.is_extrusion(slices.iter().copied()));
}
