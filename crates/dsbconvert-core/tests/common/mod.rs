#![allow(dead_code)]

use dsbconvert_core::model::{
    BoundaryCondition, Construction, Face, Face3D, FaceType, Material, Model, Room, Roughness,
    Story,
};

/// Six faces of an axis-aligned box, each wound counter-clockwise seen from
/// outside. Face ids are `<room>_<side>`.
pub fn box_room(id: &str, min: [f64; 3], max: [f64; 3]) -> Room {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;
    let face = |side: &str, face_type, boundary: Vec<[f64; 3]>| Face {
        identifier: format!("{id}_{side}"),
        display_name: None,
        face_type,
        boundary_condition: match face_type {
            FaceType::Floor => BoundaryCondition::Ground,
            _ => BoundaryCondition::Outdoors,
        },
        geometry: Face3D::new(boundary),
        construction: None,
        apertures: Vec::new(),
        doors: Vec::new(),
        shades: Vec::new(),
    };
    Room {
        identifier: id.to_string(),
        display_name: None,
        program: None,
        multiplier: 1,
        faces: vec![
            face(
                "Bottom",
                FaceType::Floor,
                vec![[x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [x1, y0, z0]],
            ),
            face(
                "Top",
                FaceType::RoofCeiling,
                vec![[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
            ),
            face(
                "South",
                FaceType::Wall,
                vec![[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
            ),
            face(
                "North",
                FaceType::Wall,
                vec![[x1, y1, z0], [x0, y1, z0], [x0, y1, z1], [x1, y1, z1]],
            ),
            face(
                "West",
                FaceType::Wall,
                vec![[x0, y1, z0], [x0, y0, z0], [x0, y0, z1], [x0, y1, z1]],
            ),
            face(
                "East",
                FaceType::Wall,
                vec![[x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1]],
            ),
        ],
        shades: Vec::new(),
    }
}

pub fn face_mut<'a>(room: &'a mut Room, side: &str) -> &'a mut Face {
    let id = format!("{}_{side}", room.identifier);
    room.faces
        .iter_mut()
        .find(|f| f.identifier == id)
        .expect("face exists")
}

pub fn story(id: &str, floor_height: f64, rooms: Vec<Room>) -> Story {
    Story {
        identifier: id.to_string(),
        display_name: None,
        floor_height: Some(floor_height),
        rooms,
    }
}

pub fn one_room_model() -> Model {
    let mut model = Model::new("Single_Room");
    model.stories.push(story(
        "Level_1",
        0.0,
        vec![box_room("Office", [0.0, 0.0, 0.0], [5.0, 4.0, 3.0])],
    ));
    model
}

/// Two boxes sharing the wall at x = 5, with reciprocal `Surface` conditions.
pub fn two_adjacent_rooms() -> Model {
    let mut west = box_room("West", [0.0, 0.0, 0.0], [5.0, 4.0, 3.0]);
    let mut east = box_room("East", [5.0, 0.0, 0.0], [10.0, 4.0, 3.0]);
    face_mut(&mut west, "East").boundary_condition = BoundaryCondition::Surface {
        adjacent_face: "East_West".to_string(),
    };
    face_mut(&mut east, "West").boundary_condition = BoundaryCondition::Surface {
        adjacent_face: "West_East".to_string(),
    };
    let mut model = Model::new("Two_Rooms");
    model.stories.push(story("Level_1", 0.0, vec![west, east]));
    model
}

pub fn concrete(id: &str) -> Material {
    Material::Opaque {
        identifier: id.to_string(),
        thickness: 0.2,
        conductivity: 1.95,
        density: 2240.0,
        specific_heat: 900.0,
        roughness: Roughness::MediumRough,
        thermal_absorptance: 0.9,
        solar_absorptance: 0.7,
        visible_absorptance: 0.7,
    }
}

pub fn opaque_construction(id: &str, materials: &[&str]) -> Construction {
    Construction::Opaque {
        identifier: id.to_string(),
        materials: materials.iter().map(|m| m.to_string()).collect(),
    }
}

/// Assigns `construction` to every face of every room in the model.
pub fn assign_everywhere(model: &mut Model, construction: &str) {
    for story in &mut model.stories {
        for room in &mut story.rooms {
            for face in &mut room.faces {
                face.construction = Some(construction.to_string());
            }
        }
    }
}
