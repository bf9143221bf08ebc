use dsbconvert_core::model::{BoundaryCondition, Construction, FaceType, Units};
use dsbconvert_core::simulation::{resolve, ReportingFrequency, TerrainType};
use dsbconvert_import_json::{
    import_model, import_simulation_parameter, parse_model, parse_simulation_parameter,
};
use std::path::{Path, PathBuf};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[test]
fn imports_the_sample_model() {
    let model = import_model(&data("sample_office.json")).expect("import");
    assert_eq!("Sample_Office", model.identifier);
    assert_eq!("Sample Office", model.display_name());
    assert_eq!(Units::Meters, model.units);
    assert_eq!(1, model.stories.len());

    let room = &model.stories[0].rooms[0];
    assert_eq!(6, room.faces.len());
    assert_eq!(1, room.multiplier);
    assert_eq!(Some("Office Program"), room.program.as_deref());

    let south = &room.faces[2];
    assert_eq!(FaceType::Wall, south.face_type);
    assert_eq!(BoundaryCondition::Outdoors, south.boundary_condition);
    assert_eq!(1, south.apertures.len());
    assert!(south.apertures[0].is_operable);

    assert!(matches!(
        &model.constructions[0],
        Construction::Opaque { materials, .. } if materials == &["Concrete 200".to_string()]
    ));
    assert_eq!(24, model.schedules[0].values.len());
    assert_eq!(1, model.schedules[0].timestep);
}

#[test]
fn sample_model_translates() {
    let model = import_model(&data("sample_office.json")).expect("import");
    let params = import_simulation_parameter(&data("simulation_parameter.json")).expect("import");
    let xml = dsbconvert_core::translate(&model, Some(&params), Some("dsbconvert")).expect("translate");
    assert!(xml.contains("<Timestep perHour=\"6\" />"));
    assert!(xml.contains("name=\"Concrete_Wall\""));
    roxmltree::Document::parse(&xml).expect("well-formed");
}

#[test]
fn imports_partial_simulation_parameters() {
    let params = import_simulation_parameter(&data("simulation_parameter.json")).expect("import");
    let resolved = resolve(Some(&params));
    assert_eq!(6, resolved.timestep);
    assert_eq!(6, resolved.run_period.start_month);
    assert_eq!(1, resolved.run_period.start_day);
    assert_eq!(8, resolved.run_period.end_month);
    assert_eq!(ReportingFrequency::Daily, resolved.output.reporting_frequency);
    assert_eq!(TerrainType::Suburbs, resolved.terrain_type);
}

#[test]
fn adjacency_boundary_condition_is_read() {
    let model = parse_model(
        r#"{
            "identifier": "Adjacent",
            "unassigned_rooms": [{
                "identifier": "R",
                "faces": [{
                    "identifier": "F",
                    "face_type": "Wall",
                    "boundary_condition": { "type": "Surface", "adjacent_face": "G" },
                    "geometry": { "boundary": [[0, 0, 0], [1, 0, 0], [1, 0, 1]] }
                }]
            }]
        }"#,
    )
    .expect("parse");
    assert_eq!(
        BoundaryCondition::Surface {
            adjacent_face: "G".to_string()
        },
        model.unassigned_rooms[0].faces[0].boundary_condition
    );
}

#[test]
fn wrong_document_type_is_rejected() {
    let err = parse_model(r#"{ "type": "SimulationParameter", "identifier": "x" }"#)
        .expect_err("wrong type");
    assert!(err.to_string().contains("SimulationParameter"));

    assert!(parse_simulation_parameter("[1, 2, 3]").is_err());
    assert!(parse_model("{ not json").is_err());
}

#[test]
fn missing_file_error_names_the_path() {
    let path = std::env::temp_dir().join("dsbconvert-does-not-exist.json");
    let err = import_model(&path).expect_err("missing");
    assert!(format!("{err:#}").contains("dsbconvert-does-not-exist.json"));
}

#[test]
fn model_written_to_disk_round_trips_through_the_importer() {
    let dir = std::env::temp_dir().join(format!("dsbconvert-import-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("model.json");
    std::fs::write(&path, r#"{ "type": "Model", "identifier": "Empty", "units": "Feet" }"#)
        .expect("write");

    let model = import_model(&path).expect("import");
    assert_eq!("Empty", model.identifier);
    assert_eq!(Units::Feet, model.units);
    assert!(model.stories.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}
