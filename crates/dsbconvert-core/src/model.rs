use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Units {
    #[default]
    Meters,
    Millimeters,
    Centimeters,
    Feet,
    Inches,
}

impl Units {
    /// Factor that converts a length in these units to meters.
    pub fn to_meters(self) -> f64 {
        match self {
            Units::Meters => 1.0,
            Units::Millimeters => 0.001,
            Units::Centimeters => 0.01,
            Units::Feet => 0.3048,
            Units::Inches => 0.0254,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Face3D {
    pub boundary: Vec<[f64; 3]>,
}

impl Face3D {
    pub fn new(boundary: Vec<[f64; 3]>) -> Self {
        Self { boundary }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceType {
    Wall,
    Floor,
    RoofCeiling,
    AirBoundary,
}

impl FaceType {
    pub fn name(self) -> &'static str {
        match self {
            FaceType::Wall => "Wall",
            FaceType::Floor => "Floor",
            FaceType::RoofCeiling => "RoofCeiling",
            FaceType::AirBoundary => "AirBoundary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryCondition {
    Outdoors,
    Ground,
    Adiabatic,
    Surface { adjacent_face: String },
}

impl BoundaryCondition {
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryCondition::Outdoors => "Outdoors",
            BoundaryCondition::Ground => "Ground",
            BoundaryCondition::Adiabatic => "Adiabatic",
            BoundaryCondition::Surface { .. } => "Surface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shade {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub geometry: Face3D,
    #[serde(default)]
    pub construction: Option<String>,
    #[serde(default)]
    pub transmittance_schedule: Option<String>,
    #[serde(default)]
    pub is_detached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadeMesh {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<Vec<usize>>,
    #[serde(default)]
    pub construction: Option<String>,
    #[serde(default = "default_true")]
    pub is_detached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aperture {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub geometry: Face3D,
    #[serde(default)]
    pub construction: Option<String>,
    #[serde(default)]
    pub is_operable: bool,
    #[serde(default)]
    pub shades: Vec<Shade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub geometry: Face3D,
    #[serde(default)]
    pub construction: Option<String>,
    #[serde(default)]
    pub is_glass: bool,
    #[serde(default)]
    pub shades: Vec<Shade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub face_type: FaceType,
    pub boundary_condition: BoundaryCondition,
    pub geometry: Face3D,
    #[serde(default)]
    pub construction: Option<String>,
    #[serde(default)]
    pub apertures: Vec<Aperture>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub shades: Vec<Shade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
    pub faces: Vec<Face>,
    #[serde(default)]
    pub shades: Vec<Shade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub floor_height: Option<f64>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Roughness {
    VeryRough,
    Rough,
    #[default]
    MediumRough,
    MediumSmooth,
    Smooth,
    VerySmooth,
}

impl Roughness {
    pub fn name(self) -> &'static str {
        match self {
            Roughness::VeryRough => "VeryRough",
            Roughness::Rough => "Rough",
            Roughness::MediumRough => "MediumRough",
            Roughness::MediumSmooth => "MediumSmooth",
            Roughness::Smooth => "Smooth",
            Roughness::VerySmooth => "VerySmooth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Material {
    #[serde(rename = "EnergyMaterial")]
    Opaque {
        identifier: String,
        thickness: f64,
        conductivity: f64,
        density: f64,
        specific_heat: f64,
        #[serde(default)]
        roughness: Roughness,
        #[serde(default = "default_absorptance")]
        thermal_absorptance: f64,
        #[serde(default = "default_solar_absorptance")]
        solar_absorptance: f64,
        #[serde(default = "default_solar_absorptance")]
        visible_absorptance: f64,
    },
    #[serde(rename = "EnergyMaterialNoMass")]
    NoMass {
        identifier: String,
        r_value: f64,
        #[serde(default)]
        roughness: Roughness,
        #[serde(default = "default_absorptance")]
        thermal_absorptance: f64,
        #[serde(default = "default_solar_absorptance")]
        solar_absorptance: f64,
        #[serde(default = "default_solar_absorptance")]
        visible_absorptance: f64,
    },
    #[serde(rename = "EnergyWindowMaterialSimpleGlazSys")]
    SimpleGlazing {
        identifier: String,
        u_factor: f64,
        shgc: f64,
        #[serde(default = "default_vt")]
        vt: f64,
    },
}

impl Material {
    pub fn identifier(&self) -> &str {
        match self {
            Material::Opaque { identifier, .. }
            | Material::NoMass { identifier, .. }
            | Material::SimpleGlazing { identifier, .. } => identifier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Construction {
    #[serde(rename = "OpaqueConstruction")]
    Opaque {
        identifier: String,
        materials: Vec<String>,
    },
    #[serde(rename = "WindowConstruction")]
    Window {
        identifier: String,
        materials: Vec<String>,
    },
    #[serde(rename = "ShadeConstruction")]
    Shade {
        identifier: String,
        #[serde(default = "default_shade_reflectance")]
        solar_reflectance: f64,
        #[serde(default = "default_shade_reflectance")]
        visible_reflectance: f64,
        #[serde(default)]
        is_specular: bool,
    },
}

impl Construction {
    pub fn identifier(&self) -> &str {
        match self {
            Construction::Opaque { identifier, .. }
            | Construction::Window { identifier, .. }
            | Construction::Shade { identifier, .. } => identifier,
        }
    }

    /// Material layers from outside to inside. Shade constructions have none.
    pub fn materials(&self) -> &[String] {
        match self {
            Construction::Opaque { materials, .. } | Construction::Window { materials, .. } => {
                materials
            }
            Construction::Shade { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScheduleType {
    #[default]
    Fraction,
    Temperature,
    OnOff,
    ActivityLevel,
    Dimensionless,
}

impl ScheduleType {
    pub fn name(self) -> &'static str {
        match self {
            ScheduleType::Fraction => "Fraction",
            ScheduleType::Temperature => "Temperature",
            ScheduleType::OnOff => "OnOff",
            ScheduleType::ActivityLevel => "ActivityLevel",
            ScheduleType::Dimensionless => "Dimensionless",
        }
    }
}

/// Interval schedule. With a timestep of 1, 24 values repeat daily, 168 repeat
/// weekly (Mon-Sun) and 8760 cover a full year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    #[serde(default = "default_schedule_timestep")]
    pub timestep: u32,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct People {
    pub people_per_area: f64,
    pub occupancy_schedule: String,
    #[serde(default)]
    pub activity_schedule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    pub watts_per_area: f64,
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricEquipment {
    pub watts_per_area: f64,
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Infiltration {
    pub flow_per_exterior_area: f64,
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    pub heating_schedule: String,
    pub cooling_schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramType {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub people: Option<People>,
    #[serde(default)]
    pub lighting: Option<Lighting>,
    #[serde(default)]
    pub electric_equipment: Option<ElectricEquipment>,
    #[serde(default)]
    pub infiltration: Option<Infiltration>,
    #[serde(default)]
    pub setpoint: Option<Setpoint>,
}

impl ProgramType {
    /// Every schedule id this program points at, in a fixed order.
    pub fn schedule_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        if let Some(people) = &self.people {
            ids.push(people.occupancy_schedule.as_str());
            if let Some(activity) = &people.activity_schedule {
                ids.push(activity.as_str());
            }
        }
        if let Some(lighting) = &self.lighting {
            ids.push(lighting.schedule.as_str());
        }
        if let Some(equipment) = &self.electric_equipment {
            ids.push(equipment.schedule.as_str());
        }
        if let Some(infiltration) = &self.infiltration {
            ids.push(infiltration.schedule.as_str());
        }
        if let Some(setpoint) = &self.setpoint {
            ids.push(setpoint.heating_schedule.as_str());
            ids.push(setpoint.cooling_schedule.as_str());
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default)]
    pub unassigned_rooms: Vec<Room>,
    #[serde(default)]
    pub shades: Vec<Shade>,
    #[serde(default)]
    pub shade_meshes: Vec<ShadeMesh>,
    #[serde(default)]
    pub orphaned_faces: Vec<Face>,
    #[serde(default)]
    pub orphaned_apertures: Vec<Aperture>,
    #[serde(default)]
    pub orphaned_doors: Vec<Door>,
    #[serde(default)]
    pub constructions: Vec<Construction>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub programs: Vec<ProgramType>,
}

impl Model {
    /// An empty model in meters.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: None,
            units: Units::Meters,
            tolerance: None,
            stories: Vec::new(),
            unassigned_rooms: Vec::new(),
            shades: Vec::new(),
            shade_meshes: Vec::new(),
            orphaned_faces: Vec::new(),
            orphaned_apertures: Vec::new(),
            orphaned_doors: Vec::new(),
            constructions: Vec::new(),
            materials: Vec::new(),
            schedules: Vec::new(),
            programs: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }
}

fn default_true() -> bool {
    true
}

fn default_multiplier() -> u32 {
    1
}

fn default_absorptance() -> f64 {
    0.9
}

fn default_solar_absorptance() -> f64 {
    0.7
}

fn default_vt() -> f64 {
    0.6
}

fn default_shade_reflectance() -> f64 {
    0.2
}

fn default_schedule_timestep() -> u32 {
    1
}
