//! Construction, material and schedule library.
//!
//! Only definitions that exported geometry actually uses are collected.
//! Definitions that are structurally identical share one exported entry; the
//! first one seen names it.

use crate::accessor::{ModelIndex, ShadeNode, ShadeParent, SubFaceKind, SubFaceNode};
use crate::error::{Result, TranslateError};
use crate::ids::{ExportId, IdAllocator, IdKind};
use crate::model::{
    BoundaryCondition, Construction, Face, FaceType, Material, ProgramType, Roughness, Schedule,
};
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialEntry {
    pub id: ExportId,
    pub source: String,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionEntry {
    pub id: ExportId,
    pub source: String,
    pub construction: Construction,
    /// Exported material names, outside to inside.
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub id: ExportId,
    pub source: String,
    pub schedule: Schedule,
}

#[derive(Debug, Clone, Default)]
pub struct LibraryFragment {
    pub materials: Vec<MaterialEntry>,
    pub constructions: Vec<ConstructionEntry>,
    pub schedules: Vec<ScheduleEntry>,
    /// Definitions folded into an identical earlier entry.
    pub merged: usize,
    /// Built-in constructions that stood in for missing assignments.
    pub defaults_used: Vec<String>,
}

/// Exported names of the schedules a zone's program points at.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLoads<'m> {
    pub program: &'m ProgramType,
    pub schedules: HashMap<&'m str, String>,
}

/// Where a definition came from. Built-ins and model definitions never share
/// an entry by id alone, only through an equal structural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Source {
    Model(String),
    Builtin(String),
}

impl Source {
    fn native(&self) -> &str {
        match self {
            Source::Model(id) | Source::Builtin(id) => id,
        }
    }

    /// Same origin, different id.
    fn sibling(&self, id: &str) -> Source {
        match self {
            Source::Model(_) => Source::Model(id.to_string()),
            Source::Builtin(_) => Source::Builtin(id.to_string()),
        }
    }

    fn allocate(&self, ids: &mut IdAllocator, kind: IdKind) -> ExportId {
        match self {
            Source::Model(id) => ids.allocate(id, kind),
            Source::Builtin(id) => ids.allocate_unbound(id, kind),
        }
    }
}

pub struct LibraryEncoder<'a, 'm> {
    index: &'a ModelIndex<'m>,
    defaults: DefaultLibrary,
    fragment: LibraryFragment,
    material_keys: HashMap<String, usize>,
    material_by_source: HashMap<Source, usize>,
    construction_keys: HashMap<String, usize>,
    construction_by_source: HashMap<Source, usize>,
    schedule_keys: HashMap<String, usize>,
    schedule_by_id: HashMap<String, usize>,
    defaults_used: BTreeSet<String>,
}

impl<'a, 'm> LibraryEncoder<'a, 'm> {
    pub fn new(index: &'a ModelIndex<'m>) -> Self {
        Self {
            index,
            defaults: DefaultLibrary::generic(),
            fragment: LibraryFragment::default(),
            material_keys: HashMap::new(),
            material_by_source: HashMap::new(),
            construction_keys: HashMap::new(),
            construction_by_source: HashMap::new(),
            schedule_keys: HashMap::new(),
            schedule_by_id: HashMap::new(),
            defaults_used: BTreeSet::new(),
        }
    }

    pub fn face_construction(&mut self, face: &Face, ids: &mut IdAllocator) -> Result<String> {
        match &face.construction {
            Some(id) => self.model_construction(id, &face.identifier, ids),
            None => {
                let name = default_face_construction(face.face_type, &face.boundary_condition);
                self.default_construction(name, ids)
            }
        }
    }

    pub fn sub_face_construction(
        &mut self,
        sub_face: &SubFaceNode<'_>,
        parent_boundary: &BoundaryCondition,
        ids: &mut IdAllocator,
    ) -> Result<String> {
        if let Some(id) = sub_face.construction {
            return self.model_construction(id, &sub_face.polygon.identifier, ids);
        }
        let interior = matches!(parent_boundary, BoundaryCondition::Surface { .. });
        let name = match (sub_face.kind, interior) {
            (SubFaceKind::Window { .. } | SubFaceKind::Door { is_glass: true }, false) => {
                "Generic Double Pane"
            }
            (SubFaceKind::Window { .. } | SubFaceKind::Door { is_glass: true }, true) => {
                "Generic Single Pane"
            }
            (SubFaceKind::Door { is_glass: false }, false) => "Generic Exterior Door",
            (SubFaceKind::Door { is_glass: false }, true) => "Generic Interior Door",
        };
        self.default_construction(name, ids)
    }

    pub fn shade_construction(&mut self, shade: &ShadeNode, ids: &mut IdAllocator) -> Result<String> {
        if let Some(id) = &shade.construction {
            return self.model_construction(id, &shade.polygon.identifier, ids);
        }
        let name = match shade.parent {
            ShadeParent::Context => "Generic Context",
            ShadeParent::Room(_) | ShadeParent::Face(_) | ShadeParent::SubFace(_) => {
                "Generic Shade"
            }
        };
        self.default_construction(name, ids)
    }

    pub fn schedule(&mut self, id: &str, owner: &str, ids: &mut IdAllocator) -> Result<String> {
        if let Some(&i) = self.schedule_by_id.get(id) {
            return Ok(self.fragment.schedules[i].id.name.clone());
        }
        let schedule = self
            .index
            .schedule(id)
            .ok_or_else(|| TranslateError::dangling("Schedule", id, owner))?;
        let key = schedule_key(schedule);
        let i = match self.schedule_keys.get(&key) {
            Some(&i) => {
                self.fragment.merged += 1;
                debug!(schedule = id, into = %self.fragment.schedules[i].source, "merged identical schedule");
                i
            }
            None => {
                let i = self.fragment.schedules.len();
                self.fragment.schedules.push(ScheduleEntry {
                    id: ids.allocate(id, IdKind::Schedule),
                    source: id.to_string(),
                    schedule: schedule.clone(),
                });
                self.schedule_keys.insert(key, i);
                i
            }
        };
        self.schedule_by_id.insert(id.to_string(), i);
        Ok(self.fragment.schedules[i].id.name.clone())
    }

    /// Registers every schedule of a room's program and returns their names.
    pub fn zone_loads(
        &mut self,
        program_id: &str,
        owner: &str,
        ids: &mut IdAllocator,
    ) -> Result<ZoneLoads<'m>> {
        let program = self
            .index
            .program(program_id)
            .ok_or_else(|| TranslateError::dangling("ProgramType", program_id, owner))?;
        let mut schedules = HashMap::new();
        for schedule in program.schedule_ids() {
            let name = self.schedule(schedule, &program.identifier, ids)?;
            schedules.insert(schedule, name);
        }
        Ok(ZoneLoads { program, schedules })
    }

    pub fn finish(mut self) -> LibraryFragment {
        self.fragment.defaults_used = self.defaults_used.into_iter().collect();
        self.fragment
    }

    fn model_construction(&mut self, id: &str, owner: &str, ids: &mut IdAllocator) -> Result<String> {
        let source = Source::Model(id.to_string());
        if let Some(&i) = self.construction_by_source.get(&source) {
            return Ok(self.fragment.constructions[i].id.name.clone());
        }
        let construction = self
            .index
            .construction(id)
            .ok_or_else(|| TranslateError::dangling("Construction", id, owner))?;
        let mut materials = Vec::with_capacity(construction.materials().len());
        for m in construction.materials() {
            let material = self
                .index
                .material(m)
                .ok_or_else(|| TranslateError::dangling("Material", m, id))?;
            materials.push(material.clone());
        }
        self.register_construction(source, construction.clone(), materials, ids)
    }

    fn default_construction(&mut self, name: &str, ids: &mut IdAllocator) -> Result<String> {
        let source = Source::Builtin(name.to_string());
        if let Some(&i) = self.construction_by_source.get(&source) {
            self.defaults_used.insert(name.to_string());
            return Ok(self.fragment.constructions[i].id.name.clone());
        }
        let construction = self
            .defaults
            .constructions
            .iter()
            .find(|c| c.identifier() == name)
            .cloned()
            .ok_or_else(|| TranslateError::assembly(format!("no built-in construction '{name}'")))?;
        let mut materials = Vec::new();
        for m in construction.materials() {
            let material = self
                .defaults
                .materials
                .iter()
                .find(|mat| mat.identifier() == m)
                .cloned()
                .ok_or_else(|| TranslateError::assembly(format!("no built-in material '{m}'")))?;
            materials.push(material);
        }
        self.defaults_used.insert(name.to_string());
        self.register_construction(source, construction, materials, ids)
    }

    fn register_construction(
        &mut self,
        source: Source,
        construction: Construction,
        materials: Vec<Material>,
        ids: &mut IdAllocator,
    ) -> Result<String> {
        let key = construction_key(&construction, &materials);
        if let Some(&i) = self.construction_keys.get(&key) {
            self.fragment.merged += 1;
            debug!(construction = %source.native(), into = %self.fragment.constructions[i].source, "merged identical construction");
            self.construction_by_source.insert(source, i);
            return Ok(self.fragment.constructions[i].id.name.clone());
        }

        let layers = materials
            .into_iter()
            .map(|m| {
                let material_source = source.sibling(m.identifier());
                self.register_material(material_source, m, ids)
            })
            .collect();
        let i = self.fragment.constructions.len();
        self.fragment.constructions.push(ConstructionEntry {
            id: source.allocate(ids, IdKind::Construction),
            source: source.native().to_string(),
            construction,
            layers,
        });
        self.construction_keys.insert(key, i);
        self.construction_by_source.insert(source, i);
        Ok(self.fragment.constructions[i].id.name.clone())
    }

    fn register_material(&mut self, source: Source, material: Material, ids: &mut IdAllocator) -> String {
        if let Some(&i) = self.material_by_source.get(&source) {
            return self.fragment.materials[i].id.name.clone();
        }
        let key = material_key(&material);
        let i = match self.material_keys.get(&key) {
            Some(&i) => {
                self.fragment.merged += 1;
                i
            }
            None => {
                let i = self.fragment.materials.len();
                self.fragment.materials.push(MaterialEntry {
                    id: source.allocate(ids, IdKind::Material),
                    source: source.native().to_string(),
                    material,
                });
                self.material_keys.insert(key, i);
                i
            }
        };
        self.material_by_source.insert(source, i);
        self.fragment.materials[i].id.name.clone()
    }
}

pub fn default_face_construction(face_type: FaceType, boundary: &BoundaryCondition) -> &'static str {
    use BoundaryCondition as Bc;
    match (face_type, boundary) {
        (FaceType::AirBoundary, _) => "Generic Air Boundary",
        (FaceType::Wall, Bc::Outdoors) => "Generic Exterior Wall",
        (FaceType::Wall, Bc::Ground) => "Generic Underground Wall",
        (FaceType::Wall, Bc::Adiabatic | Bc::Surface { .. }) => "Generic Interior Wall",
        (FaceType::Floor, Bc::Outdoors) => "Generic Exposed Floor",
        (FaceType::Floor, Bc::Ground) => "Generic Ground Slab",
        (FaceType::Floor, Bc::Adiabatic | Bc::Surface { .. }) => "Generic Interior Floor",
        (FaceType::RoofCeiling, Bc::Outdoors) => "Generic Roof",
        (FaceType::RoofCeiling, Bc::Ground) => "Generic Underground Roof",
        (FaceType::RoofCeiling, Bc::Adiabatic | Bc::Surface { .. }) => "Generic Interior Ceiling",
    }
}

fn num(v: f64) -> String {
    let s = format!("{v:.6}");
    if s == "-0.000000" {
        "0.000000".to_string()
    } else {
        s
    }
}

pub fn material_key(material: &Material) -> String {
    match material {
        Material::Opaque {
            thickness,
            conductivity,
            density,
            specific_heat,
            roughness,
            thermal_absorptance,
            solar_absorptance,
            visible_absorptance,
            ..
        } => format!(
            "opaque|{}|{}|{}|{}|{}|{}|{}|{}",
            num(*thickness),
            num(*conductivity),
            num(*density),
            num(*specific_heat),
            roughness.name(),
            num(*thermal_absorptance),
            num(*solar_absorptance),
            num(*visible_absorptance)
        ),
        Material::NoMass {
            r_value,
            roughness,
            thermal_absorptance,
            solar_absorptance,
            visible_absorptance,
            ..
        } => format!(
            "nomass|{}|{}|{}|{}|{}",
            num(*r_value),
            roughness.name(),
            num(*thermal_absorptance),
            num(*solar_absorptance),
            num(*visible_absorptance)
        ),
        Material::SimpleGlazing {
            u_factor, shgc, vt, ..
        } => format!("glazing|{}|{}|{}", num(*u_factor), num(*shgc), num(*vt)),
    }
}

pub fn construction_key(construction: &Construction, materials: &[Material]) -> String {
    let layers = || materials.iter().map(material_key).join(";");
    match construction {
        Construction::Opaque { .. } => format!("opaque[{}]", layers()),
        Construction::Window { .. } => format!("window[{}]", layers()),
        Construction::Shade {
            solar_reflectance,
            visible_reflectance,
            is_specular,
            ..
        } => format!(
            "shade|{}|{}|{}",
            num(*solar_reflectance),
            num(*visible_reflectance),
            is_specular
        ),
    }
}

pub fn schedule_key(schedule: &Schedule) -> String {
    format!(
        "{}|{}|{}",
        schedule.schedule_type.name(),
        schedule.timestep,
        schedule.values.iter().map(|v| num(*v)).join(",")
    )
}

/// Generic constructions used when a surface has none assigned.
pub struct DefaultLibrary {
    pub materials: Vec<Material>,
    pub constructions: Vec<Construction>,
}

impl DefaultLibrary {
    pub fn generic() -> Self {
        let opaque = |id: &str, thickness, conductivity, density, specific_heat, solar: f64| {
            Material::Opaque {
                identifier: id.to_string(),
                thickness,
                conductivity,
                density,
                specific_heat,
                roughness: Roughness::MediumRough,
                thermal_absorptance: 0.9,
                solar_absorptance: solar,
                visible_absorptance: solar,
            }
        };
        let materials = vec![
            opaque("Generic Brick", 0.1, 0.9, 1920.0, 790.0, 0.65),
            opaque("Generic LW Concrete", 0.1, 0.53, 1280.0, 840.0, 0.8),
            opaque("Generic HW Concrete", 0.2, 1.95, 2240.0, 900.0, 0.8),
            opaque("Generic 50mm Insulation", 0.05, 0.03, 43.0, 1210.0, 0.7),
            opaque("Generic Gypsum Board", 0.0127, 0.16, 800.0, 1090.0, 0.5),
            opaque("Generic Wall Air Gap", 0.1, 0.667, 1.28, 1000.0, 0.7),
            opaque("Generic Ceiling Air Gap", 0.1, 0.556, 1.28, 1000.0, 0.7),
            opaque("Generic Roof Membrane", 0.01, 0.16, 1120.0, 1460.0, 0.65),
            opaque("Generic Acoustic Tile", 0.02, 0.06, 368.0, 590.0, 0.2),
            opaque("Generic 25mm Wood", 0.0254, 0.15, 608.0, 1630.0, 0.5),
            opaque("Generic Painted Metal", 0.0015, 45.0, 7690.0, 410.0, 0.5),
            Material::NoMass {
                identifier: "Generic Air Boundary Material".to_string(),
                r_value: 0.001,
                roughness: Roughness::Smooth,
                thermal_absorptance: 0.9,
                solar_absorptance: 0.7,
                visible_absorptance: 0.7,
            },
            Material::SimpleGlazing {
                identifier: "Generic Double Pane Glazing".to_string(),
                u_factor: 1.8,
                shgc: 0.4,
                vt: 0.6,
            },
            Material::SimpleGlazing {
                identifier: "Generic Single Pane Glazing".to_string(),
                u_factor: 5.8,
                shgc: 0.8,
                vt: 0.88,
            },
        ];

        let layered = |id: &str, layers: &[&str]| Construction::Opaque {
            identifier: id.to_string(),
            materials: layers.iter().map(|l| l.to_string()).collect(),
        };
        let window = |id: &str, glazing: &str| Construction::Window {
            identifier: id.to_string(),
            materials: vec![glazing.to_string()],
        };
        let shade = |id: &str, reflectance: f64| Construction::Shade {
            identifier: id.to_string(),
            solar_reflectance: reflectance,
            visible_reflectance: reflectance,
            is_specular: false,
        };
        let constructions = vec![
            layered(
                "Generic Exterior Wall",
                &[
                    "Generic Brick",
                    "Generic LW Concrete",
                    "Generic 50mm Insulation",
                    "Generic Wall Air Gap",
                    "Generic Gypsum Board",
                ],
            ),
            layered(
                "Generic Interior Wall",
                &["Generic Gypsum Board", "Generic Wall Air Gap", "Generic Gypsum Board"],
            ),
            layered(
                "Generic Underground Wall",
                &[
                    "Generic 50mm Insulation",
                    "Generic HW Concrete",
                    "Generic Wall Air Gap",
                    "Generic Gypsum Board",
                ],
            ),
            layered(
                "Generic Exposed Floor",
                &[
                    "Generic Painted Metal",
                    "Generic Ceiling Air Gap",
                    "Generic 50mm Insulation",
                    "Generic LW Concrete",
                ],
            ),
            layered(
                "Generic Interior Floor",
                &["Generic Acoustic Tile", "Generic Ceiling Air Gap", "Generic LW Concrete"],
            ),
            layered(
                "Generic Ground Slab",
                &["Generic 50mm Insulation", "Generic HW Concrete"],
            ),
            layered(
                "Generic Roof",
                &[
                    "Generic Roof Membrane",
                    "Generic 50mm Insulation",
                    "Generic LW Concrete",
                    "Generic Ceiling Air Gap",
                    "Generic Acoustic Tile",
                ],
            ),
            layered(
                "Generic Interior Ceiling",
                &["Generic LW Concrete", "Generic Ceiling Air Gap", "Generic Acoustic Tile"],
            ),
            layered(
                "Generic Underground Roof",
                &[
                    "Generic 50mm Insulation",
                    "Generic HW Concrete",
                    "Generic Ceiling Air Gap",
                    "Generic Acoustic Tile",
                ],
            ),
            layered("Generic Air Boundary", &["Generic Air Boundary Material"]),
            layered(
                "Generic Exterior Door",
                &["Generic Painted Metal", "Generic 25mm Wood"],
            ),
            layered("Generic Interior Door", &["Generic 25mm Wood"]),
            window("Generic Double Pane", "Generic Double Pane Glazing"),
            window("Generic Single Pane", "Generic Single Pane Glazing"),
            shade("Generic Shade", 0.35),
            shade("Generic Context", 0.2),
        ];

        Self {
            materials,
            constructions,
        }
    }
}
