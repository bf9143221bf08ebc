//! Model plus optional simulation parameters in, dsbXML text out.
//!
//! One call runs in phases: resolve the settings, index the model, hand out
//! every geometry name, encode geometry and library entries in traversal
//! order, then assemble. Nothing is returned unless every phase succeeded.

use crate::accessor::{AccessorConfig, BlockNode, FaceIdx, ModelIndex, RoomIdx, ShadeIdx, SubFaceKind};
use crate::assemble::{
    Assembler, BlockFragment, BuildingFragment, LoadFragment, OpeningFragment, ShadeFragment,
    SurfaceFragment, ZoneFragment, ZoneLoadsFragment,
};
use crate::error::{Result, TranslateError};
use crate::geometry::{CoordinateMode, GeometryEncoder, GeometryEntity, StoryFrame, Winding};
use crate::ids::{ExportId, IdAllocator, IdKind};
use crate::library::{LibraryEncoder, ZoneLoads};
use crate::model::{BoundaryCondition, Model};
use crate::report::{TranslationStats, TranslationSummary, Warning};
use crate::simulation::{resolve_with_notes, SimulationParameters, DEFAULTS_VERSION};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct TranslateConfig {
    /// Distance in meters under which two vertices are the same point.
    pub tolerance: f64,
    /// Degrees a face may lean and still count as horizontal or vertical.
    pub angle_tolerance: f64,
    pub max_id_length: usize,
    pub handle_start: u32,
    pub coordinate_mode: CoordinateMode,
    pub story_min_difference: f64,
    /// Decimals written for coordinates and other reals.
    pub coordinate_precision: usize,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            angle_tolerance: 1.0,
            max_id_length: 100,
            handle_start: 100,
            coordinate_mode: CoordinateMode::StoryRelative,
            story_min_difference: 2.0,
            coordinate_precision: 4,
        }
    }
}

impl TranslateConfig {
    fn accessor(&self) -> AccessorConfig {
        AccessorConfig {
            story_min_difference: self.story_min_difference,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub document: String,
    pub summary: TranslationSummary,
}

pub struct Translator {
    cfg: TranslateConfig,
}

impl Translator {
    pub fn new(cfg: TranslateConfig) -> Self {
        Self { cfg }
    }

    pub fn translate(
        &self,
        model: &Model,
        simulation_parameters: Option<&SimulationParameters>,
        program_name: Option<&str>,
    ) -> Result<String> {
        Ok(self
            .translate_with_summary(model, simulation_parameters, program_name)?
            .document)
    }

    pub fn translate_with_summary(
        &self,
        model: &Model,
        simulation_parameters: Option<&SimulationParameters>,
        program_name: Option<&str>,
    ) -> Result<Translation> {
        let (settings, notes) = resolve_with_notes(simulation_parameters);
        let mut warnings: Vec<Warning> = notes
            .into_iter()
            .map(|n| Warning::new("simulation_parameter_adjusted", n))
            .collect();

        let index = ModelIndex::build(model, &self.cfg.accessor())?;
        debug!(
            model = %model.identifier,
            stories = index.stories().count(),
            blocks = index.blocks().len(),
            rooms = index.room_count(),
            "indexed model"
        );

        let mut ids = IdAllocator::new(self.cfg.max_id_length, self.cfg.handle_start);
        let block_ids = allocate_geometry_ids(&index, &mut ids);
        debug!(names = ids.len(), "allocated geometry names");

        let encoder = GeometryEncoder::new(self.tolerance(model), self.cfg.coordinate_mode)
            .with_angle_tolerance(self.cfg.angle_tolerance);
        let mut emitter = Emitter {
            index: &index,
            encoder: &encoder,
            library: LibraryEncoder::new(&index),
            ids,
            stats: TranslationStats::default(),
        };

        let mut blocks = Vec::with_capacity(index.blocks().len());
        for (block, id) in index.blocks().iter().zip(block_ids) {
            blocks.push(emitter.block(block, id)?);
        }
        let mut context_shades = Vec::new();
        for (idx, _) in index.context_shades() {
            context_shades.push(emitter.shade(idx, None)?);
        }

        let building = BuildingFragment {
            model_name: model.display_name().to_string(),
            site: emitter.ids.allocate(&model.identifier, IdKind::Site),
            building: emitter.ids.allocate(&model.identifier, IdKind::Building),
            blocks,
            context_shades,
        };

        let Emitter {
            library,
            mut stats,
            ..
        } = emitter;
        let library = library.finish();
        debug!(
            materials = library.materials.len(),
            constructions = library.constructions.len(),
            schedules = library.schedules.len(),
            merged = library.merged,
            "encoded library"
        );
        for name in &library.defaults_used {
            warn!(construction = %name, "built-in construction used for unassigned geometry");
            warnings.push(Warning::new(
                "default_construction",
                format!("built-in construction '{name}' used where none was assigned"),
            ));
        }

        stats.stories = index.stories().count();
        stats.synthesized_stories = index.stories().filter(|(_, s)| s.synthesized).count();
        stats.blocks = building.blocks.len();
        stats.zones = index.room_count();
        stats.materials = library.materials.len();
        stats.constructions = library.constructions.len();
        stats.schedules = library.schedules.len();
        stats.merged_definitions = library.merged;

        let header = program_name.map(str::trim).filter(|p| !p.is_empty());
        let document = Assembler::new(self.cfg.coordinate_precision).assemble(
            header,
            &settings,
            &building,
            &library,
        )?;
        debug!(bytes = document.len(), "assembled document");

        Ok(Translation {
            document,
            summary: TranslationSummary {
                model: model.identifier.clone(),
                defaults_version: DEFAULTS_VERSION,
                stats,
                warnings,
            },
        })
    }

    /// The configured tolerance, tightened to the model's own when it has one.
    fn tolerance(&self, model: &Model) -> f64 {
        match model.tolerance.map(|t| t * model.units.to_meters()) {
            Some(t) if t.is_finite() && t > 0.0 => t.min(self.cfg.tolerance),
            _ => self.cfg.tolerance,
        }
    }
}

/// Translates with the default configuration.
pub fn translate(
    model: &Model,
    simulation_parameters: Option<&SimulationParameters>,
    program_name: Option<&str>,
) -> Result<String> {
    Translator::new(TranslateConfig::default()).translate(model, simulation_parameters, program_name)
}

/// Names every geometric object up front so adjacency can refer to faces that
/// are encoded later. Returns the block names in block order.
fn allocate_geometry_ids(index: &ModelIndex<'_>, ids: &mut IdAllocator) -> Vec<ExportId> {
    let mut block_ids = Vec::with_capacity(index.blocks().len());
    for (n, block) in index.blocks().iter().enumerate() {
        let native = if ids.lookup(&block.name, IdKind::Block).is_some() {
            format!("{} {}", block.name, n + 1)
        } else {
            block.name.clone()
        };
        block_ids.push(ids.allocate(&native, IdKind::Block));

        for room_idx in &block.rooms {
            let room = index.room(*room_idx);
            ids.allocate(&room.room.identifier, IdKind::Zone);
            for face_idx in &room.faces {
                let face = index.face(*face_idx);
                ids.allocate(&face.face.identifier, IdKind::Surface);
                for (_, sub_face) in index.sub_faces(*face_idx) {
                    ids.allocate(&sub_face.polygon.identifier, IdKind::Opening);
                    for shade in &sub_face.shades {
                        ids.allocate(&index.shade(*shade).polygon.identifier, IdKind::Shade);
                    }
                }
                for shade in &face.shades {
                    ids.allocate(&index.shade(*shade).polygon.identifier, IdKind::Shade);
                }
            }
            for shade in &room.shades {
                ids.allocate(&index.shade(*shade).polygon.identifier, IdKind::Shade);
            }
        }
    }
    for (_, shade) in index.context_shades() {
        ids.allocate(&shade.polygon.identifier, IdKind::Shade);
    }
    block_ids
}

struct Emitter<'a, 'm> {
    index: &'a ModelIndex<'m>,
    encoder: &'a GeometryEncoder,
    library: LibraryEncoder<'a, 'm>,
    ids: IdAllocator,
    stats: TranslationStats,
}

impl<'a, 'm> Emitter<'a, 'm> {
    fn block(&mut self, block: &BlockNode, id: ExportId) -> Result<BlockFragment> {
        let story = self.index.story(block.story);
        let frame = StoryFrame {
            base_elevation: story.base_elevation,
        };
        let mut zones = Vec::with_capacity(block.rooms.len());
        for room in &block.rooms {
            zones.push(self.zone(*room, &frame)?);
        }
        Ok(BlockFragment {
            id,
            title: block.name.clone(),
            elevation: story.base_elevation,
            zones,
        })
    }

    fn zone(&mut self, room_idx: RoomIdx, frame: &StoryFrame) -> Result<ZoneFragment> {
        let index = self.index;
        let room = index.room(room_idx);

        let mut loops = Vec::with_capacity(room.faces.len());
        for face in &room.faces {
            loops.push(self.encoder.validate(&index.face(*face).polygon)?);
        }
        let winding = self.encoder.room_winding(loops.iter().map(Vec::as_slice));
        let plan_extrusion = self.encoder.is_extrusion(loops.iter().map(Vec::as_slice));
        if winding == Winding::Reverse {
            debug!(room = %room.room.identifier, "room is wound inward; reversing its faces");
        }

        let mut surfaces = Vec::with_capacity(room.faces.len());
        for face in &room.faces {
            surfaces.push(self.surface(*face, frame, winding)?);
        }
        let mut shades = Vec::with_capacity(room.shades.len());
        for shade in &room.shades {
            shades.push(self.shade(*shade, Some(frame))?);
        }

        let loads = match &room.room.program {
            Some(program) => {
                let loads = self
                    .library
                    .zone_loads(program, &room.room.identifier, &mut self.ids)?;
                Some(zone_loads_fragment(&loads)?)
            }
            None => None,
        };

        Ok(ZoneFragment {
            id: self.ids.allocate(&room.room.identifier, IdKind::Zone),
            title: room.display_name().to_string(),
            multiplier: room.room.multiplier.max(1),
            plan_extrusion,
            loads,
            surfaces,
            shades,
        })
    }

    fn surface(
        &mut self,
        face_idx: FaceIdx,
        frame: &StoryFrame,
        winding: Winding,
    ) -> Result<SurfaceFragment> {
        let index = self.index;
        let node = index.face(face_idx);
        let face = node.face;

        let geometry = self
            .encoder
            .encode(GeometryEntity::Face(&node.polygon), Some(frame), winding)?;
        if geometry.reversed {
            self.stats.reversed_loops += 1;
        }
        let construction = self.library.face_construction(face, &mut self.ids)?;

        let mut openings = Vec::with_capacity(node.sub_faces.len());
        for (_, sub_face) in index.sub_faces(face_idx) {
            let entity = match sub_face.kind {
                SubFaceKind::Window { .. } => GeometryEntity::Aperture(&sub_face.polygon),
                SubFaceKind::Door { .. } => GeometryEntity::Door(&sub_face.polygon),
            };
            let sub_winding = self
                .encoder
                .sub_face_winding(&geometry.normal, &sub_face.polygon);
            let sub_geometry = self.encoder.encode(entity, Some(frame), sub_winding)?;
            if sub_geometry.reversed {
                self.stats.reversed_loops += 1;
            }
            let construction =
                self.library
                    .sub_face_construction(sub_face, &face.boundary_condition, &mut self.ids)?;
            let mut shades = Vec::with_capacity(sub_face.shades.len());
            for shade in &sub_face.shades {
                shades.push(self.shade(*shade, Some(frame))?);
            }
            self.stats.openings += 1;
            openings.push(OpeningFragment {
                id: self
                    .ids
                    .allocate(&sub_face.polygon.identifier, IdKind::Opening),
                title: sub_face.display_name.to_string(),
                operable: matches!(sub_face.kind, SubFaceKind::Window { is_operable: true }),
                construction,
                geometry: sub_geometry,
                shades,
            });
        }

        let mut shades = Vec::with_capacity(node.shades.len());
        for shade in &node.shades {
            shades.push(self.shade(*shade, Some(frame))?);
        }

        let adjacent = match &face.boundary_condition {
            BoundaryCondition::Surface { adjacent_face } => Some(
                self.ids
                    .lookup(adjacent_face, IdKind::Surface)
                    .map(|id| id.name.clone())
                    .ok_or_else(|| {
                        TranslateError::dangling("Face", adjacent_face, &face.identifier)
                    })?,
            ),
            BoundaryCondition::Outdoors | BoundaryCondition::Ground | BoundaryCondition::Adiabatic => {
                None
            }
        };

        self.stats.surfaces += 1;
        Ok(SurfaceFragment {
            id: self.ids.allocate(&face.identifier, IdKind::Surface),
            title: node.display_name().to_string(),
            face_type: face.face_type.name(),
            boundary: face.boundary_condition.name(),
            adjacent,
            construction,
            geometry,
            openings,
            shades,
        })
    }

    fn shade(&mut self, idx: ShadeIdx, frame: Option<&StoryFrame>) -> Result<ShadeFragment> {
        let shade = self.index.shade(idx);
        let geometry = self
            .encoder
            .encode(GeometryEntity::Shade(&shade.polygon), frame, Winding::Keep)?;
        let construction = self.library.shade_construction(shade, &mut self.ids)?;
        let transmittance_schedule = match &shade.transmittance_schedule {
            Some(schedule) => Some(self.library.schedule(
                schedule,
                &shade.polygon.identifier,
                &mut self.ids,
            )?),
            None => None,
        };
        self.stats.shades += 1;
        Ok(ShadeFragment {
            id: self.ids.allocate(&shade.polygon.identifier, IdKind::Shade),
            title: shade.display_name.clone(),
            construction,
            transmittance_schedule,
            detached: shade.is_detached,
            geometry,
        })
    }
}

fn zone_loads_fragment(loads: &ZoneLoads<'_>) -> Result<ZoneLoadsFragment> {
    let program = loads.program;
    let schedule = |id: &str| -> Result<String> {
        loads
            .schedules
            .get(id)
            .cloned()
            .ok_or_else(|| TranslateError::dangling("Schedule", id, &program.identifier))
    };

    let mut out = Vec::new();
    if let Some(people) = &program.people {
        let mut schedules = vec![("occupancySchedule", schedule(&people.occupancy_schedule)?)];
        if let Some(activity) = &people.activity_schedule {
            schedules.push(("activitySchedule", schedule(activity)?));
        }
        out.push(LoadFragment {
            element: "People",
            magnitude: Some(("peoplePerArea", people.people_per_area)),
            schedules,
        });
    }
    if let Some(lighting) = &program.lighting {
        out.push(LoadFragment {
            element: "Lighting",
            magnitude: Some(("wattsPerArea", lighting.watts_per_area)),
            schedules: vec![("schedule", schedule(&lighting.schedule)?)],
        });
    }
    if let Some(equipment) = &program.electric_equipment {
        out.push(LoadFragment {
            element: "Equipment",
            magnitude: Some(("wattsPerArea", equipment.watts_per_area)),
            schedules: vec![("schedule", schedule(&equipment.schedule)?)],
        });
    }
    if let Some(infiltration) = &program.infiltration {
        out.push(LoadFragment {
            element: "Infiltration",
            magnitude: Some(("flowPerExteriorArea", infiltration.flow_per_exterior_area)),
            schedules: vec![("schedule", schedule(&infiltration.schedule)?)],
        });
    }
    if let Some(setpoint) = &program.setpoint {
        out.push(LoadFragment {
            element: "Setpoint",
            magnitude: None,
            schedules: vec![
                ("heatingSchedule", schedule(&setpoint.heating_schedule)?),
                ("coolingSchedule", schedule(&setpoint.cooling_schedule)?),
            ],
        });
    }

    Ok(ZoneLoadsFragment {
        program: program
            .display_name
            .clone()
            .unwrap_or_else(|| program.identifier.clone()),
        loads: out,
    })
}
