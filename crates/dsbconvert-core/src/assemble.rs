//! Puts the encoded fragments into one dsbXML document.
//!
//! Section order is fixed: simulation settings, then the library, then the
//! site geometry. The library comes first because geometry refers to its
//! entries by name.

use crate::error::{Result, TranslateError};
use crate::geometry::{FragmentKind, GeometryFragment};
use crate::ids::ExportId;
use crate::library::LibraryFragment;
use crate::model::{Construction, Material};
use crate::simulation::{ResolvedSimulationParameters, DEFAULTS_VERSION};
use crate::xml::{fmt_num, Document, Element};
use std::collections::HashSet;

/// DesignBuilder release the emitted documents target.
pub const DESIGNBUILDER_VERSION: &str = "2025.1.0.085";

#[derive(Debug, Clone, PartialEq)]
pub struct ShadeFragment {
    pub id: ExportId,
    pub title: String,
    pub construction: String,
    pub transmittance_schedule: Option<String>,
    pub detached: bool,
    pub geometry: GeometryFragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpeningFragment {
    pub id: ExportId,
    pub title: String,
    pub operable: bool,
    pub construction: String,
    pub geometry: GeometryFragment,
    pub shades: Vec<ShadeFragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFragment {
    pub id: ExportId,
    pub title: String,
    pub face_type: &'static str,
    pub boundary: &'static str,
    pub adjacent: Option<String>,
    pub construction: String,
    pub geometry: GeometryFragment,
    pub openings: Vec<OpeningFragment>,
    pub shades: Vec<ShadeFragment>,
}

/// One load line of a zone: a magnitude and the schedules driving it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFragment {
    pub element: &'static str,
    pub magnitude: Option<(&'static str, f64)>,
    pub schedules: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLoadsFragment {
    pub program: String,
    pub loads: Vec<LoadFragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFragment {
    pub id: ExportId,
    pub title: String,
    pub multiplier: u32,
    /// The room is an extruded floor plate.
    pub plan_extrusion: bool,
    pub loads: Option<ZoneLoadsFragment>,
    pub surfaces: Vec<SurfaceFragment>,
    pub shades: Vec<ShadeFragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockFragment {
    pub id: ExportId,
    pub title: String,
    pub elevation: f64,
    pub zones: Vec<ZoneFragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingFragment {
    pub model_name: String,
    pub site: ExportId,
    pub building: ExportId,
    pub blocks: Vec<BlockFragment>,
    pub context_shades: Vec<ShadeFragment>,
}

impl BuildingFragment {
    fn all_shades(&self) -> Vec<&ShadeFragment> {
        let mut out: Vec<&ShadeFragment> = self.context_shades.iter().collect();
        for zone in self.blocks.iter().flat_map(|b| &b.zones) {
            out.extend(&zone.shades);
            for surface in &zone.surfaces {
                out.extend(&surface.shades);
                for opening in &surface.openings {
                    out.extend(&opening.shades);
                }
            }
        }
        out
    }
}

pub struct Assembler {
    precision: usize,
}

impl Assembler {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    pub fn assemble(
        &self,
        header_comment: Option<&str>,
        settings: &ResolvedSimulationParameters,
        building: &BuildingFragment,
        library: &LibraryFragment,
    ) -> Result<String> {
        check_references(building, library)?;

        let root = Element::new("dsbXML")
            .attr("name", format!("~{}", building.model_name))
            .attr("version", DESIGNBUILDER_VERSION)
            .attr("objects", "all")
            .child(self.settings_element(settings))
            .child(self.library_element(library))
            .child(self.site_element(building));

        let doc = Document {
            comment: header_comment.map(|p| format!("File generated by {p}")),
            root,
        };
        Ok(doc.to_xml())
    }

    fn num(&self, v: f64) -> String {
        fmt_num(v, self.precision)
    }

    fn settings_element(&self, s: &ResolvedSimulationParameters) -> Element {
        let mut run_period = Element::new("RunPeriod")
            .attr("startMonth", s.run_period.start_month.to_string())
            .attr("startDay", s.run_period.start_day.to_string())
            .attr("endMonth", s.run_period.end_month.to_string())
            .attr("endDay", s.run_period.end_day.to_string())
            .attr("startDayOfWeek", s.run_period.start_day_of_week.name())
            .attr("daylightSaving", flag(s.run_period.daylight_saving));
        for holiday in &s.run_period.holidays {
            run_period.push(
                Element::new("Holiday")
                    .attr("month", holiday.month.to_string())
                    .attr("day", holiday.day.to_string()),
            );
        }

        let mut outputs = Element::new("Outputs")
            .attr("reportingFrequency", s.output.reporting_frequency.name())
            .attr("sqlite", flag(s.output.include_sqlite))
            .attr("html", flag(s.output.include_html));
        for report in &s.output.summary_reports {
            outputs.push(Element::new("SummaryReport").attr("name", report.as_str()));
        }
        for output in &s.output.outputs {
            outputs.push(Element::new("Output").attr("name", output.as_str()));
        }

        Element::new("SimulationSettings")
            .attr("defaultsVersion", DEFAULTS_VERSION.to_string())
            .child(run_period)
            .child(Element::new("Timestep").attr("perHour", s.timestep.to_string()))
            .child(
                Element::new("SimulationControl")
                    .attr("zoneSizing", flag(s.simulation_control.do_zone_sizing))
                    .attr("systemSizing", flag(s.simulation_control.do_system_sizing))
                    .attr("plantSizing", flag(s.simulation_control.do_plant_sizing))
                    .attr("sizingPeriods", flag(s.simulation_control.run_for_sizing_periods))
                    .attr("runPeriods", flag(s.simulation_control.run_for_run_periods)),
            )
            .child(
                Element::new("ShadowCalculation")
                    .attr("solarDistribution", s.shadow_calculation.solar_distribution.name())
                    .attr("calculationMethod", s.shadow_calculation.calculation_method.name())
                    .attr("frequency", s.shadow_calculation.calculation_frequency.to_string())
                    .attr("maximumFigures", s.shadow_calculation.maximum_figures.to_string()),
            )
            .child(
                Element::new("Sizing")
                    .attr("heatingFactor", self.num(s.sizing_parameter.heating_factor))
                    .attr("coolingFactor", self.num(s.sizing_parameter.cooling_factor)),
            )
            .child(
                Element::new("Location")
                    .attr("northAngle", self.num(s.north_angle))
                    .attr("terrain", s.terrain_type.name()),
            )
            .child(outputs)
    }

    fn library_element(&self, library: &LibraryFragment) -> Element {
        let mut materials =
            Element::new("Materials").attr("count", library.materials.len().to_string());
        for entry in &library.materials {
            let el = Element::new("Material")
                .attr("handle", entry.id.handle.to_string())
                .attr("name", entry.id.name.as_str())
                .attr("title", entry.source.as_str());
            materials.push(match &entry.material {
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
                } => el
                    .attr("type", "Opaque")
                    .attr("thickness", self.num(*thickness))
                    .attr("conductivity", self.num(*conductivity))
                    .attr("density", self.num(*density))
                    .attr("specificHeat", self.num(*specific_heat))
                    .attr("roughness", roughness.name())
                    .attr("thermalAbsorptance", self.num(*thermal_absorptance))
                    .attr("solarAbsorptance", self.num(*solar_absorptance))
                    .attr("visibleAbsorptance", self.num(*visible_absorptance)),
                Material::NoMass {
                    r_value,
                    roughness,
                    thermal_absorptance,
                    solar_absorptance,
                    visible_absorptance,
                    ..
                } => el
                    .attr("type", "NoMass")
                    .attr("rValue", self.num(*r_value))
                    .attr("roughness", roughness.name())
                    .attr("thermalAbsorptance", self.num(*thermal_absorptance))
                    .attr("solarAbsorptance", self.num(*solar_absorptance))
                    .attr("visibleAbsorptance", self.num(*visible_absorptance)),
                Material::SimpleGlazing {
                    u_factor, shgc, vt, ..
                } => el
                    .attr("type", "SimpleGlazing")
                    .attr("uFactor", self.num(*u_factor))
                    .attr("shgc", self.num(*shgc))
                    .attr("vt", self.num(*vt)),
            });
        }

        let mut constructions =
            Element::new("Constructions").attr("count", library.constructions.len().to_string());
        for entry in &library.constructions {
            let el = Element::new("Construction")
                .attr("handle", entry.id.handle.to_string())
                .attr("name", entry.id.name.as_str())
                .attr("title", entry.source.as_str());
            let el = match &entry.construction {
                Construction::Opaque { .. } => layered(el, "Opaque", &entry.layers),
                Construction::Window { .. } => layered(el, "Window", &entry.layers),
                Construction::Shade {
                    solar_reflectance,
                    visible_reflectance,
                    is_specular,
                    ..
                } => el
                    .attr("type", "Shade")
                    .attr("solarReflectance", self.num(*solar_reflectance))
                    .attr("visibleReflectance", self.num(*visible_reflectance))
                    .attr("specular", flag(*is_specular)),
            };
            constructions.push(el);
        }

        let mut schedules =
            Element::new("Schedules").attr("count", library.schedules.len().to_string());
        for entry in &library.schedules {
            let values = entry
                .schedule
                .values
                .iter()
                .map(|v| self.num(*v))
                .collect::<Vec<_>>()
                .join(" ");
            schedules.push(
                Element::new("Schedule")
                    .attr("handle", entry.id.handle.to_string())
                    .attr("name", entry.id.name.as_str())
                    .attr("title", entry.source.as_str())
                    .attr("type", entry.schedule.schedule_type.name())
                    .attr("timestep", entry.schedule.timestep.to_string())
                    .attr("count", entry.schedule.values.len().to_string())
                    .text(values),
            );
        }

        Element::new("Library")
            .child(materials)
            .child(constructions)
            .child(schedules)
    }

    fn site_element(&self, building: &BuildingFragment) -> Element {
        let building_handle = building.building.handle.to_string();
        let mut blocks =
            Element::new("BuildingBlocks").attr("count", building.blocks.len().to_string());
        for block in &building.blocks {
            let block_handle = block.id.handle.to_string();
            let mut zones = Element::new("Zones").attr("count", block.zones.len().to_string());
            for zone in &block.zones {
                let handle = zone.id.handle.to_string();
                let ids = ObjectIds {
                    building: &building_handle,
                    block: &block_handle,
                    zone: &handle,
                    ..ObjectIds::new(&handle)
                };
                zones.push(self.zone_element(zone, ids));
            }
            blocks.push(
                Element::new("BuildingBlock")
                    .attr("handle", block_handle.as_str())
                    .attr("name", block.id.name.as_str())
                    .attr("title", block.title.as_str())
                    .attr("elevation", self.num(block.elevation))
                    .child(
                        ObjectIds {
                            building: &building_handle,
                            block: &block_handle,
                            ..ObjectIds::new(&block_handle)
                        }
                        .element(),
                    )
                    .child(zones),
            );
        }

        let mut building_el = Element::new("Building")
            .attr("handle", building_handle.as_str())
            .attr("name", building.building.name.as_str())
            .attr("currentComponentBlockHandle", NONE)
            .attr("currentAssemblyInstanceHandle", NONE)
            .attr("currentPlaneHandle", NONE)
            .child(ObjectIds::new("0").element())
            .child(Element::new("ComponentBlocks"))
            .child(Element::new("AssemblyInstances"))
            .child(Element::new("ProfileOutlines"))
            .child(Element::new("ConstructionLines"))
            .child(Element::new("Planes"))
            .child(Element::new("HVACNetwork"))
            .child(Element::new("BookmarkBuildings").attr("numberOfBuildings", "0"))
            .child(
                Element::new("Attributes").child(
                    Element::new("Attribute")
                        .attr("key", "GeometryDataLevel")
                        .text(GEOMETRY_DATA_LEVEL),
                ),
            )
            .child(blocks);
        if !building.context_shades.is_empty() {
            building_el.push(self.shades_element("ContextShades", &building.context_shades));
        }

        Element::new("Site")
            .attr("handle", building.site.handle.to_string())
            .attr("name", format!("~{}", building.model_name))
            .attr("count", "1")
            .child(Element::new("Attributes"))
            .child(Element::new("Tables"))
            .child(Element::new("AssemblyLibrary"))
            .child(
                Element::new("Buildings")
                    .attr("numberOfBuildings", "1")
                    .child(building_el),
            )
    }

    fn zone_element(&self, zone: &ZoneFragment, ids: ObjectIds<'_>) -> Element {
        let handle = zone.id.handle.to_string();
        let mut el = Element::new("Zone")
            .attr("handle", handle.as_str())
            .attr("name", zone.id.name.as_str())
            .attr("title", zone.title.as_str())
            .attr("parentZoneHandle", handle.as_str())
            .attr("inheritedZoneHandle", handle.as_str())
            .attr("planExtrusion", flag(zone.plan_extrusion))
            .attr("innerSurfaceMode", "Deflation")
            .attr("multiplier", zone.multiplier.to_string())
            .child(ids.element());

        if let Some(loads) = &zone.loads {
            let mut loads_el = Element::new("Loads").attr("program", loads.program.as_str());
            for load in &loads.loads {
                let mut load_el = Element::new(load.element);
                if let Some((key, value)) = load.magnitude {
                    load_el = load_el.attr(key, self.num(value));
                }
                for (key, schedule) in &load.schedules {
                    load_el = load_el.attr(*key, schedule.as_str());
                }
                loads_el.push(load_el);
            }
            el.push(loads_el);
        }

        let mut surfaces = Element::new("Surfaces").attr("count", zone.surfaces.len().to_string());
        for surface in &zone.surfaces {
            let mut s = Element::new("Surface")
                .attr("handle", surface.id.handle.to_string())
                .attr("name", surface.id.name.as_str())
                .attr("title", surface.title.as_str())
                .attr("type", surface.face_type)
                .attr("boundary", surface.boundary)
                .attr("construction", surface.construction.as_str());
            if let Some(adjacent) = &surface.adjacent {
                s = s.attr("adjacentSurface", adjacent.as_str());
            }
            s = s
                .attr("area", self.num(surface.geometry.area))
                .child(self.polygon_element(&surface.geometry));

            if !surface.openings.is_empty() {
                let mut openings =
                    Element::new("Openings").attr("count", surface.openings.len().to_string());
                for opening in &surface.openings {
                    let kind = match opening.geometry.kind {
                        FragmentKind::Door => "Door",
                        FragmentKind::Window | FragmentKind::Surface | FragmentKind::Shade => {
                            "Window"
                        }
                    };
                    let mut o = Element::new("Opening")
                        .attr("handle", opening.id.handle.to_string())
                        .attr("name", opening.id.name.as_str())
                        .attr("title", opening.title.as_str())
                        .attr("type", kind)
                        .attr("operable", flag(opening.operable))
                        .attr("construction", opening.construction.as_str())
                        .attr("area", self.num(opening.geometry.area))
                        .child(self.polygon_element(&opening.geometry));
                    if !opening.shades.is_empty() {
                        o.push(self.shades_element("Shades", &opening.shades));
                    }
                    openings.push(o);
                }
                s.push(openings);
            }
            if !surface.shades.is_empty() {
                s.push(self.shades_element("Shades", &surface.shades));
            }
            surfaces.push(s);
        }
        el.push(surfaces);

        if !zone.shades.is_empty() {
            el.push(self.shades_element("Shades", &zone.shades));
        }
        el
    }

    fn shades_element(&self, name: &'static str, shades: &[ShadeFragment]) -> Element {
        let mut el = Element::new(name).attr("count", shades.len().to_string());
        for shade in shades {
            let mut s = Element::new("Shade")
                .attr("handle", shade.id.handle.to_string())
                .attr("name", shade.id.name.as_str())
                .attr("title", shade.title.as_str())
                .attr("detached", flag(shade.detached))
                .attr("construction", shade.construction.as_str());
            if let Some(schedule) = &shade.transmittance_schedule {
                s = s.attr("transmittanceSchedule", schedule.as_str());
            }
            el.push(s.child(self.polygon_element(&shade.geometry)));
        }
        el
    }

    fn polygon_element(&self, geometry: &GeometryFragment) -> Element {
        let mut el = Element::new("Polygon").attr("count", geometry.vertices.len().to_string());
        for v in &geometry.vertices {
            el.push(
                Element::new("Vertex")
                    .attr("x", self.num(v.x))
                    .attr("y", self.num(v.y))
                    .attr("z", self.num(v.z)),
            );
        }
        el
    }
}

fn layered(el: Element, kind: &'static str, layers: &[String]) -> Element {
    let mut el = el.attr("type", kind).attr("layers", layers.len().to_string());
    for layer in layers {
        el.push(Element::new("Layer").attr("material", layer.as_str()));
    }
    el
}

/// Handle value meaning "no object".
const NONE: &str = "-1";

const GEOMETRY_DATA_LEVEL: &str = "3";

/// Where an object sits in the building hierarchy. Unset levels are `-1`.
#[derive(Debug, Clone, Copy)]
struct ObjectIds<'a> {
    handle: &'a str,
    building: &'a str,
    block: &'a str,
    zone: &'a str,
    surface: &'a str,
    opening: &'a str,
}

impl<'a> ObjectIds<'a> {
    fn new(handle: &'a str) -> Self {
        Self {
            handle,
            building: NONE,
            block: NONE,
            zone: NONE,
            surface: NONE,
            opening: NONE,
        }
    }

    fn element(&self) -> Element {
        Element::new("ObjectIDs")
            .attr("handle", self.handle)
            .attr("buildingHandle", self.building)
            .attr("buildingBlockHandle", self.block)
            .attr("zoneHandle", self.zone)
            .attr("surfaceIndex", self.surface)
            .attr("openingIndex", self.opening)
    }
}

fn flag(v: bool) -> &'static str {
    if v {
        "True"
    } else {
        "False"
    }
}

/// Every name geometry uses must be in the library, and every library entry
/// must be used by something.
fn check_references(building: &BuildingFragment, library: &LibraryFragment) -> Result<()> {
    let materials: HashSet<&str> = library.materials.iter().map(|m| m.id.name.as_str()).collect();
    let constructions: HashSet<&str> = library
        .constructions
        .iter()
        .map(|c| c.id.name.as_str())
        .collect();
    let schedules: HashSet<&str> = library.schedules.iter().map(|s| s.id.name.as_str()).collect();

    let mut used_materials = HashSet::new();
    for entry in &library.constructions {
        for layer in &entry.layers {
            if !materials.contains(layer.as_str()) {
                return Err(TranslateError::assembly(format!(
                    "construction '{}' uses material '{layer}' missing from the library",
                    entry.id.name
                )));
            }
            used_materials.insert(layer.as_str());
        }
    }

    let mut used_constructions = HashSet::new();
    let mut used_schedules = HashSet::new();
    let mut surface_names = HashSet::new();
    let mut use_construction = |name: &str, owner: &str| -> Result<()> {
        if !constructions.contains(name) {
            return Err(TranslateError::assembly(format!(
                "'{owner}' uses construction '{name}' missing from the library"
            )));
        }
        used_constructions.insert(name.to_string());
        Ok(())
    };

    for zone in building.blocks.iter().flat_map(|b| &b.zones) {
        for surface in &zone.surfaces {
            surface_names.insert(surface.id.name.as_str());
            use_construction(&surface.construction, &surface.id.name)?;
            for opening in &surface.openings {
                use_construction(&opening.construction, &opening.id.name)?;
            }
        }
        if let Some(loads) = &zone.loads {
            for (_, schedule) in loads.loads.iter().flat_map(|l| &l.schedules) {
                used_schedules.insert(schedule.as_str());
            }
        }
    }
    for shade in building.all_shades() {
        use_construction(&shade.construction, &shade.id.name)?;
        if let Some(schedule) = &shade.transmittance_schedule {
            used_schedules.insert(schedule.as_str());
        }
    }

    for schedule in &used_schedules {
        if !schedules.contains(schedule) {
            return Err(TranslateError::assembly(format!(
                "schedule '{schedule}' is used but missing from the library"
            )));
        }
    }

    for zone in building.blocks.iter().flat_map(|b| &b.zones) {
        for surface in &zone.surfaces {
            if let Some(adjacent) = &surface.adjacent {
                if !surface_names.contains(adjacent.as_str()) {
                    return Err(TranslateError::assembly(format!(
                        "surface '{}' is adjacent to '{adjacent}' which is not exported",
                        surface.id.name
                    )));
                }
            }
        }
    }

    if let Some(unused) = library
        .materials
        .iter()
        .find(|m| !used_materials.contains(m.id.name.as_str()))
    {
        return Err(TranslateError::assembly(format!(
            "material '{}' is in the library but nothing uses it",
            unused.id.name
        )));
    }
    if let Some(unused) = library
        .constructions
        .iter()
        .find(|c| !used_constructions.contains(&c.id.name))
    {
        return Err(TranslateError::assembly(format!(
            "construction '{}' is in the library but nothing uses it",
            unused.id.name
        )));
    }
    if let Some(unused) = library
        .schedules
        .iter()
        .find(|s| !used_schedules.contains(s.id.name.as_str()))
    {
        return Err(TranslateError::assembly(format!(
            "schedule '{}' is in the library but nothing uses it",
            unused.id.name
        )));
    }
    Ok(())
}
