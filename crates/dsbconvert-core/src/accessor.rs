//! Read-only arena view over a [`Model`].
//!
//! The nested model is flattened into vectors addressed by typed indices, and
//! cross references (constructions, programs, schedules, adjacent faces) go
//! through id maps. All coordinates are converted to meters here.

use crate::error::{Result, TranslateError};
use crate::geom::{bbox_of, BBox3, Point};
use crate::model::{
    BoundaryCondition, Construction, Face, FaceType, Material, Model, ProgramType, Room,
    Schedule, Shade,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoryIdx(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomIdx(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceIdx(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubFaceIdx(pub usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShadeIdx(pub usize);

/// Identifier plus a loop in meters; the payload every geometric entity shares.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub identifier: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone)]
pub struct StoryNode {
    pub identifier: String,
    pub display_name: String,
    pub base_elevation: f64,
    pub rooms: Vec<RoomIdx>,
    /// Created from unassigned rooms rather than declared in the model.
    pub synthesized: bool,
}

#[derive(Debug, Clone)]
pub struct BlockNode {
    pub name: String,
    pub story: StoryIdx,
    pub rooms: Vec<RoomIdx>,
}

#[derive(Debug, Clone)]
pub struct RoomNode<'m> {
    pub room: &'m Room,
    pub story: StoryIdx,
    pub faces: Vec<FaceIdx>,
    pub shades: Vec<ShadeIdx>,
}

impl RoomNode<'_> {
    pub fn display_name(&self) -> &str {
        self.room.display_name.as_deref().unwrap_or(&self.room.identifier)
    }
}

#[derive(Debug, Clone)]
pub struct FaceNode<'m> {
    pub face: &'m Face,
    pub room: RoomIdx,
    pub polygon: Polygon,
    pub sub_faces: Vec<SubFaceIdx>,
    pub shades: Vec<ShadeIdx>,
}

impl FaceNode<'_> {
    pub fn display_name(&self) -> &str {
        self.face.display_name.as_deref().unwrap_or(&self.face.identifier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubFaceKind {
    Window { is_operable: bool },
    Door { is_glass: bool },
}

#[derive(Debug, Clone)]
pub struct SubFaceNode<'m> {
    pub kind: SubFaceKind,
    pub display_name: &'m str,
    pub construction: Option<&'m str>,
    pub face: FaceIdx,
    pub polygon: Polygon,
    pub shades: Vec<ShadeIdx>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadeParent {
    Context,
    Room(RoomIdx),
    Face(FaceIdx),
    SubFace(SubFaceIdx),
}

#[derive(Debug, Clone)]
pub struct ShadeNode {
    pub display_name: String,
    pub construction: Option<String>,
    pub transmittance_schedule: Option<String>,
    pub is_detached: bool,
    pub parent: ShadeParent,
    pub polygon: Polygon,
}

/// One `(story, room, face)` step of the geometry traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRef {
    pub story: StoryIdx,
    pub room: RoomIdx,
    pub face: FaceIdx,
}

#[derive(Debug, Clone)]
pub struct AccessorConfig {
    /// Minimum floor height difference between synthesized stories, in meters.
    pub story_min_difference: f64,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            story_min_difference: 2.0,
        }
    }
}

#[derive(Debug)]
pub struct ModelIndex<'m> {
    model: &'m Model,
    stories: Vec<StoryNode>,
    blocks: Vec<BlockNode>,
    rooms: Vec<RoomNode<'m>>,
    faces: Vec<FaceNode<'m>>,
    sub_faces: Vec<SubFaceNode<'m>>,
    shades: Vec<ShadeNode>,
    face_lookup: HashMap<&'m str, FaceIdx>,
    constructions: HashMap<&'m str, &'m Construction>,
    materials: HashMap<&'m str, &'m Material>,
    schedules: HashMap<&'m str, &'m Schedule>,
    programs: HashMap<&'m str, &'m ProgramType>,
}

impl<'m> ModelIndex<'m> {
    pub fn build(model: &'m Model, cfg: &AccessorConfig) -> Result<Self> {
        reject_orphans(model)?;

        let scale = model.units.to_meters();
        let mut index = ModelIndex {
            model,
            stories: Vec::new(),
            blocks: Vec::new(),
            rooms: Vec::new(),
            faces: Vec::new(),
            sub_faces: Vec::new(),
            shades: Vec::new(),
            face_lookup: HashMap::new(),
            constructions: unique_map(&model.constructions, "Construction", |c| c.identifier())?,
            materials: unique_map(&model.materials, "Material", |m| m.identifier())?,
            schedules: unique_map(&model.schedules, "Schedule", |s| s.identifier.as_str())?,
            programs: unique_map(&model.programs, "ProgramType", |p| p.identifier.as_str())?,
        };

        let mut seen = SeenIds::default();
        for story in &model.stories {
            seen.check("Story", &story.identifier)?;
            let story_idx = StoryIdx(index.stories.len());
            index.stories.push(StoryNode {
                identifier: story.identifier.clone(),
                display_name: story
                    .display_name
                    .clone()
                    .unwrap_or_else(|| story.identifier.clone()),
                base_elevation: story.floor_height.map(|h| h * scale).unwrap_or(f64::NAN),
                rooms: Vec::new(),
                synthesized: false,
            });
            for room in &story.rooms {
                index.push_room(room, story_idx, scale, &mut seen)?;
            }
        }

        index.assign_unassigned(&model.unassigned_rooms, scale, cfg, &mut seen)?;

        for shade in &model.shades {
            index.push_shade(shade, ShadeParent::Context, scale, &mut seen)?;
        }
        index.push_shade_meshes(scale, &mut seen)?;

        index.fill_story_elevations();
        index.check_references()?;
        index.check_adjacency()?;
        index.build_blocks();
        Ok(index)
    }

    fn push_room(
        &mut self,
        room: &'m Room,
        story: StoryIdx,
        scale: f64,
        seen: &mut SeenIds,
    ) -> Result<RoomIdx> {
        seen.check("Room", &room.identifier)?;
        if room.faces.is_empty() {
            return Err(TranslateError::malformed(format!(
                "room '{}' has no faces",
                room.identifier
            )));
        }
        let room_idx = RoomIdx(self.rooms.len());
        self.rooms.push(RoomNode {
            room,
            story,
            faces: Vec::new(),
            shades: Vec::new(),
        });
        self.stories[story.0].rooms.push(room_idx);

        for face in &room.faces {
            seen.check("Face", &face.identifier)?;
            let face_idx = FaceIdx(self.faces.len());
            self.face_lookup.insert(&face.identifier, face_idx);
            self.faces.push(FaceNode {
                face,
                room: room_idx,
                polygon: polygon(&face.identifier, &face.geometry.boundary, scale),
                sub_faces: Vec::new(),
                shades: Vec::new(),
            });
            self.rooms[room_idx.0].faces.push(face_idx);

            for aperture in &face.apertures {
                seen.check("Opening", &aperture.identifier)?;
                let idx = self.push_sub_face(SubFaceNode {
                    kind: SubFaceKind::Window {
                        is_operable: aperture.is_operable,
                    },
                    display_name: aperture
                        .display_name
                        .as_deref()
                        .unwrap_or(&aperture.identifier),
                    construction: aperture.construction.as_deref(),
                    face: face_idx,
                    polygon: polygon(&aperture.identifier, &aperture.geometry.boundary, scale),
                    shades: Vec::new(),
                });
                for shade in &aperture.shades {
                    self.push_shade(shade, ShadeParent::SubFace(idx), scale, seen)?;
                }
            }
            for door in &face.doors {
                seen.check("Opening", &door.identifier)?;
                let idx = self.push_sub_face(SubFaceNode {
                    kind: SubFaceKind::Door {
                        is_glass: door.is_glass,
                    },
                    display_name: door.display_name.as_deref().unwrap_or(&door.identifier),
                    construction: door.construction.as_deref(),
                    face: face_idx,
                    polygon: polygon(&door.identifier, &door.geometry.boundary, scale),
                    shades: Vec::new(),
                });
                for shade in &door.shades {
                    self.push_shade(shade, ShadeParent::SubFace(idx), scale, seen)?;
                }
            }
            for shade in &face.shades {
                self.push_shade(shade, ShadeParent::Face(face_idx), scale, seen)?;
            }
        }
        for shade in &room.shades {
            self.push_shade(shade, ShadeParent::Room(room_idx), scale, seen)?;
        }
        Ok(room_idx)
    }

    fn push_sub_face(&mut self, node: SubFaceNode<'m>) -> SubFaceIdx {
        let idx = SubFaceIdx(self.sub_faces.len());
        self.faces[node.face.0].sub_faces.push(idx);
        self.sub_faces.push(node);
        idx
    }

    fn push_shade(
        &mut self,
        shade: &Shade,
        parent: ShadeParent,
        scale: f64,
        seen: &mut SeenIds,
    ) -> Result<ShadeIdx> {
        seen.check("Shade", &shade.identifier)?;
        let idx = ShadeIdx(self.shades.len());
        self.shades.push(ShadeNode {
            display_name: shade
                .display_name
                .clone()
                .unwrap_or_else(|| shade.identifier.clone()),
            construction: shade.construction.clone(),
            transmittance_schedule: shade.transmittance_schedule.clone(),
            is_detached: shade.is_detached,
            parent,
            polygon: polygon(&shade.identifier, &shade.geometry.boundary, scale),
        });
        match parent {
            ShadeParent::Context => {}
            ShadeParent::Room(room) => self.rooms[room.0].shades.push(idx),
            ShadeParent::Face(face) => self.faces[face.0].shades.push(idx),
            ShadeParent::SubFace(sub) => self.sub_faces[sub.0].shades.push(idx),
        }
        Ok(idx)
    }

    /// Every mesh face becomes its own context shade named `<mesh>_<n>`.
    fn push_shade_meshes(&mut self, scale: f64, seen: &mut SeenIds) -> Result<()> {
        let model = self.model;
        for mesh in &model.shade_meshes {
            seen.check("ShadeMesh", &mesh.identifier)?;
            let base_name = mesh
                .display_name
                .clone()
                .unwrap_or_else(|| mesh.identifier.clone());
            for (i, face) in mesh.faces.iter().enumerate() {
                let mut boundary = Vec::with_capacity(face.len());
                for &vi in face {
                    let Some(v) = mesh.vertices.get(vi) else {
                        return Err(TranslateError::malformed(format!(
                            "shade mesh '{}' face {i} uses vertex {vi} but the mesh has {} vertices",
                            mesh.identifier,
                            mesh.vertices.len()
                        )));
                    };
                    boundary.push(*v);
                }
                let identifier = format!("{}_{}", mesh.identifier, i + 1);
                seen.check("Shade", &identifier)?;
                self.shades.push(ShadeNode {
                    display_name: format!("{base_name} {}", i + 1),
                    construction: mesh.construction.clone(),
                    transmittance_schedule: None,
                    is_detached: mesh.is_detached,
                    parent: ShadeParent::Context,
                    polygon: polygon(&identifier, &boundary, scale),
                });
            }
        }
        Ok(())
    }

    /// Groups unassigned rooms into new stories by floor height. A room joins
    /// the current story while its floor is less than `story_min_difference`
    /// above that story's lowest floor.
    fn assign_unassigned(
        &mut self,
        rooms: &'m [Room],
        scale: f64,
        cfg: &AccessorConfig,
        seen: &mut SeenIds,
    ) -> Result<()> {
        if rooms.is_empty() {
            return Ok(());
        }
        let mut floors: Vec<(f64, usize)> = rooms
            .iter()
            .enumerate()
            .map(|(i, room)| (room_floor_height(room, scale), i))
            .collect();
        floors.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut groups: Vec<(f64, Vec<usize>)> = Vec::new();
        for (height, i) in floors {
            match groups.last_mut() {
                Some((start, members)) if height - *start < cfg.story_min_difference => {
                    members.push(i)
                }
                _ => groups.push((height, vec![i])),
            }
        }

        let mut counter = 1usize;
        for (height, mut members) in groups {
            // Rooms keep their model order inside a story.
            members.sort_unstable();
            let name = loop {
                let candidate = format!("Floor{counter}");
                counter += 1;
                if !seen.contains("Story", &candidate) {
                    break candidate;
                }
            };
            seen.check("Story", &name)?;
            let story_idx = StoryIdx(self.stories.len());
            self.stories.push(StoryNode {
                identifier: name.clone(),
                display_name: name,
                base_elevation: height,
                rooms: Vec::new(),
                synthesized: true,
            });
            for i in members {
                self.push_room(&rooms[i], story_idx, scale, seen)?;
            }
        }
        Ok(())
    }

    fn fill_story_elevations(&mut self) {
        for story in &mut self.stories {
            if story.base_elevation.is_finite() {
                continue;
            }
            let mut bbox = BBox3::empty();
            for room in &story.rooms {
                for face in &self.rooms[room.0].faces {
                    bbox = bbox.union(&bbox_of(&self.faces[face.0].polygon.points));
                }
            }
            story.base_elevation = bbox.min_z().unwrap_or(0.0);
        }
    }

    fn check_references(&self) -> Result<()> {
        for construction in &self.model.constructions {
            for material in construction.materials() {
                if !self.materials.contains_key(material.as_str()) {
                    return Err(TranslateError::dangling(
                        "Material",
                        material,
                        construction.identifier(),
                    ));
                }
            }
        }
        for program in &self.model.programs {
            for schedule in program.schedule_ids() {
                if !self.schedules.contains_key(schedule) {
                    return Err(TranslateError::dangling(
                        "Schedule",
                        schedule,
                        &program.identifier,
                    ));
                }
            }
        }
        for room in &self.rooms {
            if let Some(program) = &room.room.program {
                if !self.programs.contains_key(program.as_str()) {
                    return Err(TranslateError::dangling(
                        "ProgramType",
                        program,
                        &room.room.identifier,
                    ));
                }
            }
        }
        for face in &self.faces {
            let expected = match face.face.face_type {
                FaceType::AirBoundary => ConstructionClass::Any,
                _ => ConstructionClass::Opaque,
            };
            self.check_construction(face.face.construction.as_deref(), &face.face.identifier, expected)?;
        }
        for sub in &self.sub_faces {
            let expected = match sub.kind {
                SubFaceKind::Window { .. } | SubFaceKind::Door { is_glass: true } => {
                    ConstructionClass::Window
                }
                SubFaceKind::Door { is_glass: false } => ConstructionClass::Opaque,
            };
            self.check_construction(sub.construction, &sub.polygon.identifier, expected)?;
        }
        for shade in &self.shades {
            self.check_construction(
                shade.construction.as_deref(),
                &shade.polygon.identifier,
                ConstructionClass::Shade,
            )?;
            if let Some(schedule) = &shade.transmittance_schedule {
                if !self.schedules.contains_key(schedule.as_str()) {
                    return Err(TranslateError::dangling(
                        "Schedule",
                        schedule,
                        &shade.polygon.identifier,
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_construction(
        &self,
        id: Option<&str>,
        owner: &str,
        expected: ConstructionClass,
    ) -> Result<()> {
        let Some(id) = id else {
            return Ok(());
        };
        let Some(construction) = self.constructions.get(id) else {
            return Err(TranslateError::dangling("Construction", id, owner));
        };
        let ok = match (expected, construction) {
            (ConstructionClass::Any, _) => true,
            (ConstructionClass::Opaque, Construction::Opaque { .. }) => true,
            (ConstructionClass::Window, Construction::Window { .. }) => true,
            (ConstructionClass::Shade, Construction::Shade { .. } | Construction::Opaque { .. }) => {
                true
            }
            _ => false,
        };
        if !ok {
            return Err(TranslateError::malformed(format!(
                "'{owner}' cannot use construction '{id}' of this type"
            )));
        }
        Ok(())
    }

    fn check_adjacency(&self) -> Result<()> {
        for face in &self.faces {
            let BoundaryCondition::Surface { adjacent_face } = &face.face.boundary_condition else {
                continue;
            };
            let Some(other) = self.face_lookup.get(adjacent_face.as_str()) else {
                return Err(TranslateError::dangling(
                    "Face",
                    adjacent_face,
                    &face.face.identifier,
                ));
            };
            let other = &self.faces[other.0];
            let reciprocal = matches!(
                &other.face.boundary_condition,
                BoundaryCondition::Surface { adjacent_face } if adjacent_face == &face.face.identifier
            );
            if !reciprocal {
                return Err(TranslateError::malformed(format!(
                    "face '{}' is adjacent to '{}' but not the other way around",
                    face.face.identifier, other.face.identifier
                )));
            }
        }
        Ok(())
    }

    /// Rooms of a story connected through `Surface` boundary conditions form a
    /// block. Blocks are ordered by their first room.
    fn build_blocks(&mut self) {
        let mut blocks = Vec::new();
        for (si, story) in self.stories.iter().enumerate() {
            let mut dsu = DisjointSet::new(story.rooms.len());
            let local: HashMap<RoomIdx, usize> = story
                .rooms
                .iter()
                .enumerate()
                .map(|(i, r)| (*r, i))
                .collect();
            for (i, room) in story.rooms.iter().enumerate() {
                for face in &self.rooms[room.0].faces {
                    if let BoundaryCondition::Surface { adjacent_face } =
                        &self.faces[face.0].face.boundary_condition
                    {
                        if let Some(other) = self.face_lookup.get(adjacent_face.as_str()) {
                            if let Some(&j) = local.get(&self.faces[other.0].room) {
                                dsu.union(i, j);
                            }
                        }
                    }
                }
            }

            let mut groups: Vec<(usize, Vec<RoomIdx>)> = Vec::new();
            for (i, room) in story.rooms.iter().enumerate() {
                let root = dsu.find(i);
                match groups.iter_mut().find(|(r, _)| *r == root) {
                    Some((_, members)) => members.push(*room),
                    None => groups.push((root, vec![*room])),
                }
            }

            let single = groups.len() == 1;
            for (n, (_, rooms)) in groups.into_iter().enumerate() {
                let name = if single {
                    story.display_name.clone()
                } else {
                    format!("{} {}", story.display_name, n + 1)
                };
                blocks.push(BlockNode {
                    name,
                    story: StoryIdx(si),
                    rooms,
                });
            }
        }
        self.blocks = blocks;
    }

    pub fn stories(&self) -> impl Iterator<Item = (StoryIdx, &StoryNode)> + '_ {
        self.stories.iter().enumerate().map(|(i, s)| (StoryIdx(i), s))
    }

    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    /// Faces in story → room → face order.
    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceRef> + '_ {
        self.stories.iter().enumerate().flat_map(move |(si, story)| {
            story.rooms.iter().flat_map(move |room| {
                self.rooms[room.0].faces.iter().map(move |face| SurfaceRef {
                    story: StoryIdx(si),
                    room: *room,
                    face: *face,
                })
            })
        })
    }

    /// Apertures first, then doors, each in model order.
    pub fn sub_faces(&self, face: FaceIdx) -> impl Iterator<Item = (SubFaceIdx, &SubFaceNode<'m>)> + '_ {
        self.faces[face.0]
            .sub_faces
            .iter()
            .map(move |idx| (*idx, &self.sub_faces[idx.0]))
    }

    pub fn context_shades(&self) -> impl Iterator<Item = (ShadeIdx, &ShadeNode)> + '_ {
        self.shades
            .iter()
            .enumerate()
            .filter(|(_, s)| s.parent == ShadeParent::Context)
            .map(|(i, s)| (ShadeIdx(i), s))
    }

    pub fn story(&self, idx: StoryIdx) -> &StoryNode {
        &self.stories[idx.0]
    }

    pub fn room(&self, idx: RoomIdx) -> &RoomNode<'m> {
        &self.rooms[idx.0]
    }

    pub fn face(&self, idx: FaceIdx) -> &FaceNode<'m> {
        &self.faces[idx.0]
    }

    pub fn shade(&self, idx: ShadeIdx) -> &ShadeNode {
        &self.shades[idx.0]
    }

    pub fn face_by_id(&self, id: &str) -> Option<FaceIdx> {
        self.face_lookup.get(id).copied()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn construction(&self, id: &str) -> Option<&'m Construction> {
        self.constructions.get(id).copied()
    }

    pub fn material(&self, id: &str) -> Option<&'m Material> {
        self.materials.get(id).copied()
    }

    pub fn schedule(&self, id: &str) -> Option<&'m Schedule> {
        self.schedules.get(id).copied()
    }

    pub fn program(&self, id: &str) -> Option<&'m ProgramType> {
        self.programs.get(id).copied()
    }
}

#[derive(Debug, Clone, Copy)]
enum ConstructionClass {
    Any,
    Opaque,
    Window,
    Shade,
}

#[derive(Default)]
struct SeenIds {
    ids: HashSet<(&'static str, String)>,
}

impl SeenIds {
    fn check(&mut self, kind: &'static str, id: &str) -> Result<()> {
        if !self.ids.insert((kind, id.to_string())) {
            return Err(TranslateError::malformed(format!(
                "{kind} identifier '{id}' is used more than once"
            )));
        }
        Ok(())
    }

    fn contains(&self, kind: &'static str, id: &str) -> bool {
        self.ids.contains(&(kind, id.to_string()))
    }
}

fn reject_orphans(model: &Model) -> Result<()> {
    let orphans: Vec<&str> = model
        .orphaned_faces
        .iter()
        .map(|f| f.identifier.as_str())
        .chain(model.orphaned_apertures.iter().map(|a| a.identifier.as_str()))
        .chain(model.orphaned_doors.iter().map(|d| d.identifier.as_str()))
        .collect();
    if orphans.is_empty() {
        return Ok(());
    }
    Err(TranslateError::malformed(format!(
        "geometry without a parent room cannot be exported: {}",
        orphans.join(", ")
    )))
}

fn unique_map<'m, T>(
    items: &'m [T],
    kind: &'static str,
    id: impl Fn(&'m T) -> &'m str,
) -> Result<HashMap<&'m str, &'m T>> {
    let mut map = HashMap::with_capacity(items.len());
    for item in items {
        if map.insert(id(item), item).is_some() {
            return Err(TranslateError::malformed(format!(
                "{kind} identifier '{}' is defined more than once",
                id(item)
            )));
        }
    }
    Ok(map)
}

fn polygon(identifier: &str, boundary: &[[f64; 3]], scale: f64) -> Polygon {
    Polygon {
        identifier: identifier.to_string(),
        points: boundary
            .iter()
            .map(|p| Point::new(p[0] * scale, p[1] * scale, p[2] * scale))
            .collect(),
    }
}

fn room_floor_height(room: &Room, scale: f64) -> f64 {
    room.faces
        .iter()
        .flat_map(|f| f.geometry.boundary.iter())
        .map(|p| p[2] * scale)
        .fold(f64::INFINITY, f64::min)
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Lower index wins so roots are stable.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}
