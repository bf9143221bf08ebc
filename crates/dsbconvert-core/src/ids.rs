use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IdKind {
    Site,
    Building,
    Block,
    Zone,
    Surface,
    Opening,
    Shade,
    Construction,
    Material,
    Schedule,
}

impl IdKind {
    /// Name used when a native id sanitizes to nothing.
    pub fn fallback(self) -> &'static str {
        match self {
            IdKind::Site => "Site",
            IdKind::Building => "Building",
            IdKind::Block => "Block",
            IdKind::Zone => "Zone",
            IdKind::Surface => "Surface",
            IdKind::Opening => "Opening",
            IdKind::Shade => "Shade",
            IdKind::Construction => "Construction",
            IdKind::Material => "Material",
            IdKind::Schedule => "Schedule",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fallback())
    }
}

/// An exported name plus the integer handle DesignBuilder addresses objects by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExportId {
    pub name: String,
    pub handle: u32,
}

/// Hands out schema-legal, collision-free names for one translation call.
///
/// Allocation is memoized on `(native id, kind)`. A name is never issued twice,
/// whatever its kind, so a zone and a construction that share a native id end
/// up with different names.
#[derive(Debug)]
pub struct IdAllocator {
    max_len: usize,
    next_handle: u32,
    issued: HashMap<(IdKind, String), ExportId>,
    taken: HashSet<String>,
}

impl IdAllocator {
    pub fn new(max_len: usize, handle_start: u32) -> Self {
        Self {
            // Room for at least one character and a short suffix.
            max_len: max_len.max(8),
            next_handle: handle_start,
            issued: HashMap::new(),
            taken: HashSet::new(),
        }
    }

    pub fn allocate(&mut self, native_id: &str, kind: IdKind) -> ExportId {
        let key = (kind, native_id.to_string());
        if let Some(existing) = self.issued.get(&key) {
            return existing.clone();
        }

        let id = self.issue(native_id, kind);
        self.issued.insert(key, id.clone());
        id
    }

    /// Issues a fresh name that is not recorded against `native_id`. Used for
    /// built-in definitions whose ids may also appear in the model.
    pub fn allocate_unbound(&mut self, native_id: &str, kind: IdKind) -> ExportId {
        self.issue(native_id, kind)
    }

    fn issue(&mut self, native_id: &str, kind: IdKind) -> ExportId {
        let base = sanitize(native_id, kind, self.max_len);
        let mut name = base.clone();
        let mut n = 2u32;
        while self.taken.contains(&name) {
            let suffix = format!("_{n}");
            let keep = self.max_len.saturating_sub(suffix.len());
            name = format!("{}{suffix}", truncate(&base, keep));
            n += 1;
        }

        let id = ExportId {
            name: name.clone(),
            handle: self.next_handle,
        };
        self.next_handle += 1;
        self.taken.insert(name);
        id
    }

    pub fn lookup(&self, native_id: &str, kind: IdKind) -> Option<&ExportId> {
        self.issued.get(&(kind, native_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

/// Characters outside `[A-Za-z0-9_-]` become `_`; the result is cut to `max_len`.
pub fn sanitize(native_id: &str, kind: IdKind, max_len: usize) -> String {
    let cleaned: String = native_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = if cleaned.is_empty() {
        kind.fallback().to_string()
    } else {
        cleaned
    };
    truncate(&cleaned, max_len).to_string()
}

fn truncate(s: &str, max_len: usize) -> &str {
    // Sanitized names are ASCII, but stay on a char boundary regardless.
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
