use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

impl Warning {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStats {
    pub stories: usize,
    pub synthesized_stories: usize,
    pub blocks: usize,
    pub zones: usize,
    pub surfaces: usize,
    pub openings: usize,
    pub shades: usize,
    pub materials: usize,
    pub constructions: usize,
    pub schedules: usize,
    pub merged_definitions: usize,
    pub reversed_loops: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSummary {
    pub model: String,
    pub defaults_version: u32,
    pub stats: TranslationStats,
    pub warnings: Vec<Warning>,
}
