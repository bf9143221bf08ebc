pub mod accessor;
pub mod assemble;
pub mod error;
pub mod geom;
pub mod geometry;
pub mod ids;
pub mod library;
pub mod model;
pub mod report;
pub mod simulation;
pub mod translate;
pub mod xml;

pub use error::{Result, TranslateError};
pub use model::Model;
pub use report::TranslationSummary;
pub use simulation::{resolve, SimulationParameters};
pub use translate::{translate, TranslateConfig, Translation, Translator};
