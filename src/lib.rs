pub mod error;
pub mod fetch;
pub mod parser;
pub mod settings;

pub use error::{Error, ParsingError, ResolutionError, Result};
pub use parser::chapters::Chapter;
pub use parser::timestamp::GapPolicy;
pub use parser::warning::{Outcome, Warning};
pub use parser::{process_page, ChapterFile, PipelineOptions};
