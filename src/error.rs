use thiserror::Error;

use crate::parser::layout::Layout;

pub type Result<T> = std::result::Result<T, Error>;

/// The page could not be turned into track records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("page layout not recognized as a tracklist")]
    UnrecognizedLayout,

    #[error("no tracks found on {layout} tracklist page")]
    NoTracks { layout: Layout },
}

/// Start times could not be established for the extracted tracks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("no track has a usable timestamp")]
    NoAnchor,

    #[error("only track {known_index} has a timestamp; need two to estimate the others")]
    SingleAnchor { known_index: usize },

    #[error("track {index} start time is out of range")]
    Overflow { index: usize },

    #[error("cannot build chapters from an empty track list")]
    Empty,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parsing error: {0}")]
    Parsing(#[from] ParsingError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Invalid tracklist URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
