use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::Serialize;

use super::layout::{self, collapse_ws, read_first, Layout};
use super::warning::{Outcome, Warning};
use crate::error::ParsingError;

static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static DOC_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// One track block as it appears on the page, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTrackEntry {
    /// Position of the track block on the page (0-based).
    pub index: usize,
    pub artist: Option<String>,
    pub title: String,
    pub timestamp: Option<String>,
}

impl RawTrackEntry {
    pub fn display_title(&self) -> String {
        match &self.artist {
            Some(artist) => format!("{} - {}", artist, self.title),
            None => self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracklist {
    pub title: Option<String>,
    pub layout: Layout,
    pub entries: Vec<RawTrackEntry>,
}

/// Detect the page layout and read every track block in page order.
pub fn extract(html: &str) -> Result<Outcome<Tracklist>, ParsingError> {
    let doc = Html::parse_document(html);
    let layout = layout::detect(&doc).ok_or(ParsingError::UnrecognizedLayout)?;
    let rules = layout.rules();

    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for (index, block) in doc.select(&rules.item).enumerate() {
        let Some(title) = read_first(&rules.title, block) else {
            warnings.push(Warning::DroppedTrack { index });
            continue;
        };
        entries.push(RawTrackEntry {
            index,
            artist: read_first(&rules.artist, block),
            title,
            timestamp: read_first(&rules.timestamp, block),
        });
    }

    if entries.is_empty() {
        return Err(ParsingError::NoTracks { layout });
    }

    let tracklist = Tracklist {
        title: page_title(&doc),
        layout,
        entries,
    };
    Ok(Outcome::new(tracklist, warnings))
}

fn page_title(doc: &Html) -> Option<String> {
    let og = doc
        .select(&OG_TITLE)
        .next()
        .and_then(|e| e.value().attr("content"))
        .map(collapse_ws);
    og.filter(|t| !t.is_empty()).or_else(|| {
        doc.select(&DOC_TITLE)
            .next()
            .map(|e| collapse_ws(&e.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    })
}

// ── Tests ──
