pub mod chapters;
pub mod extract;
pub mod ffmetadata;
pub mod layout;
pub mod timestamp;
pub mod warning;

use chapters::Chapter;
use layout::Layout;
use timestamp::GapPolicy;
use warning::Outcome;

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub gap_policy: GapPolicy,
    /// Length of the whole mix; closes the last chapter when set.
    pub total_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterFile {
    pub layout: Layout,
    pub tracklist_title: Option<String>,
    pub chapters: Vec<Chapter>,
    pub text: String,
}

/// Four-stage pipeline: page → raw tracks → resolved tracks → chapters → FFMETADATA text.
pub fn process_page(html: &str, opts: &PipelineOptions) -> Result<Outcome<ChapterFile>> {
    let extracted = extract::extract(html)?;
    let layout = extracted.value.layout;
    let tracklist_title = extracted.value.title.clone();

    let out = extracted
        .map(|list| list.entries)
        .and_then(|entries| timestamp::resolve(entries, opts.gap_policy))?
        .and_then(|tracks| chapters::build(tracks, opts.total_ms))?;

    Ok(out.map(|chapters| {
        let text = ffmetadata::render(&chapters);
        ChapterFile {
            layout,
            tracklist_title,
            chapters,
            text,
        }
    }))
}
