use serde::Serialize;

use super::timestamp::ResolvedTrack;
use super::warning::{Outcome, Warning};
use crate::error::ResolutionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub start_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<u64>,
    pub title: String,
}

/// Each chapter ends where the next one starts. The last one ends at
/// `total_ms` when given, otherwise it is left open.
pub fn build(
    tracks: Vec<ResolvedTrack>,
    total_ms: Option<u64>,
) -> Result<Outcome<Vec<Chapter>>, ResolutionError> {
    let Some(last_start) = tracks.last().map(|t| t.start_ms) else {
        return Err(ResolutionError::Empty);
    };

    let mut warnings = Vec::new();
    let last_end = match total_ms {
        Some(total) if total > last_start => Some(total),
        Some(total) => {
            warnings.push(Warning::DurationIgnored {
                duration_ms: total,
                last_start_ms: last_start,
            });
            None
        }
        None => None,
    };

    let ends: Vec<Option<u64>> = tracks
        .iter()
        .skip(1)
        .map(|t| Some(t.start_ms))
        .chain(std::iter::once(last_end))
        .collect();

    let chapters = tracks
        .into_iter()
        .zip(ends)
        .map(|(track, end_ms)| Chapter {
            start_ms: track.start_ms,
            end_ms,
            title: track.display_title,
        })
        .collect();

    Ok(Outcome::new(chapters, warnings))
}
