use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::extract::RawTrackEntry;
use super::warning::{Outcome, Warning};
use crate::error::ResolutionError;

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{2})$").unwrap());

/// Longest mix we accept a cue point for.
const MAX_HOURS: u64 = 999;

/// What to do with a track whose start time cannot be read from the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Interpolate or extrapolate from neighbouring known start times.
    #[default]
    Estimate,
    /// Leave the track out of the chapter list.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub index: usize,
    pub display_title: String,
    pub start_ms: u64,
    pub estimated: bool,
}

/// A track whose start time was read from the page.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    pos: usize,
    index: usize,
    ms: u64,
}

/// Parse `H:MM:SS`, `MM:SS` or `M:SS` into milliseconds.
pub fn parse_timestamp(text: &str) -> Option<u64> {
    let caps = TIMESTAMP_RE.captures(text.trim())?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    let hours: u64 = match caps.get(1) {
        Some(h) => {
            if caps[2].len() != 2 || minutes >= 60 {
                return None;
            }
            let hours: u64 = h.as_str().parse().ok()?;
            if hours > MAX_HOURS {
                return None;
            }
            hours
        }
        None => 0,
    };
    hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)
}

/// Turn raw entries into tracks with a start offset each, in the same order.
pub fn resolve(
    entries: Vec<RawTrackEntry>,
    policy: GapPolicy,
) -> Result<Outcome<Vec<ResolvedTrack>>, ResolutionError> {
    let mut warnings = Vec::new();

    let mut slots: Vec<(RawTrackEntry, Option<u64>)> = entries
        .into_iter()
        .map(|entry| {
            let ms = read_start(&entry, &mut warnings);
            (entry, ms)
        })
        .collect();

    if policy == GapPolicy::Skip {
        slots.retain(|(entry, ms)| {
            if ms.is_none() {
                warnings.push(Warning::SkippedTrack { index: entry.index });
            }
            ms.is_some()
        });
    }

    let anchors: Vec<Anchor> = slots
        .iter()
        .enumerate()
        .filter_map(|(pos, (entry, ms))| {
            ms.map(|ms| Anchor {
                pos,
                index: entry.index,
                ms,
            })
        })
        .collect();
    if anchors.is_empty() {
        return Err(ResolutionError::NoAnchor);
    }

    let mut tracks = Vec::with_capacity(slots.len());
    for (pos, (entry, ms)) in slots.into_iter().enumerate() {
        let (start_ms, estimated) = match ms {
            Some(ms) => (ms, false),
            None => {
                let ms = estimate(&anchors, pos)?;
                warnings.push(Warning::Estimated {
                    index: entry.index,
                    start_ms: ms,
                });
                (ms, true)
            }
        };
        tracks.push(ResolvedTrack {
            index: entry.index,
            display_title: entry.display_title(),
            start_ms,
            estimated,
        });
    }

    enforce_order(&mut tracks, &mut warnings)?;
    Ok(Outcome::new(tracks, warnings))
}

fn read_start(entry: &RawTrackEntry, warnings: &mut Vec<Warning>) -> Option<u64> {
    let Some(text) = entry.timestamp.as_deref() else {
        warnings.push(Warning::MissingTimestamp { index: entry.index });
        return None;
    };
    let ms = parse_timestamp(text);
    if ms.is_none() {
        warnings.push(Warning::MalformedTimestamp {
            index: entry.index,
            text: text.to_string(),
        });
    }
    ms
}

/// Start time for the unanchored track at `pos`.
///
/// Between two anchors the value is interpolated. Before the first or after
/// the last anchor it follows the slope of the two nearest anchors.
fn estimate(anchors: &[Anchor], pos: usize) -> Result<u64, ResolutionError> {
    let next = anchors.partition_point(|a| a.pos < pos);
    let (from, to) = if next == 0 || next == anchors.len() {
        if anchors.len() < 2 {
            return Err(ResolutionError::SingleAnchor {
                known_index: anchors[0].index,
            });
        }
        if next == 0 {
            (anchors[0], anchors[1])
        } else {
            (anchors[next - 2], anchors[next - 1])
        }
    } else {
        (anchors[next - 1], anchors[next])
    };
    Ok(project(from, to, pos))
}

/// Point at `pos` on the line through `from` and `to`, never below zero.
fn project(from: Anchor, to: Anchor, pos: usize) -> u64 {
    let span = to.ms as i128 - from.ms as i128;
    let steps = to.pos as i128 - from.pos as i128;
    let offset = pos as i128 - from.pos as i128;
    let ms = from.ms as i128 + span * offset / steps;
    ms.clamp(0, u64::MAX as i128) as u64
}

fn enforce_order(
    tracks: &mut [ResolvedTrack],
    warnings: &mut Vec<Warning>,
) -> Result<(), ResolutionError> {
    for i in 1..tracks.len() {
        let prev = tracks[i - 1].start_ms;
        let track = &mut tracks[i];
        if track.start_ms <= prev {
            let to = prev
                .checked_add(1)
                .ok_or(ResolutionError::Overflow { index: track.index })?;
            warnings.push(Warning::OrderCorrected {
                index: track.index,
                from: track.start_ms,
                to,
            });
            track.start_ms = to;
            track.estimated = true;
        }
    }
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(stamps: &[Option<&str>]) -> Vec<RawTrackEntry> {
        stamps
            .iter()
            .enumerate()
            .map(|(i, ts)| RawTrackEntry {
                index: i,
                artist: Some(format!("Artist{}", i + 1)),
                title: format!("Title{}", i + 1),
                timestamp: ts.map(str::to_string),
            })
            .collect()
    }

    fn starts(tracks: &[ResolvedTrack]) -> Vec<u64> {
        tracks.iter().map(|t| t.start_ms).collect()
    }

    #[test]
    fn accepted_forms() {
        assert_eq!(parse_timestamp("0:34"), Some(34_000));
        assert_eq!(parse_timestamp("3:53"), Some(233_000));
        assert_eq!(parse_timestamp("55:34"), Some(3_334_000));
        assert_eq!(parse_timestamp("1:02:10"), Some(3_730_000));
        assert_eq!(parse_timestamp(" 7:42 "), Some(462_000));
    }

    #[test]
    fn rejected_forms() {
        for bad in ["", "ID", "7:61", "1:2:10", "1:60:00", "123:45", "3.53", "-0:10"] {
            assert_eq!(parse_timestamp(bad), None, "{:?}", bad);
        }
    }

    #[test]
    fn hour_ceiling() {
        assert_eq!(parse_timestamp("999:59:59"), Some(3_599_999_000));
        assert_eq!(parse_timestamp("1000:00:00"), None);
        assert_eq!(parse_timestamp("5124095576030:00:00"), None);
    }

    #[test]
    fn huge_hour_count_is_malformed_not_a_panic() {
        let err = resolve(
            entries(&[Some("0:00"), Some("5124095576030:00:00"), None, None]),
            GapPolicy::Estimate,
        )
        .unwrap_err();
        assert_eq!(err, ResolutionError::SingleAnchor { known_index: 0 });
    }

    #[test]
    fn order_bump_past_u64_max_is_an_error() {
        let mut tracks: Vec<ResolvedTrack> = [u64::MAX, u64::MAX]
            .iter()
            .enumerate()
            .map(|(i, &ms)| ResolvedTrack {
                index: i,
                display_title: format!("Track {}", i + 1),
                start_ms: ms,
                estimated: false,
            })
            .collect();
        let mut warnings = Vec::new();
        let err = enforce_order(&mut tracks, &mut warnings).unwrap_err();
        assert_eq!(err, ResolutionError::Overflow { index: 1 });
    }

    #[test]
    fn all_known() {
        let out = resolve(entries(&[Some("0:34"), Some("3:53"), Some("7:42")]), GapPolicy::Estimate).unwrap();
        assert_eq!(starts(&out.value), vec![34_000, 233_000, 462_000]);
        assert!(out.value.iter().all(|t| !t.estimated));
        assert_eq!(out.value[0].display_title, "Artist1 - Title1");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn missing_middle_is_interpolated() {
        let out = resolve(entries(&[Some("0:10"), None, Some("0:50")]), GapPolicy::Estimate).unwrap();
        assert_eq!(starts(&out.value), vec![10_000, 30_000, 50_000]);
        assert!(out.value[1].estimated);
        assert!(!out.value[0].estimated && !out.value[2].estimated);
        assert_eq!(
            out.warnings,
            vec![
                Warning::MissingTimestamp { index: 1 },
                Warning::Estimated { index: 1, start_ms: 30_000 },
            ]
        );
    }

    #[test]
    fn interpolation_uses_position_gap() {
        let out = resolve(
            entries(&[Some("1:00"), None, None, Some("4:00")]),
            GapPolicy::Estimate,
        )
        .unwrap();
        assert_eq!(starts(&out.value), vec![60_000, 120_000, 180_000, 240_000]);
    }

    #[test]
    fn head_extrapolates_backward() {
        let out = resolve(entries(&[None, Some("1:00"), Some("2:00")]), GapPolicy::Estimate).unwrap();
        assert_eq!(starts(&out.value), vec![0, 60_000, 120_000]);
        assert!(out.value[0].estimated);
    }

    #[test]
    fn head_clamps_to_zero_then_orders() {
        let out = resolve(
            entries(&[None, None, Some("0:05"), Some("0:20")]),
            GapPolicy::Estimate,
        )
        .unwrap();
        assert_eq!(starts(&out.value), vec![0, 1, 5_000, 20_000]);
        assert!(out
            .warnings
            .contains(&Warning::OrderCorrected { index: 1, from: 0, to: 1 }));
    }

    #[test]
    fn tail_extrapolates_forward() {
        let out = resolve(entries(&[Some("0:00"), Some("1:00"), None]), GapPolicy::Estimate).unwrap();
        assert_eq!(starts(&out.value), vec![0, 60_000, 120_000]);
        assert!(out.value[2].estimated);
    }

    #[test]
    fn malformed_counts_as_missing() {
        let out = resolve(entries(&[Some("0:10"), Some("ID"), Some("0:50")]), GapPolicy::Estimate).unwrap();
        assert_eq!(out.value[1].start_ms, 30_000);
        assert_eq!(
            out.warnings[0],
            Warning::MalformedTimestamp { index: 1, text: "ID".into() }
        );
    }

    #[test]
    fn no_anchor_is_fatal() {
        let err = resolve(entries(&[None, Some("w/"), None]), GapPolicy::Estimate).unwrap_err();
        assert_eq!(err, ResolutionError::NoAnchor);
    }

    #[test]
    fn single_anchor_cannot_extrapolate() {
        let err = resolve(entries(&[Some("0:10"), None]), GapPolicy::Estimate).unwrap_err();
        assert_eq!(err, ResolutionError::SingleAnchor { known_index: 0 });
    }

    #[test]
    fn single_track_list() {
        let out = resolve(entries(&[Some("0:00")]), GapPolicy::Estimate).unwrap();
        assert_eq!(starts(&out.value), vec![0]);
        let err = resolve(entries(&[None]), GapPolicy::Estimate).unwrap_err();
        assert_eq!(err, ResolutionError::NoAnchor);
    }

    #[test]
    fn skip_policy_drops_unanchored() {
        let out = resolve(entries(&[Some("0:10"), None, Some("0:50")]), GapPolicy::Skip).unwrap();
        let idx: Vec<_> = out.value.iter().map(|t| t.index).collect();
        assert_eq!(idx, vec![0, 2]);
        assert!(out.warnings.contains(&Warning::SkippedTrack { index: 1 }));
        assert!(out.value.iter().all(|t| !t.estimated));
    }

    #[test]
    fn skip_policy_with_nothing_left() {
        let err = resolve(entries(&[None, None]), GapPolicy::Skip).unwrap_err();
        assert_eq!(err, ResolutionError::NoAnchor);
    }

    #[test]
    fn out_of_order_is_bumped() {
        let out = resolve(
            entries(&[Some("1:00"), Some("0:30"), Some("1:00"), Some("2:00")]),
            GapPolicy::Estimate,
        )
        .unwrap();
        assert_eq!(starts(&out.value), vec![60_000, 60_001, 60_002, 120_000]);
        assert!(out.value[1].estimated && out.value[2].estimated);
        assert!(!out.value[3].estimated);
    }

    #[test]
    fn gap_policy_from_config_string() {
        let p: GapPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(p, GapPolicy::Skip);
        assert_eq!(GapPolicy::default(), GapPolicy::Estimate);
    }
}
