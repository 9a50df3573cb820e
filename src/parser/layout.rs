use std::fmt;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// Known structural shapes of a tracklist page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Current layout: `.tlpItem` rows inside a `.tlpContainer`, cue time nested in `.tcWrap`.
    Container,
    /// Older layout: bare `.tlpTog` rows with the cue time directly in `.cueValueField`.
    Legacy,
    /// schema.org `MusicRecording` blocks carrying names in `<meta>` attributes.
    Microdata,
}

/// One way of reading a field out of a track block.
pub(crate) enum Field {
    Text(Selector),
    Attr(Selector, &'static str),
}

pub(crate) struct Rules {
    sentinel: Selector,
    pub(crate) item: Selector,
    pub(crate) timestamp: Vec<Field>,
    pub(crate) artist: Vec<Field>,
    pub(crate) title: Vec<Field>,
}

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static CONTAINER: LazyLock<Rules> = LazyLock::new(|| Rules {
    sentinel: sel(".tlpContainer"),
    item: sel(".tlpContainer .tlpItem"),
    timestamp: vec![Field::Text(sel(".tlpCuePointTimecode .tcWrap"))],
    artist: vec![Field::Text(sel(".blueTxt"))],
    title: vec![Field::Text(sel(".trackValue"))],
});

static LEGACY: LazyLock<Rules> = LazyLock::new(|| Rules {
    sentinel: sel(".tlpTog"),
    item: sel(".tlpTog"),
    timestamp: vec![Field::Text(sel(".cueValueField"))],
    artist: vec![Field::Text(sel(".trackFormat .blueTxt"))],
    title: vec![Field::Text(sel(".trackFormat .blackTxt"))],
});

static MICRODATA: LazyLock<Rules> = LazyLock::new(|| Rules {
    sentinel: sel(r#"[itemtype$="MusicRecording"]"#),
    item: sel(r#"[itemtype$="MusicRecording"]"#),
    timestamp: vec![
        Field::Text(sel(".cueValueField")),
        Field::Attr(sel(r#"meta[itemprop="startTime"]"#), "content"),
    ],
    artist: vec![Field::Attr(sel(r#"meta[itemprop="byArtist"]"#), "content")],
    title: vec![Field::Attr(sel(r#"meta[itemprop="name"]"#), "content")],
});

impl Layout {
    /// Detection order. The first variant whose sentinel is present wins.
    pub const ALL: [Layout; 3] = [Layout::Container, Layout::Legacy, Layout::Microdata];

    pub(crate) fn rules(self) -> &'static Rules {
        match self {
            Layout::Container => &CONTAINER,
            Layout::Legacy => &LEGACY,
            Layout::Microdata => &MICRODATA,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Container => "container",
            Layout::Legacy => "legacy",
            Layout::Microdata => "microdata",
        };
        f.write_str(name)
    }
}

pub fn detect(doc: &Html) -> Option<Layout> {
    Layout::ALL
        .into_iter()
        .find(|layout| doc.select(&layout.rules().sentinel).next().is_some())
}

impl Field {
    pub(crate) fn read(&self, block: ElementRef<'_>) -> Option<String> {
        let raw = match self {
            Field::Text(s) => block.select(s).next().map(|e| e.text().collect::<String>()),
            Field::Attr(s, attr) => block
                .select(s)
                .next()
                .and_then(|e| e.value().attr(attr))
                .map(str::to_string),
        }?;
        Some(collapse_ws(&raw)).filter(|t| !t.is_empty())
    }
}

/// First field in `fields` that yields non-empty text.
pub(crate) fn read_first(fields: &[Field], block: ElementRef<'_>) -> Option<String> {
    fields.iter().find_map(|f| f.read(block))
}

pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
