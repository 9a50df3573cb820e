use super::chapters::Chapter;

pub const HEADER: &str = ";FFMETADATA1";
const TIMEBASE: &str = "1/1000";

/// Render chapters as an FFMETADATA1 document.
pub fn render(chapters: &[Chapter]) -> String {
    let mut out = String::with_capacity(64 + chapters.len() * 96);
    out.push_str(HEADER);
    out.push('\n');

    for ch in chapters {
        out.push_str("[CHAPTER]\n");
        out.push_str(&format!("TIMEBASE={}\n", TIMEBASE));
        out.push_str(&format!("START={}\n", ch.start_ms));
        if let Some(end) = ch.end_ms {
            out.push_str(&format!("END={}\n", end));
        }
        out.push_str(&format!("title={}\n", escape(&ch.title)));
    }

    out
}

/// Backslash-escape the characters FFMETADATA treats as syntax.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
