use super::{TextMeasure, TextStyle};

/// One display line produced by [`wrap_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    /// Byte offset in the wrapped source where this line begins.
    pub start: usize,
    pub text: String,
}

/// Greedy word wrap.
///
/// - `'\n'` always starts a new line.
/// - The whitespace run at a wrap point is dropped.
/// - Trailing whitespace at the end of a paragraph is kept on its line.
/// - A word wider than `width` on its own is broken between characters.
///
/// Wrapping is restartable: wrapping the source from any returned
/// `start` reproduces the remaining lines, which lets callers re-wrap only
/// the tail after an edit at the end.
pub fn wrap_text(
    measure: &dyn TextMeasure,
    style: &TextStyle,
    text: &str,
    width: f32,
) -> Vec<WrappedLine> {
    let fits = |s: &str| measure.measure(s, style).x <= width;
    let mut lines = Vec::new();
    let mut base = 0;
    for para in text.split('\n') {
        wrap_paragraph(para, base, &fits, &mut lines);
        base += para.len() + 1;
    }
    lines
}

fn wrap_paragraph(
    para: &str,
    base: usize,
    fits: &dyn Fn(&str) -> bool,
    out: &mut Vec<WrappedLine>,
) {
    let mut line = String::new();
    let mut start = base;

    for (pos, token) in tokens(para) {
        if token.starts_with(char::is_whitespace) {
            line.push_str(token);
            continue;
        }

        let candidate = format!("{line}{token}");
        if fits(&candidate) {
            line = candidate;
            continue;
        }

        if !line.trim().is_empty() {
            out.push(WrappedLine { start, text: line.trim_end().to_string() });
            line.clear();
            start = base + pos;
        }

        // The word now leads its line; break it by characters if still too wide.
        let mut rest = token;
        let mut rest_at = base + pos;
        loop {
            let candidate = format!("{line}{rest}");
            if fits(&candidate) {
                line = candidate;
                break;
            }
            let take = fitting_prefix(&line, rest, fits);
            line.push_str(&rest[..take]);
            rest = &rest[take..];
            rest_at += take;
            if rest.is_empty() {
                break;
            }
            out.push(WrappedLine { start, text: std::mem::take(&mut line) });
            start = rest_at;
        }
    }

    out.push(WrappedLine { start, text: line });
}

/// Splits a paragraph into alternating whitespace and word runs.
fn tokens(para: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut run_start = 0;
    let mut run_space: Option<bool> = None;
    for (i, c) in para.char_indices() {
        let space = c.is_whitespace();
        match run_space {
            Some(prev) if prev != space => {
                out.push((run_start, &para[run_start..i]));
                run_start = i;
            }
            _ => {}
        }
        run_space = Some(space);
    }
    if run_start < para.len() {
        out.push((run_start, &para[run_start..]));
    }
    out
}

/// Byte length of the longest prefix of `word` that fits after `line`.
/// Always at least one character so wrapping makes progress.
fn fitting_prefix(line: &str, word: &str, fits: &dyn Fn(&str) -> bool) -> usize {
    let mut best = word.chars().next().map_or(word.len(), char::len_utf8);
    for (i, _) in word.char_indices().skip(1) {
        if !fits(&format!("{line}{}", &word[..i])) {
            break;
        }
        best = i;
    }
    best
}
