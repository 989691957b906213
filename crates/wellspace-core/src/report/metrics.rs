//! Helvetica glyph metrics and width-based word wrap.

use serde::{Deserialize, Serialize};

/// Built-in font weight used by the report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Points to millimetres.
pub const PT_TO_MM: f32 = 0.352_778;

/// Width used for characters outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

/// Helvetica-Bold advance widths (1/1000 em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,      // 'p'..'~'
];

fn glyph_width(c: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Regular => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    match c as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in millimetres.
pub fn text_width_mm(text: &str, size_pt: f32, weight: FontWeight) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c, weight))).sum();
    units as f32 / 1000.0 * size_pt * PT_TO_MM
}

/// How a wrapped line attaches to the line before it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Join {
    /// First line of a block
    Start,
    /// Hard line break in the source text
    Newline,
    /// Broken at whitespace; holds the separator that was dropped
    Space(String),
    /// Broken inside a word too long for one line
    Glue,
}

/// Greedy wrap: each line takes words until the next one would not fit.
///
/// Hard newlines always start a new line. Separators inside a line are kept
/// as written, and the separator at a soft break is carried on the `Join`, so
/// the source text can be rebuilt exactly. A word wider than `max_mm` on its
/// own is split at character boundaries.
pub fn wrap_to_width(
    text: &str,
    max_mm: f32,
    size_pt: f32,
    weight: FontWeight,
) -> Vec<(String, Join)> {
    let mut lines: Vec<(String, Join)> = Vec::new();
    for (i, hard_line) in text.split('\n').enumerate() {
        let first = if i == 0 { Join::Start } else { Join::Newline };
        wrap_line(hard_line, first, max_mm, size_pt, weight, &mut lines);
    }
    lines
}

/// Words of one line, each with the whitespace before it, plus trailing whitespace.
fn split_words(line: &str) -> (Vec<(&str, &str)>, &str) {
    let mut words = Vec::new();
    let mut rest = line;
    loop {
        let word_start = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        let (sep, tail) = rest.split_at(word_start);
        if tail.is_empty() {
            return (words, sep);
        }
        let word_end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let (word, next) = tail.split_at(word_end);
        words.push((sep, word));
        rest = next;
    }
}

fn wrap_line(
    line: &str,
    first: Join,
    max_mm: f32,
    size_pt: f32,
    weight: FontWeight,
    lines: &mut Vec<(String, Join)>,
) {
    let (words, trailing) = split_words(line);
    let mut current = String::new();
    let mut current_width = 0.0_f32;
    let mut join = first;

    for (index, (sep, word)) in words.into_iter().enumerate() {
        let word_width = text_width_mm(word, size_pt, weight);
        let sep_width = text_width_mm(sep, size_pt, weight);

        if index == 0 {
            // Indentation stays with the first word
            current.push_str(sep);
            current_width = sep_width;
        } else if current_width + sep_width + word_width <= max_mm {
            current.push_str(sep);
            current.push_str(word);
            current_width += sep_width + word_width;
            continue;
        } else {
            lines.push((std::mem::take(&mut current), join));
            join = Join::Space(sep.to_string());
            current_width = 0.0;
        }

        if current_width + word_width <= max_mm {
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        // Word wider than a line: hard-break it
        for c in word.chars() {
            let w = text_width_mm(c.encode_utf8(&mut [0; 4]), size_pt, weight);
            if !current.is_empty() && current_width + w > max_mm {
                lines.push((std::mem::take(&mut current), join));
                join = Join::Glue;
                current_width = 0.0;
            }
            current.push(c);
            current_width += w;
        }
    }

    current.push_str(trailing);
    lines.push((current, join));
}

/// Rebuild the source text from wrapped lines.
pub fn unwrap_lines<'a>(lines: impl IntoIterator<Item = (&'a str, &'a Join)>) -> String {
    let mut out = String::new();
    for (line, join) in lines {
        match join {
            Join::Start if out.is_empty() => {}
            Join::Start | Join::Newline => out.push('\n'),
            Join::Space(sep) => out.push_str(sep),
            Join::Glue => {}
        }
        out.push_str(line);
    }
    out
}
