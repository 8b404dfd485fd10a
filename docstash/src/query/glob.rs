// FICHIER : docstash/src/query/glob.rs

//! Traduction de motifs glob (style shell) en `Regex` ancrées.
//!
//! * `*`  : n'importe quelle suite sans `/`
//! * `**` : n'importe quelle suite, `/` compris
//! * `?`  : un caractère (hors `/`)
//! * `[abc]`, `[a-z]`, `[!a]`, `[^a]` : classes
//! * `{a,b}` : alternatives (imbricables)
//! * `\x` : caractère littéral

use regex::Regex;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GlobError {
    #[error("Classe de caractères non fermée : {0}")]
    UnclosedClass(String),
    #[error("Accolade non fermée : {0}")]
    UnclosedBrace(String),
    #[error("Motif invalide : {0}")]
    InvalidRegex(String),
}

/// Compile un motif glob en expression régulière ancrée (`^...$`).
pub fn compile(pattern: &str) -> Result<Regex, GlobError> {
    let source = to_regex_source(pattern)?;
    Regex::new(&source).map_err(|e| GlobError::InvalidRegex(e.to_string()))
}

/// Raccourci : `true` si `text` correspond au motif (motif invalide : `false`).
pub fn is_match(text: &str, pattern: &str) -> bool {
    compile(pattern).map(|re| re.is_match(text)).unwrap_or(false)
}

fn to_regex_source(pattern: &str) -> Result<String, GlobError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut brace_depth = 0usize;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                i += 1;
                match chars.get(i) {
                    Some(next) => push_literal(&mut out, *next),
                    None => push_literal(&mut out, '\\'),
                }
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    // `**/` absorbe aussi le séparateur : `a/**/b` accepte `a/b`
                    if chars.get(i + 2) == Some(&'/') {
                        out.push_str("(?:.*/)?");
                        i += 2;
                    } else {
                        out.push_str(".*");
                        i += 1;
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '[' => {
                let end = class_end(&chars, i)
                    .ok_or_else(|| GlobError::UnclosedClass(pattern.to_string()))?;
                out.push('[');
                let mut j = i + 1;
                if matches!(chars.get(j), Some('!') | Some('^')) {
                    out.push('^');
                    j += 1;
                }
                while j < end {
                    let mut cc = chars[j];
                    // `\x` dans une classe désigne `x` seul
                    if cc == '\\' && j + 1 < end {
                        j += 1;
                        cc = chars[j];
                        if cc == '-' {
                            out.push('\\');
                        }
                    }
                    if matches!(cc, '\\' | '[' | ']' | '^' | '&' | '~') {
                        out.push('\\');
                    }
                    out.push(cc);
                    j += 1;
                }
                out.push(']');
                i = end;
            }
            '{' => {
                brace_depth += 1;
                out.push_str("(?:");
            }
            ',' if brace_depth > 0 => out.push('|'),
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                out.push(')');
            }
            other => push_literal(&mut out, other),
        }
        i += 1;
    }

    if brace_depth > 0 {
        return Err(GlobError::UnclosedBrace(pattern.to_string()));
    }
    out.push('$');
    Ok(out)
}

/// Position du `]` fermant la classe ouverte en `start`.
/// Un `]` placé en tête de classe est littéral.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if matches!(chars.get(j), Some('!') | Some('^')) {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}
