//! Tolerant extraction of icon records from generated library artifacts.
//!
//! Two textual shapes are supported: a sequence of declared export
//! blocks, and a sprite-style sequence of `<symbol>` blocks. Neither is
//! parsed with a strict grammar. Extraction anchors on markers that
//! cannot appear mid-body and tracks nesting only where delimiters can
//! legitimately nest, so an embedded style block full of braces comes
//! out whole instead of truncating the body.

use std::path::Path;

use compact_str::CompactString;

use glyphdex_core::{AnimationSpec, IconRecord, IterationCount};

const DECL_MARKER: &str = "export const ";
const SYMBOL_OPEN: &str = "<symbol";
const SYMBOL_CLOSE: &str = "</symbol>";

/// Extract every icon record from a generated artifact's full text.
///
/// Never fails: malformed entries are skipped without aborting the
/// rest, and a file that cannot be parsed at all yields zero records
/// with the cause logged.
pub fn extract(artifact: &Path, text: &str) -> Vec<IconRecord> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut records = extract_declarations(artifact, text);
    records.extend(extract_sprite(artifact, text));
    if records.is_empty() {
        tracing::warn!(
            path = %artifact.display(),
            "library artifact yielded no records"
        );
    }
    records
}

/// Declared export blocks: `export const <ident> = { name, body,
/// viewBox, animation? };`
fn extract_declarations(artifact: &Path, text: &str) -> Vec<IconRecord> {
    let mut records = Vec::new();
    let mut search = 0;
    while let Some(found) = text[search..].find(DECL_MARKER) {
        let ident_start = search + found + DECL_MARKER.len();
        search = ident_start;

        let ident_end = text[ident_start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .map(|offset| ident_start + offset)
            .unwrap_or(text.len());
        let ident = &text[ident_start..ident_end];
        if ident.is_empty() {
            continue;
        }

        let Some(brace) = text[ident_end..].find('{').map(|offset| ident_end + offset) else {
            continue;
        };
        let Some(end) = skip_balanced(text, brace) else {
            tracing::debug!(name = ident, "unterminated declaration skipped");
            continue;
        };
        search = end;

        let object = &text[brace + 1..end - 1];
        match declaration_record(artifact, ident, object) {
            Some(record) => records.push(record),
            None => tracing::debug!(name = ident, "malformed entry skipped"),
        }
    }
    records
}

fn declaration_record(artifact: &Path, ident: &str, object: &str) -> Option<IconRecord> {
    let name = match find_field(object, "name") {
        Some(FieldValue::Str(name)) if !name.is_empty() => name,
        _ => ident.to_string(),
    };
    let body = match find_field(object, "body") {
        Some(FieldValue::Str(body)) if !body.is_empty() => body,
        _ => return None,
    };
    let view_box = match find_field(object, "viewBox") {
        Some(FieldValue::Str(value)) => Some(CompactString::from(value)),
        _ => None,
    };
    let animation = match find_field(object, "animation") {
        Some(FieldValue::Object(inner)) => animation_from(inner),
        _ => None,
    };
    Some(IconRecord::new_library(name, artifact, body, view_box, animation))
}

fn animation_from(object: &str) -> Option<AnimationSpec> {
    let kind = match find_field(object, "type")? {
        // The kind parser keeps unrecognized names verbatim.
        FieldValue::Str(value) => value.parse().ok()?,
        _ => return None,
    };
    let duration_ms = match find_field(object, "duration")? {
        FieldValue::Number(value) => value,
        _ => return None,
    };
    let timing = match find_field(object, "timing") {
        Some(FieldValue::Str(value)) => CompactString::from(value),
        _ => CompactString::const_new("linear"),
    };
    let iteration = match find_field(object, "iteration") {
        Some(FieldValue::Str(value)) => IterationCount::parse(&value),
        Some(FieldValue::Word(word)) => IterationCount::parse(word),
        Some(FieldValue::Number(value)) => IterationCount::Count(value as u32),
        _ => IterationCount::Count(1),
    };
    let delay_ms = match find_field(object, "delay") {
        Some(FieldValue::Number(value)) => Some(value),
        _ => None,
    };
    let direction = match find_field(object, "direction") {
        Some(FieldValue::Str(value)) => value.parse().ok(),
        _ => None,
    };
    Some(AnimationSpec {
        kind,
        duration_ms,
        timing,
        iteration,
        delay_ms,
        direction,
    })
}

/// Sprite shape: `<symbol id="…" viewBox="…">…</symbol>` blocks. Inner
/// content is anchored on the closing marker, which cannot appear
/// mid-body.
fn extract_sprite(artifact: &Path, text: &str) -> Vec<IconRecord> {
    let mut records = Vec::new();
    let mut search = 0;
    while let Some(found) = text[search..].find(SYMBOL_OPEN) {
        let start = search + found;
        let Some(tag_end) = text[start..].find('>').map(|offset| start + offset) else {
            break;
        };
        let content_start = tag_end + 1;
        let Some(content_end) = text[content_start..]
            .find(SYMBOL_CLOSE)
            .map(|offset| content_start + offset)
        else {
            tracing::debug!("unterminated symbol block skipped");
            break;
        };
        search = content_end + SYMBOL_CLOSE.len();

        let tag = &text[start..tag_end];
        let Some(id) = attr_value(tag, "id") else {
            tracing::debug!("symbol without id skipped");
            continue;
        };
        let body = text[content_start..content_end].trim().to_string();
        if body.is_empty() {
            continue;
        }
        let view_box = attr_value(tag, "viewBox").map(CompactString::from);
        records.push(IconRecord::new_library(id, artifact, body, view_box, None));
    }
    records
}

/// Value of a quoted attribute inside an element's opening tag.
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let bytes = tag.as_bytes();
    let mut search = 0;
    while let Some(found) = tag[search..].find(name) {
        let at = search + found;
        search = at + name.len();
        let boundary_ok = at == 0
            || (!bytes[at - 1].is_ascii_alphanumeric()
                && bytes[at - 1] != b'-'
                && bytes[at - 1] != b'_');
        if !boundary_ok {
            continue;
        }
        let mut i = skip_ws(bytes, at + name.len());
        if i >= bytes.len() || bytes[i] != b'=' {
            continue;
        }
        i = skip_ws(bytes, i + 1);
        if i >= bytes.len() || (bytes[i] != b'"' && bytes[i] != b'\'') {
            continue;
        }
        let quote = bytes[i] as char;
        let value_start = i + 1;
        let end = tag[value_start..].find(quote)?;
        return Some(tag[value_start..value_start + end].to_string());
    }
    None
}

/// A top-level field value inside an object literal.
enum FieldValue<'t> {
    Str(String),
    Number(u64),
    Object(&'t str),
    Word(&'t str),
}

/// Find the value of `key` among an object literal's top-level fields.
/// String literals and nested blocks are stepped over whole, so
/// delimiter characters inside body content cannot derail the scan.
fn find_field<'t>(object: &'t str, key: &str) -> Option<FieldValue<'t>> {
    let bytes = object.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                // Either a quoted key or a stray value.
                let (content, end) = read_string(object, i)?;
                let after = skip_ws(bytes, end);
                if after < bytes.len() && bytes[after] == b':' {
                    let (value, next) = read_value(object, skip_ws(bytes, after + 1))?;
                    if content == key {
                        return Some(value);
                    }
                    i = next;
                } else {
                    i = end;
                }
            }
            b'{' | b'[' | b'(' => {
                i = skip_balanced(object, i)?;
            }
            c if c.is_ascii_alphabetic() || c == b'_' || c == b'$' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
                {
                    i += 1;
                }
                let ident = &object[start..i];
                let after = skip_ws(bytes, i);
                if after < bytes.len() && bytes[after] == b':' {
                    let (value, next) = read_value(object, skip_ws(bytes, after + 1))?;
                    if ident == key {
                        return Some(value);
                    }
                    i = next;
                }
            }
            _ => i += 1,
        }
    }
    None
}

fn read_value(text: &str, start: usize) -> Option<(FieldValue<'_>, usize)> {
    let bytes = text.as_bytes();
    if start >= bytes.len() {
        return None;
    }
    match bytes[start] {
        b'"' | b'\'' | b'`' => {
            let (content, end) = read_string(text, start)?;
            Some((FieldValue::Str(content), end))
        }
        b'{' => {
            let end = skip_balanced(text, start)?;
            Some((FieldValue::Object(&text[start + 1..end - 1]), end))
        }
        b'[' | b'(' => {
            let end = skip_balanced(text, start)?;
            Some((FieldValue::Word(&text[start..end]), end))
        }
        c if c.is_ascii_digit() || c == b'-' => {
            let mut i = start + 1;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.' || bytes[i] == b'_')
            {
                i += 1;
            }
            let number = text[start..i].replace('_', "").parse::<f64>().ok()?;
            Some((FieldValue::Number(number.max(0.0) as u64), i))
        }
        c if c.is_ascii_alphabetic() || c == b'_' => {
            let mut i = start + 1;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            Some((FieldValue::Word(&text[start..i]), i))
        }
        _ => None,
    }
}

/// Read a quoted string starting at `start`, unescaping backslash
/// sequences. Returns the content and the index past the closing quote.
fn read_string(text: &str, start: usize) -> Option<(String, usize)> {
    let mut chars = text[start..].char_indices();
    let (_, quote) = chars.next()?;
    let mut out = String::new();
    let mut escaped = false;
    for (offset, c) in chars {
        if escaped {
            out.push(match c {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some((out, start + offset + c.len_utf8()));
        } else {
            out.push(c);
        }
    }
    None
}

/// Step past a balanced `{…}`/`[…]`/`(…)` block, ignoring delimiters
/// inside string literals. Returns the index past the closer.
fn skip_balanced(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let open = bytes[start];
    let close = match open {
        b'{' => b'}',
        b'[' => b']',
        b'(' => b')',
        _ => return None,
    };
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'"' || c == b'\'' || c == b'`' {
            let (_, end) = read_string(text, i)?;
            i = end;
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i + 1);
            }
        }
        i += 1;
    }
    None
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
