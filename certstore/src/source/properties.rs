//! Parser for the flat key/value text used by sidecar configuration files.
//!
//! The accepted syntax is that of Java `.properties` files read as UTF-8:
//!
//! - lines end at `\r\n`, `\n` or a lone `\r`;
//! - lines whose first non-blank character is `#` or `!` are comments;
//! - a key ends at the first unescaped `=`, `:` or whitespace; whitespace around the separator is
//!   skipped and the remainder of the logical line is the value;
//! - a line ending in an odd number of backslashes continues on the next line, whose leading
//!   whitespace is dropped;
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are decoded, any other escaped character stands
//!   for itself.
//!
//! When a key appears more than once, the last value wins.

use std::collections::BTreeMap;

/// `parse_properties` parses key/value text into a map or returns a description of the first
/// syntax error encountered.
pub fn parse_properties(text: &str) -> core::result::Result<BTreeMap<String, String>, String> {
    let mut props = BTreeMap::new();
    for (line_no, line) in logical_lines(text) {
        let (raw_key, raw_value) = split_key_value(&line);
        let key = unescape(raw_key).map_err(|e| format!("line {}: {}", line_no, e))?;
        let value = unescape(raw_value).map_err(|e| format!("line {}: {}", line_no, e))?;
        props.insert(key, value);
    }
    Ok(props)
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\x0c'
}

/// Returns true when `s` ends with an odd number of backslashes.
fn ends_with_continuation(s: &str) -> bool {
    s.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Splits `text` into physical lines terminated by `\r\n`, `\n` or a lone `\r`.
fn physical_lines(text: &str) -> Vec<&str> {
    let mut lines = vec![];
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(i) => {
                lines.push(&rest[..i]);
                let eol = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[i + eol..];
            }
            None => {
                lines.push(rest);
                rest = "";
            }
        }
    }
    lines
}

/// Joins continuation lines and drops blank and comment lines. Each logical line is returned with the
/// one-based number of the physical line it started on.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut retval = vec![];
    let mut current: Option<(usize, String)> = None;
    for (i, physical) in physical_lines(text).into_iter().enumerate() {
        let trimmed = physical.trim_start_matches(is_blank);
        let (start, mut acc) = match current.take() {
            Some(c) => c,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (i + 1, String::new())
            }
        };
        if ends_with_continuation(trimmed) {
            acc.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some((start, acc));
        } else {
            acc.push_str(trimmed);
            retval.push((start, acc));
        }
    }
    // a continuation on the final line simply ends the value
    if let Some(c) = current {
        retval.push(c);
    }
    retval
}

/// Splits a logical line into its raw (still escaped) key and value.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }
    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if rest.starts_with('=') || rest.starts_with(':') {
        rest = rest[1..].trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(raw: &str) -> core::result::Result<String, String> {
    let mut s = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            s.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => s.push('\t'),
            Some('n') => s.push('\n'),
            Some('r') => s.push('\r'),
            Some('f') => s.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = if hex.len() == 4 {
                    u32::from_str_radix(&hex, 16).ok()
                } else {
                    None
                };
                match code.and_then(char::from_u32) {
                    Some(decoded) => s.push(decoded),
                    None => return Err(format!("malformed \\uxxxx encoding: \\u{}", hex)),
                }
            }
            Some(other) => s.push(other),
            None => {}
        }
    }
    Ok(s)
}

#[test]
fn separators_and_comments() {
    let text = "# comment\n! another\n\nalias=foo\nkey2 : value two\nkey3 value3\n  key4=\n";
    let p = parse_properties(text).unwrap();
    assert_eq!(Some(&"foo".to_string()), p.get("alias"));
    assert_eq!(Some(&"value two".to_string()), p.get("key2"));
    assert_eq!(Some(&"value3".to_string()), p.get("key3"));
    assert_eq!(Some(&"".to_string()), p.get("key4"));
    assert_eq!(4, p.len());
}

#[test]
fn escapes_and_continuations() {
    let text = "alias = first \\\n    second\nname\\ with\\=sep=v\\u00e9\\tx\nlast=wins\nlast=again\n";
    let p = parse_properties(text).unwrap();
    assert_eq!(Some(&"first second".to_string()), p.get("alias"));
    assert_eq!(Some(&"v\u{e9}\tx".to_string()), p.get("name with=sep"));
    assert_eq!(Some(&"again".to_string()), p.get("last"));
}

#[test]
fn line_terminators() {
    let text = "# comment\ralias=foo\rkey2=a \\\r\n  b\r\n\r\nkey3=c";
    let p = parse_properties(text).unwrap();
    assert_eq!(Some(&"foo".to_string()), p.get("alias"));
    assert_eq!(Some(&"a b".to_string()), p.get("key2"));
    assert_eq!(Some(&"c".to_string()), p.get("key3"));
    assert_eq!(3, p.len());

    assert_eq!(vec!["a", "", "b"], physical_lines("a\r\rb\n"));
    assert!(physical_lines("").is_empty());
}

#[test]
fn even_backslashes_do_not_continue() {
    let p = parse_properties("path=c:\\\\\nalias=x\n").unwrap();
    assert_eq!(Some(&"c:\\".to_string()), p.get("path"));
    assert_eq!(Some(&"x".to_string()), p.get("alias"));
}

#[test]
fn malformed_unicode_escape() {
    let r = parse_properties("alias=\\u12G4\n");
    assert!(r.is_err());
    assert!(r.unwrap_err().starts_with("line 1:"));
    assert!(parse_properties("alias=\\u12").is_err());
}
