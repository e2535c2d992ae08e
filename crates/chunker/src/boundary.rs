//! Block-boundary scans used to decide where an extracted section ends.

/// Largest byte offset `<= idx` that lands on a char boundary of `text`.
pub(crate) fn clamp_to_char_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Find where a brace-delimited block ends.
///
/// Scans `text[scan_start..window_end]` with a depth counter, ignoring braces
/// inside single- or double-quoted runs. Returns the offset one past the
/// closing brace that brings the depth to zero at or after `min_end`, or
/// `None` when the block never closes inside the window.
pub fn braced_block_end(
    text: &str,
    scan_start: usize,
    min_end: usize,
    window_end: usize,
) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut quote = '"';

    for (i, ch) in text[scan_start..window_end].char_indices() {
        let at = scan_start + i;
        if ch == '"' || ch == '\'' {
            if !in_string {
                in_string = true;
                quote = ch;
            } else if ch == quote {
                in_string = false;
            }
            continue;
        }
        if in_string {
            continue;
        }
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && at >= min_end {
                    return Some(at + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Find where an indentation-delimited block ends.
///
/// The reference indent comes from the first non-blank line at or after
/// `body_start`. The block ends at the start of the next non-blank line whose
/// indent is at or below the reference; blank lines never terminate a block.
/// Returns `None` when no such line exists inside the window.
pub fn indented_block_end(text: &str, body_start: usize, window_end: usize) -> Option<usize> {
    let mut offset = body_start;
    let mut reference: Option<usize> = None;

    for line in text[body_start..window_end].split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            continue;
        }
        let indent = content.len() - content.trim_start().len();
        match reference {
            None => reference = Some(indent),
            Some(level) if indent <= level => return Some(line_start),
            Some(_) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn braced_end_balances_nested_blocks() {
        let text = "app.get('/x', (req, res) => { if (ok) { res.send(1); } });\nnext();";
        let end = braced_block_end(text, 0, 10, text.len()).unwrap();
        assert_eq!(&text[..end], "app.get('/x', (req, res) => { if (ok) { res.send(1); } }");
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = "app.get('/a', h => { send(\"}\"); log('{'); }";
        let end = braced_block_end(text, 0, 5, text.len()).unwrap();
        assert_eq!(end, text.len());
    }

    #[test]
    fn stray_close_after_match_terminates_the_block() {
        // A handler registered by name inside an enclosing scope: the next
        // close brace belongs to that scope and still bounds the section.
        let text = "  r.GET(\"/users\", list)\n}\nfunc other() {}";
        let brace_at = text.find('}').unwrap();
        let end = braced_block_end(text, 2, 8, text.len()).unwrap();
        assert_eq!(end, brace_at + 1);
    }

    #[test]
    fn unbalanced_block_is_reported_as_unterminated() {
        let text = "app.get('/x', h => { start(";
        assert_eq!(braced_block_end(text, 0, 5, text.len()), None);
    }

    #[test]
    fn close_brace_before_min_end_does_not_terminate() {
        let text = "} app.get('/x', h) }";
        let end = braced_block_end(text, 0, 18, text.len()).unwrap();
        assert_eq!(end, text.len());
    }

    #[test]
    fn indented_block_ends_at_dedent() {
        let text = "def users():\n    return all()\n\n@app.route('/other')\n";
        let body_start = text.find('\n').unwrap() + 1;
        let end = indented_block_end(text, 0, text.len()).unwrap();
        assert_eq!(&text[end..end + 4], "@app");
        // Same result when scanning from the body: reference indent comes
        // from the first non-blank line either way.
        assert_eq!(indented_block_end(text, body_start, text.len()), Some(end));
    }

    #[test]
    fn blank_lines_do_not_close_an_indented_block() {
        let text = "@app.route('/a')\ndef a():\n    x = 1\n\n    y = 2\ndef b():\n";
        let body_start = text.find('\n').unwrap() + 1;
        let end = indented_block_end(text, body_start, text.len()).unwrap();
        assert_eq!(&text[end..end + 5], "def b");
    }

    #[test]
    fn sibling_at_reference_indent_closes_the_block() {
        let text = "    x = 1\n    y = 2\n";
        assert_eq!(indented_block_end(text, 0, text.len()), Some(10));
    }

    #[test]
    fn indented_block_without_dedent_is_unterminated() {
        let text = "def a():\n    x = 1\n    y = 2\n";
        assert_eq!(indented_block_end(text, 0, text.len()), None);
    }

    #[test]
    fn char_boundary_clamp_never_splits_a_character() {
        let text = "héllo";
        // Byte 2 falls inside the two-byte `é`.
        assert_eq!(clamp_to_char_boundary(text, 2), 1);
        assert_eq!(clamp_to_char_boundary(text, 99), text.len());
    }
}
