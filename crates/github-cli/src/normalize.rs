/// Reflow column width. Fixed on purpose: width controls visual layout,
/// while the line cap passed to `normalize_content` controls payload size,
/// and the two knobs stay independent.
pub const WRAP_WIDTH: usize = 60;

/// Indent carried by wrapped continuations and by every line after the
/// first inside the literal block.
pub const CONTINUATION_INDENT: &str = "   ";

/// Literal line appended to truncated content.
pub const CUTOFF_MARKER: &str = "[...]";

/// Marker that makes downstream rendering treat the block as verbatim
/// text instead of markup.
pub const BLOCK_MARKER: &str = ".. code-block:: text";

/// Reflows a free-text body into a safe literal block.
///
/// Existing newlines are respected: each non-blank input line becomes one
/// logical line, reflowed to `WRAP_WIDTH` columns with wrapped
/// continuations indented by `CONTINUATION_INDENT`. Logical lines are
/// separated by a blank line. When `max_lines` is positive and the result
/// spans more physical lines, the block is cut there and a cutoff marker
/// line signals the omission. `max_lines <= 0` means unbounded.
pub fn normalize_content(body: &str, max_lines: i64) -> String {
    let continuation = format!("\n{CONTINUATION_INDENT}");

    let logical_lines: Vec<String> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| wrap_line(line, WRAP_WIDTH).join(&continuation))
        .collect();

    let mut content = logical_lines.join(&format!("\n\n{CONTINUATION_INDENT}"));

    if max_lines > 0 {
        let physical: Vec<&str> = content.lines().collect();
        if physical.len() > max_lines as usize {
            let mut kept: Vec<String> = physical[..max_lines as usize]
                .iter()
                .map(|line| (*line).to_string())
                .collect();
            kept.push(format!("{CONTINUATION_INDENT}{CUTOFF_MARKER}"));
            content = kept.join("\n");
        }
    }

    format!("{BLOCK_MARKER}\n\n{CONTINUATION_INDENT}{content}")
}

/// Greedy reflow of one logical line. Breaks at whitespace, splits tokens
/// longer than `width` mid-word, and keeps internal whitespace runs
/// verbatim instead of collapsing them.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for token in tokenize(line) {
        if token.chars().all(char::is_whitespace) {
            // Whitespace survives between words and at the very start of
            // the original line; it is dropped where a break happens.
            if !current.is_empty() || lines.is_empty() {
                current.push_str(token);
            }
            continue;
        }

        let mut word = token;
        loop {
            let used = current.chars().count();
            let word_len = word.chars().count();

            if used + word_len <= width {
                current.push_str(word);
                break;
            }

            if current.is_empty() {
                let (head, tail) = split_at_chars(word, width);
                lines.push(head.to_string());
                word = tail;
                continue;
            }

            let flushed = current.trim_end().to_string();
            current.clear();
            if !flushed.is_empty() {
                lines.push(flushed);
            }
        }
    }

    let tail = current.trim_end();
    if !tail.is_empty() {
        lines.push(tail.to_string());
    }

    lines
}

/// Splits a line into alternating runs of whitespace and non-whitespace.
fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut run_is_whitespace: Option<bool> = None;

    for (idx, ch) in line.char_indices() {
        let is_whitespace = ch.is_whitespace();
        match run_is_whitespace {
            Some(previous) if previous == is_whitespace => {}
            Some(_) => {
                tokens.push(&line[start..idx]);
                start = idx;
                run_is_whitespace = Some(is_whitespace);
            }
            None => run_is_whitespace = Some(is_whitespace),
        }
    }

    if start < line.len() {
        tokens.push(&line[start..]);
    }

    tokens
}

fn split_at_chars(word: &str, count: usize) -> (&str, &str) {
    match word.char_indices().nth(count) {
        Some((idx, _)) => word.split_at(idx),
        None => (word, ""),
    }
}
