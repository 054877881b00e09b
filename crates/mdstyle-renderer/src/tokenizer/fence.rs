//! Code fence tracking and fence construction.
//!
//! Block delimiters (`$$`, `:::`, `@startuml`) inside fenced code are
//! content, not syntax, so the preprocessor skips every line inside a fence
//! and every line indented as code.

/// Tracks fenced code state during line-by-line processing.
///
/// Fences use backticks or tildes (three or more). A closing fence uses the
/// same character, is at least as long as the opening one and carries no
/// info string.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line. Returns `true` if it opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let Some((ch, len, rest)) = fence_marker(line) else {
            return false;
        };
        match self.open {
            Some((open_ch, open_len)) => {
                if ch == open_ch && len >= open_len && rest.trim().is_empty() {
                    self.open = None;
                    true
                } else {
                    false
                }
            }
            // Backtick fences may not carry backticks in the info string.
            None if ch == '`' && rest.contains('`') => false,
            None => {
                self.open = Some((ch, len));
                true
            }
        }
    }
}

/// Split a fence line into (char, run length, remainder).
///
/// Up to three spaces of indentation are allowed.
fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let trimmed = &line[indent..];
    let ch = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    (len >= 3).then(|| (ch, len, &trimmed[len..]))
}

/// Whether `line` starts at column four or beyond, as indented code does.
///
/// Tabs advance to the next multiple of four.
pub(crate) fn is_indented_code(line: &str) -> bool {
    let mut column = 0;
    for c in line.chars() {
        match c {
            ' ' => column += 1,
            '\t' => column += 4 - column % 4,
            _ => break,
        }
        if column >= 4 {
            return true;
        }
    }
    false
}

/// Backtick fence long enough to enclose `content`.
///
/// One backtick longer than the longest run inside the content, and never
/// shorter than three.
pub(crate) fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}
