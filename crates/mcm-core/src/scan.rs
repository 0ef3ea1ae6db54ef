// Bracket-balance scanner for embedded literals.
// Walks bytes from an opening `[`/`{` and finds its partner, skipping
// brackets that sit inside strings ('', "", ``) or comments (//, /* */).
// All markers are ASCII, so byte offsets are always char boundaries.
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    LineComment,
    BlockComment,
    InString(u8),
}

/// Returns the index of the bracket closing the one at `open`.
///
/// Fails with `UnbalancedLiteral` when input ends with brackets still open or
/// inside an unterminated string/comment.
pub fn scan_literal(text: &str, open: usize) -> StoreResult<usize> {
    let bytes = text.as_bytes();
    match bytes.get(open) {
        Some(b'[' | b'{') => {}
        _ => return Err(StoreError::UnbalancedLiteral { offset: open }),
    }
    let mut state = State::Normal;
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Normal => match c {
                b'/' if next == Some(b'/') => {
                    state = State::LineComment;
                    i += 2;
                    continue;
                }
                b'/' if next == Some(b'*') => {
                    state = State::BlockComment;
                    i += 2;
                    continue;
                }
                b'"' | b'\'' | b'`' => state = State::InString(c),
                b'[' | b'{' => depth += 1,
                b']' | b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            },
            State::LineComment => {
                if c == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == b'*' && next == Some(b'/') {
                    state = State::Normal;
                    i += 2;
                    continue;
                }
            }
            State::InString(q) => {
                if c == b'\\' {
                    // escaped char never terminates the string
                    i += 2;
                    continue;
                }
                if c == q {
                    state = State::Normal;
                }
            }
        }
        i += 1;
    }
    Err(StoreError::UnbalancedLiteral { offset: open })
}
