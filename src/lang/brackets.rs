//! Bracket pairing by nesting depth.
//!
//! Scans start one byte past the bracket with depth 1; each bracket of the
//! same kind adds one, each partner subtracts one, and the scan stops when
//! depth reaches zero. `None` means the scan ran off the source.

/// Position of the `]` matching the `[` at `pos`.
pub fn match_forward(source: &[u8], pos: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (index, byte) in source.iter().enumerate().skip(pos + 1) {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Position of the `[` matching the `]` at `pos`.
pub fn match_backward(source: &[u8], pos: usize) -> Option<usize> {
    let mut depth = 1usize;
    for index in (0..pos.min(source.len())).rev() {
        match source[index] {
            b']' => depth += 1,
            b'[' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Partner of whichever bracket sits at `pos`.
pub fn match_bracket(source: &[u8], pos: usize) -> Option<usize> {
    match source.get(pos) {
        Some(b'[') => match_forward(source, pos),
        Some(b']') => match_backward(source, pos),
        _ => None,
    }
}
