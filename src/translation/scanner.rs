#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    /// Inside a quoted literal or identifier; the byte is the closing quote.
    Quoted(u8),
    LineComment,
    BlockComment,
}

/// Scan a placeholder name starting at `start`: a letter or `_`, then letters, digits, `_`.
pub(super) fn scan_identifier(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    match bytes.get(start) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    let mut idx = start + 1;
    while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
        idx += 1;
    }
    std::str::from_utf8(&bytes[start..idx])
        .ok()
        .map(|name| (idx, name))
}
