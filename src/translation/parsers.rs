/// `#` always opens a comment; MySQL only treats `--` as one when whitespace follows.
pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx) {
        Some(b'#') => true,
        Some(b'-') => {
            bytes.get(idx + 1) == Some(&b'-')
                && bytes.get(idx + 2).is_none_or(u8::is_ascii_whitespace)
        }
        _ => false,
    }
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// A `:` opens a named placeholder unless it is part of `::` or `:=`.
pub(super) fn is_named_marker(bytes: &[u8], idx: usize) -> bool {
    if bytes.get(idx) != Some(&b':') {
        return false;
    }
    if idx > 0 && bytes[idx - 1] == b':' {
        return false;
    }
    !matches!(bytes.get(idx + 1), Some(b':' | b'='))
}
