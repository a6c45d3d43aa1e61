/// Normalize one label cell: drop surrounding blanks, then unwrap a single
/// enclosing `"..."` pair. A lone `"` stays as it is.
pub fn clean_str(raw: &str) -> String {
    let cell = raw.trim();
    cell.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(cell)
        .to_owned()
}

/// Decode upload bytes: UTF-8 first, Latin-1 as the fallback.
///
/// Every byte sequence is valid Latin-1, so this never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.strip_prefix('\u{feff}').unwrap_or(s).to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
