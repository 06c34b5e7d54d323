/// Normalizes a source color.
///
/// `#RGB` expands to `#rrggbb`, `#RRGGBB` is lowercased, any other non-empty value (`red`,
/// `rgb(...)`) passes through unchanged. Missing or blank input stays missing.
pub fn normalize_color(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let Some(hex) = raw.strip_prefix('#') else {
        return Some(raw.to_string());
    };
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Some(raw.to_string());
    }
    match hex.len() {
        3 => {
            let mut out = String::with_capacity(7);
            out.push('#');
            for ch in hex.chars() {
                let ch = ch.to_ascii_lowercase();
                out.push(ch);
                out.push(ch);
            }
            Some(out)
        }
        6 => Some(format!("#{}", hex.to_ascii_lowercase())),
        _ => Some(raw.to_string()),
    }
}
