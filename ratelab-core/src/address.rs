//! Contract address normalization.
//!
//! Token contracts arrive as composite identifiers of the form
//! `<hex-address>::<module>::<type>`. Different readers pad the hex segment
//! differently (`0x2` vs `0x0000…0002`) and disagree on case, so every
//! cross-source comparison goes through [`normalize`].

/// Segment separator inside a composite contract identifier.
pub const SEPARATOR: &str = "::";

const HEX_PREFIX: &str = "0x";

/// Canonicalize a contract identifier.
///
/// Lower-cases the leading address segment and strips leading zeros after
/// the `0x` prefix (an all-zero address collapses to `0x0`). Module and type
/// segments are left untouched. Identifiers with fewer than three segments
/// are returned unchanged.
pub fn normalize(address: &str) -> String {
    let segments: Vec<&str> = address.split(SEPARATOR).collect();
    if segments.len() < 3 {
        return address.to_string();
    }

    let head = segments[0].to_lowercase();
    let head = match head.strip_prefix(HEX_PREFIX) {
        Some(digits) => {
            let trimmed = digits.trim_start_matches('0');
            if trimmed.is_empty() {
                format!("{HEX_PREFIX}0")
            } else {
                format!("{HEX_PREFIX}{trimmed}")
            }
        }
        None => head,
    };

    let mut out = head;
    for segment in &segments[1..] {
        out.push_str(SEPARATOR);
        out.push_str(segment);
    }
    out
}

/// True when two identifiers denote the same asset after normalization.
pub fn same_contract(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
