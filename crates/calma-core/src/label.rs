//! Raw label normalization.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Reduce a raw label to its identity form: NFKD-decompose, drop combining
/// marks, lowercase, collapse every run of non-alphanumeric characters to a
/// single space, trim.
///
/// This backs label-derived [`EntityKey`](crate::report::EntityKey)s and
/// alias lookups, so it must stay deterministic and idempotent.
pub fn normalize_label(raw: &str) -> String {
    let stripped: String = raw.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let lower = stripped.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    for c in lower.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
    }
    out.trim_end().to_string()
}
