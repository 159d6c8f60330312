/// Characters the destination filesystem (OneDrive filename rules) rejects,
/// with the bracketed token each one is replaced by.
const ESCAPES: [(char, &str); 15] = [
    ('~', "[tilde]"),
    ('"', "[quote]"),
    ('#', "[sharp]"),
    ('%', "[pct]"),
    ('&', "[and]"),
    ('*', "[star]"),
    (':', "[colon]"),
    ('<', "[langle]"),
    ('>', "[rangle]"),
    ('?', "[qmark]"),
    ('/', "[slash]"),
    ('\\', "[rslash]"),
    ('{', "[lcurly]"),
    ('}', "[rcurly]"),
    ('|', "[vbar]"),
];

/// Map a folder's display name to a name safe for the remote filesystem.
///
/// Single pass; every reserved character becomes its token, everything else
/// is copied through. Not reversible in general (a name may already contain
/// a token).
pub fn escape_name(orig_name: &str) -> String {
    let mut res = String::with_capacity(orig_name.len());

    for ch in orig_name.chars() {
        match ESCAPES.iter().find(|(reserved, _)| *reserved == ch) {
            Some((_, token)) => res.push_str(token),
            None => res.push(ch),
        }
    }

    res
}
