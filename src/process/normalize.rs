/// Rewrite one raw export header into its destination column form: trim
/// surrounding whitespace, then space → underscore, `&` → `and`,
/// hyphen → underscore. Applying it twice yields the same result.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .replace(' ', "_")
        .replace('&', "and")
        .replace('-', "_")
}
