//! Slash-separated document identifiers.
//!
//! An identifier such as `movies/_indexes/by_name` names a location in a
//! tree. Everything but the last segment is the identifier's *folder*.
//! Leading, trailing and repeated slashes as well as `.` segments carry no
//! meaning and are dropped by [`normalize`]. The empty identifier is the
//! namespace root.

/// Segment separator.
pub const SEPARATOR: char = '/';

/// Parent-directory traversal segment. Never valid inside the namespace.
pub const PARENT_SEGMENT: &str = "..";

/// Iterates over the meaningful segments of `id`.
pub fn segments(id: &str) -> impl Iterator<Item = &str> {
    id.split(SEPARATOR).filter(|s| !s.is_empty() && *s != ".")
}

/// Returns the canonical form of `id`.
///
/// ```
/// use arbordb_codec::path::normalize;
///
/// assert_eq!(normalize("/movies//matrix/"), "movies/matrix");
/// assert_eq!(normalize("/"), "");
/// ```
pub fn normalize(id: &str) -> String {
    segments(id).collect::<Vec<_>>().join("/")
}

/// Returns true if `id` contains a `..` segment.
pub fn has_parent_traversal(id: &str) -> bool {
    segments(id).any(|s| s == PARENT_SEGMENT)
}

/// Returns true if `id` names the namespace root.
pub fn is_root(id: &str) -> bool {
    segments(id).next().is_none()
}

/// Returns the folder of `id` (all segments but the last).
///
/// ```
/// use arbordb_codec::path::folder;
///
/// assert_eq!(folder("movies/matrix"), "movies");
/// assert_eq!(folder("matrix"), "");
/// ```
pub fn folder(id: &str) -> String {
    let mut parts: Vec<&str> = segments(id).collect();
    parts.pop();
    parts.join("/")
}

/// Returns the last segment of `id`, or `""` for the root.
pub fn name(id: &str) -> &str {
    segments(id).last().unwrap_or("")
}

/// Joins a folder and a relative path into a canonical identifier.
pub fn join(folder: &str, child: &str) -> String {
    segments(folder)
        .chain(segments(child))
        .collect::<Vec<_>>()
        .join("/")
}
