//! Endpoint URL normalization
//!
//! Catalog endpoints come in at least three shapes:
//! - `http://{host}:{port}/v{1,2,3}/{project-id}` (classic)
//! - the same without an explicit port
//! - `http://{host}:{port}/volume/v{1,2,3}` (mounted under a WSGI prefix)
//!
//! Version documents live at the top level of each service, so the version
//! segment and everything after it has to be cropped off before probing.

use url::Url;

/// Version markers recognised in endpoint paths, checked in this order
pub const VERSION_MARKERS: [&str; 3] = ["v1", "v2", "v3"];

/// Normalize an endpoint URL
///
/// With `top_level` set, the path is cut just before the first `/v1`, `/v2`
/// or `/v3` segment, or replaced by `/{top_level_path}` when that is
/// non-empty. A URL with no path at all gets `/{top_level_path}`; a bare `/`
/// path without a version marker is kept. The scheme and authority are
/// copied as written, explicit default ports included. Runs of `/` in the
/// path are collapsed in every case.
///
/// # Example
/// ```rust,ignore
/// let url = normalize("http://172.16.52.151:8774/v2.1/402486", true, "");
/// assert_eq!(url, "http://172.16.52.151:8774/");
/// ```
pub fn normalize(raw: &str, top_level: bool, top_level_path: &str) -> String {
    let origin = match (Url::parse(raw), raw_origin(raw)) {
        (Ok(url), Some(origin)) if url.has_host() => origin,
        _ => return collapse_unparsed(raw),
    };

    let rest = &raw[origin.len()..];
    let (path, suffix) = rest.split_at(rest.find(['?', '#']).unwrap_or(rest.len()));

    if top_level {
        let cropped = if path.is_empty() {
            Some(format!("/{}", top_level_path))
        } else {
            top_level_path_for(path, top_level_path)
        };
        if let Some(cropped) = cropped {
            return format!("{}{}", origin, collapse_slashes(&cropped));
        }
    }

    format!("{}{}{}", origin, collapse_slashes(path), suffix)
}

/// `scheme://authority` exactly as it appears in `raw`
pub(crate) fn raw_origin(raw: &str) -> Option<&str> {
    let start = raw.find("://")? + 3;
    let end = raw[start..]
        .find(['/', '?', '#'])
        .map_or(raw.len(), |pos| start + pos);
    Some(&raw[..end])
}

fn top_level_path_for(path: &str, top_level_path: &str) -> Option<String> {
    VERSION_MARKERS.iter().find_map(|marker| {
        let pos = path.find(&format!("/{}", marker))?;
        if top_level_path.is_empty() {
            Some(path[..=pos].to_string())
        } else {
            Some(format!("/{}", top_level_path))
        }
    })
}

/// Collapse every run of `/` into a single `/`
pub fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out
}

fn collapse_unparsed(raw: &str) -> String {
    match raw.split_once("://") {
        Some((scheme, rest)) => format!("{}://{}", scheme, collapse_slashes(rest)),
        None => collapse_slashes(raw),
    }
}
