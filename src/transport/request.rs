//! Values read off the upgrade request before a connection exists.

use url::Url;

use crate::socket::{NamespaceError, validate_name};

/// `scheme://host` of the page that opened the socket, or `*` when the
/// referer is missing or has no scheme.
pub fn client_origin(referer: Option<&str>) -> String {
    let Some((scheme, rest)) = referer.and_then(|r| r.split_once("://")) else {
        return "*".to_string();
    };
    let host = rest.split('/').next().unwrap_or_default();
    if scheme.is_empty() || host.is_empty() {
        return "*".to_string();
    }
    format!("{}://{}", scheme, host)
}

/// Picks the namespace a client asked for: the `namespace` query parameter
/// wins, otherwise the segment after `/v/` in the referer path.
pub fn namespace_from_request(
    query: Option<&str>,
    referer: Option<&str>,
) -> Result<String, NamespaceError> {
    if let Some(name) = query {
        return validate_name(name).map(str::to_string);
    }

    let from_referer = referer
        .and_then(|r| Url::parse(r).ok())
        .and_then(|url| {
            let mut segments = url.path_segments()?;
            segments.find(|s| *s == "v")?;
            segments.next().map(str::to_string)
        })
        .ok_or(NamespaceError::Missing)?;

    validate_name(&from_referer)?;
    Ok(from_referer)
}
