use url::Url;

/// Extension of the container that must be transcoded before download.
pub const TRANSCODE_EXTENSION: &str = "m4a";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    RawDownloadable,
    RequiresTranscode,
}

/// Decides from the URL path whether the source needs transcoding.
///
/// Query string and fragment never influence the decision.
pub fn classify_source(url: &str) -> FormatHint {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Relative or otherwise unparseable: strip query/fragment by hand.
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let is_transcode = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case(TRANSCODE_EXTENSION))
        .unwrap_or(false);

    if is_transcode {
        FormatHint::RequiresTranscode
    } else {
        FormatHint::RawDownloadable
    }
}
