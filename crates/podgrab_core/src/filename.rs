/// Extension appended to every suggested file name.
pub const TARGET_EXTENSION: &str = "mp3";

/// Last entry of the title fallback chain.
pub const DEFAULT_TITLE: &str = "小宇宙FM音频";

/// Title text read from the page at the moment the user activates the affordance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TitleCandidates {
    pub episode_title: Option<String>,
    pub document_title: Option<String>,
}

impl TitleCandidates {
    /// First non-blank candidate: episode title, then document title.
    pub fn best(&self) -> Option<&str> {
        [&self.episode_title, &self.document_title]
            .into_iter()
            .filter_map(|candidate| candidate.as_deref())
            .map(str::trim)
            .find(|title| !title.is_empty())
    }
}

/// Replaces each character that is illegal in a file name with `_`.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect()
}

/// `{sanitized_title}.mp3`, with the title taken from the fallback chain.
pub fn episode_filename(titles: &TitleCandidates, default_title: &str) -> String {
    let title = titles.best().unwrap_or(default_title);
    format!("{}.{TARGET_EXTENSION}", sanitize(title))
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}
