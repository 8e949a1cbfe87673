use url::Url;

/// Which locations count as an episode-detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPattern {
    /// Host, or parent domain of the host.
    pub host_suffix: String,
    /// Path segment that must be followed by at least one more segment.
    pub path_segment: String,
}

impl Default for TargetPattern {
    fn default() -> Self {
        Self {
            host_suffix: "xiaoyuzhoufm.com".to_string(),
            path_segment: "episode".to_string(),
        }
    }
}

impl TargetPattern {
    pub fn matches(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host_matches = host.eq_ignore_ascii_case(&self.host_suffix)
            || host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", self.host_suffix.to_ascii_lowercase()));
        if !host_matches {
            return false;
        }

        let Some(segments) = parsed.path_segments() else {
            return false;
        };
        let segments: Vec<&str> = segments.collect();
        segments
            .iter()
            .position(|segment| *segment == self.path_segment)
            .is_some_and(|idx| idx + 1 < segments.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Same location as last time: a plain DOM mutation.
    Unchanged,
    /// Location changed to a page we do not handle.
    Ignored,
    /// Location changed (or first load) to an episode page.
    Arm,
}

/// Detects client-side navigation by comparing each observed location with the
/// last one. The observer is the only writer of `last_url`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageObserver {
    last_url: Option<String>,
    target: TargetPattern,
}

impl PageObserver {
    pub fn new(target: TargetPattern) -> Self {
        Self {
            last_url: None,
            target,
        }
    }

    pub fn last_url(&self) -> Option<&str> {
        self.last_url.as_deref()
    }

    /// First sighting of the page: records the location and arms if it matches.
    pub fn load(&mut self, url: &str) -> Navigation {
        self.last_url = Some(url.to_string());
        if self.target.matches(url) {
            Navigation::Arm
        } else {
            Navigation::Ignored
        }
    }

    /// Called once per mutation batch.
    pub fn observe(&mut self, url: &str) -> Navigation {
        if self.last_url.as_deref() == Some(url) {
            return Navigation::Unchanged;
        }
        self.load(url)
    }
}
