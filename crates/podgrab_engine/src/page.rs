use std::sync::RwLock;

use scraper::{ElementRef, Html, Selector};

/// Source of the episode title used for the file name.
const EPISODE_TITLE_SELECTOR: &str = ".episode-title";
/// Elements the button may be placed next to, tried in order.
const TITLE_ANCHOR_SELECTORS: &[&str] = &[EPISODE_TITLE_SELECTOR, ".jsx-399326063.title"];

/// Read-only queries the poller and the click handler run against the page.
pub trait PageProbe: Send + Sync {
    /// `src` of the first playable audio element, if any.
    fn audio_source(&self) -> Option<String>;
    fn titles(&self) -> PageTitles;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageTitles {
    pub episode_title: Option<String>,
    pub document_title: Option<String>,
}

/// What the content script can see of the document at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageSnapshot {
    pub audio_src: Option<String>,
    pub titles: PageTitles,
    /// Whether an element exists that the affordance can be placed next to.
    pub has_title_anchor: bool,
}

impl PageSnapshot {
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);

        let audio_src = Selector::parse("audio")
            .ok()
            .and_then(|sel| doc.select(&sel).next())
            .and_then(audio_element_src);

        let episode_title = Selector::parse(EPISODE_TITLE_SELECTOR)
            .ok()
            .and_then(|sel| doc.select(&sel).next())
            .and_then(non_blank_text);

        let has_title_anchor = TITLE_ANCHOR_SELECTORS
            .iter()
            .filter_map(|raw| Selector::parse(raw).ok())
            .any(|sel| doc.select(&sel).next().is_some());

        let document_title = Selector::parse("title")
            .ok()
            .and_then(|sel| doc.select(&sel).next())
            .and_then(|el| non_blank_text(el));

        Self {
            audio_src,
            has_title_anchor,
            titles: PageTitles {
                episode_title,
                document_title,
            },
        }
    }
}

fn audio_element_src(audio: ElementRef<'_>) -> Option<String> {
    let direct = audio
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty());
    if let Some(src) = direct {
        return Some(src.to_string());
    }
    // <audio><source src=...></audio>
    let source_sel = Selector::parse("source[src]").ok()?;
    audio
        .select(&source_sel)
        .filter_map(|source| source.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(ToOwned::to_owned)
}

fn non_blank_text(el: ElementRef<'_>) -> Option<String> {
    let text = el.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Page handle shared between the host (writer, once per mutation batch) and
/// the engine (reader).
#[derive(Debug, Default)]
pub struct LivePage {
    inner: RwLock<LivePageState>,
}

#[derive(Debug, Default)]
struct LivePageState {
    url: String,
    snapshot: PageSnapshot,
}

impl LivePage {
    pub fn new(url: impl Into<String>, html: &str) -> Self {
        Self {
            inner: RwLock::new(LivePageState {
                url: url.into(),
                snapshot: PageSnapshot::parse(html),
            }),
        }
    }

    pub fn replace(&self, url: impl Into<String>, html: &str) {
        let snapshot = PageSnapshot::parse(html);
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.url = url.into();
        guard.snapshot = snapshot;
    }

    pub fn url(&self) -> String {
        self.read(|state| state.url.clone())
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.read(|state| state.snapshot.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&LivePageState) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }
}

impl PageProbe for LivePage {
    fn audio_source(&self) -> Option<String> {
        self.read(|state| state.snapshot.audio_src.clone())
    }

    fn titles(&self) -> PageTitles {
        self.read(|state| state.snapshot.titles.clone())
    }
}
