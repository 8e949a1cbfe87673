use podgrab_core::{Navigation, PageObserver, TargetPattern};

const EPISODE: &str = "https://www.xiaoyuzhoufm.com/episode/65a1b2c3";
const OTHER_EPISODE: &str = "https://www.xiaoyuzhoufm.com/episode/77ffee00";

#[test]
fn target_pattern_requires_host_and_episode_segment() {
    let target = TargetPattern::default();
    assert!(target.matches(EPISODE));
    assert!(target.matches("https://xiaoyuzhoufm.com/episode/abc?s=1"));
    assert!(target.matches("https://www.xiaoyuzhoufm.com/episode/"));
    assert!(!target.matches("https://www.xiaoyuzhoufm.com/podcast/abc"));
    assert!(!target.matches("https://www.xiaoyuzhoufm.com/episode"));
    assert!(!target.matches("https://evilxiaoyuzhoufm.com/episode/abc"));
    assert!(!target.matches("not a url"));
}

#[test]
fn unchanged_location_never_rearms() {
    let mut observer = PageObserver::new(TargetPattern::default());
    assert_eq!(observer.load(EPISODE), Navigation::Arm);
    for _ in 0..5 {
        assert_eq!(observer.observe(EPISODE), Navigation::Unchanged);
    }
    assert_eq!(observer.last_url(), Some(EPISODE));
}

#[test]
fn navigation_arms_only_on_matching_pages() {
    let mut observer = PageObserver::new(TargetPattern::default());
    assert_eq!(
        observer.load("https://www.xiaoyuzhoufm.com/"),
        Navigation::Ignored
    );
    assert_eq!(observer.observe(EPISODE), Navigation::Arm);
    assert_eq!(
        observer.observe("https://www.xiaoyuzhoufm.com/podcast/1"),
        Navigation::Ignored
    );
    assert_eq!(observer.observe(OTHER_EPISODE), Navigation::Arm);
    assert_eq!(observer.last_url(), Some(OTHER_EPISODE));
}
