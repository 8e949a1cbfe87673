use std::time::Duration;

use crate::{TargetPattern, DEFAULT_TITLE};

/// Bounded retry budget for finding the audio element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSettings {
    pub discovery: DiscoveryPolicy,
    pub target: TargetPattern,
    pub toast_duration: Duration,
    pub default_title: String,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            discovery: DiscoveryPolicy::default(),
            target: TargetPattern::default(),
            toast_duration: Duration::from_secs(3),
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}
