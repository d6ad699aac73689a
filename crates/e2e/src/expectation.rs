//! What a UI action is allowed to produce

use std::time::Duration;

use regex::Regex;

use crate::config::OracleConfig;

/// Default deadline for a transition (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default spacing between polls (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Matches rendered heading text in full, case-sensitively
#[derive(Debug, Clone)]
pub enum HeadingMatcher {
    /// Heading equals one of a fixed set of titles
    OneOf(Vec<String>),
    /// Heading is matched by an anchored regex
    Regex(Regex),
}

impl HeadingMatcher {
    pub fn exact(title: impl Into<String>) -> Self {
        HeadingMatcher::OneOf(vec![title.into()])
    }

    pub fn one_of<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HeadingMatcher::OneOf(titles.into_iter().map(Into::into).collect())
    }

    /// Compile `pattern` so that it must cover the entire heading
    pub fn full_regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{})$", pattern)).map(HeadingMatcher::Regex)
    }

    pub fn matches(&self, heading: &str) -> bool {
        let heading = heading.trim();
        if heading.is_empty() {
            return false;
        }
        match self {
            HeadingMatcher::OneOf(titles) => titles.iter().any(|t| t == heading),
            HeadingMatcher::Regex(re) => re.is_match(heading),
        }
    }
}

/// One acceptable outcome of an action
#[derive(Debug, Clone)]
pub enum OutcomePattern {
    /// Any change of location away from the baseline
    LocationChanged,
    /// Location matches this route pattern
    Route(Regex),
    /// Page or dialog heading matches
    Heading(HeadingMatcher),
}

impl OutcomePattern {
    fn is_location_signal(&self) -> bool {
        matches!(self, OutcomePattern::LocationChanged | OutcomePattern::Route(_))
    }
}

/// Acceptable outcomes plus the timing of the wait for them
#[derive(Debug, Clone)]
pub struct TransitionExpectation {
    pub patterns: Vec<OutcomePattern>,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for TransitionExpectation {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl TransitionExpectation {
    /// Any navigation away from the baseline location
    pub fn navigation() -> Self {
        Self::default().or_location_change()
    }

    /// A heading that matches; location changes alone are not enough
    pub fn heading(matcher: HeadingMatcher) -> Self {
        Self::default().or_heading(matcher)
    }

    /// Either a navigation or one of `titles` rendered
    pub fn navigation_or_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::navigation().or_heading(HeadingMatcher::one_of(titles))
    }

    pub fn or_location_change(mut self) -> Self {
        self.patterns.push(OutcomePattern::LocationChanged);
        self
    }

    pub fn or_route(mut self, route: Regex) -> Self {
        self.patterns.push(OutcomePattern::Route(route));
        self
    }

    pub fn or_heading(mut self, matcher: HeadingMatcher) -> Self {
        self.patterns.push(OutcomePattern::Heading(matcher));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Apply the configured deadline and poll spacing
    pub fn with_config(self, config: &OracleConfig) -> Self {
        self.with_timeout(config.timeout())
            .with_poll_interval(config.poll_interval())
    }

    /// True when only a heading can satisfy this expectation
    pub fn requires_heading(&self) -> bool {
        !self.patterns.iter().any(OutcomePattern::is_location_signal)
    }

    /// Does `location`, compared with the baseline, satisfy a location pattern?
    pub fn accepts_location(&self, baseline: &str, location: &str) -> bool {
        self.patterns.iter().any(|p| match p {
            OutcomePattern::LocationChanged => location != baseline,
            OutcomePattern::Route(re) => re.is_match(location),
            OutcomePattern::Heading(_) => false,
        })
    }

    pub fn accepts_heading(&self, heading: &str) -> bool {
        self.patterns.iter().any(|p| match p {
            OutcomePattern::Heading(m) => m.matches(heading),
            _ => false,
        })
    }
}
