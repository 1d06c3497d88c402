//! Client-side content filtering for candidate shots.
//!
//! The site has no NSFW or tag exclusion parameter, so unwanted shots are
//! dropped after the page is fetched.

use std::collections::BTreeSet;

use crate::markup::ShotPage;
use crate::types::DEFAULT_EXCLUDED_TAGS;

/// Why a candidate was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Nsfw,
    ExcludedTags(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Acceptance rules applied to each shot page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotFilter {
    pub nsfw_ok: bool,
    pub excluded_tags: BTreeSet<String>,
}

impl Default for ShotFilter {
    /// No NSFW shots and none tagged with [`DEFAULT_EXCLUDED_TAGS`].
    fn default() -> Self {
        Self {
            nsfw_ok: false,
            excluded_tags: DEFAULT_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ShotFilter {
    /// A filter that accepts everything.
    pub fn permissive() -> Self {
        Self {
            nsfw_ok: true,
            excluded_tags: BTreeSet::new(),
        }
    }

    pub fn with_excluded_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn verdict(&self, page: &ShotPage) -> Verdict {
        if page.nsfw && !self.nsfw_ok {
            return Verdict::Reject(RejectReason::Nsfw);
        }

        if !self.excluded_tags.is_empty() {
            let hits: Vec<String> = page
                .tags
                .intersection(&self.excluded_tags)
                .cloned()
                .collect();
            if !hits.is_empty() {
                return Verdict::Reject(RejectReason::ExcludedTags(hits));
            }
        }

        Verdict::Accept
    }
}
