use std::collections::BTreeSet;

use regex::Regex;

use crate::model::catalog::Task;
use crate::model::config::{CompletedFilter, IgnoredFilter, ListSettings, TrackedFilter};

/// Predicate deciding whether a task row may be shown.
pub trait TaskFilter: Send {
    fn matches(&self, task: &Task) -> bool;
}

impl<F> TaskFilter for F
where
    F: Fn(&Task) -> bool + Send,
{
    fn matches(&self, task: &Task) -> bool {
        self(task)
    }
}

/// The standard text/attribute filter driven by the list settings
#[derive(Debug, Clone, Default)]
pub struct StandingFilter {
    pub completed: CompletedFilter,
    pub tracked: TrackedFilter,
    pub ignored: IgnoredFilter,
    pub tiers: Vec<String>,
    pub tags: BTreeSet<String>,
    text: Option<Regex>,
}

impl StandingFilter {
    pub fn from_settings(settings: &ListSettings) -> Self {
        StandingFilter {
            completed: settings.completed,
            tracked: settings.tracked,
            ignored: settings.ignored,
            tiers: settings.tiers.clone(),
            tags: BTreeSet::new(),
            text: None,
        }
    }

    pub fn with_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Case-insensitive substring match against name and description.
    /// Blank text clears the filter.
    pub fn set_text(&mut self, text: &str) {
        let trimmed = text.trim();
        self.text = if trimmed.is_empty() {
            None
        } else {
            Regex::new(&format!("(?i){}", regex::escape(trimmed))).ok()
        };
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    fn text_matches(&self, task: &Task) -> bool {
        match &self.text {
            Some(re) => re.is_match(&task.def.name) || re.is_match(&task.def.description),
            None => true,
        }
    }
}

impl TaskFilter for StandingFilter {
    fn matches(&self, task: &Task) -> bool {
        if !self.completed.admits(task.is_completed()) {
            return false;
        }
        let tracked_ok = match self.tracked {
            TrackedFilter::All => true,
            TrackedFilter::Tracked => task.is_tracked(),
            TrackedFilter::Untracked => !task.is_tracked(),
        };
        let ignored_ok = match self.ignored {
            IgnoredFilter::All => true,
            IgnoredFilter::NotIgnored => !task.is_ignored(),
            IgnoredFilter::Ignored => task.is_ignored(),
        };
        if !tracked_ok || !ignored_ok {
            return false;
        }
        if !self.tiers.is_empty() {
            let tier = task.def.tier.as_deref().unwrap_or("");
            if !self.tiers.iter().any(|t| t.eq_ignore_ascii_case(tier)) {
                return false;
            }
        }
        if !self.tags.is_empty() && self.tags.is_disjoint(&task.save.tags) {
            return false;
        }
        self.text_matches(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::TaskDefinition;

    fn task(name: &str) -> Task {
        Task::new(TaskDefinition {
            id: 1,
            name: name.into(),
            description: "Kill a goblin in Lumbridge".into(),
            tier: Some("Easy".into()),
            ..Default::default()
        })
    }

    #[test]
    fn default_filter_hides_only_ignored() {
        let filter = StandingFilter::default();
        let mut t = task("Goblin");
        assert!(filter.matches(&t));
        t.set_ignored(true, 1);
        assert!(!filter.matches(&t));
    }

    #[test]
    fn completed_filter_applies() {
        let filter = StandingFilter {
            completed: CompletedFilter::Incomplete,
            ..Default::default()
        };
        let mut t = task("Goblin");
        assert!(filter.matches(&t));
        t.set_completed(true, 1);
        assert!(!filter.matches(&t));
    }

    #[test]
    fn text_filter_is_case_insensitive_and_literal() {
        let filter = StandingFilter::default().with_text("LUMBRIDGE");
        assert!(filter.matches(&task("Goblin")));
        let filter = StandingFilter::default().with_text("lumb.*");
        assert!(!filter.matches(&task("Goblin")));
        let filter = StandingFilter::default().with_text("   ");
        assert!(filter.matches(&task("Goblin")));
    }

    #[test]
    fn tier_and_tag_filters() {
        let mut filter = StandingFilter {
            tiers: vec!["hard".into()],
            ..Default::default()
        };
        assert!(!filter.matches(&task("Goblin")));
        filter.tiers = vec!["easy".into()];
        assert!(filter.matches(&task("Goblin")));

        let filter = filter.with_tags(["pvm".to_string()].into_iter().collect());
        let mut t = task("Goblin");
        assert!(!filter.matches(&t));
        t.save.tags.insert("pvm".into());
        assert!(filter.matches(&t));
    }

    #[test]
    fn closures_are_filters() {
        let only_even = |t: &Task| t.id() % 2 == 0;
        assert!(!only_even.matches(&task("x")));
    }
}
