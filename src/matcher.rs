//! Participant identity resolution.
//!
//! Display names in archives are often partly corrupted, or contain emoji the
//! export could only half decode. [`match_names`] therefore tries a ladder of
//! increasingly loose rules and reports which one succeeded:
//!
//! 1. [`MatchRule::Exact`]: case-insensitive equality
//! 2. [`MatchRule::Contains`]: case-insensitive containment, either direction
//! 3. [`MatchRule::Prefix`]: the first three characters agree, ignoring case
//!
//! The prefix rule is a low-confidence heuristic. It exists for usernames
//! that are mostly undecodable emoji.
//!
//! ```rust
//! use memorybook::matcher::{MatchRule, ParticipantMatcher, SenderRole, match_names};
//!
//! assert_eq!(match_names("Sam", "sam"), Some(MatchRule::Exact));
//! assert_eq!(match_names("sam_k", "Sam"), Some(MatchRule::Contains));
//!
//! let matcher = ParticipantMatcher::new("sam", "alex");
//! assert_eq!(matcher.classify("Alex"), SenderRole::Me);
//! assert_eq!(matcher.classify("Jordan"), SenderRole::Other);
//! ```

use serde::Serialize;

const PREFIX_LEN: usize = 3;

/// Which matching rule identified a name.
///
/// Variants are ordered from most to least confident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Exact,
    Contains,
    Prefix,
}

impl MatchRule {
    /// All rules in the order they are tried.
    pub const ALL: [MatchRule; 3] = [MatchRule::Exact, MatchRule::Contains, MatchRule::Prefix];

    fn applies(self, a: &str, b: &str) -> bool {
        match self {
            MatchRule::Exact => a == b,
            MatchRule::Contains => a.contains(b) || b.contains(a),
            MatchRule::Prefix => {
                let prefix_a: String = a.chars().take(PREFIX_LEN).collect();
                let prefix_b: String = b.chars().take(PREFIX_LEN).collect();
                prefix_a.chars().count() == PREFIX_LEN && prefix_a == prefix_b
            }
        }
    }
}

/// Matches two display names, returning the first rule that succeeds.
///
/// Names are trimmed and lowercased first. An empty name never matches.
pub fn match_names(a: &str, b: &str) -> Option<MatchRule> {
    let a = normalize_name(a)?;
    let b = normalize_name(b)?;
    MatchRule::ALL.into_iter().find(|rule| rule.applies(&a, &b))
}

fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_lowercase())
}

/// Who wrote a message, from the archive owner's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Me,
    Target,
    Other,
}

/// Classifies senders against the configured "me" and target identities.
#[derive(Debug, Clone)]
pub struct ParticipantMatcher {
    target: String,
    me: String,
}

impl ParticipantMatcher {
    pub fn new(target: impl Into<String>, me: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            me: me.into(),
        }
    }

    /// The configured target name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The configured "me" name.
    pub fn me(&self) -> &str {
        &self.me
    }

    /// Classifies `sender`.
    ///
    /// Rules are tried in order; within a rule "me" is checked before the
    /// target, so an exact match on either always beats a looser match on the
    /// other.
    pub fn classify(&self, sender: &str) -> SenderRole {
        let Some(sender) = normalize_name(sender) else {
            return SenderRole::Other;
        };
        let me = normalize_name(&self.me);
        let target = normalize_name(&self.target);

        for rule in MatchRule::ALL {
            if me.as_deref().is_some_and(|me| rule.applies(&sender, me)) {
                return SenderRole::Me;
            }
            if target.as_deref().is_some_and(|t| rule.applies(&sender, t)) {
                return SenderRole::Target;
            }
        }
        SenderRole::Other
    }

    /// Best rule by which any name in `names` matches the target.
    ///
    /// Names that [`classify`](Self::classify) resolves to the owner are
    /// ignored, since the owner appears in every conversation.
    pub fn roster_contains_target<S: AsRef<str>>(&self, names: &[S]) -> Option<MatchRule> {
        names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| self.classify(name) != SenderRole::Me)
            .filter_map(|name| match_names(name, &self.target))
            .min()
    }

    /// Returns `true` if `content` mentions the target by name.
    pub fn mentions_target(&self, content: &str) -> bool {
        crate::text::mentions(content, &self.target)
    }

    /// Returns `true` if `content` mentions the archive owner by name.
    pub fn mentions_me(&self, content: &str) -> bool {
        crate::text::mentions(content, &self.me)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ignores_case_and_whitespace() {
        assert_eq!(match_names("  Sam ", "SAM"), Some(MatchRule::Exact));
    }

    #[test]
    fn test_contains_either_direction() {
        assert_eq!(match_names("Sam Kim", "sam"), Some(MatchRule::Contains));
        assert_eq!(match_names("sam", "Sam Kim"), Some(MatchRule::Contains));
    }

    #[test]
    fn test_prefix_tolerates_corrupted_tail() {
        assert_eq!(
            match_names("Nai\u{FFFD}\u{FFFD}", "Naila 🌸"),
            Some(MatchRule::Prefix)
        );
    }

    #[test]
    fn test_prefix_needs_three_chars() {
        assert_eq!(match_names("ab", "abx"), Some(MatchRule::Contains));
        assert_eq!(match_names("ab", "ac"), None);
        assert_eq!(match_names("xy", "xz"), None);
    }

    #[test]
    fn test_empty_never_matches() {
        assert_eq!(match_names("", "sam"), None);
        assert_eq!(match_names("sam", "  "), None);
        assert_eq!(match_names("", ""), None);
    }

    #[test]
    fn test_classify_roles() {
        let matcher = ParticipantMatcher::new("Naila", "Yacine");
        assert_eq!(matcher.classify("naila"), SenderRole::Target);
        assert_eq!(matcher.classify("YACINE"), SenderRole::Me);
        assert_eq!(matcher.classify("Someone"), SenderRole::Other);
        assert_eq!(matcher.classify(""), SenderRole::Other);
    }

    #[test]
    fn test_classify_prefers_stronger_rule() {
        // "samuel" contains "sam" (target) but equals "samuel" (me)
        let matcher = ParticipantMatcher::new("sam", "samuel");
        assert_eq!(matcher.classify("Samuel"), SenderRole::Me);
        assert_eq!(matcher.classify("Sam"), SenderRole::Target);
    }

    #[test]
    fn test_classify_with_empty_me() {
        let matcher = ParticipantMatcher::new("sam", "");
        assert_eq!(matcher.classify("sam"), SenderRole::Target);
        assert_eq!(matcher.classify("alex"), SenderRole::Other);
    }

    #[test]
    fn test_roster_contains_target() {
        let matcher = ParticipantMatcher::new("sam", "alex");
        assert_eq!(
            matcher.roster_contains_target(&["alex", "Sam"]),
            Some(MatchRule::Exact)
        );
        assert_eq!(
            matcher.roster_contains_target(&["samantha", "SAM"]),
            Some(MatchRule::Exact)
        );
        assert_eq!(matcher.roster_contains_target(&["alex", "jordan"]), None);
        assert_eq!(matcher.roster_contains_target::<&str>(&[]), None);
    }

    #[test]
    fn test_roster_ignores_owner_entry() {
        // "mark" shares a prefix with "maria" but is the owner
        let matcher = ParticipantMatcher::new("Maria", "Mark");
        assert_eq!(matcher.roster_contains_target(&["Mark", "Jordan"]), None);
        assert_eq!(
            matcher.roster_contains_target(&["Mark", "Maria"]),
            Some(MatchRule::Exact)
        );

        // owner containing the target
        let matcher = ParticipantMatcher::new("sam", "samuel");
        assert_eq!(matcher.roster_contains_target(&["Samuel", "jordan"]), None);
    }

    #[test]
    fn test_mentions() {
        let matcher = ParticipantMatcher::new("Sam", "Alex");
        assert!(matcher.mentions_target("tell sam hi"));
        assert!(matcher.mentions_me("ALEX!"));
        assert!(!matcher.mentions_me("nobody"));
    }
}
