//! Rule set resolution
//!
//! Runs every active rule over a snapshot, merges the matches and
//! resolves overlaps into a single ordered, non-overlapping list of
//! annotations. Rule list order is priority: when two matches start at
//! the same offset the earlier rule wins.

use tracing::warn;

use super::matcher::Matcher;
use super::rule::KeywordRule;
use super::snapshot::TextSnapshot;
use super::style::{resolve_style, StyleDescriptor};

/// A resolved, styled range of text (char offsets)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Style to paint the range with
    pub style: StyleDescriptor,
}

impl Annotation {
    /// Text covered by this annotation
    pub fn text<'a>(&self, snapshot: &TextSnapshot<'a>) -> &'a str {
        snapshot.slice(self.start, self.end)
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the annotation covers nothing
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// One compiled, active rule
#[derive(Debug)]
struct CompiledRule {
    /// Position in the original rule list
    index: usize,
    matcher: Matcher,
    style: StyleDescriptor,
}

/// Rules compiled once for repeated resolution
///
/// Building a `RuleSet` drops inactive rules and rules whose pattern
/// fails to compile (logging the failure), so resolving many snapshots
/// against the same rules never recompiles a pattern.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile a rule list
    pub fn compile(rules: &[KeywordRule]) -> Self {
        let rules = rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.is_active())
            .filter_map(|(index, rule)| match Matcher::compile(rule) {
                Ok(matcher) => Some(CompiledRule {
                    index,
                    matcher,
                    style: resolve_style(rule),
                }),
                Err(e) => {
                    warn!("Skipping keyword rule {}: {}", index, e);
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Number of rules that take part in matching
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rule takes part in matching
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve annotations for a snapshot
    pub fn resolve(&self, snapshot: &TextSnapshot) -> Vec<Annotation> {
        self.resolve_around(snapshot, &[], |_, _| true)
    }

    /// Resolve annotations around ranges that are already highlighted
    ///
    /// `locked` ranges take part in the sweep as accepted spans ahead of
    /// every rule, so nothing overlapping them is produced. A match is
    /// only kept if `placeable(start, end)` allows it; a refused match is
    /// dropped without blocking later ones. Only new annotations are
    /// returned.
    pub fn resolve_around<F>(
        &self,
        snapshot: &TextSnapshot,
        locked: &[(usize, usize)],
        placeable: F,
    ) -> Vec<Annotation>
    where
        F: Fn(usize, usize) -> bool,
    {
        if snapshot.is_empty() {
            return Vec::new();
        }

        // (start, end, slot): locked ranges use slot None, which sorts first
        let mut spans: Vec<(usize, usize, Option<usize>)> =
            locked.iter().map(|&(start, end)| (start, end, None)).collect();
        for (slot, rule) in self.rules.iter().enumerate() {
            spans.extend(
                rule.matcher
                    .find_ranges(snapshot)
                    .into_iter()
                    .map(|(start, end)| (start, end, Some(slot))),
            );
        }

        // Compiled rules keep list order, so slot order is rule-index order
        spans.sort_by_key(|&(start, _, slot)| (start, slot));

        let mut annotations = Vec::new();
        let mut last_end = 0;
        for (start, end, slot) in spans {
            let Some(slot) = slot else {
                last_end = last_end.max(end);
                continue;
            };
            if start < last_end || !placeable(start, end) {
                continue;
            }
            annotations.push(Annotation {
                start,
                end,
                style: self.rules[slot].style.clone(),
            });
            last_end = end;
        }
        annotations
    }

    /// List index of each compiled rule, in priority order
    pub fn rule_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rules.iter().map(|r| r.index)
    }
}

/// Resolve annotations for a snapshot against a rule list
pub fn resolve(snapshot: &TextSnapshot, rules: &[KeywordRule]) -> Vec<Annotation> {
    RuleSet::compile(rules).resolve(snapshot)
}

/// A piece of text, plain or highlighted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Highlighted(&'a str, &'a StyleDescriptor),
}

impl<'a> Segment<'a> {
    /// Text of the segment
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain(text) | Segment::Highlighted(text, _) => text,
        }
    }
}

/// Cut a snapshot into plain and highlighted segments covering all of it
pub fn segments<'a>(snapshot: &TextSnapshot<'a>, annotations: &'a [Annotation]) -> Vec<Segment<'a>> {
    let mut segments = Vec::with_capacity(annotations.len() * 2 + 1);
    let mut pos = 0;

    for ann in annotations {
        if ann.start > pos {
            segments.push(Segment::Plain(snapshot.slice(pos, ann.start)));
        }
        segments.push(Segment::Highlighted(ann.text(snapshot), &ann.style));
        pos = ann.end;
    }

    if pos < snapshot.len_chars() {
        segments.push(Segment::Plain(snapshot.slice(pos, snapshot.len_chars())));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::FontModifier;

    fn spans(text: &str, rules: &[KeywordRule]) -> Vec<(usize, usize, String)> {
        let snap = TextSnapshot::new(text);
        resolve(&snap, rules)
            .iter()
            .map(|a| (a.start, a.end, a.text(&snap).to_string()))
            .collect()
    }

    #[test]
    fn test_todo_fixme_scenario() {
        let rules = vec![KeywordRule::regex(r"TODO\.*"), KeywordRule::literal("FIXME")];
        // The trailing \b sits between '.' and 'f', so the match stops
        // at "TODO." and never reaches "fix"
        assert_eq!(
            spans("TODO.fix this FIXME later", &rules),
            vec![(0, 5, "TODO.".to_string()), (14, 19, "FIXME".to_string())]
        );
    }

    #[test]
    fn test_earlier_rule_wins_tie() {
        let first = KeywordRule::regex("foo").with_modifier(FontModifier::Bold);
        let second = KeywordRule::regex(r"foo bar");
        let snap = TextSnapshot::new("foo bar");

        let anns = resolve(&snap, &[first.clone(), second.clone()]);
        assert_eq!(anns.len(), 1);
        assert_eq!((anns[0].start, anns[0].end), (0, 3));
        assert_eq!(anns[0].style, resolve_style(&first));

        let anns = resolve(&snap, &[second.clone(), first]);
        assert_eq!(anns.len(), 1);
        assert_eq!((anns[0].start, anns[0].end), (0, 7));
        assert_eq!(anns[0].style, resolve_style(&second));
    }

    #[test]
    fn test_overlap_dropped_not_truncated() {
        let rules = vec![KeywordRule::regex("alpha beta"), KeywordRule::regex("beta gamma")];
        assert_eq!(
            spans("alpha beta gamma", &rules),
            vec![(0, 10, "alpha beta".to_string())]
        );
    }

    #[test]
    fn test_empty_pattern_rule_ignored() {
        let rules = vec![KeywordRule::literal(""), KeywordRule::regex("  "), KeywordRule::literal("x")];
        assert_eq!(RuleSet::compile(&rules).len(), 1);
        assert_eq!(spans("x y", &rules), vec![(0, 1, "x".to_string())]);
    }

    #[test]
    fn test_bad_pattern_does_not_abort() {
        let rules = vec![KeywordRule::regex("(oops"), KeywordRule::literal("fine")];
        let set = RuleSet::compile(&rules);
        assert_eq!(set.rule_indices().collect::<Vec<_>>(), vec![1]);
        assert_eq!(spans("all fine here", &rules), vec![(4, 8, "fine".to_string())]);
    }

    #[test]
    fn test_locked_ranges_block_overlaps() {
        let rules = vec![KeywordRule::regex("x p"), KeywordRule::regex("p q|q r")];
        let set = RuleSet::compile(&rules);
        let snap = TextSnapshot::new("x p q r");

        // "q r" is never a match of its own: "p q" consumed the "q"
        assert!(set.resolve_around(&snap, &[(0, 3)], |_, _| true).is_empty());

        let anns = set.resolve_around(&snap, &[(0, 1)], |_, _| true);
        assert_eq!(anns.len(), 1);
        assert_eq!((anns[0].start, anns[0].end), (2, 5));
    }

    #[test]
    fn test_refused_match_does_not_block() {
        let rules = vec![KeywordRule::regex("alpha beta"), KeywordRule::literal("beta")];
        let set = RuleSet::compile(&rules);
        let snap = TextSnapshot::new("alpha beta");
        let anns = set.resolve_around(&snap, &[], |start, _| start > 0);
        assert_eq!(anns.len(), 1);
        assert_eq!((anns[0].start, anns[0].end), (6, 10));
    }

    #[test]
    fn test_segments_cover_text() {
        let rules = vec![KeywordRule::literal("b")];
        let snap = TextSnapshot::new("a b c b");
        let anns = resolve(&snap, &rules);
        let segs = segments(&snap, &anns);
        let joined: String = segs.iter().map(|s| s.text()).collect();
        assert_eq!(joined, "a b c b");
        assert_eq!(segs.len(), 4);
        assert!(matches!(segs[1], Segment::Highlighted("b", _)));
        assert!(matches!(segs[3], Segment::Highlighted("b", _)));
    }

    #[test]
    fn test_empty_text() {
        let rules = vec![KeywordRule::literal("x")];
        assert!(spans("", &rules).is_empty());
        let snap = TextSnapshot::new("");
        assert!(segments(&snap, &[]).is_empty());
    }
}
