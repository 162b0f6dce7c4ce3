//! Rendered-surface highlighting
//!
//! Rewrites an already rendered element tree in place: every text node
//! containing matches is replaced by sibling nodes alternating plain
//! text and highlight elements. Adjacent text and highlight siblings are
//! matched as one text with earlier highlights held fixed, and highlight
//! elements are never entered, so running the pass again changes nothing.

use crate::highlight::{KeywordRule, RuleSet, StyleDescriptor, TextSnapshot, BASE_CLASS};

/// Tag used for inserted highlight elements
pub const HIGHLIGHT_TAG: &str = "span";

/// A node of the rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => escape_into(text, out),
            Node::Element(el) => el.write_html(out),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// An element of the rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    /// Inline style properties, in insertion order
    pub style: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            style: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add a class
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: append a text child
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    /// Check whether a class is present
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Set an inline style property, replacing an earlier value
    pub fn set_style_property(&mut self, name: &str, value: &str) {
        match self.style.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.style.push((name.to_string(), value.to_string())),
        }
    }

    /// Inline style property value
    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether this element is a highlight inserted by a previous pass
    pub fn is_highlight(&self) -> bool {
        self.has_class(BASE_CLASS)
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.collect_text(&mut out));
        out
    }

    /// Serialize as HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            escape_into(&self.classes.join(" "), out);
            out.push('"');
        }
        if !self.style.is_empty() {
            let style: Vec<String> = self
                .style
                .iter()
                .map(|(name, value)| format!("{}: {};", name, value))
                .collect();
            out.push_str(" style=\"");
            escape_into(&style.join(" "), out);
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// Build the highlight element for a matched substring
fn highlight_element(text: &str, style: &StyleDescriptor) -> Element {
    let mut el = Element::new(HIGHLIGHT_TAG);
    el.classes = style.class_names.clone();
    for (name, value) in style.variables() {
        el.set_style_property(name, value);
    }
    el.with_text(text)
}

/// Rewrite a run of adjacent text and highlight siblings into `out`
///
/// The run is matched as one text, so highlights from an earlier pass
/// keep their neighbours. Existing highlights are locked in place and new
/// ones are only placed inside a single non-blank text node. Returns the
/// number of highlights inserted.
fn rewrite_run(run: Vec<Node>, rules: &RuleSet, out: &mut Vec<Node>) -> usize {
    let has_text = run
        .iter()
        .any(|node| matches!(node, Node::Text(text) if !text.trim().is_empty()));
    if !has_text {
        out.extend(run);
        return 0;
    }

    let mut text = String::new();
    let mut bounds = Vec::with_capacity(run.len());
    let mut locked = Vec::new();
    let mut fragments = Vec::new();
    for node in &run {
        let start = bounds.last().map_or(0, |&(_, end)| end);
        let content = node.text_content();
        let end = start + content.chars().count();
        match node {
            Node::Element(_) => locked.push((start, end)),
            Node::Text(t) if !t.trim().is_empty() => fragments.push((start, end)),
            Node::Text(_) => {}
        }
        bounds.push((start, end));
        text.push_str(&content);
    }

    let snapshot = TextSnapshot::new(&text);
    let annotations = rules.resolve_around(&snapshot, &locked, |start, end| {
        fragments.iter().any(|&(from, to)| from <= start && end <= to)
    });
    if annotations.is_empty() {
        out.extend(run);
        return 0;
    }

    let mut pending = annotations.iter().peekable();
    for (node, (from, to)) in run.into_iter().zip(bounds) {
        let Node::Text(_) = node else {
            out.push(node);
            continue;
        };
        if !pending.peek().is_some_and(|ann| ann.end <= to) {
            out.push(node);
            continue;
        }

        let mut pos = from;
        while let Some(ann) = pending.next_if(|ann| ann.end <= to) {
            if ann.start > pos {
                out.push(Node::text(snapshot.slice(pos, ann.start)));
            }
            out.push(highlight_element(ann.text(&snapshot), &ann.style).into());
            pos = ann.end;
        }
        if pos < to {
            out.push(Node::text(snapshot.slice(pos, to)));
        }
    }

    annotations.len()
}

/// Highlight all keyword matches under `root` in place
///
/// Returns the number of highlight elements inserted.
pub fn highlight_tree(root: &mut Element, rules: &[KeywordRule]) -> usize {
    let rules = RuleSet::compile(rules);
    if rules.is_empty() {
        return 0;
    }

    let mut inserted = 0;
    let mut stack: Vec<&mut Element> = vec![root];

    while let Some(el) = stack.pop() {
        if el.is_highlight() {
            continue;
        }

        // Children are replaced wholesale before descending
        let children = std::mem::take(&mut el.children);
        let mut rewritten = Vec::with_capacity(children.len());
        let mut run = Vec::new();
        for child in children {
            match child {
                Node::Element(child) if !child.is_highlight() => {
                    inserted += rewrite_run(std::mem::take(&mut run), &rules, &mut rewritten);
                    rewritten.push(Node::Element(child));
                }
                node => run.push(node),
            }
        }
        inserted += rewrite_run(run, &rules, &mut rewritten);
        el.children = rewritten;

        // Reversed so the first child is processed first
        for child in el.children.iter_mut().rev() {
            if let Node::Element(child) = child {
                if !child.is_highlight() {
                    stack.push(child);
                }
            }
        }
    }

    inserted
}

/// Escape text for HTML output
fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{FontModifier, BACKGROUND_VAR, COLOR_VAR};

    fn rules() -> Vec<KeywordRule> {
        vec![
            KeywordRule::regex(r"TODO\.*").with_colors("#000000", "#A9CCE3"),
            KeywordRule::literal("FIXME")
                .with_colors("#000000", "#BAA2E8")
                .with_visibility(false, true)
                .with_modifier(FontModifier::Bold),
        ]
    }

    fn document() -> Element {
        Element::new("div")
            .with_child(Element::new("p").with_text("TODO.fix this FIXME later"))
            .with_child(
                Element::new("ul").with_child(
                    Element::new("li")
                        .with_text("nested ")
                        .with_child(Element::new("em").with_text("fixme"))
                        .with_text(" & TODO"),
                ),
            )
    }

    #[test]
    fn test_wraps_matches() {
        let mut root = document();
        let original = root.text_content();

        assert_eq!(highlight_tree(&mut root, &rules()), 4);
        assert_eq!(root.text_content(), original);

        let Node::Element(p) = &root.children[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.children.len(), 4);
        assert_eq!(p.children[1], Node::text(".fix this "));
        let Node::Element(todo) = &p.children[0] else {
            panic!("expected highlight");
        };
        assert_eq!(todo.text_content(), "TODO.");
        assert_eq!(todo.style_property(COLOR_VAR), Some("#000000"));
        assert_eq!(todo.style_property(BACKGROUND_VAR), Some("#A9CCE3"));

        let Node::Element(fixme) = &p.children[2] else {
            panic!("expected highlight");
        };
        assert_eq!(fixme.classes, vec!["kh-highlighted", "kh-bold"]);
        assert_eq!(fixme.style_property(COLOR_VAR), None);
        assert_eq!(fixme.style_property(BACKGROUND_VAR), Some("#BAA2E8"));
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut root = document();
        highlight_tree(&mut root, &rules());
        let once = root.clone();

        assert_eq!(highlight_tree(&mut root, &rules()), 0);
        assert_eq!(root, once);
    }

    #[test]
    fn test_existing_highlight_skipped() {
        let mut root = Element::new("p")
            .with_child(Element::new("span").with_class(BASE_CLASS).with_text("FIXME"))
            .with_text(" FIXME");
        assert_eq!(highlight_tree(&mut root, &rules()), 1);
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.text_content(), "FIXME FIXME");
    }

    #[test]
    fn test_second_pass_keeps_word_context() {
        // "todo" is not a whole word in "ab-todo"; wrapping "ab-" must not
        // make it one on the next pass
        let rules = vec![KeywordRule::regex("ab-"), KeywordRule::literal("todo")];
        let mut root = Element::new("p").with_text("ab-todo");

        assert_eq!(highlight_tree(&mut root, &rules), 1);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1], Node::text("todo"));
        assert_eq!(highlight_tree(&mut root, &rules), 0);
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_second_pass_keeps_consumed_alternatives() {
        // "p q" lost to "x p", and "q r" never matched on its own
        let rules = vec![KeywordRule::regex("x p"), KeywordRule::regex("p q|q r")];
        let mut root = Element::new("p").with_text("x p q r");

        assert_eq!(highlight_tree(&mut root, &rules), 1);
        let once = root.clone();
        assert_eq!(highlight_tree(&mut root, &rules), 0);
        assert_eq!(root, once);
        assert_eq!(root.children[1], Node::text(" q r"));
    }

    #[test]
    fn test_adjacent_text_nodes_matched_together() {
        let rules = vec![KeywordRule::literal("FIXME")];
        let mut root = Element::new("p")
            .with_text("FIX")
            .with_text("ME later FIXME");

        // The match across the node boundary cannot be wrapped in place
        assert_eq!(highlight_tree(&mut root, &rules), 1);
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0], Node::text("FIX"));
        assert_eq!(root.children[1], Node::text("ME later "));
        assert_eq!(root.text_content(), "FIXME later FIXME");
    }

    #[test]
    fn test_blank_and_textless_trees() {
        let mut root = Element::new("div")
            .with_text("")
            .with_text("  \n ")
            .with_child(Element::new("hr"));
        let before = root.clone();
        assert_eq!(highlight_tree(&mut root, &rules()), 0);
        assert_eq!(root, before);

        let mut empty = Element::new("div");
        assert_eq!(highlight_tree(&mut empty, &rules()), 0);
        assert!(empty.children.is_empty());
    }

    #[test]
    fn test_to_html() {
        let mut root = Element::new("p").with_text("a <b> FIXME");
        highlight_tree(&mut root, &rules());
        assert_eq!(
            root.to_html(),
            "<p>a &lt;b&gt; <span class=\"kh-highlighted kh-bold\" \
             style=\"--kh-bgc: #BAA2E8;\">FIXME</span></p>"
        );
    }
}
