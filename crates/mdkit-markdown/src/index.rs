//! Sections and anchors derived from a document's headings.
//!
//! Every heading starts a section that runs until the next heading of the same or a shallower
//! level. Sections nest by level under a root section standing for the whole document.
use std::collections::HashMap;

use crate::ast::Document;
use crate::ast::NodeId;
use crate::ast::NodeKind;

/// Converts heading text into a GitHub-style anchor: lowercased, stripped of everything but
/// letters, digits, `-`, `_` and spaces, with spaces turned into `-`.
pub fn github_anchor(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectionId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// `0` for the root section.
    pub level: u8,
    pub anchor: String,
    pub title: String,
    /// The heading that opens the section, or the document node for the root.
    pub start: NodeId,
    /// The heading that closes the section, if any.
    pub end: Option<NodeId>,
    pub subsections: Vec<SectionId>,
}

#[derive(Clone, Debug)]
pub struct DocumentIndex {
    sections: Vec<Section>,
    anchors: HashMap<String, Vec<SectionId>>,
}

impl DocumentIndex {
    pub fn build(doc: &Document<'_>) -> Self {
        Self::build_with(doc, github_anchor)
    }

    /// Like [`DocumentIndex::build`], with a custom heading-to-anchor conversion.
    pub fn build_with(doc: &Document<'_>, anchor: impl Fn(&str) -> String) -> Self {
        let mut sections = vec![Section {
            level: 0,
            anchor: String::new(),
            title: String::new(),
            start: doc.root(),
            end: None,
            subsections: Vec::new(),
        }];
        let mut anchors: HashMap<String, Vec<SectionId>> = HashMap::new();
        let mut stack = vec![SectionId(0)];

        for node in doc.descendants(doc.root()) {
            let NodeKind::Heading { level, .. } = *doc.kind(node) else {
                continue;
            };
            while let Some(&open) = stack.last()
                && open.0 != 0
                && level <= sections[open.0].level
            {
                sections[open.0].end = Some(node);
                stack.pop();
            }

            let title = doc.plain_text(node);
            let id = SectionId(sections.len());
            sections.push(Section {
                level,
                anchor: anchor(&title),
                title,
                start: node,
                end: None,
                subsections: Vec::new(),
            });
            anchors
                .entry(sections[id.0].anchor.clone())
                .or_default()
                .push(id);
            let parent = stack.last().copied().unwrap_or(SectionId(0));
            sections[parent.0].subsections.push(id);
            stack.push(id);
        }

        Self { sections, anchors }
    }

    /// The root section; its subsections form the table of contents.
    pub fn toc(&self) -> SectionId {
        SectionId(0)
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    /// Sections with the given anchor, in document order.
    pub fn lookup(&self, anchor: &str) -> &[SectionId] {
        self.anchors.get(anchor).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Top-level nodes of a section: its heading and the siblings that follow it up to the
    /// closing heading. The root section yields the document node alone.
    pub fn nodes(&self, doc: &Document<'_>, id: SectionId) -> Vec<NodeId> {
        let section = &self.sections[id.0];
        let Some(parent) = doc.parent(section.start) else {
            return vec![section.start];
        };
        doc.children(parent)
            .iter()
            .copied()
            .skip_while(|n| *n != section.start)
            .take_while(|n| Some(*n) != section.end)
            .collect()
    }

    /// The table of contents as `(depth, title, anchor)` rows in document order.
    pub fn outline(&self) -> Vec<(usize, &str, &str)> {
        let mut rows = Vec::new();
        let mut stack: Vec<(usize, SectionId)> = self
            .section(self.toc())
            .subsections
            .iter()
            .rev()
            .map(|id| (0, *id))
            .collect();
        while let Some((depth, id)) = stack.pop() {
            let section = self.section(id);
            rows.push((depth, section.title.as_str(), section.anchor.as_str()));
            stack.extend(section.subsections.iter().rev().map(|s| (depth + 1, *s)));
        }
        rows
    }
}
