//! Byte ranges of rendered output attributed to the nodes that produced them.
//!
//! A [`SpanTree`] has two views over one arena: the owning tree (`parent` / `children`) and a
//! flat preorder list (`prev` / `next`). Both are filled by the same [`SpanBuilder::open`] call,
//! so they cannot disagree. Start offsets are nondecreasing in preorder, which is what makes
//! [`SpanTree::find`] a binary search.
use crate::ast::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpanId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeSpan {
    /// Inclusive.
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub node: NodeId,
    pub parent: Option<SpanId>,
    pub children: Vec<SpanId>,
    pub prev: Option<SpanId>,
    pub next: Option<SpanId>,
}

impl NodeSpan {
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

#[derive(Debug, Default)]
pub struct SpanBuilder {
    spans: Vec<NodeSpan>,
    stack: Vec<SpanId>,
}

impl SpanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Starts a span for `node` at `offset`, as the last child of the innermost open span and
    /// the preorder successor of the most recently opened one.
    pub fn open(&mut self, node: NodeId, offset: usize) -> SpanId {
        let id = SpanId(self.spans.len());
        let parent = self.stack.last().copied();
        if let Some(parent) = parent {
            self.spans[parent.0].children.push(id);
        } else {
            assert!(self.spans.is_empty(), "span tree already has a root");
        }
        let prev = id.0.checked_sub(1).map(SpanId);
        if let Some(prev) = prev {
            self.spans[prev.0].next = Some(id);
        }
        self.spans.push(NodeSpan {
            start: offset,
            end: offset,
            node,
            parent,
            children: Vec::new(),
            prev,
            next: None,
        });
        self.stack.push(id);
        id
    }

    pub fn close(&mut self, offset: usize) {
        let Some(id) = self.stack.pop() else {
            panic!("close_span without matching open_span");
        };
        self.spans[id.0].end = offset;
    }

    /// Freezes the tree, translating start offsets through `start` and end offsets through
    /// `end`. An end never lands before its start.
    pub fn finish(
        self,
        start: impl Fn(usize) -> usize,
        end: impl Fn(usize) -> usize,
    ) -> SpanTree {
        assert!(
            self.stack.is_empty(),
            "finish with {} unclosed spans",
            self.stack.len()
        );
        assert!(!self.spans.is_empty(), "finish without a root span");
        let mut spans = self.spans;
        for span in &mut spans {
            span.start = start(span.start);
            span.end = end(span.end).max(span.start);
        }
        SpanTree { spans }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanTree {
    spans: Vec<NodeSpan>,
}

impl SpanTree {
    pub fn root(&self) -> SpanId {
        SpanId(0)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, id: SpanId) -> &NodeSpan {
        &self.spans[id.0]
    }

    pub fn children(&self, id: SpanId) -> &[SpanId] {
        &self.spans[id.0].children
    }

    pub fn parent(&self, id: SpanId) -> Option<SpanId> {
        self.spans[id.0].parent
    }

    pub fn next(&self, id: SpanId) -> Option<SpanId> {
        self.spans[id.0].next
    }

    pub fn prev(&self, id: SpanId) -> Option<SpanId> {
        self.spans[id.0].prev
    }

    /// Spans in preorder.
    pub fn iter(&self) -> impl Iterator<Item = (SpanId, &NodeSpan)> {
        self.spans.iter().enumerate().map(|(i, s)| (SpanId(i), s))
    }

    /// The innermost span containing `offset`.
    pub fn find(&self, offset: usize) -> Option<SpanId> {
        let last = self.spans.partition_point(|s| s.start <= offset);
        let mut cursor = last.checked_sub(1).map(SpanId);
        while let Some(id) = cursor {
            if self.spans[id.0].contains(offset) {
                return Some(id);
            }
            cursor = self.spans[id.0].parent;
        }
        None
    }

    /// The first span after `from` in preorder whose node satisfies `pred`.
    pub fn next_matching(
        &self,
        from: SpanId,
        mut pred: impl FnMut(&NodeSpan) -> bool,
    ) -> Option<SpanId> {
        let mut cursor = self.next(from);
        while let Some(id) = cursor {
            if pred(self.get(id)) {
                return Some(id);
            }
            cursor = self.next(id);
        }
        None
    }

    /// The last span before `from` in preorder whose node satisfies `pred`.
    pub fn prev_matching(
        &self,
        from: SpanId,
        mut pred: impl FnMut(&NodeSpan) -> bool,
    ) -> Option<SpanId> {
        let mut cursor = self.prev(from);
        while let Some(id) = cursor {
            if pred(self.get(id)) {
                return Some(id);
            }
            cursor = self.prev(id);
        }
        None
    }

    /// The span recorded for `node`, if it produced one.
    pub fn span_of(&self, node: NodeId) -> Option<SpanId> {
        self.spans
            .iter()
            .position(|s| s.node == node)
            .map(SpanId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Document;

    fn ids(n: usize) -> Vec<NodeId> {
        let doc = Document::parse("a *b* c\n\nd\n");
        doc.descendants(doc.root()).take(n).collect()
    }

    fn sample() -> SpanTree {
        let n = ids(4);
        let mut b = SpanBuilder::new();
        b.open(n[0], 0);
        b.open(n[1], 0);
        b.close(5);
        b.open(n[2], 5);
        b.open(n[3], 6);
        b.close(8);
        b.close(9);
        b.close(9);
        b.finish(|o| o, |o| o)
    }

    #[test]
    fn builds_tree_and_preorder_list_together() {
        let tree = sample();
        let root = tree.root();
        assert_eq!(tree.children(root).len(), 2);
        let order: Vec<_> = std::iter::successors(Some(root), |id| tree.next(*id))
            .map(|id| (tree.get(id).start, tree.get(id).end))
            .collect();
        assert_eq!(order, vec![(0, 9), (0, 5), (5, 9), (6, 8)]);

        let back: Vec<_> = std::iter::successors(Some(SpanId(3)), |id| tree.prev(*id))
            .map(|id| id.0)
            .collect();
        assert_eq!(back, vec![3, 2, 1, 0]);
    }

    #[test]
    fn find_returns_innermost_span() {
        let tree = sample();
        assert_eq!(tree.find(0), Some(SpanId(1)));
        assert_eq!(tree.find(5), Some(SpanId(2)));
        assert_eq!(tree.find(7), Some(SpanId(3)));
        assert_eq!(tree.find(8), Some(SpanId(2)));
        assert_eq!(tree.find(9), None);
    }

    #[test]
    fn matching_walks_skip_non_matches() {
        let tree = sample();
        let wide = |s: &NodeSpan| s.len() > 3;
        assert_eq!(tree.next_matching(tree.root(), wide), Some(SpanId(1)));
        assert_eq!(tree.next_matching(SpanId(1), wide), Some(SpanId(2)));
        assert_eq!(tree.next_matching(SpanId(2), wide), None);
        assert_eq!(tree.prev_matching(SpanId(3), |s| s.start == 0), Some(SpanId(1)));
    }

    #[test]
    fn finish_translates_offsets() {
        let n = ids(1);
        let mut b = SpanBuilder::new();
        b.open(n[0], 2);
        b.close(4);
        let tree = b.finish(|o| o * 10, |o| o * 10 - 1);
        assert_eq!((tree.get(tree.root()).start, tree.get(tree.root()).end), (20, 39));
    }

    #[test]
    fn empty_spans_keep_end_at_start() {
        let n = ids(1);
        let mut b = SpanBuilder::new();
        b.open(n[0], 3);
        b.close(3);
        let tree = b.finish(|o| o + 2, |o| o);
        assert_eq!((tree.get(tree.root()).start, tree.get(tree.root()).end), (5, 5));
    }

    #[test]
    #[should_panic(expected = "close_span without matching open_span")]
    fn unbalanced_close_panics() {
        SpanBuilder::new().close(0);
    }

    #[test]
    #[should_panic(expected = "unclosed spans")]
    fn finishing_with_open_spans_panics() {
        let n = ids(1);
        let mut b = SpanBuilder::new();
        b.open(n[0], 0);
        b.finish(|o| o, |o| o);
    }
}
