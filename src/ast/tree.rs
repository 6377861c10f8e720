use ast::node::Node;
use error::{Result, SassError, ErrorKind};

use std::ops::{Index, IndexMut};

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena owning every node of one stylesheet. Parent and child links are
/// indices, so detaching a node never frees it; detached subtrees simply
/// become unreachable from the root.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Tree {
        Tree::new()
    }
}

impl Tree {
    pub fn new() -> Tree {
        Tree {
            slots: vec![Slot { node: Node::Root, parent: None, children: vec![] }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Adds a node that belongs to no parent yet.
    pub fn create(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot { node: node, parent: None, children: vec![] });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.create(node);
        self.append(parent, id);
        id
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.slots[parent.0].children.push(child);
        self.slots[child.0].parent = Some(parent);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    /// The parent of a node that must still be attached.
    pub fn parent_of(&self, id: NodeId) -> Result<NodeId> {
        self.parent(id).ok_or_else(|| SassError::new(
            ErrorKind::NodeNotExpanded,
            format!("{} is no longer attached to the stylesheet", self[id]),
        ))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.slots[id.0].parent.is_some()
    }

    pub fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.slots[parent.0].children.iter().position(|&c| c == child)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let pos = self.position(parent, id)?;
        self.children(parent).get(pos + 1).cloned()
    }

    /// Places `child` right after `anchor` in `parent`, or at the end when
    /// `anchor` is not one of its children.
    pub fn insert_after(&mut self, parent: NodeId, anchor: NodeId, child: NodeId) {
        self.detach(child);
        let at = match self.position(parent, anchor) {
            Some(pos) => pos + 1,
            None => self.slots[parent.0].children.len(),
        };
        self.slots[parent.0].children.insert(at, child);
        self.slots[child.0].parent = Some(parent);
    }

    /// Takes `id` out of its parent's children. Its own subtree is kept.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent.take() {
            self.slots[parent.0].children.retain(|&c| c != id);
        }
    }

    pub fn remove(&mut self, parent: NodeId, id: NodeId) {
        if self.parent(id) == Some(parent) {
            self.detach(id);
        }
    }

    /// Replaces all children of `id`, detaching the previous ones.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        let old = ::std::mem::replace(&mut self.slots[id.0].children, vec![]);
        for c in old {
            self.slots[c.0].parent = None;
        }
        for c in children {
            self.append(id, c);
        }
    }

    /// Deep copy of the subtree under `id`, detached. The copy shares no
    /// node with the original.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let copy = self.create(self.slots[id.0].node.clone());
        let children = self.slots[id.0].children.clone();
        for c in children {
            let child_copy = self.clone_subtree(c);
            self.slots[copy.0].children.push(child_copy);
            self.slots[child_copy.0].parent = Some(copy);
        }
        copy
    }

    /// Copies the subtree under `id` of another tree into this one, detached.
    pub fn graft(&mut self, other: &Tree, id: NodeId) -> NodeId {
        let copy = self.create(other[id].clone());
        for &c in other.children(id) {
            let child_copy = self.graft(other, c);
            self.slots[copy.0].children.push(child_copy);
            self.slots[child_copy.0].parent = Some(copy);
        }
        copy
    }

    /// Every node under `id` in document order, `id` included.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = vec![];
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            result.push(n);
            stack.extend(self.children(n).iter().rev().cloned());
        }
        result
    }

    /// Indented dump of the reachable tree, one node per line.
    pub fn outline(&self) -> String {
        let mut lines = vec![];
        self.outline_into(self.root, 0, &mut lines);
        lines.join("\n")
    }

    fn outline_into(&self, id: NodeId, depth: usize, lines: &mut Vec<String>) {
        for &c in self.children(id) {
            lines.push(format!("{}{}", "  ".repeat(depth), self[c]));
            self.outline_into(c, depth + 1, lines);
        }
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;
    fn index(&self, index: NodeId) -> &Node {
        &self.slots[index.0].node
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, index: NodeId) -> &mut Node {
        &mut self.slots[index.0].node
    }
}
