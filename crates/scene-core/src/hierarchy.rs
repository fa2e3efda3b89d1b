//! Parent/child structure among entities.
//!
//! Two independent forms exist: a flat list of [`HierarchyRelation`]s and a
//! nested [`HierarchyTree`]. They are never reconciled with each other.

use serde::{Serialize, Serializer};

/// Name given to the synthetic node that anchors several declared roots.
pub const VIRTUAL_ROOT_NAME: &str = "__root__";

/// A flat parent/child edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyRelation {
    /// Parent entity name.
    pub parent: String,
    /// Child entity name.
    pub child: String,
    /// Ordering hint among siblings.
    pub order: i64,
}

impl HierarchyRelation {
    /// Creates a relation.
    pub fn new(parent: impl Into<String>, child: impl Into<String>, order: i64) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            order,
        }
    }
}

/// Index of a node inside a [`HierarchyTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a tree node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A reference to a declared entity.
    Entity,
    /// The synthetic anchor created for multiple roots. Not an entity.
    VirtualRoot,
}

/// A node in the tree form of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    /// Entity name, or [`VIRTUAL_ROOT_NAME`].
    pub name: String,
    /// Entity reference or synthetic anchor.
    pub kind: NodeKind,
    /// Children in declaration order.
    pub children: Vec<NodeId>,
    /// Non-owning back-reference; `None` at the root.
    pub parent: Option<NodeId>,
}

impl HierarchyNode {
    /// Returns true for the synthetic multi-root anchor.
    pub fn is_virtual(&self) -> bool {
        self.kind == NodeKind::VirtualRoot
    }
}

/// An owned nested description of a subtree, used to build a
/// [`HierarchyTree`] and to serialize one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    /// Entity name.
    pub name: String,
    /// Nested children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Branch>,
}

impl Branch {
    /// A node with no children.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// A node with children.
    pub fn new(name: impl Into<String>, children: Vec<Branch>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// Arena-backed tree. Parent links are indices, so nodes never own each
/// other and the tree can be walked in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyTree {
    nodes: Vec<HierarchyNode>,
    root: NodeId,
}

impl HierarchyTree {
    /// Builds a tree from declared roots. Several roots are gathered under a
    /// virtual root; no roots yields `None`.
    pub fn from_roots(mut roots: Vec<Branch>) -> Option<Self> {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        match roots.len() {
            0 => return None,
            1 => {
                let root = roots.remove(0);
                tree.root = tree.insert(root, None);
            }
            _ => {
                let anchor = tree.push(VIRTUAL_ROOT_NAME.to_string(), NodeKind::VirtualRoot, None);
                for branch in roots {
                    let child = tree.insert(branch, Some(anchor));
                    tree.nodes[anchor.0].children.push(child);
                }
                tree.root = anchor;
            }
        }
        Some(tree)
    }

    fn push(&mut self, name: String, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HierarchyNode {
            name,
            kind,
            children: Vec::new(),
            parent,
        });
        id
    }

    fn insert(&mut self, branch: Branch, parent: Option<NodeId>) -> NodeId {
        let id = self.push(branch.name, NodeKind::Entity, parent);
        for child in branch.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// Id of the top node (possibly the virtual root).
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// The top node (possibly the virtual root).
    pub fn root(&self) -> &HierarchyNode {
        &self.nodes[self.root.0]
    }

    /// Returns true if several roots were declared.
    pub fn has_virtual_root(&self) -> bool {
        self.root().is_virtual()
    }

    /// The declared roots, in order, regardless of whether a virtual root
    /// anchors them.
    pub fn roots(&self) -> Vec<NodeId> {
        if self.has_virtual_root() {
            self.root().children.clone()
        } else {
            vec![self.root]
        }
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.nodes.get(id.0)
    }

    /// Finds the first entity node named `name`, in depth-first order.
    pub fn find(&self, name: &str) -> Option<&HierarchyNode> {
        self.find_id(name).and_then(|id| self.node(id))
    }

    /// Id form of [`HierarchyTree::find`].
    pub fn find_id(&self, name: &str) -> Option<NodeId> {
        self.walk()
            .into_iter()
            .map(|(id, _)| id)
            .find(|id| self.nodes[id.0].name == name)
    }

    /// The node's parent, skipping the virtual root.
    pub fn parent_of(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.node(id)?
            .parent
            .and_then(|p| self.node(p))
            .filter(|p| !p.is_virtual())
    }

    /// The node's children.
    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = &HierarchyNode> {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.node(*c))
    }

    /// Depth-first pre-order walk over entity nodes with their depth
    /// (declared roots are depth 0). The virtual root is skipped.
    pub fn walk(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, usize)> = self.roots().into_iter().rev().map(|r| (r, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }

    /// Entity names in depth-first pre-order, virtual root excluded.
    pub fn entity_names(&self) -> Vec<&str> {
        self.walk()
            .into_iter()
            .map(|(id, _)| self.nodes[id.0].name.as_str())
            .collect()
    }

    /// Number of entity nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_virtual()).count()
    }

    /// Always false: a tree holds at least one root.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_branch(&self, id: NodeId) -> Branch {
        let node = &self.nodes[id.0];
        Branch {
            name: node.name.clone(),
            children: node.children.iter().map(|c| self.to_branch(*c)).collect(),
        }
    }

    /// The declared roots as owned nested branches.
    pub fn to_branches(&self) -> Vec<Branch> {
        self.roots().into_iter().map(|r| self.to_branch(r)).collect()
    }
}

impl Serialize for HierarchyTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_branches().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_roots() -> HierarchyTree {
        HierarchyTree::from_roots(vec![
            Branch::new("World", vec![Branch::leaf("Player"), Branch::new("Camp", vec![Branch::leaf("Fire")])]),
            Branch::leaf("UI"),
        ])
        .unwrap()
    }

    #[test]
    fn single_root_has_no_anchor() {
        let tree = HierarchyTree::from_roots(vec![Branch::new("World", vec![Branch::leaf("Player")])]).unwrap();
        assert!(!tree.has_virtual_root());
        assert_eq!(tree.root().name, "World");
        assert_eq!(tree.roots().len(), 1);
    }

    #[test]
    fn several_roots_get_a_virtual_anchor() {
        let tree = two_roots();
        assert!(tree.has_virtual_root());
        assert_eq!(tree.root().name, VIRTUAL_ROOT_NAME);
        let roots: Vec<_> = tree.children_of(tree.root_id()).map(|n| n.name.as_str()).collect();
        assert_eq!(roots, ["World", "UI"]);
    }

    #[test]
    fn empty_roots_build_nothing() {
        assert!(HierarchyTree::from_roots(Vec::new()).is_none());
    }

    #[test]
    fn walk_skips_virtual_root() {
        let tree = two_roots();
        assert_eq!(tree.entity_names(), ["World", "Player", "Camp", "Fire", "UI"]);
        assert_eq!(tree.len(), 5);
        assert!(tree.find(VIRTUAL_ROOT_NAME).is_none());
    }

    #[test]
    fn parent_links_are_navigable() {
        let tree = two_roots();
        let fire = tree.find_id("Fire").unwrap();
        assert_eq!(tree.parent_of(fire).unwrap().name, "Camp");
        let world = tree.find_id("World").unwrap();
        assert!(tree.parent_of(world).is_none());
    }

    #[test]
    fn serializes_as_nested_branches() {
        let tree = two_roots();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"World","children":[{"name":"Player"},{"name":"Camp","children":[{"name":"Fire"}]}]},{"name":"UI"}]"#
        );
    }
}
