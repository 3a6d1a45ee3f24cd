//! Validated tree produced by [`validate`](crate::validate).
//!
//! Nodes live in an arena indexed by [`NodeId`]; parent links are handles,
//! so ancestor walks are `O(depth)` without reference cycles. Everything
//! borrows the [`Spec`] it was built from.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    ArgumentsSpec, Constraint, Description, GroupSpec, InformationSpec, OptionSpec,
    PositionalSpec, SpecialEntry, Spec, Value,
};

/// Handle of a node in a [`ValidatedConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root arguments of the specification.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Validated positional endpoint with computed limits.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEndpoint<'a> {
    /// `None` for the endpoint synthesized from direct positionals.
    pub id: Option<u64>,
    pub description: Option<&'a Description>,
    pub positionals: &'a [PositionalSpec],
    /// Positional defaults with enum names resolved to ids.
    pub defaults: Vec<Option<Value>>,
    pub constraints: &'a [Constraint],
    /// Declared minimum (or positional count); used for default backfill.
    pub minimum_actual: usize,
    /// Minimum number of supplied positionals once defaults are applied.
    pub minimum_effective: usize,
    /// `None` means unbounded.
    pub maximum: Option<usize>,
}

impl ValidEndpoint<'_> {
    /// Whether `count` supplied positionals fall inside this endpoint.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.minimum_effective && self.maximum.is_none_or(|max| count <= max)
    }
}

/// Validated group or root arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidNode<'a> {
    /// `None` for the root.
    pub group: Option<&'a GroupSpec>,
    pub arguments: &'a ArgumentsSpec,
    pub parent: Option<NodeId>,
    pub depth: usize,
    /// Lowercase word naming the selection among the children (`mode`).
    pub label: String,
    pub children: Vec<NodeId>,
    pub(crate) by_name: BTreeMap<&'a str, NodeId>,
    pub(crate) by_abbreviation: BTreeMap<char, NodeId>,
    /// Sorted by `minimum_effective`; empty when the node has children.
    pub endpoints: Vec<ValidEndpoint<'a>>,
    /// Reference ids declared by the group.
    pub links: BTreeSet<u64>,
    /// Indices into [`ValidatedConfig::options`] usable at this node.
    pub options: Vec<usize>,
    /// Indices into [`ValidatedConfig::information`] shown at this node.
    pub information: Vec<usize>,
    /// Whether this node or any descendant accepts positionals.
    pub nested_positionals: bool,
}

impl<'a> ValidNode<'a> {
    /// Whether a group still has to be selected below this node.
    pub fn is_incomplete(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn name(&self) -> Option<&'a str> {
        self.group.map(|group| group.name.as_str())
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn child_by_abbreviation(&self, abbreviation: char) -> Option<NodeId> {
        self.by_abbreviation.get(&abbreviation).copied()
    }
}

/// Validated option with resolved owner and users.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidOption<'a> {
    pub spec: &'a OptionSpec,
    pub owner: NodeId,
    /// Nodes allowed to use the option (with their descendants).
    pub users: BTreeSet<NodeId>,
    pub minimum_actual: usize,
    /// Zero when defaults cover a missing option.
    pub minimum_effective: usize,
    /// `None` means unbounded.
    pub maximum: Option<usize>,
    pub payload: bool,
    pub hidden: bool,
    /// Payload defaults with enum names resolved to ids.
    pub defaults: Vec<Value>,
}

impl ValidOption<'_> {
    /// Whether the option is restricted to fewer nodes than the whole tree.
    pub fn is_restricted(&self) -> bool {
        !self.users.contains(&NodeId::ROOT)
    }
}

/// Validated information block with resolved users.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidInformation<'a> {
    pub spec: &'a InformationSpec,
    pub owner: NodeId,
    pub users: BTreeSet<NodeId>,
}

/// Fully cross-checked runtime structure of a [`Spec`].
///
/// Read-only once constructed. Use [`Parser`](crate::Parser) to parse
/// tokens against it, or a [`Formatter`](crate::Formatter) to render help.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig<'a> {
    pub spec: &'a Spec,
    pub(crate) nodes: Vec<ValidNode<'a>>,
    pub options: Vec<ValidOption<'a>>,
    pub(crate) option_names: BTreeMap<&'a str, usize>,
    pub(crate) option_abbreviations: BTreeMap<char, usize>,
    pub information: Vec<ValidInformation<'a>>,
    pub help: Option<&'a SpecialEntry>,
    pub version: Option<&'a SpecialEntry>,
}

impl<'a> ValidatedConfig<'a> {
    pub fn is_menu(&self) -> bool {
        self.spec.menu
    }

    pub fn root(&self) -> &ValidNode<'a> {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &ValidNode<'a> {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ValidNode<'a>)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn option_by_name(&self, name: &str) -> Option<&ValidOption<'a>> {
        self.option_names.get(name).map(|&i| &self.options[i])
    }

    pub fn option_by_abbreviation(&self, abbreviation: char) -> Option<&ValidOption<'a>> {
        self.option_abbreviations
            .get(&abbreviation)
            .map(|&i| &self.options[i])
    }

    /// Resolves a path of group names starting at the root.
    pub fn find_path<S: AsRef<str>>(&self, names: &[S]) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for name in names {
            let name = name.as_ref();
            let node = self.node(current);
            current = node.child(name).or_else(|| {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => node.child_by_abbreviation(c),
                    _ => None,
                }
            })?;
        }
        Some(current)
    }

    /// Whether `parent` is `child` or one of its ancestors.
    pub fn check_parent(&self, parent: NodeId, child: NodeId) -> bool {
        if self.node(child).depth < self.node(parent).depth {
            return false;
        }
        let mut current = Some(child);
        while let Some(id) = current {
            if id == parent {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Whether either node is an ancestor of (or equal to) the other.
    pub fn check_ancestors(&self, a: NodeId, b: NodeId) -> bool {
        if self.node(a).depth < self.node(b).depth {
            self.check_parent(a, b)
        } else {
            self.check_parent(b, a)
        }
    }

    /// Whether the option may be used when `node` is selected.
    pub fn is_usable(&self, option: &ValidOption<'_>, node: NodeId) -> bool {
        option
            .users
            .iter()
            .any(|&user| self.check_ancestors(user, node))
    }

    /// Nodes from the root down to `node`, inclusive.
    pub fn lineage(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::with_capacity(self.node(node).depth + 1);
        let mut current = Some(node);
        while let Some(id) = current {
            chain.push(id);
            current = self.node(id).parent;
        }
        chain.reverse();
        chain
    }
}
