use std::fmt;
use std::sync::Arc;

use super::condition::ConditionRef;
use super::context::Context;
use super::failure::Failure;
use super::rule::{Candidate, RuleRef};

/// Label used by [`root()`] and in execution paths for the run's top node.
pub const ROOT_LABEL: &str = "root";

/// A composable tree node.
///
/// Evaluation is two passes over the same tree. [`prepare_conditions`](Self::prepare_conditions)
/// primes the conditions that may be consulted, and [`evaluate`](Self::evaluate)
/// then reads them and reports whether the node matched along with the rules it
/// contributes, in pre-order, left-to-right order.
pub trait Evaluable: Send + Sync {
    fn prepare_conditions(&self, ctx: &Context) -> Result<(), Failure>;

    fn evaluate(&self, ctx: &Context, path: &str) -> (bool, Vec<Candidate>);
}

/// The node algebra.
///
/// Trees are immutable once built and cheap to clone: conditions and rules
/// are shared through `Arc`. Build with the free functions ([`leaf`],
/// [`conditional`], [`all_of`], [`any_of`], [`root`], [`either`]).
///
/// A `None` condition is never satisfied.
#[derive(Clone)]
pub enum Node {
    /// Always matches and contributes its rules.
    Leaf(Vec<RuleRef>),
    /// Matches when its condition holds; contributes the rules of every
    /// matching child.
    Conditional {
        condition: Option<ConditionRef>,
        children: Vec<Node>,
    },
    /// Conjunction. Stops at the first child that does not match.
    AllOf(Vec<Node>),
    /// Disjunction. Explores every child.
    AnyOf {
        label: Option<String>,
        children: Vec<Node>,
    },
    /// Evaluates `left` when the condition holds, `right` otherwise.
    Either {
        condition: Option<ConditionRef>,
        left: Vec<Node>,
        right: Vec<Node>,
    },
    /// A caller-supplied node.
    External(Arc<dyn Evaluable>),
}

impl Node {
    /// Short tag naming the node kind, as used in execution paths.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Node::Leaf(_) => "leaf",
            Node::Conditional { .. } => "conditional",
            Node::AllOf(_) => "allOf",
            Node::AnyOf { label, .. } => label.as_deref().unwrap_or("anyOf"),
            Node::Either { .. } => "either",
            Node::External(_) => "external",
        }
    }
}

impl Evaluable for Node {
    fn prepare_conditions(&self, ctx: &Context) -> Result<(), Failure> {
        crate::evaluate::prepare_conditions(self, ctx)
    }

    fn evaluate(&self, ctx: &Context, path: &str) -> (bool, Vec<Candidate>) {
        crate::evaluate::evaluate(self, ctx, path)
    }
}

fn condition_name(condition: Option<&ConditionRef>) -> &str {
    condition.map_or("nil", |c| c.name())
}

fn write_children(f: &mut fmt::Formatter<'_>, children: &[Node]) -> fmt::Result {
    write!(f, "[")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{child}")?;
    }
    write!(f, "]")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(rules) => {
                let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
                write!(f, "leaf({})", names.join(", "))
            }
            Node::Conditional {
                condition,
                children,
            } => {
                write!(f, "when {} ", condition_name(condition.as_ref()))?;
                write_children(f, children)
            }
            Node::AllOf(children) => {
                write!(f, "allOf")?;
                write_children(f, children)
            }
            Node::AnyOf { children, .. } => {
                write!(f, "{}", self.kind())?;
                write_children(f, children)
            }
            Node::Either {
                condition,
                left,
                right,
            } => {
                write!(f, "either {} ", condition_name(condition.as_ref()))?;
                write_children(f, left)?;
                write!(f, " else ")?;
                write_children(f, right)
            }
            Node::External(_) => write!(f, "external"),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({self})")
    }
}

impl<E: Evaluable + 'static> From<Arc<E>> for Node {
    fn from(node: Arc<E>) -> Self {
        Node::External(node)
    }
}

/// A node that always matches and contributes `rules`.
#[must_use]
pub fn leaf(rules: impl IntoIterator<Item = RuleRef>) -> Node {
    Node::Leaf(rules.into_iter().collect())
}

/// A node guarded by `condition`. Pass `None` for a branch that never matches.
#[must_use]
pub fn conditional(
    condition: impl Into<Option<ConditionRef>>,
    children: impl IntoIterator<Item = Node>,
) -> Node {
    Node::Conditional {
        condition: condition.into(),
        children: children.into_iter().collect(),
    }
}

/// Conjunction: matches only when every child matches, and then contributes
/// all their rules. An empty conjunction matches with no rules.
#[must_use]
pub fn all_of(children: impl IntoIterator<Item = Node>) -> Node {
    Node::AllOf(children.into_iter().collect())
}

/// Disjunction: matches when any child matches and contributes the rules of
/// every matching child. An empty disjunction matches with no rules.
#[must_use]
pub fn any_of(children: impl IntoIterator<Item = Node>) -> Node {
    Node::AnyOf {
        label: None,
        children: children.into_iter().collect(),
    }
}

/// A disjunction whose execution-path segment is `label` instead of `anyOf`.
#[must_use]
pub fn any_of_labeled(label: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Node {
    Node::AnyOf {
        label: Some(label.into()),
        children: children.into_iter().collect(),
    }
}

/// The conventional top of a tree: a disjunction labeled [`ROOT_LABEL`].
///
/// Trees built independently can be merged by listing them under one root.
#[must_use]
pub fn root(children: impl IntoIterator<Item = Node>) -> Node {
    any_of_labeled(ROOT_LABEL, children)
}

/// Two-way branch on `condition`; `None` always takes `right`.
///
/// Unlike [`conditional`], the node reports a match only when the chosen
/// branch contributed at least one rule.
#[must_use]
pub fn either(
    condition: impl Into<Option<ConditionRef>>,
    left: impl IntoIterator<Item = Node>,
    right: impl IntoIterator<Item = Node>,
) -> Node {
    Node::Either {
        condition: condition.into(),
        left: left.into_iter().collect(),
        right: right.into_iter().collect(),
    }
}
