use std::sync::Arc;

use tracing::trace;

use crate::{Candidate, ConditionRef, Context, Evaluable, Failure, Node};

/// Preparation pass. Primes every condition evaluation may consult, skipping
/// branches under a pure condition that is already known to be false.
pub(crate) fn prepare_conditions(node: &Node, ctx: &Context) -> Result<(), Failure> {
    match node {
        Node::Leaf(_) => Ok(()),
        Node::Conditional {
            condition,
            children,
        } => match condition {
            Some(condition) if prime(condition, ctx)? => prepare_all(children, ctx),
            _ => Ok(()),
        },
        Node::AllOf(children) | Node::AnyOf { children, .. } => prepare_all(children, ctx),
        Node::Either {
            condition,
            left,
            right,
        } => match condition {
            Some(condition) if condition.is_pure() => {
                condition.prepare(ctx)?;
                if condition.is_valid(ctx) {
                    prepare_all(left, ctx)
                } else {
                    prepare_all(right, ctx)
                }
            }
            Some(condition) => {
                condition.prepare(ctx)?;
                prepare_all(left, ctx)?;
                prepare_all(right, ctx)
            }
            None => prepare_all(right, ctx),
        },
        Node::External(inner) => inner.prepare_conditions(ctx),
    }
}

/// Returns whether the subtree under `condition` must be prepared.
fn prime(condition: &ConditionRef, ctx: &Context) -> Result<bool, Failure> {
    if condition.is_pure() && !condition.is_valid(ctx) {
        trace!(condition = condition.name(), "pruned branch under false pure condition");
        return Ok(false);
    }
    condition.prepare(ctx)?;
    Ok(true)
}

fn prepare_all(children: &[Node], ctx: &Context) -> Result<(), Failure> {
    children
        .iter()
        .try_for_each(|child| child.prepare_conditions(ctx))
}

/// Evaluation pass. Returns whether `node` matched and the rules it
/// contributes, in pre-order, left-to-right order.
pub(crate) fn evaluate(node: &Node, ctx: &Context, path: &str) -> (bool, Vec<Candidate>) {
    trace!(path, kind = node.kind(), "evaluating node");
    match node {
        Node::Leaf(rules) => {
            let candidates = rules
                .iter()
                .map(|rule| {
                    Candidate::new(
                        Arc::clone(rule),
                        format!("{path} -> leaf -> {}", rule.name()),
                    )
                })
                .collect();
            (true, candidates)
        }
        Node::Conditional {
            condition,
            children,
        } => match condition {
            Some(condition) if condition.is_valid(ctx) => {
                let path = format!("{path} -> {}", condition.name());
                (true, collect_matched(children, ctx, &path))
            }
            _ => (false, Vec::new()),
        },
        Node::AllOf(children) => {
            let path = format!("{path} -> {}", node.kind());
            let mut acc = Vec::new();
            for (i, child) in children.iter().enumerate() {
                let (matched, rules) = child.evaluate(ctx, &path);
                if !matched {
                    trace!(path = %path, child = i, "allOf short-circuited");
                    return (false, Vec::new());
                }
                acc.extend(rules);
            }
            (true, acc)
        }
        Node::AnyOf { children, .. } => {
            if children.is_empty() {
                return (true, Vec::new());
            }
            let path = format!("{path} -> {}", node.kind());
            let mut any_matched = false;
            let mut acc = Vec::new();
            for child in children {
                let (matched, rules) = child.evaluate(ctx, &path);
                if matched {
                    any_matched = true;
                    acc.extend(rules);
                }
            }
            if any_matched {
                (true, acc)
            } else {
                (false, Vec::new())
            }
        }
        Node::Either {
            condition,
            left,
            right,
        } => {
            let (branch, path) = match condition {
                Some(condition) if condition.is_valid(ctx) => {
                    (left, format!("{path} -> {} -> left", condition.name()))
                }
                Some(condition) => (right, format!("{path} -> {} -> right", condition.name())),
                None => (right, format!("{path} -> nil -> right")),
            };
            let rules = collect_matched(branch, ctx, &path);
            (!rules.is_empty(), rules)
        }
        Node::External(inner) => inner.evaluate(ctx, path),
    }
}

fn collect_matched(children: &[Node], ctx: &Context, path: &str) -> Vec<Candidate> {
    let mut acc = Vec::new();
    for child in children {
        let (matched, rules) = child.evaluate(ctx, path);
        if matched {
            acc.extend(rules);
        }
    }
    acc
}
