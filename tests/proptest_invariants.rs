
use proptest::prelude::*;
use ruletree::{
    all_of, any_of, condition, conditional, leaf, negate, validate, Candidate, Context, Evaluable,
    Hooks, Node,
};
use strategies::{arb_flags, arb_tree, bit, named_failure, GenTree};

fn names(candidates: &[Candidate]) -> Vec<String> {
    candidates.iter().map(|c| c.name().to_owned()).collect()
}

// ---------------------------------------------------------------------------
// Invariant 1: Evaluation agrees with the reference model
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn evaluate_matches_model(gen in arb_tree(), flags in arb_flags()) {
        let tree = gen.build();
        let ctx = Context::new().with_data(flags);
        tree.prepare_conditions(&ctx).unwrap();
        let (matched, candidates) = tree.evaluate(&ctx, "run");
        let (expected_matched, expected_names) = gen.expected(flags);
        prop_assert_eq!(matched, expected_matched);
        prop_assert_eq!(names(&candidates), expected_names);
    }

    /// Every candidate executes (none of the generated rules need preparing),
    /// so the failure codes are exactly the candidate names in order.
    #[test]
    fn failures_follow_candidate_order(gen in arb_tree(), flags in arb_flags()) {
        let tree = gen.build();
        let ctx = Context::new().with_data(flags);
        let failures = validate(&ctx, &tree, &Hooks::new(), "run");
        let (_, expected) = gen.expected(flags);
        prop_assert_eq!(failures.codes(), expected);
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: A pure tree is reusable and idempotent
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn repeated_runs_are_identical(gen in arb_tree(), flags in arb_flags()) {
        let tree = gen.build();
        let first = validate(&Context::new().with_data(flags), &tree, &Hooks::new(), "run");
        for _ in 0..3 {
            let again = validate(&Context::new().with_data(flags), &tree, &Hooks::new(), "run");
            prop_assert_eq!(&first, &again);
        }
    }

    #[test]
    fn one_tree_many_inputs(gen in arb_tree(), inputs in prop::collection::vec(arb_flags(), 1..8)) {
        let tree = gen.build();
        for flags in inputs {
            let failures = validate(&Context::new().with_data(flags), &tree, &Hooks::new(), "run");
            prop_assert_eq!(failures.codes(), gen.expected(flags).1);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Combinator laws
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Past the first unmatched child nothing is collected, whatever follows.
    #[test]
    fn all_of_short_circuits(before in 0_usize..4, after in 0_usize..4) {
        let mut children: Vec<Node> = (0..before)
            .map(|i| leaf([named_failure(&format!("before{i}"))]))
            .collect();
        children.push(conditional(condition("never", || false), [leaf([named_failure("gated")])]));
        children.extend((0..after).map(|i| leaf([named_failure(&format!("after{i}"))])));

        let (matched, candidates) = all_of(children).evaluate(&Context::new(), "run");
        prop_assert!(!matched);
        prop_assert!(candidates.is_empty());
    }

    /// The union keeps exactly the rules of matching children, in child order.
    #[test]
    fn any_of_unions_matching_children(mask in prop::collection::vec(any::<bool>(), 0..6)) {
        let children: Vec<Node> = mask
            .iter()
            .enumerate()
            .map(|(i, &on)| {
                conditional(
                    condition(format!("c{i}"), move || on),
                    [leaf([named_failure(&format!("r{i}"))])],
                )
            })
            .collect();
        let expected: Vec<String> = mask
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| format!("r{i}"))
            .collect();

        let (matched, candidates) = any_of(children).evaluate(&Context::new(), "run");
        prop_assert_eq!(matched, mask.is_empty() || mask.iter().any(|&on| on));
        prop_assert_eq!(names(&candidates), expected);
    }

    /// NOT(NOT(c)) selects the same branch as c.
    #[test]
    fn double_negation(b in 0_u8..16, flags in arb_flags()) {
        let ctx = Context::new().with_data(flags);
        let plain = conditional(bit(b), [leaf([named_failure("r")])]);
        let doubled = conditional(negate(negate(bit(b))), [leaf([named_failure("r")])]);
        prop_assert_eq!(plain.evaluate(&ctx, "run").0, doubled.evaluate(&ctx, "run").0);
    }

    /// A condition and its negation split the input space.
    #[test]
    fn negation_is_complementary(b in 0_u8..16, flags in arb_flags()) {
        let ctx = Context::new().with_data(flags);
        let when = conditional(bit(b), [leaf([named_failure("yes")])]);
        let unless = conditional(negate(bit(b)), [leaf([named_failure("no")])]);
        prop_assert_ne!(when.evaluate(&ctx, "run").0, unless.evaluate(&ctx, "run").0);
    }
}

#[test]
fn generated_leaf_model_sanity() {
    let gen = GenTree::AnyOf(vec![
        GenTree::When(0, vec![GenTree::Leaf(vec!["a1".into()])]),
        GenTree::When(1, vec![GenTree::Leaf(vec!["b1".into()])]),
    ]);
    let (matched, names) = gen.expected(strategies::Flags(0b10));
    assert!(matched);
    assert_eq!(names, ["b1"]);
}
