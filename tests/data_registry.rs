use std::any::TypeId;
use std::sync::Arc;
use std::time::Duration;

use ruletree::{
    conditional, has_data, leaf, no_data, nop_rule, root, type_switch, validate_multi_with_data,
    CancelToken, Context, DataRegistry, Evaluable, Hooks, TreeAndData,
};

#[derive(Debug, PartialEq)]
struct Order {
    total: u64,
}

#[test]
fn registry_reports_bound_type() {
    let registry = DataRegistry::new(Order { total: 10 });
    assert!(registry.is::<Order>());
    assert_eq!(registry.type_id(), TypeId::of::<Order>());
    assert!(registry.type_name().ends_with("Order"));
    assert_eq!(registry.get_as::<Order>(), Some(&Order { total: 10 }));
    assert_eq!(registry.get_as::<u64>(), None);
}

#[test]
fn context_exposes_bound_data() {
    let ctx = Context::new().with_registry(Arc::new(DataRegistry::new(Order { total: 3 })));
    assert_eq!(ctx.type_of(), Some(TypeId::of::<Order>()));
    assert!(ctx.is_type(TypeId::of::<Order>()));
    assert_eq!(ctx.must_get_as::<Order>().total, 3);
    assert!(ctx.bound_type_name().is_some_and(|n| n.ends_with("Order")));

    let empty = Context::new();
    assert!(empty.registry().is_none());
    assert!(empty.type_of().is_none());
    assert!(empty.get().is_none());
}

#[test]
#[should_panic]
fn must_get_panics_without_data() {
    let _ = Context::new().must_get();
}

#[test]
fn rebinding_keeps_cancellation_and_deadline() {
    let token = CancelToken::new();
    let base = Context::new()
        .with_cancellation(token.clone())
        .with_timeout(Duration::from_secs(60));
    let bound = base.with_data(Order { total: 1 });

    assert!(!bound.is_cancelled());
    token.cancel();
    assert!(bound.is_cancelled());
    assert_eq!(bound.deadline(), base.deadline());
    assert!(bound.remaining().is_some());
}

#[test]
fn presence_conditions_follow_binding() {
    let tree = root([
        conditional(has_data("bound"), [leaf([nop_rule("withData")])]),
        conditional(no_data("unbound"), [leaf([nop_rule("withoutData")])]),
    ]);

    let (_, with) = tree.evaluate(&Context::new().with_data(1_u8), "run");
    assert_eq!(with[0].name(), "withData");

    let (_, without) = tree.evaluate(&Context::new(), "run");
    assert_eq!(without[0].name(), "withoutData");
}

#[test]
fn type_switch_sees_raw_value() {
    let numeric = type_switch("numeric", |data| data.is::<i64>() || data.is::<f64>());
    let tree = conditional(numeric, [leaf([nop_rule("r")])]);

    assert!(tree.evaluate(&Context::new().with_data(2.5_f64), "run").0);
    assert!(tree.evaluate(&Context::new().with_data(7_i64), "run").0);
    assert!(!tree.evaluate(&Context::new().with_data("7"), "run").0);
    assert!(!tree.evaluate(&Context::new(), "run").0);
}

#[test]
fn each_target_sees_only_its_own_data() {
    let orders = root([conditional(
        ruletree::typed_condition::<Order, _>("large", |_, o| o.total > 100),
        [leaf([ruletree::typed_rule::<Order, _>("approved", |_, o| {
            Err(ruletree::Failure::new("total", format!("{} needs approval", o.total), "APPROVAL"))
        })])],
    )]);

    let failures = validate_multi_with_data(
        &Context::new(),
        vec![
            TreeAndData::new(&orders, Order { total: 50 }),
            TreeAndData::new(&orders, Order { total: 500 }),
            TreeAndData::new(&orders, "not an order"),
        ],
        &Hooks::new(),
        "orders",
    );
    assert_eq!(failures.codes(), ["APPROVAL"]);
    assert_eq!(failures[0].message(), "500 needs approval");
}
