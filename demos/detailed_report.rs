use std::time::Duration;

use ruletree::{
    any_rule, conditional, leaf, root, typed_condition, typed_condition_with_prepare, typed_rule,
    typed_rule_with_prepare, validate_detailed, Context, Failure, Hooks,
};
use tracing_subscriber::{fmt, EnvFilter};

struct Order {
    customer: u32,
    total: u64,
    coupon: Option<String>,
}

/// Stand-in for a lookup that would normally hit a store.
fn credit_limit(customer: u32) -> Result<u64, Failure> {
    match customer {
        0 => Err(Failure::new("customer", "unknown customer", "UNKNOWN_CUSTOMER")),
        c if c % 2 == 0 => Ok(1_000),
        _ => Ok(100),
    }
}

fn main() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let within_limit = typed_rule_with_prepare::<Order, u64, _, _>(
        "withinCreditLimit",
        |_, o| credit_limit(o.customer),
        |_, o, limit| {
            if o.total > *limit {
                let message = format!("exceeds limit of {limit}");
                return Err(Failure::new("total", message, "OVER_LIMIT"));
            }
            Ok(())
        },
    );
    let coupon_ok = any_rule(
        "couponAccepted",
        [
            typed_rule::<Order, _>("noCoupon", |_, o| match o.coupon {
                None => Ok(()),
                Some(_) => Err(Failure::new("coupon", "coupon present", "HAS_COUPON")),
            }),
            typed_rule::<Order, _>("knownCoupon", |_, o| match o.coupon.as_deref() {
                Some("WELCOME10") => Ok(()),
                _ => Err(Failure::new("coupon", "unknown coupon", "UNKNOWN_COUPON")),
            }),
        ],
    );

    let tree = root([
        conditional(
            typed_condition::<Order, _>("nonEmpty", |_, o| o.total > 0),
            [leaf([within_limit, coupon_ok])],
        ),
        conditional(
            typed_condition_with_prepare::<Order, u64, _, _>(
                "bigSpender",
                |_, o| credit_limit(o.customer),
                |_, o, limit| o.total * 2 > *limit,
            ),
            [leaf([ruletree::nop_rule("flagForReview")])],
        ),
    ]);

    let orders = [
        Order {
            customer: 2,
            total: 300,
            coupon: None,
        },
        Order {
            customer: 3,
            total: 300,
            coupon: Some("FREE".into()),
        },
        Order {
            customer: 0,
            total: 10,
            coupon: None,
        },
    ];

    let base = Context::new().with_timeout(Duration::from_secs(1));
    for order in orders {
        let report = validate_detailed(&base.with_data(order), &tree, &Hooks::new(), "checkout");
        println!("{report}");
        for path in report.candidates() {
            println!("  {path}");
        }
        for failure in report.failures() {
            println!("  {failure}");
        }
    }
}
