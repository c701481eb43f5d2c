use ruletree::{
    conditional, either, is_a, leaf, root, typed_condition, typed_rule, validate_with_data,
    Context, Failure, Hooks,
};
use tracing_subscriber::{fmt, EnvFilter};

struct User {
    email: String,
    age: u32,
    admin: bool,
}

fn main() {
    // RUST_LOG=ruletree=debug shows each phase of the run.
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let email_required = typed_rule::<User, _>("emailRequired", |_, u| {
        if u.email.is_empty() {
            return Err(Failure::new("email", "email is required", "EMAIL_REQUIRED"));
        }
        Ok(())
    });
    let adult = typed_rule::<User, _>("isAdult", |_, u| {
        if u.age < 18 {
            return Err(Failure::new("age", "must be 18 or older", "UNDERAGE"));
        }
        Ok(())
    });
    let admin_email = typed_rule::<User, _>("adminEmail", |_, u| {
        if !u.email.ends_with("@example.com") {
            return Err(Failure::new("email", "admins need a company address", "ADMIN_EMAIL"));
        }
        Ok(())
    });

    let tree = root([conditional(
        is_a::<User>("isUser"),
        [
            leaf([email_required, adult]),
            either(
                typed_condition::<User, _>("isAdmin", |_, u| u.admin),
                [leaf([admin_email])],
                [],
            ),
        ],
    )]);

    println!("{tree}");

    let users = [
        User {
            email: "ada@example.com".into(),
            age: 36,
            admin: true,
        },
        User {
            email: String::new(),
            age: 16,
            admin: false,
        },
        User {
            email: "grace@elsewhere.org".into(),
            age: 45,
            admin: true,
        },
    ];

    for user in users {
        let failures = validate_with_data(&Context::new(), &tree, &Hooks::new(), "signup", user);
        match failures.into_result() {
            Ok(()) => println!("passed"),
            Err(failures) => println!("rejected: {failures}"),
        }
    }
}
