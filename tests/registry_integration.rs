//! Cross-module registry scenarios
//!
//! Exercises the registry the way a host application uses it: several
//! participants sharing one registry, registering and removing callbacks
//! around live dispatches, and observing each other only through hook names.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use hookable::{
    ALL_HOOK, CallOutcome, Callable, DEFAULT_PRIORITY, HookArg, HookContext, HookRegistry,
    HookValue,
};

/// A hook with no registrations behaves as if `apply` were never written.
#[test]
fn unregistered_hooks_are_transparent() {
    let hooks = HookRegistry::new();

    assert_eq!(hooks.apply("title", json!("as is"), &[]), json!("as is"));
    assert!(!hooks.has("title"));
    assert_eq!(hooks.count("title"), None);
}

/// The override-and-restore flow: a bound method registered at priority 90
/// overrides the filtered value, and clearing that priority bucket restores
/// the original behavior while leaving the rest of the hook alone.
#[test]
fn override_then_remove_all_restores_the_original() {
    let hooks = HookRegistry::new();
    let base = json!("asserted string");

    assert_eq!(hooks.apply("render_title", base.clone(), &[]), base);

    let overrider = Arc::new("overrider".to_string());
    hooks
        .add(
            "render_title",
            Callable::method(&overrider, "override_title", |_| {
                json!("asserted string overridden")
            }),
            90,
            1,
        )
        .unwrap();

    assert_eq!(
        hooks.apply("render_title", base.clone(), &[]),
        json!("asserted string overridden")
    );

    hooks.remove_all("render_title", Some(90));
    assert_eq!(hooks.apply("render_title", base.clone(), &[]), base);
}

/// Clearing one priority bucket must not disturb the other priorities.
#[test]
fn remove_all_at_one_priority_leaves_others_live() {
    let hooks = HookRegistry::new();
    hooks
        .add(
            "greet",
            Callable::function("upper", |args| {
                json!(args[0].value().as_str().unwrap_or_default().to_uppercase())
            }),
            10,
            1,
        )
        .unwrap();
    hooks
        .add(
            "greet",
            Callable::function("bang", |args| {
                json!(format!("{}!", args[0].value().as_str().unwrap_or_default()))
            }),
            90,
            1,
        )
        .unwrap();

    assert_eq!(hooks.apply("greet", json!("hi"), &[]), json!("HI!"));

    hooks.remove_all("greet", Some(90));
    assert_eq!(hooks.apply("greet", json!("hi"), &[]), json!("HI"));
    assert!(hooks.has("greet"));
}

/// has() flips with the lifetime of the sole registration.
#[test]
fn has_tracks_the_sole_registration() {
    let hooks = HookRegistry::new();
    let audit = Callable::function("audit", |_| HookValue::Null);

    assert!(!hooks.has("saved"));
    hooks
        .add("saved", audit.clone(), DEFAULT_PRIORITY, 1)
        .unwrap();
    assert!(hooks.has("saved"));

    hooks.remove("saved", &audit, DEFAULT_PRIORITY);
    assert!(!hooks.has("saved"));
}

/// Actions on unregistered hooks tick the counter and invoke nothing.
#[test]
fn calls_on_unregistered_hooks_only_count() {
    let hooks = HookRegistry::new();
    let invoked = Arc::new(Mutex::new(0u32));

    // A callback on an unrelated hook proves nothing leaks across names.
    let counter = Arc::clone(&invoked);
    hooks
        .add(
            "other",
            Callable::closure(move |_| {
                *counter.lock() += 1;
                HookValue::Null
            }),
            10,
            1,
        )
        .unwrap();

    assert_eq!(hooks.call("saved", HookArg::none(), &[]), CallOutcome::NoSuchHook);
    assert_eq!(hooks.call("saved", HookArg::none(), &[]), CallOutcome::NoSuchHook);

    assert_eq!(hooks.call_count("saved"), 2);
    assert_eq!(*invoked.lock(), 0);
}

/// Registering the same instance and method twice yields one identity.
#[test]
fn bound_method_registrations_deduplicate() {
    let hooks = HookRegistry::new();
    let listener = Arc::new(42u32);

    let register = |hooks: &HookRegistry| {
        hooks.add_unique(
            "saved",
            Callable::method(&listener, "on_saved", |_| HookValue::Null),
            DEFAULT_PRIORITY,
            1,
        )
    };

    assert!(register(&hooks).unwrap());
    assert!(!register(&hooks).unwrap());

    assert_eq!(hooks.count("saved"), Some(1));
    assert_eq!(
        hooks.find(
            "saved",
            &Callable::method(&listener, "on_saved", |_| HookValue::Null)
        ),
        Some(DEFAULT_PRIORITY)
    );
}

/// The "all" meta-hook observes every dispatch, filter or action, with the
/// full argument list led by the target hook's name.
#[test]
fn all_meta_hook_observes_both_dispatch_modes() {
    let hooks = HookRegistry::new();
    let seen: Arc<Mutex<Vec<Vec<HookValue>>>> = Arc::new(Mutex::new(Vec::new()));
    let active: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));

    let recorder = {
        let seen = Arc::clone(&seen);
        let active = Arc::clone(&active);
        let hooks = hooks.clone();
        Callable::closure(move |args| {
            seen.lock().push(args.iter().map(HookArg::value).collect());
            active.lock().push(hooks.current());
            HookValue::Null
        })
    };
    hooks.add(ALL_HOOK, recorder, DEFAULT_PRIORITY, 1).unwrap();

    hooks.apply("x", json!(1), &[json!(2)]);
    hooks.call("y", HookArg::from(json!("payload")), &[json!(3)]);

    let seen = seen.lock().clone();
    assert_eq!(
        seen,
        vec![
            vec![json!("x"), json!(1), json!(2)],
            vec![json!("y"), json!("payload"), json!(3)],
        ]
    );

    // The target hook is already on the execution stack during the pass.
    assert_eq!(
        active.lock().clone(),
        vec![Some("x".to_string()), Some("y".to_string())]
    );

    // The meta-hook fires even though neither target was ever registered.
    assert!(!hooks.has("x"));
    assert!(!hooks.has("y"));
}

/// Action-mode context: every callback mutates the same value and the caller
/// sees the final state.
#[test]
fn action_context_collects_mutations() {
    let hooks = HookRegistry::new();

    for (name, priority) in [("first", 10), ("second", 20)] {
        hooks
            .add(
                "collect",
                Callable::function(name, move |args| {
                    let context = args[0].as_context().expect("context argument");
                    context.update(|value| {
                        value.as_array_mut().unwrap().push(json!(priority));
                    });
                    HookValue::Null
                }),
                priority,
                1,
            )
            .unwrap();
    }

    let context = HookContext::new(json!([]));
    let outcome = hooks.call("collect", HookArg::Context(context.clone()), &[]);

    assert_eq!(outcome, CallOutcome::Succeeded);
    assert_eq!(context.get(), json!([10, 20]));
}

/// Participants share one registry by cloning it; registrations made through
/// any clone are visible to all.
#[test]
fn cloned_registries_share_state() {
    let hooks = HookRegistry::new();
    let participant = hooks.clone();

    participant
        .add(
            "greet",
            Callable::function("upper", |args| {
                json!(args[0].value().as_str().unwrap_or_default().to_uppercase())
            }),
            10,
            1,
        )
        .unwrap();

    assert_eq!(hooks.apply("greet", json!("hi"), &[]), json!("HI"));
    assert_eq!(hooks.hook_names(), vec!["greet"]);
}

/// A callback that dispatches another hook keeps both names on the stack and
/// the stack unwinds cleanly afterwards.
#[test]
fn nested_dispatch_unwinds_cleanly() {
    let hooks = HookRegistry::new();

    hooks
        .add(
            "inner",
            Callable::function("double", |args| {
                json!(args[0].value().as_i64().unwrap_or_default() * 2)
            }),
            10,
            1,
        )
        .unwrap();

    let nested = {
        let hooks = hooks.clone();
        Callable::function("delegate", move |args| {
            assert!(hooks.is_dispatching_hook("outer"));
            hooks.apply("inner", args[0].value(), &[])
        })
    };
    hooks.add("outer", nested, 10, 1).unwrap();

    assert_eq!(hooks.apply("outer", json!(21), &[]), json!(42));
    assert!(!hooks.is_dispatching());
    assert_eq!(hooks.current(), None);
}

/// Swapping a callback with replace changes the filtered output in place.
#[test]
fn replace_changes_the_transform() {
    let hooks = HookRegistry::new();
    let shout = Callable::function("shout", |args| {
        json!(args[0].value().as_str().unwrap_or_default().to_uppercase())
    });
    hooks.add("render", shout.clone(), 10, 1).unwrap();
    assert_eq!(hooks.apply("render", json!("quiet"), &[]), json!("QUIET"));

    hooks
        .replace(
            "render",
            &shout,
            Callable::function("hush", |args| {
                json!(args[0].value().as_str().unwrap_or_default().to_lowercase())
            }),
            10,
            1,
            false,
        )
        .unwrap();

    assert_eq!(hooks.apply("render", json!("QUIET"), &[]), json!("quiet"));
    assert_eq!(hooks.count("render"), Some(1));
}
