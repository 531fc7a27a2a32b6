//! Integration tests for guarded execution across a definition hierarchy.


use rescue_hooks::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};
use test_utils::*;

// ═══════════════════════════════════════════════════════════════════════════════
// WORK AND FAULTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn missing_work_block_is_rejected_before_any_hook_runs() {
    let definition = Arc::clone(&WITH_SYMBOL_BEFORE_AFTER_HOOK);
    let mut service = TestService::new(&definition);

    let err = Activation::<TestService, ()>::new(&definition, &mut service)
        .execute()
        .unwrap_err();

    assert!(matches!(err, ExecutionError::MissingWorkBlock { .. }));
    assert_eq!(service.hook_exec_count, 0);
}

#[test]
fn activation_runs_hooks_around_work() {
    let mut service = TestService::new(&WITH_SYMBOL_BEFORE_AFTER_HOOK);

    let missing = WITH_SYMBOL_BEFORE_AFTER_HOOK
        .activation::<()>(&mut service)
        .execute()
        .unwrap_err();
    assert!(matches!(missing, ExecutionError::MissingWorkBlock { .. }));
    assert_eq!(service.hook_exec_count, 0);

    let outcome = WITH_SYMBOL_BEFORE_AFTER_HOOK
        .activation(&mut service)
        .work(noop)
        .execute()
        .unwrap();
    assert_eq!(outcome, Outcome::Completed(()));
    assert_eq!(service.hook_exec_count, 2);
}

#[test]
fn work_can_call_methods_of_its_definition() {
    let mut service = TestService::new(&TEST_SERVICE);

    let outcome = service.call(call_private_method).unwrap();

    assert_eq!(outcome, Outcome::Completed(()));
}

#[test]
fn work_value_is_returned() {
    let mut service = TestService::new(&WITH_HOOK);

    let outcome = service
        .execute_with_rescue(|service| Ok(service.some_data.len() + 41))
        .unwrap();

    assert_eq!(outcome.completed(), Some(41));
}

#[test]
fn fault_without_handler_propagates() {
    let mut service = TestService::new(&TEST_SERVICE);

    let err = service.call(fail_with_standard_error).unwrap_err();

    assert!(err.is_fault::<StandardError>());
}

#[test]
fn handler_fault_replaces_original() {
    let mut service = TestService::new(&WITH_RESCUE);

    let err = service.call(fail_with_standard_error).unwrap_err();

    assert!(err.is_fault::<CustomError>());
    assert!(!err.is_fault::<StandardError>());
}

#[test]
fn handled_fault_reports_rescued() {
    let mut service = TestService::new(&WITH_HOOK);

    let outcome = service.call(fail_with_standard_error).unwrap();

    assert!(outcome.is_rescued());
    assert!(matches!(
        outcome,
        Outcome::Rescued { fault_type } if fault_type.ends_with("StandardError")
    ));
}

#[test]
fn fault_not_matching_any_handler_propagates() {
    let mut service = TestService::new(&WITH_BLOCK_AFTER_HOOK);

    let err = service.call(fail_with_unexpected_error).unwrap_err();

    assert!(err.is_fault::<UnexpectedError>());
    assert_eq!(service.hook_exec_count, 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOOKS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn named_before_hook_runs_once() {
    let mut service = TestService::new(&WITH_SYMBOL_BEFORE_HOOK);
    assert_eq!(service.hook_exec_count, 0);

    service.call(noop).unwrap();

    assert_eq!(service.hook_exec_count, 1);
}

#[test]
fn named_after_hook_runs_once() {
    let mut service = TestService::new(&WITH_SYMBOL_AFTER_HOOK);

    service.call(noop).unwrap();

    assert_eq!(service.hook_exec_count, 1);
}

#[test]
fn named_before_and_after_hooks_both_run() {
    let mut service = TestService::new(&WITH_SYMBOL_BEFORE_AFTER_HOOK);

    service.call(noop).unwrap();

    assert_eq!(service.hook_exec_count, 2);
}

#[test]
fn block_hooks_behave_like_named_hooks() {
    let mut before = TestService::new(&WITH_BLOCK_BEFORE_HOOK);
    let mut after = TestService::new(&WITH_BLOCK_AFTER_HOOK);
    let mut both = TestService::new(&WITH_BLOCK_BEFORE_AFTER_HOOK);

    before.call(noop).unwrap();
    after.call(noop).unwrap();
    both.call(noop).unwrap();

    assert_eq!(before.hook_exec_count, 1);
    assert_eq!(after.hook_exec_count, 1);
    assert_eq!(both.hook_exec_count, 2);
}

#[test]
fn duplicate_hooks_run_every_time() {
    let mut service = TestService::new(&WITH_MANY_SYMBOL_BEFORE_HOOK);

    service.call(noop).unwrap();

    assert_eq!(service.hook_exec_count, 3);
}

#[test]
fn inherited_hooks_run_before_own() {
    let mut service = TestService::new(&WITH_MANY_SYMBOL_BEFORE_HOOK_INHERITED);

    service.call(noop).unwrap();

    assert_eq!(service.hook_exec_count, 5);
    assert_eq!(WITH_MANY_SYMBOL_BEFORE_HOOK.before_hooks().len(), 3);
}

#[test]
fn after_hooks_run_in_reverse_registration_order() {
    let mut service = TestService::new(&WITH_MANY_AFTER_HOOKS);

    service.call(noop).unwrap();

    assert_eq!(service.some_data, vec![2, 1]);
}

#[test]
fn hooks_run_around_work_and_handler() {
    let mut definition = WITH_HOOK.extend("Traced");
    definition
        .add_before_block(|service: &mut TestService| {
            service.events.push("before");
            Ok(())
        })
        .add_after_block(|service: &mut TestService| {
            service.events.push("after");
            Ok(())
        })
        .rescue_from::<StandardError, _>(|service: &mut TestService, _| {
            service.events.push("handler");
            Ok(())
        });

    let mut service = TestService::new(&Arc::new(definition));
    service
        .call(|service| {
            service.events.push("work");
            Err(StandardError.into())
        })
        .unwrap();

    assert_eq!(service.events, vec!["before", "work", "handler", "after"]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// AFTER HOOKS ON FAILURE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn after_hooks_run_when_handler_raises() {
    let mut service = TestService::new(&WITH_ERROR_AND_AFTER_HOOK);
    assert_eq!(service.hook_exec_count, 0);

    let err = service.call(fail_with_standard_error).unwrap_err();

    assert!(err.is_fault::<RuntimeError>());
    assert_eq!(service.hook_exec_count, 1);
}

#[test]
fn after_hooks_run_once_after_raising_handler() {
    let mut definition = TEST_SERVICE.extend("RaisingHandler");
    definition
        .add_after_block(|service: &mut TestService| {
            service.events.push("after");
            Ok(())
        })
        .rescue_from::<StandardError, _>(|service: &mut TestService, _| {
            service.events.push("handler");
            Err(RuntimeError.into())
        });
    let mut service = TestService::new(&Arc::new(definition));

    let err = service
        .call(|service| {
            service.events.push("work");
            Err(StandardError.into())
        })
        .unwrap_err();

    assert!(err.is_fault::<RuntimeError>());
    assert_eq!(service.events, vec!["work", "handler", "after"]);
}

#[test]
fn missing_after_hook_method_is_reported() {
    let mut definition = WITH_HOOK.extend("WithMissingAfterHook");
    definition.add_after_hook("non_existing_method").unwrap();
    let mut service = TestService::new(&Arc::new(definition));

    let err = service.call(noop).unwrap_err();

    match err {
        ExecutionError::NoHookMethod { definition, name } => {
            assert_eq!(definition, "WithMissingAfterHook");
            assert_eq!(name, "non_existing_method");
        }
        other => panic!("expected NoHookMethod, got {other:?}"),
    }
}

#[test]
fn missing_after_hook_method_reported_after_handled_fault() {
    let mut definition = WITH_HOOK.extend("WithMissingAfterHook");
    definition.add_after_hook("non_existing_method").unwrap();
    let mut service = TestService::new(&Arc::new(definition));

    let err = service.call(fail_with_standard_error).unwrap_err();

    assert!(matches!(err, ExecutionError::NoHookMethod { .. }));
}

#[test]
fn missing_handler_method_is_reported() {
    let mut definition = TEST_SERVICE.extend("WithMissingHandler");
    definition
        .rescue_from_with::<StandardError>("handle_error")
        .add_after_block(inc_hook_exec_count);
    let mut service = TestService::new(&Arc::new(definition));

    let err = service.call(fail_with_standard_error).unwrap_err();

    match err {
        ExecutionError::NoHandlerMethod { name, .. } => assert_eq!(name, "handle_error"),
        other => panic!("expected NoHandlerMethod, got {other:?}"),
    }
    assert_eq!(service.hook_exec_count, 1);
}

#[test]
fn after_hooks_run_while_work_panics() {
    let mut service = TestService::new(&WITH_BLOCK_AFTER_HOOK);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = service.call(|_| panic!("work panicked"));
    }));

    assert!(result.is_err());
    assert_eq!(service.hook_exec_count, 1);
}

#[test]
fn after_hooks_run_while_before_hook_panics() {
    let mut definition = WITH_BLOCK_AFTER_HOOK.extend("PanickingBeforeHook");
    definition.add_before_block(|_: &mut TestService| panic!("before hook panicked"));
    let mut service = TestService::new(&Arc::new(definition));

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = service.call(|service| {
            service.events.push("work");
            Ok(())
        });
    }));

    assert!(result.is_err());
    assert!(service.events.is_empty());
    assert_eq!(service.hook_exec_count, 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// NESTING
// ═══════════════════════════════════════════════════════════════════════════════

fn outer_with_catch_all() -> Arc<Definition<TestService>> {
    let mut outer = TEST_SERVICE.extend("Outer");
    outer
        .rescue_from::<StandardError, _>(|service: &mut TestService, _| {
            service.events.push("outer rescued");
            Ok(())
        })
        .rescue_from_any(|service: &mut TestService, _| {
            service.events.push("outer caught");
            Ok(())
        });
    Arc::new(outer)
}

#[test]
fn nested_fault_keeps_its_type_for_enclosing_handlers() {
    let mut inner = TEST_SERVICE.extend("Inner");
    inner.add_after_block(|service: &mut TestService| {
        service.events.push("inner after");
        Ok(())
    });

    let mut service = TestService::new(&outer_with_catch_all());
    let outcome = service
        .execute_with_rescue(|service| {
            inner.execute_with_rescue(service, fail_with_standard_error)?;
            Ok(())
        })
        .unwrap();

    assert!(matches!(
        outcome,
        Outcome::Rescued { fault_type } if fault_type.ends_with("StandardError")
    ));
    assert_eq!(service.events, vec!["inner after", "outer rescued"]);
}

#[test]
fn nested_usage_error_is_not_offered_to_enclosing_handlers() {
    let mut inner = TEST_SERVICE.extend("Inner");
    inner.add_before_hook("non_existing_method").unwrap();

    let mut service = TestService::new(&outer_with_catch_all());
    let err = service
        .execute_with_rescue(|service| {
            inner.execute_with_rescue(service, noop)?;
            Ok(())
        })
        .unwrap_err();

    match err {
        ExecutionError::NoHookMethod { definition, name } => {
            assert_eq!(definition, "Inner");
            assert_eq!(name, "non_existing_method");
        }
        other => panic!("expected NoHookMethod, got {other:?}"),
    }
    assert!(service.events.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARING
// ═══════════════════════════════════════════════════════════════════════════════

static SHARED: LazyLock<Arc<Definition<TestService>>> = LazyLock::new(|| {
    let mut definition = WITH_SYMBOL_BEFORE_AFTER_HOOK.extend("Shared");
    definition.rescue_from_any(|service: &mut TestService, _| {
        service.events.push("rescued");
        Ok(())
    });
    Arc::new(definition)
});

#[test]
fn definition_is_shared_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let mut service = TestService::new(&SHARED);
                let work = if i % 2 == 0 {
                    noop
                } else {
                    fail_with_unexpected_error
                };
                let outcome = service.call(work).unwrap();
                (outcome.is_rescued(), service.hook_exec_count)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let (rescued, count) = handle.join().unwrap();
        assert_eq!(rescued, i % 2 == 1);
        assert_eq!(count, 2);
    }
}
