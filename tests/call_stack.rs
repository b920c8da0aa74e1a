mod support;

use std::thread;

use pannkaka::{
    CallStack, CallStackError, Frame, debug_installed_stacks,
    description::{Descriptive, StaticDescription},
};
use support::isolated;

fn texts(stack: &CallStack) -> Vec<String> {
    stack.iter().map(|frame| frame.to_string()).collect()
}

fn is_registered(thread: thread::ThreadId) -> bool {
    let mut found = false;
    debug_installed_stacks(|installed, _| found |= installed == thread);
    found
}

#[test]
fn test_pop_is_newest_first_and_iteration_oldest_first() {
    isolated(|| {
        let stack = CallStack::current();
        stack.push("First").unwrap();
        stack.push("Second").unwrap();
        stack.push("Third").unwrap();

        assert_eq!(texts(&stack), ["First", "Second", "Third"]);
        assert_eq!(stack.pop().unwrap().to_string(), "Third");
        assert_eq!(stack.pop().unwrap().to_string(), "Second");
        assert_eq!(stack.pop().unwrap().to_string(), "First");
        assert_eq!(stack.pop().unwrap_err(), CallStackError::Empty);
    });
}

#[test]
fn test_current_is_created_once_per_thread() {
    isolated(|| {
        let first = CallStack::current();
        let second = CallStack::current();
        assert!(first.ptr_eq(&second));
        assert!(first.is_current());
        assert_eq!(first.owner(), Some(thread::current().id()));
        assert!(first.is_empty());

        let elsewhere = isolated(CallStack::current);
        assert!(!elsewhere.ptr_eq(&first));
        assert_ne!(elsewhere.owner(), first.owner());
    });
}

#[test]
fn test_split_is_independent_both_ways() {
    isolated(|| {
        let original = CallStack::current();
        original.push("A").unwrap();

        let copy = original.split();
        assert!(!copy.ptr_eq(&original));
        assert!(!copy.is_installed());
        assert!(!original.is_locked());

        original.push("B").unwrap();
        assert_eq!(texts(&copy), ["A"]);

        let copy_texts = isolated(move || {
            copy.install().unwrap();
            copy.push("C").unwrap();
            texts(&copy)
        });
        assert_eq!(copy_texts, ["A", "C"]);
        assert_eq!(texts(&original), ["A", "B"]);
    });
}

#[test]
fn test_split_from_a_foreign_thread() {
    isolated(|| {
        let stack = CallStack::current();
        stack.push("owned elsewhere").unwrap();

        let handle = stack.clone();
        let copied = isolated(move || texts(&handle.split()));
        assert_eq!(copied, ["owned elsewhere"]);
    });
}

#[test]
fn test_migrate_locks_the_source_even_for_its_owner() {
    isolated(|| {
        let stack = CallStack::current();
        stack.push("A").unwrap();

        let handoff = stack.migrate();
        assert!(stack.is_locked());
        assert!(!handoff.is_locked());
        assert_eq!(stack.push("B").unwrap_err(), CallStackError::Locked);
        assert_eq!(stack.pop().unwrap_err(), CallStackError::Locked);
        assert_eq!(texts(&stack), ["A"]);

        let popped = isolated(move || {
            handoff.install().unwrap();
            handoff.pop().unwrap().to_string()
        });
        assert_eq!(popped, "A");

        // Copies of a locked stack are still usable.
        let second = stack.split();
        second.install().unwrap();
        assert_eq!(second.pop().unwrap().to_string(), "A");
    });
}

#[test]
fn test_locked_is_reported_before_everything_else() {
    isolated(|| {
        let unbound = CallStack::current().split();
        let _ = unbound.migrate();
        assert_eq!(unbound.push("x").unwrap_err(), CallStackError::Locked);
    });
}

#[test]
fn test_uninstalled_stack_is_unbound() {
    isolated(|| {
        let copy = CallStack::current().split();
        assert_eq!(copy.push("x").unwrap_err(), CallStackError::Unbound);
        assert_eq!(copy.pop().unwrap_err(), CallStackError::Unbound);
        assert!(copy.is_empty());
    });
}

#[test]
fn test_foreign_thread_cannot_mutate() {
    isolated(|| {
        let stack = CallStack::current();
        stack.push("owner frame").unwrap();

        let handle = stack.clone();
        let (push, pop) = isolated(move || (handle.push("intruder"), handle.pop()));
        assert!(push.unwrap_err().is_foreign_context());
        assert!(pop.unwrap_err().is_foreign_context());

        assert_eq!(texts(&stack), ["owner frame"]);
        stack.pop().unwrap();
        assert_eq!(stack.pop().unwrap_err(), CallStackError::Empty);
    });
}

#[test]
fn test_shadowed_stack_is_not_current() {
    isolated(|| {
        let first = CallStack::current();
        let second = CallStack::empty();

        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(CallStack::current().ptr_eq(&second));
        assert_eq!(first.push("x").unwrap_err(), CallStackError::NotCurrent);
        second.push("y").unwrap();
    });
}

#[test]
fn test_installing_twice_fails() {
    isolated(|| {
        let stack = CallStack::current();
        let owner = thread::current().id();
        assert_eq!(
            stack.install().unwrap_err(),
            CallStackError::AlreadyInstalled { owner }
        );

        let handle = stack.clone();
        let elsewhere = isolated(move || handle.install().map(|_| ()));
        assert_eq!(elsewhere, Err(CallStackError::AlreadyInstalled { owner }));
        assert!(stack.is_current());
    });
}

#[test]
fn test_failed_operations_leave_the_stack_untouched() {
    isolated(|| {
        let stack = CallStack::current();
        stack.push("kept").unwrap();
        let _shadow = CallStack::empty();

        assert!(stack.push("rejected").is_err());
        assert!(stack.pop().is_err());
        assert_eq!(texts(&stack), ["kept"]);
    });
}

#[test]
fn test_push_value_renders_type_name() {
    #[derive(derive_more::Display)]
    #[display("{_0}ms")]
    struct Timeout(u64);

    isolated(|| {
        let stack = CallStack::current();
        stack.push_value(10).unwrap();
        stack.push_value(Timeout(250)).unwrap();

        assert_eq!(texts(&stack), ["[i32] 10", "[Timeout] 250ms"]);
    });
}

#[test]
fn test_push_descriptive() {
    struct Connection {
        peer: &'static str,
    }

    impl Descriptive for Connection {
        fn description(&self) -> Frame {
            StaticDescription::new(format!("talking to {}", self.peer)).into()
        }
    }

    isolated(|| {
        let stack = CallStack::current();
        stack
            .push_descriptive(&Connection { peer: "db-1" })
            .unwrap();
        assert_eq!(stack.pop().unwrap().to_string(), "talking to db-1");
    });
}

#[test]
fn test_frames_are_shared_by_snapshots() {
    isolated(|| {
        let stack = CallStack::current();
        stack.push("shared").unwrap();

        let copy = stack.split();
        let original_frame = stack.iter().next().unwrap();
        let copied_frame = copy.iter().next().unwrap();
        assert!(original_frame.ptr_eq(&copied_frame));
    });
}

#[test]
fn test_enter_guard_pops_on_drop() {
    isolated(|| {
        let stack = CallStack::current();
        {
            let outer = stack.enter("outer").unwrap();
            let _inner = stack.enter("inner").unwrap();
            assert_eq!(outer.frame().to_string(), "outer");
            assert_eq!(texts(&stack), ["outer", "inner"]);
        }
        assert!(stack.is_empty());
    });
}

#[test]
fn test_release_current_is_idempotent() {
    isolated(|| {
        let stack = CallStack::current();
        let me = thread::current().id();
        assert!(is_registered(me));

        let released = CallStack::release_current().unwrap();
        assert!(released.ptr_eq(&stack));
        assert!(CallStack::release_current().is_none());
        assert!(!is_registered(me));

        // The released stack keeps its owner and is no longer usable.
        assert_eq!(stack.push("x").unwrap_err(), CallStackError::NotCurrent);
        assert!(!CallStack::current().ptr_eq(&stack));
    });
}

#[test]
fn test_binding_is_released_when_the_thread_exits() {
    let (stack, id) = isolated(|| {
        let stack = CallStack::current();
        stack.push("short-lived").unwrap();
        (stack, thread::current().id())
    });

    assert!(!is_registered(id));
    assert_eq!(stack.owner(), Some(id));
    assert_eq!(texts(&stack), ["short-lived"]);
}

#[test]
fn test_thread_local_destructor_leaves_no_slot_behind() {
    struct PushOnExit;

    impl Drop for PushOnExit {
        fn drop(&mut self) {
            // Registered before the exit guard, so with locals destroyed in
            // reverse order this runs after the binding is gone.
            let _ = CallStack::current().push("from thread-local destructor");
        }
    }

    thread_local! {
        static PUSH_ON_EXIT: PushOnExit = const { PushOnExit };
    }

    let id = thread::spawn(|| {
        PUSH_ON_EXIT.with(|_| ());
        CallStack::current().push("while alive").unwrap();
        thread::current().id()
    })
    .join()
    .unwrap();

    assert!(!is_registered(id));
}

#[test]
fn test_debug_installed_stacks_sees_the_current_stack() {
    isolated(|| {
        let stack = CallStack::current();
        stack.push("visible").unwrap();

        let mut seen = None;
        let me = thread::current().id();
        debug_installed_stacks(|thread, installed| {
            if thread == me {
                seen = Some(installed.clone());
            }
        });
        assert!(seen.unwrap().ptr_eq(&stack));
    });
}

#[test]
fn test_concurrent_split_while_owner_mutates() {
    isolated(|| {
        let stack = CallStack::current();
        stack.push("base").unwrap();

        let reader = stack.clone();
        let splitter = thread::spawn(move || {
            (0..1_000).all(|_| {
                let copy = reader.split();
                copy.iter().next().map(|frame| frame.to_string()).as_deref() == Some("base")
            })
        });

        for i in 0..1_000 {
            stack.push_value(i).unwrap();
            stack.pop().unwrap();
        }
        assert!(splitter.join().unwrap());
    });
}
