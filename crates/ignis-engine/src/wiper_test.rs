use std::collections::BTreeSet;

use super::{wipe, WipeError};
use crate::journal::{load_deployment_state, MemoryJournal};
use crate::test_support::*;

fn foo1_and_foo2() -> MemoryJournal {
    let mut messages = successful_deployment_journal("M#Foo1", "0x01");
    messages.push(deployment_init_with(
        "M#Foo2",
        "Foo",
        "basic",
        BTreeSet::from(["M#Foo1".to_string()]),
    ));
    MemoryJournal::with_messages(messages)
}

#[test]
fn wiping_a_future_with_dependents_is_rejected() {
    let mut journal = foo1_and_foo2();
    let before = journal.messages().to_vec();

    let error = wipe(&mut journal, "M#Foo1").expect_err("has dependents");

    assert!(matches!(
        &error,
        WipeError::HasDependents { dependents, .. } if dependents == &vec!["M#Foo2".to_string()]
    ));
    assert!(error.to_string().contains("M#Foo2"));
    assert_eq!(journal.messages(), before.as_slice());
}

#[test]
fn wiping_a_leaf_removes_exactly_that_state() {
    let mut journal = foo1_and_foo2();

    let state = wipe(&mut journal, "M#Foo2").expect("wipe");

    assert!(state.execution_state("M#Foo2").is_none());
    assert!(state.execution_state("M#Foo1").is_some());
    assert_eq!(
        load_deployment_state(&journal).expect("replay"),
        Some(state)
    );
}

#[test]
fn all_dependents_are_listed() {
    let mut messages = foo1_and_foo2().messages().to_vec();
    messages.push(deployment_init_with(
        "M#Foo3",
        "Foo",
        "basic",
        BTreeSet::from(["M#Foo1".to_string()]),
    ));
    let mut journal = MemoryJournal::with_messages(messages);

    let error = wipe(&mut journal, "M#Foo1").expect_err("has dependents");
    assert_eq!(
        error.to_string(),
        "cannot wipe M#Foo1: it is a dependency of M#Foo2, M#Foo3"
    );
}

#[test]
fn uninitialized_and_unknown_futures_are_rejected() {
    let mut empty = MemoryJournal::new();
    assert!(matches!(
        wipe(&mut empty, "M#Foo"),
        Err(WipeError::UninitializedDeployment { .. })
    ));
    assert!(empty.messages().is_empty());

    let mut journal = foo1_and_foo2();
    assert!(matches!(
        wipe(&mut journal, "M#Nope"),
        Err(WipeError::UnknownFuture { .. })
    ));
}
