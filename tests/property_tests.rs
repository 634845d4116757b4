//! Property-based tests for the state stack.
//!
//! These tests use proptest to drive stacks through random sequences of
//! pushes, ticks and messages and check that the lifecycle invariants
//! hold after every operation.

use mindstack::core::{state_ref, State, StateContext, StateMessage, StateStatus};
use mindstack::event::{EventHandle, TickContext};
use mindstack::{RoutingPolicy, StackConfig, StackError, StateStack};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// What a generated state answers on each tick.
#[derive(Clone, Debug)]
enum Behavior {
    Stay,
    Pop,
    PushChild,
    Replace,
    Raise,
}

#[derive(Clone, Debug)]
enum Op {
    Push(Behavior, bool),
    Tick,
    Message,
    PopAll,
}

type Trace = Rc<RefCell<Vec<(u32, &'static str)>>>;

struct Actor {
    id: u32,
    behavior: Behavior,
    handles: bool,
    trace: Trace,
}

impl Actor {
    fn spawn(id: u32, behavior: Behavior, handles: bool, trace: &Trace) -> Self {
        Self {
            id,
            behavior,
            handles,
            trace: trace.clone(),
        }
    }

    fn note(&self, callback: &'static str) {
        self.trace.borrow_mut().push((self.id, callback));
    }
}

impl State for Actor {
    fn on_entry(&mut self, ctx: &StateContext) {
        assert_eq!(ctx.status(), StateStatus::Disabled);
        self.note("entry");
    }

    fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
        assert_eq!(ctx.status(), StateStatus::Active);
        let child = || state_ref(Actor::spawn(self.id + 1000, Behavior::Pop, false, &self.trace));
        match self.behavior {
            Behavior::Stay => ctx.stay(),
            Behavior::Pop => ctx.pop(),
            Behavior::PushChild => ctx.push_sub_state(child(), false),
            Behavior::Replace => ctx.push_sub_state(child(), true),
            Behavior::Raise => ctx.raise_message(self.id),
        }
    }

    fn on_exit(&mut self, ctx: &StateContext) {
        assert_ne!(ctx.status(), StateStatus::Disabled);
        self.note("exit");
    }

    fn on_pause(&mut self, ctx: &StateContext) {
        assert_eq!(ctx.status(), StateStatus::Active);
        self.note("pause");
    }

    fn on_resume(&mut self, ctx: &StateContext) {
        assert_eq!(ctx.status(), StateStatus::Paused);
        self.note("resume");
    }

    fn handle_message(&mut self, _message: &StateMessage<'_>, _ctx: &StateContext) -> bool {
        self.handles
    }
}

fn arbitrary_behavior() -> impl Strategy<Value = Behavior> {
    prop_oneof![
        3 => Just(Behavior::Stay),
        2 => Just(Behavior::Pop),
        1 => Just(Behavior::PushChild),
        1 => Just(Behavior::Replace),
        1 => Just(Behavior::Raise),
    ]
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (arbitrary_behavior(), any::<bool>()).prop_map(|(b, h)| Op::Push(b, h)),
        4 => Just(Op::Tick),
        1 => Just(Op::Message),
        1 => Just(Op::PopAll),
    ]
}

fn arbitrary_config() -> impl Strategy<Value = StackConfig> {
    (any::<bool>(), any::<bool>()).prop_map(|(tick_until_continue, peek)| StackConfig {
        tick_until_continue,
        routing: if peek {
            RoutingPolicy::Peek
        } else {
            RoutingPolicy::PopUnhandled
        },
        ..StackConfig::default()
    })
}

/// At most one slot is active, and only ever the top one.
fn assert_single_active_top(stack: &StateStack) -> Result<(), TestCaseError> {
    let statuses: Vec<StateStatus> = stack.statuses().collect();
    let active = statuses
        .iter()
        .filter(|status| **status == StateStatus::Active)
        .count();
    prop_assert!(active <= 1, "more than one active slot: {:?}", statuses);
    if active == 1 {
        prop_assert_eq!(statuses.last(), Some(&StateStatus::Active));
    }
    Ok(())
}

proptest! {
    #[test]
    fn only_the_top_is_ever_active(
        config in arbitrary_config(),
        ops in prop::collection::vec(arbitrary_op(), 1..60),
    ) {
        let trace = Trace::default();
        let mut stack = StateStack::with_config(config);
        let mut next_id = 0u32;

        for op in ops {
            match op {
                Op::Push(behavior, handles) => {
                    stack.push_state(state_ref(Actor::spawn(next_id, behavior, handles, &trace)));
                    next_id += 1;
                }
                Op::Tick => match stack.tick() {
                    // A stack of self-replacing states may run into the cap;
                    // that is reported, never a broken chain.
                    Ok(()) | Err(StackError::IterationCapExceeded { .. }) => {}
                    Err(error) => prop_assert!(false, "unexpected tick error: {}", error),
                },
                Op::Message => {
                    stack.raise_message(());
                }
                Op::PopAll => stack.pop_all_states(),
            }
            assert_single_active_top(&stack)?;
        }
    }

    #[test]
    fn every_entry_is_matched_by_one_exit(
        ops in prop::collection::vec(arbitrary_op(), 1..60),
    ) {
        let trace = Trace::default();
        {
            let mut stack = StateStack::new();
            let mut next_id = 0u32;
            for op in ops {
                match op {
                    Op::Push(behavior, handles) => {
                        stack.push_state(state_ref(Actor::spawn(next_id, behavior, handles, &trace)));
                        next_id += 1;
                    }
                    Op::Tick => stack.tick().unwrap(),
                    Op::Message => { stack.raise_message(()); }
                    Op::PopAll => stack.pop_all_states(),
                }
            }
        }

        let trace = trace.borrow();
        let entries = trace.iter().filter(|(_, callback)| *callback == "entry").count();
        let exits = trace.iter().filter(|(_, callback)| *callback == "exit").count();
        prop_assert_eq!(entries, exits);
    }

    #[test]
    fn pause_precedes_child_entry(depth in 1usize..8) {
        let trace = Trace::default();
        let mut stack = StateStack::new();

        for id in 0..depth as u32 {
            stack.push_state(state_ref(Actor::spawn(id, Behavior::Stay, false, &trace)));
            stack.tick().unwrap();
        }

        let trace = trace.borrow();
        for id in 1..depth as u32 {
            let paused = trace.iter().position(|entry| *entry == (id - 1, "pause"));
            let entered = trace.iter().position(|entry| *entry == (id, "entry"));
            prop_assert!(paused.is_some());
            prop_assert!(paused < entered);
        }
    }

    #[test]
    fn statuses_never_outnumber_pushes(pushes in 0usize..10, ticks in 0usize..10) {
        let trace = Trace::default();
        let mut stack = StateStack::new();
        for id in 0..pushes as u32 {
            stack.push_state(state_ref(Actor::spawn(id, Behavior::Pop, false, &trace)));
        }
        for _ in 0..ticks {
            stack.tick().unwrap();
        }

        prop_assert_eq!(stack.process_count(), pushes.saturating_sub(ticks));
        prop_assert_eq!(stack.statuses().count(), stack.process_count());
    }
}
