//! Guard Patrol Example
//!
//! A guard patrols a route, chases an intruder once it hears a noise, and
//! gives up the chase when the intruder slips out of sight.
//!
//! Run with `RUST_LOG=mindstack=debug cargo run --example guard_patrol`
//! to see the stack's own tracing output.

use mindstack::core::{state_ref, Guard, Receives, State, StateContext, StateRef};
use mindstack::event::{EventHandle, TickContext};
use mindstack::states::{SequenceState, StateRefExt};
use mindstack::{receives, StateStack};
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

/// Message raised when something makes a sound.
struct Noise {
    at: u32,
}

struct Patrol {
    waypoint: u32,
    heard: Option<u32>,
    intruder_visible: Rc<Cell<bool>>,
}

impl Receives<Noise> for Patrol {
    fn receive(&mut self, noise: &Noise, _sender: Option<&StateRef>) -> bool {
        println!("  Patrol heard a noise at waypoint {}", noise.at);
        self.heard = Some(noise.at);
        true
    }
}

impl State for Patrol {
    fn name(&self) -> &str {
        "Patrol"
    }

    fn on_entry(&mut self, _ctx: &StateContext) {
        println!("  Patrol starts at waypoint {}", self.waypoint);
    }

    fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> EventHandle {
        if let Some(at) = self.heard.take() {
            let visible = self.intruder_visible.clone();
            let chase = state_ref(SequenceState::new("Chase", move |step, ctx| {
                println!("  Chasing towards waypoint {} (step {})", at, step);
                Some(ctx.stay())
            }))
            .with_condition(Guard::new(move || visible.get()));
            return ctx.push_sub_state(chase, false);
        }

        self.waypoint = (self.waypoint + 1) % 4;
        println!("  Patrol walks to waypoint {}", self.waypoint);
        ctx.stay()
    }

    fn on_pause(&mut self, _ctx: &StateContext) {
        println!("  Patrol paused");
    }

    fn on_resume(&mut self, _ctx: &StateContext) {
        println!("  Patrol resumes at waypoint {}", self.waypoint);
    }

    receives!(Noise);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Guard Patrol Example ===\n");

    let intruder_visible = Rc::new(Cell::new(true));
    let patrol = Rc::new(std::cell::RefCell::new(Patrol {
        waypoint: 0,
        heard: None,
        intruder_visible: intruder_visible.clone(),
    }));

    let mut stack = StateStack::builder()
        .history_limit(64)
        .register(patrol)
        .build()?;
    stack.push_registered::<Patrol>()?;

    for frame in 0..3 {
        println!("Frame {}", frame);
        stack.tick()?;
    }

    println!("\nRaising a noise");
    let handled = stack.raise_message(Noise { at: 2 });
    println!("  handled: {}", handled);

    for frame in 3..6 {
        println!("Frame {}", frame);
        stack.tick()?;
        if frame == 4 {
            println!("  The intruder slips away");
            intruder_visible.set(false);
        }
    }

    println!("\n=== Lifecycle History ===");
    for line in stack.history().lines() {
        println!("  {}", line);
    }

    Ok(())
}
