//! Per-stack pools of transition requests.
//!
//! Each payload-carrying event kind has its own pool, and messages get one
//! pool per payload type. Pools belong to a single stack; an owner id keeps
//! handles from crossing between stacks.

use super::handle::{EventHandle, EventKind, Ticket};
use super::pool::{Pool, Recycle, VersionMismatch};
use crate::core::StateRef;
use crate::stack::{StackError, StateKey};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
pub(crate) struct PushOne {
    pub(crate) state: Option<StateRef>,
    pub(crate) pop_self: bool,
}

impl Recycle for PushOne {
    fn recycle(&mut self) {
        self.state = None;
        self.pop_self = false;
    }
}

#[derive(Default)]
pub(crate) struct PushMany {
    pub(crate) states: Vec<StateRef>,
    pub(crate) pop_self: bool,
}

impl Recycle for PushMany {
    fn recycle(&mut self) {
        self.states.clear();
        self.pop_self = false;
    }
}

#[derive(Default)]
pub(crate) struct PushKey {
    pub(crate) key: Option<StateKey>,
    pub(crate) pop_self: bool,
}

impl Recycle for PushKey {
    fn recycle(&mut self) {
        self.key = None;
        self.pop_self = false;
    }
}

#[derive(Default)]
pub(crate) struct PushKeys {
    pub(crate) keys: Vec<StateKey>,
    pub(crate) pop_self: bool,
}

impl Recycle for PushKeys {
    fn recycle(&mut self) {
        self.keys.clear();
        self.pop_self = false;
    }
}

#[derive(Default)]
struct FailureSlot(Option<StackError>);

impl Recycle for FailureSlot {
    fn recycle(&mut self) {
        self.0 = None;
    }
}

struct MessageSlot<M>(Option<M>);

impl<M> Default for MessageSlot<M> {
    fn default() -> Self {
        Self(None)
    }
}

impl<M> Recycle for MessageSlot<M> {
    fn recycle(&mut self) {
        self.0 = None;
    }
}

/// Type-erased view of a message pool for one payload type.
pub(crate) trait MessagePool {
    fn payload(&self, index: u32, version: u32) -> Result<&dyn Any, VersionMismatch>;
    fn release(&mut self, index: u32);
    #[cfg(test)]
    fn live_count(&self) -> usize;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M: 'static> MessagePool for Pool<MessageSlot<M>> {
    fn payload(&self, index: u32, version: u32) -> Result<&dyn Any, VersionMismatch> {
        let slot = self.get(index, version)?;
        slot.0
            .as_ref()
            .map(|message| message as &dyn Any)
            .ok_or(VersionMismatch {
                held: version,
                current: version,
            })
    }

    fn release(&mut self, index: u32) {
        Pool::release(self, index);
    }

    #[cfg(test)]
    fn live_count(&self) -> usize {
        Pool::live_count(self)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn stale(kind: EventKind) -> impl Fn(VersionMismatch) -> StackError {
    move |mismatch| StackError::StaleEvent {
        kind,
        held: mismatch.held,
        current: mismatch.current,
    }
}

/// Pools of every event kind owned by one stack.
pub(crate) struct EventPool {
    owner: u64,
    capacity: usize,
    push_one: Pool<PushOne>,
    push_many: Pool<PushMany>,
    push_key: Pool<PushKey>,
    push_keys: Pool<PushKeys>,
    failures: Pool<FailureSlot>,
    messages: HashMap<TypeId, Box<dyn MessagePool>>,
    outstanding: Vec<(EventKind, u32, Option<TypeId>)>,
}

impl EventPool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            capacity,
            push_one: Pool::with_capacity(capacity),
            push_many: Pool::with_capacity(capacity),
            push_key: Pool::with_capacity(capacity),
            push_keys: Pool::with_capacity(capacity),
            failures: Pool::with_capacity(1),
            messages: HashMap::new(),
            outstanding: Vec::with_capacity(capacity),
        }
    }

    fn mint(
        &mut self,
        kind: EventKind,
        index: u32,
        version: u32,
        payload: Option<TypeId>,
    ) -> EventHandle {
        self.outstanding.push((kind, index, payload));
        EventHandle::pooled(
            kind,
            Ticket {
                owner: self.owner,
                index,
                version,
                payload,
            },
        )
    }

    pub(crate) fn push_state(&mut self, state: StateRef, pop_self: bool) -> EventHandle {
        let (index, version, request) = self.push_one.acquire();
        request.state = Some(state);
        request.pop_self = pop_self;
        self.mint(EventKind::PushSubState, index, version, None)
    }

    pub(crate) fn push_states<I>(&mut self, states: I, pop_self: bool) -> EventHandle
    where
        I: IntoIterator<Item = StateRef>,
    {
        let (index, version, request) = self.push_many.acquire();
        request.states.extend(states);
        request.pop_self = pop_self;
        self.mint(EventKind::PushSubStates, index, version, None)
    }

    pub(crate) fn push_registered(&mut self, key: StateKey, pop_self: bool) -> EventHandle {
        let (index, version, request) = self.push_key.acquire();
        request.key = Some(key);
        request.pop_self = pop_self;
        self.mint(EventKind::PushRegisteredState, index, version, None)
    }

    pub(crate) fn push_registered_states(
        &mut self,
        keys: &[StateKey],
        pop_self: bool,
    ) -> EventHandle {
        let (index, version, request) = self.push_keys.acquire();
        request.keys.extend_from_slice(keys);
        request.pop_self = pop_self;
        self.mint(EventKind::PushRegisteredStates, index, version, None)
    }

    pub(crate) fn raise_message<M: 'static>(&mut self, message: M) -> EventHandle {
        let capacity = self.capacity;
        let type_id = TypeId::of::<M>();
        let pool = self
            .messages
            .entry(type_id)
            .or_insert_with(|| -> Box<dyn MessagePool> {
                Box::new(Pool::<MessageSlot<M>>::with_capacity(capacity))
            })
            .as_any_mut()
            .downcast_mut::<Pool<MessageSlot<M>>>()
            .expect("message pools are keyed by payload type");
        let (index, version, slot) = pool.acquire();
        slot.0 = Some(message);
        self.mint(EventKind::RaiseMessage, index, version, Some(type_id))
    }

    pub(crate) fn fail(&mut self, error: StackError) -> EventHandle {
        let (index, version, slot) = self.failures.acquire();
        slot.0 = Some(error);
        self.mint(EventKind::Failure, index, version, None)
    }

    /// Check that `handle` was minted by this pool and is still current.
    pub(crate) fn validate(&self, handle: &EventHandle) -> Result<(), StackError> {
        let kind = handle.kind();
        let Some(ticket) = handle.ticket() else {
            return Ok(());
        };
        if ticket.owner != self.owner {
            return Err(StackError::ForeignEvent { kind });
        }

        let (index, version) = (ticket.index, ticket.version);
        let checked = match kind {
            EventKind::Continue | EventKind::Pop => Ok(()),
            EventKind::PushSubState => self.push_one.get(index, version).map(drop),
            EventKind::PushSubStates => self.push_many.get(index, version).map(drop),
            EventKind::PushRegisteredState => self.push_key.get(index, version).map(drop),
            EventKind::PushRegisteredStates => self.push_keys.get(index, version).map(drop),
            EventKind::Failure => self.failures.get(index, version).map(drop),
            EventKind::RaiseMessage => match ticket.payload.and_then(|t| self.messages.get(&t)) {
                Some(pool) => pool.payload(index, version).map(drop),
                None => Err(VersionMismatch {
                    held: version,
                    current: 0,
                }),
            },
        };
        checked.map_err(stale(kind))
    }

    pub(crate) fn take_push_state(&mut self, ticket: Ticket) -> Result<PushOne, StackError> {
        self.push_one
            .checkout(ticket.index, ticket.version)
            .map_err(stale(EventKind::PushSubState))
    }

    pub(crate) fn finish_push_state(&mut self, ticket: Ticket, request: PushOne) {
        self.push_one.restore(ticket.index, request);
    }

    pub(crate) fn take_push_states(&mut self, ticket: Ticket) -> Result<PushMany, StackError> {
        self.push_many
            .checkout(ticket.index, ticket.version)
            .map_err(stale(EventKind::PushSubStates))
    }

    pub(crate) fn finish_push_states(&mut self, ticket: Ticket, request: PushMany) {
        self.push_many.restore(ticket.index, request);
    }

    pub(crate) fn take_push_registered(&mut self, ticket: Ticket) -> Result<PushKey, StackError> {
        self.push_key
            .checkout(ticket.index, ticket.version)
            .map_err(stale(EventKind::PushRegisteredState))
    }

    pub(crate) fn finish_push_registered(&mut self, ticket: Ticket, request: PushKey) {
        self.push_key.restore(ticket.index, request);
    }

    pub(crate) fn take_push_registered_states(
        &mut self,
        ticket: Ticket,
    ) -> Result<PushKeys, StackError> {
        self.push_keys
            .checkout(ticket.index, ticket.version)
            .map_err(stale(EventKind::PushRegisteredStates))
    }

    pub(crate) fn finish_push_registered_states(&mut self, ticket: Ticket, request: PushKeys) {
        self.push_keys.restore(ticket.index, request);
    }

    pub(crate) fn take_failure(&mut self, ticket: Ticket) -> Result<StackError, StackError> {
        let mut slot = self
            .failures
            .checkout(ticket.index, ticket.version)
            .map_err(stale(EventKind::Failure))?;
        let error = slot.0.take();
        self.failures.restore(ticket.index, slot);
        Ok(error.unwrap_or(StackError::StaleEvent {
            kind: EventKind::Failure,
            held: ticket.version,
            current: ticket.version,
        }))
    }

    /// Detach the pool holding a raised message so it can be routed while
    /// the stack is mutated. Hand it back with [`EventPool::return_messages`].
    pub(crate) fn take_messages(
        &mut self,
        ticket: Ticket,
    ) -> Result<Box<dyn MessagePool>, StackError> {
        ticket
            .payload
            .and_then(|type_id| self.messages.remove(&type_id))
            .ok_or(StackError::StaleEvent {
                kind: EventKind::RaiseMessage,
                held: ticket.version,
                current: 0,
            })
    }

    pub(crate) fn return_messages(&mut self, ticket: Ticket, pool: Box<dyn MessagePool>) {
        if let Some(type_id) = ticket.payload {
            self.messages.insert(type_id, pool);
        }
    }

    /// Release every entry minted since the last sweep that was not
    /// consumed. Consumed entries are already free and are skipped.
    pub(crate) fn sweep(&mut self) {
        for (kind, index, payload) in self.outstanding.drain(..) {
            match kind {
                EventKind::Continue | EventKind::Pop => {}
                EventKind::PushSubState => self.push_one.release(index),
                EventKind::PushSubStates => self.push_many.release(index),
                EventKind::PushRegisteredState => self.push_key.release(index),
                EventKind::PushRegisteredStates => self.push_keys.release(index),
                EventKind::Failure => self.failures.release(index),
                EventKind::RaiseMessage => {
                    if let Some(pool) = payload.and_then(|t| self.messages.get_mut(&t)) {
                        pool.release(index);
                    }
                }
            }
        }
    }

    /// Requests currently checked out of the pools.
    #[cfg(test)]
    pub(crate) fn live_requests(&self) -> usize {
        self.push_one.live_count()
            + self.push_many.live_count()
            + self.push_key.live_count()
            + self.push_keys.live_count()
            + self.failures.live_count()
            + self.messages.values().map(|pool| pool.live_count()).sum::<usize>()
    }

    /// Pooled instances ever allocated for a kind, across message types.
    #[cfg(test)]
    pub(crate) fn allocated(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Continue | EventKind::Pop => 0,
            EventKind::PushSubState => self.push_one.allocated(),
            EventKind::PushSubStates => self.push_many.allocated(),
            EventKind::PushRegisteredState => self.push_key.allocated(),
            EventKind::PushRegisteredStates => self.push_keys.allocated(),
            EventKind::Failure => self.failures.allocated(),
            EventKind::RaiseMessage => self.messages.len(),
        }
    }
}
