//! Nested graphics-state stack with skip-level restore.
//!
//! Callers may restore an outer save point while inner ones are still open;
//! everything above the target is popped and invalidated along with it. The
//! stack is strictly LIFO and every popped state is invalidated exactly once,
//! which lets [`StateHooks`] implementors mirror pushes and pops onto a native
//! save/restore primitive without any bookkeeping of their own.

use super::state::{GraphicsState, SavePoint, StackId, StateAttributes};
use log::{debug, trace};
use thiserror::Error;

/// Misuse of save/restore pairing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("state not on stack: {token} is not open on {stack}")]
    NotOnStack { token: String, stack: StackId },

    #[error("state already restored: {token}")]
    AlreadyRestored { token: String },
}

/// Lifecycle callbacks invoked in lockstep with the stack's pushes and pops.
pub trait StateHooks {
    /// Called after `state` has become the new top of the stack.
    fn pushed(&mut self, state: &GraphicsState);

    /// Called for each state as it is popped, after it has been invalidated.
    fn popped(&mut self, state: &GraphicsState);
}

impl StateHooks for () {
    fn pushed(&mut self, _state: &GraphicsState) {}
    fn popped(&mut self, _state: &GraphicsState) {}
}

/// The ordered save points of one drawing surface, plus its base state.
#[derive(Debug)]
pub struct GraphicsStateStack {
    id: StackId,
    base: GraphicsState,
    entries: Vec<GraphicsState>,
    next_ordinal: u64,
}

impl Default for GraphicsStateStack {
    fn default() -> Self {
        Self::new(StateAttributes::default())
    }
}

impl GraphicsStateStack {
    /// Creates a stack whose base state holds `attrs`.
    pub fn new(attrs: StateAttributes) -> Self {
        Self {
            id: StackId::next(),
            base: GraphicsState::base(attrs),
            entries: Vec::new(),
            next_ordinal: 1,
        }
    }

    pub fn id(&self) -> StackId {
        self.id
    }

    /// The state drawing operations read and mutate: the top entry, or the base.
    pub fn current(&self) -> &GraphicsState {
        self.entries.last().unwrap_or(&self.base)
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        self.entries.last_mut().unwrap_or(&mut self.base)
    }

    /// Number of pushed, not yet restored states.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Pushes a copy of the current state and returns its save point.
    pub fn push(&mut self, hooks: &mut dyn StateHooks) -> SavePoint {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;

        let state = self.current().fork(ordinal, self.entries.len() + 1);
        let token = state.token(self.id);
        self.entries.push(state);

        trace!("{}: pushed {}", self.id, token);
        if let Some(top) = self.entries.last() {
            hooks.pushed(top);
        }
        token
    }

    /// Pops states until the one saved as `token` has been popped.
    ///
    /// Returns the number of states discarded (at least 1). Afterwards the
    /// current state is whatever was current when `token` was saved.
    ///
    /// # Errors
    /// - [`StateError::AlreadyRestored`] if `token` has been restored before
    /// - [`StateError::NotOnStack`] if `token` belongs to another stack
    ///
    /// Validation happens before anything is popped.
    pub fn restore(
        &mut self,
        token: &SavePoint,
        hooks: &mut dyn StateHooks,
    ) -> Result<usize, StateError> {
        if !token.is_valid() {
            return Err(StateError::AlreadyRestored {
                token: token.to_string(),
            });
        }
        let position = self.position_of(token).ok_or_else(|| StateError::NotOnStack {
            token: token.to_string(),
            stack: self.id,
        })?;

        let discarded = self.entries.len() - position;
        while self.entries.len() > position {
            if let Some(state) = self.entries.pop() {
                state.invalidate();
                hooks.popped(&state);
            }
        }

        debug!(
            "{}: restored {}, discarded {} state(s), {} open",
            self.id,
            token,
            discarded,
            self.entries.len()
        );
        Ok(discarded)
    }

    /// Pops every open state, innermost first. Returns how many were popped.
    pub fn restore_all(&mut self, hooks: &mut dyn StateHooks) -> usize {
        let discarded = self.entries.len();
        while let Some(state) = self.entries.pop() {
            state.invalidate();
            hooks.popped(&state);
        }
        if discarded > 0 {
            debug!("{}: unwound {} open state(s)", self.id, discarded);
        }
        discarded
    }

    fn position_of(&self, token: &SavePoint) -> Option<usize> {
        if token.stack() != self.id {
            return None;
        }
        // Levels are 1-based and dense, so the level names the slot directly.
        let index = token.level().checked_sub(1)?;
        self.entries
            .get(index)
            .filter(|state| state.ordinal() == token.ordinal())
            .map(|_| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, GREEN, RED};
    use crate::draw::state::Pen;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl StateHooks for Recorder {
        fn pushed(&mut self, state: &GraphicsState) {
            assert!(state.is_valid());
            self.events.push(format!("push {}", state.ordinal()));
        }

        fn popped(&mut self, state: &GraphicsState) {
            assert!(!state.is_valid());
            self.events.push(format!("pop {}", state.ordinal()));
        }
    }

    fn set_width(stack: &mut GraphicsStateStack, width: f64) {
        stack.current_mut().attrs.pen.width = width;
    }

    #[test]
    fn current_is_base_when_empty() {
        let stack = GraphicsStateStack::default();
        assert_eq!(stack.count(), 0);
        assert_eq!(stack.current().level(), 0);
        assert!(stack.current().is_valid());
    }

    #[test]
    fn push_copies_current_state() {
        let mut stack = GraphicsStateStack::default();
        stack.current_mut().attrs.pen = Pen::new(RED, 3.0);

        let token = stack.push(&mut ());
        assert_eq!(stack.count(), 1);
        assert_eq!(token.level(), 1);
        assert_eq!(stack.current().attrs.pen, Pen::new(RED, 3.0));
    }

    #[test]
    fn restoring_first_of_n_saves_discards_all() {
        for n in 1..=6 {
            let mut stack = GraphicsStateStack::default();
            stack.current_mut().attrs.pen = Pen::new(GREEN, 2.0);
            let before = stack.current().attrs.clone();

            let tokens: Vec<SavePoint> = (0..n)
                .map(|i| {
                    let token = stack.push(&mut ());
                    set_width(&mut stack, 10.0 + i as f64);
                    token
                })
                .collect();

            assert_eq!(stack.restore(&tokens[0], &mut ()), Ok(n));
            assert_eq!(stack.count(), 0);
            assert_eq!(stack.current().attrs, before);
            assert!(tokens.iter().all(|t| !t.is_valid()));
        }
    }

    #[test]
    fn skip_level_restore_reverts_attribute() {
        let mut stack = GraphicsStateStack::default();
        stack.current_mut().attrs.pen.color = BLUE;

        let t1 = stack.push(&mut ());
        stack.current_mut().attrs.pen.color = RED;
        let t2 = stack.push(&mut ());
        stack.current_mut().attrs.pen.color = GREEN;

        assert_eq!(stack.restore(&t1, &mut ()), Ok(2));
        assert_eq!(stack.current().attrs.pen.color, BLUE);
        assert!(!t2.is_valid());
    }

    #[test]
    fn restoring_inner_keeps_outer_open() {
        let mut stack = GraphicsStateStack::default();
        let outer = stack.push(&mut ());
        set_width(&mut stack, 5.0);
        let inner = stack.push(&mut ());
        set_width(&mut stack, 9.0);

        assert_eq!(stack.restore(&inner, &mut ()), Ok(1));
        assert!(outer.is_valid());
        assert_eq!(stack.count(), 1);
        assert_eq!(stack.current().attrs.pen.width, 5.0);
    }

    #[test]
    fn double_restore_is_rejected() {
        let mut stack = GraphicsStateStack::default();
        let token = stack.push(&mut ());
        assert_eq!(stack.restore(&token, &mut ()), Ok(1));

        let err = stack.restore(&token, &mut ()).unwrap_err();
        assert!(matches!(err, StateError::AlreadyRestored { .. }));
        assert!(err.to_string().contains("already restored"));
    }

    #[test]
    fn token_from_other_stack_is_rejected() {
        let mut ours = GraphicsStateStack::default();
        let mut theirs = GraphicsStateStack::default();
        let kept = ours.push(&mut ());
        let foreign = theirs.push(&mut ());

        let err = ours.restore(&foreign, &mut ()).unwrap_err();
        assert!(matches!(err, StateError::NotOnStack { .. }));
        assert!(err.to_string().contains("state not on stack"));

        // Nothing was popped by the failed call.
        assert_eq!(ours.count(), 1);
        assert!(kept.is_valid());
        assert!(foreign.is_valid());
    }

    #[test]
    fn hooks_fire_in_lifo_order() {
        let mut stack = GraphicsStateStack::default();
        let mut recorder = Recorder::default();

        let first = stack.push(&mut recorder);
        stack.push(&mut recorder);
        stack.push(&mut recorder);
        stack.restore(&first, &mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec!["push 1", "push 2", "push 3", "pop 3", "pop 2", "pop 1"]
        );
    }

    #[test]
    fn restore_all_unwinds_to_base() {
        let mut stack = GraphicsStateStack::default();
        let mut recorder = Recorder::default();
        let first = stack.push(&mut recorder);
        let second = stack.push(&mut recorder);

        assert_eq!(stack.restore_all(&mut recorder), 2);
        assert_eq!(stack.count(), 0);
        assert!(!first.is_valid() && !second.is_valid());
        assert_eq!(recorder.events[2..], ["pop 2", "pop 1"]);
        assert_eq!(stack.restore_all(&mut recorder), 0);
    }

    #[test]
    fn ordinals_are_not_reused_after_restore() {
        let mut stack = GraphicsStateStack::default();
        let old = stack.push(&mut ());
        stack.restore(&old, &mut ()).unwrap();
        let new = stack.push(&mut ());

        assert_eq!(old.level(), new.level());
        assert_ne!(old.ordinal(), new.ordinal());
        assert!(matches!(
            stack.restore(&old, &mut ()),
            Err(StateError::AlreadyRestored { .. })
        ));
        assert!(new.is_valid());
    }
}
