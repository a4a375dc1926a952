//! Ordered action lists.

use crate::{Action, ActionError, Stage, StepStatus};

/// Actions run in order; a sequence resumes where the last step stopped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sequence {
    actions: Vec<Action>,
    cursor: usize,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Whether every action has completed.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.actions.len()
    }

    /// Step actions in order until one is still running.
    ///
    /// Completed actions hand over to the next one within the same tick.
    pub fn step<S: Stage>(&mut self, delta: f64, ctx: &mut S) -> Result<StepStatus, ActionError> {
        while let Some(action) = self.actions.get_mut(self.cursor) {
            match action.step(delta, ctx)? {
                StepStatus::Running => return Ok(StepStatus::Running),
                StepStatus::Complete => self.cursor += 1,
            }
        }
        Ok(StepStatus::Complete)
    }

    /// Rewind to the first action, clearing all per-run state.
    pub fn reset(&mut self) {
        self.cursor = 0;
        for action in &mut self.actions {
            action.reset();
        }
    }
}

impl FromIterator<Action> for Sequence {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        Sequence {
            actions: iter.into_iter().collect(),
            cursor: 0,
        }
    }
}
