//! Action state machines.
//!
//! An action is the runtime form of one brick. Stepping it either finishes
//! its work ([`StepStatus::Complete`]) or suspends until the next tick
//! ([`StepStatus::Running`]). Control actions own their compiled bodies and
//! re-drive them with [`Sequence::reset`]; loops yield at the end of every
//! iteration so a loop never monopolises a tick.

use stage_formula::{interpret_bool, interpret_number};
use stage_ir::{Formula, SpriteId};

use crate::{ActionError, BroadcastTicket, Effect, Sequence, Stage};

/// Outcome of stepping an action or sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// Suspended; step again next tick.
    Running,
    /// Done; the next action may run in the same tick.
    Complete,
}

/// Runtime instance of a brick.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// A leaf effect completing in one step.
    Instant {
        name: &'static str,
        target: Option<SpriteId>,
        effect: Effect,
    },
    Broadcast {
        message: String,
    },
    Wait {
        target: Option<SpriteId>,
        seconds: Formula,
        /// `(duration, elapsed)` once reached.
        progress: Option<(f64, f64)>,
    },
    WaitUntil {
        target: Option<SpriteId>,
        condition: Formula,
    },
    BroadcastWait {
        message: String,
        ticket: Option<BroadcastTicket>,
    },
    /// Requests removal of the executing clone, then never completes: the
    /// scheduler cancels the clone's scripts. A no-op on original sprites.
    DeleteThisClone {
        target: Option<SpriteId>,
        requested: bool,
    },
    Repeat {
        target: Option<SpriteId>,
        times: Formula,
        body: Sequence,
        remaining: Option<u64>,
    },
    RepeatUntil {
        target: Option<SpriteId>,
        condition: Formula,
        body: Sequence,
        in_body: bool,
    },
    Forever {
        body: Sequence,
    },
    IfElse {
        target: Option<SpriteId>,
        condition: Formula,
        then_branch: Sequence,
        else_branch: Sequence,
        chosen: Option<bool>,
    },
}

impl Action {
    /// Kind name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Instant { name, .. } => name,
            Action::Broadcast { .. } => "broadcast",
            Action::Wait { .. } => "wait",
            Action::WaitUntil { .. } => "wait until",
            Action::BroadcastWait { .. } => "broadcast and wait",
            Action::DeleteThisClone { .. } => "delete this clone",
            Action::Repeat { .. } => "repeat",
            Action::RepeatUntil { .. } => "repeat until",
            Action::Forever { .. } => "forever",
            Action::IfElse { .. } => "if",
        }
    }

    pub fn step<S: Stage>(&mut self, delta: f64, ctx: &mut S) -> Result<StepStatus, ActionError> {
        let name = self.name();
        match self {
            Action::Instant { target, effect, .. } => {
                let sprite = live_target(name, *target, ctx)?;
                effect.apply(sprite, ctx);
                Ok(StepStatus::Complete)
            }
            Action::Broadcast { message } => {
                ctx.broadcast(message);
                Ok(StepStatus::Complete)
            }
            Action::Wait {
                target,
                seconds,
                progress,
            } => {
                let sprite = live_target(name, *target, ctx)?;
                let (duration, elapsed) = progress.get_or_insert_with(|| {
                    let duration = interpret_number(seconds, sprite, &*ctx);
                    (duration.max(0.0), 0.0)
                });
                *elapsed += delta;
                if *elapsed >= *duration {
                    Ok(StepStatus::Complete)
                } else {
                    Ok(StepStatus::Running)
                }
            }
            Action::WaitUntil { target, condition } => {
                let sprite = live_target(name, *target, ctx)?;
                Ok(if interpret_bool(condition, sprite, &*ctx) {
                    StepStatus::Complete
                } else {
                    StepStatus::Running
                })
            }
            Action::BroadcastWait { message, ticket } => match *ticket {
                None => {
                    *ticket = Some(ctx.broadcast(message));
                    Ok(StepStatus::Running)
                }
                Some(raised) if ctx.broadcast_finished(raised) => Ok(StepStatus::Complete),
                Some(_) => Ok(StepStatus::Running),
            },
            Action::DeleteThisClone { target, requested } => {
                let sprite = live_target(name, *target, ctx)?;
                if !ctx.is_clone(sprite) {
                    return Ok(StepStatus::Complete);
                }
                if !*requested {
                    ctx.request_removal(sprite);
                    *requested = true;
                }
                Ok(StepStatus::Running)
            }
            Action::Repeat {
                target,
                times,
                body,
                remaining,
            } => {
                let sprite = live_target(name, *target, ctx)?;
                let left = remaining.get_or_insert_with(|| {
                    let times = interpret_number(times, sprite, &*ctx).round();
                    if times > 0.0 {
                        times as u64
                    } else {
                        0
                    }
                });
                if *left == 0 {
                    return Ok(StepStatus::Complete);
                }
                if body.step(delta, ctx)? == StepStatus::Complete {
                    *left -= 1;
                    body.reset();
                }
                Ok(StepStatus::Running)
            }
            Action::RepeatUntil {
                target,
                condition,
                body,
                in_body,
            } => {
                let sprite = live_target(name, *target, ctx)?;
                if !*in_body {
                    if interpret_bool(condition, sprite, &*ctx) {
                        return Ok(StepStatus::Complete);
                    }
                    *in_body = true;
                }
                if body.step(delta, ctx)? == StepStatus::Complete {
                    *in_body = false;
                    body.reset();
                }
                Ok(StepStatus::Running)
            }
            Action::Forever { body } => {
                if body.step(delta, ctx)? == StepStatus::Complete {
                    body.reset();
                }
                Ok(StepStatus::Running)
            }
            Action::IfElse {
                target,
                condition,
                then_branch,
                else_branch,
                chosen,
            } => {
                let branch = match *chosen {
                    Some(branch) => branch,
                    None => {
                        let sprite = live_target(name, *target, ctx)?;
                        let branch = interpret_bool(condition, sprite, &*ctx);
                        *chosen = Some(branch);
                        branch
                    }
                };
                if branch {
                    then_branch.step(delta, ctx)
                } else {
                    else_branch.step(delta, ctx)
                }
            }
        }
    }

    /// Forget all per-run state so the action can run again.
    pub fn reset(&mut self) {
        match self {
            Action::Instant { .. } | Action::Broadcast { .. } | Action::WaitUntil { .. } => {}
            Action::Wait { progress, .. } => *progress = None,
            Action::BroadcastWait { ticket, .. } => *ticket = None,
            Action::DeleteThisClone { requested, .. } => *requested = false,
            Action::Repeat {
                body, remaining, ..
            } => {
                *remaining = None;
                body.reset();
            }
            Action::RepeatUntil { body, in_body, .. } => {
                *in_body = false;
                body.reset();
            }
            Action::Forever { body } => body.reset(),
            Action::IfElse {
                then_branch,
                else_branch,
                chosen,
                ..
            } => {
                *chosen = None;
                then_branch.reset();
                else_branch.reset();
            }
        }
    }
}

/// The target sprite, provided it is set and still alive.
fn live_target<S: Stage>(
    action: &'static str,
    target: Option<SpriteId>,
    ctx: &S,
) -> Result<SpriteId, ActionError> {
    let sprite = target.ok_or(ActionError::NullTarget { action })?;
    if ctx.look(sprite).is_none() {
        return Err(ActionError::TargetGone { action, sprite });
    }
    Ok(sprite)
}
