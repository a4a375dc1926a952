//! Brick → action compilation.
//!
//! Compilation is structural: formulas are copied into the actions and only
//! evaluated when the action is stepped. Control bricks compile their bodies
//! once into nested sequences.

use stage_formula::ensure_sufficient_stack;
use stage_ir::{Brick, Script, SpriteId};

use crate::{Action, Effect, Sequence};

/// Append the actions for `brick` to `sequence`.
///
/// `target` is the sprite the actions run on behalf of. An absent target is
/// accepted here; the resulting actions fail with a null-target error when
/// stepped.
pub fn compile(brick: &Brick, target: Option<SpriteId>, sequence: &mut Sequence) {
    ensure_sufficient_stack(|| sequence.push(compile_one(brick, target)));
}

/// Compile a list of bricks into a fresh sequence.
pub fn compile_bricks(bricks: &[Brick], target: Option<SpriteId>) -> Sequence {
    let mut sequence = Sequence::new();
    for brick in bricks {
        compile(brick, target, &mut sequence);
    }
    sequence
}

/// Compile the body of a script for one sprite.
pub fn compile_script(script: &Script, target: Option<SpriteId>) -> Sequence {
    compile_bricks(&script.bricks, target)
}

fn compile_one(brick: &Brick, target: Option<SpriteId>) -> Action {
    let instant = |effect: Effect| Action::Instant {
        name: brick.kind_name(),
        target,
        effect,
    };
    match brick {
        Brick::MoveNSteps { steps } => instant(Effect::MoveNSteps(steps.clone())),
        Brick::ChangeXBy { dx } => instant(Effect::ChangeXBy(dx.clone())),
        Brick::ChangeYBy { dy } => instant(Effect::ChangeYBy(dy.clone())),
        Brick::SetX { x } => instant(Effect::SetX(x.clone())),
        Brick::SetY { y } => instant(Effect::SetY(y.clone())),
        Brick::PlaceAt { x, y } => instant(Effect::PlaceAt(x.clone(), y.clone())),
        Brick::TurnLeft { degrees } => instant(Effect::TurnLeft(degrees.clone())),
        Brick::TurnRight { degrees } => instant(Effect::TurnRight(degrees.clone())),
        Brick::PointInDirection { degrees } => instant(Effect::PointInDirection(degrees.clone())),
        Brick::SetSize { size } => instant(Effect::SetSize(size.clone())),
        Brick::ChangeSizeBy { size } => instant(Effect::ChangeSizeBy(size.clone())),
        Brick::SetTransparency { value } => instant(Effect::SetTransparency(value.clone())),
        Brick::ChangeTransparencyBy { value } => {
            instant(Effect::ChangeTransparencyBy(value.clone()))
        }
        Brick::SetBrightness { value } => instant(Effect::SetBrightness(value.clone())),
        Brick::ChangeBrightnessBy { value } => instant(Effect::ChangeBrightnessBy(value.clone())),
        Brick::ClearGraphicEffect => instant(Effect::ClearGraphicEffect),
        Brick::Show => instant(Effect::Show),
        Brick::Hide => instant(Effect::Hide),
        Brick::SetVariable { variable, value } => instant(Effect::SetVariable {
            variable: variable.clone(),
            value: value.clone(),
        }),
        Brick::ChangeVariable { variable, value } => instant(Effect::ChangeVariable {
            variable: variable.clone(),
            value: value.clone(),
        }),
        Brick::AddItemToList { list, item } => instant(Effect::AddItem {
            list: list.clone(),
            item: item.clone(),
        }),
        Brick::DeleteItemOfList { list, index } => instant(Effect::DeleteItem {
            list: list.clone(),
            index: index.clone(),
        }),
        Brick::InsertItemIntoList { list, index, item } => instant(Effect::InsertItem {
            list: list.clone(),
            index: index.clone(),
            item: item.clone(),
        }),
        Brick::ReplaceItemInList { list, index, item } => instant(Effect::ReplaceItem {
            list: list.clone(),
            index: index.clone(),
            item: item.clone(),
        }),
        Brick::CloneSprite { target: original } => instant(Effect::CloneSprite(original.clone())),
        Brick::Broadcast { message } => Action::Broadcast {
            message: message.clone(),
        },
        Brick::BroadcastWait { message } => Action::BroadcastWait {
            message: message.clone(),
            ticket: None,
        },
        Brick::DeleteThisClone => Action::DeleteThisClone {
            target,
            requested: false,
        },
        Brick::Wait { seconds } => Action::Wait {
            target,
            seconds: seconds.clone(),
            progress: None,
        },
        Brick::WaitUntil { condition } => Action::WaitUntil {
            target,
            condition: condition.clone(),
        },
        Brick::Repeat { times, body } => Action::Repeat {
            target,
            times: times.clone(),
            body: compile_bricks(body, target),
            remaining: None,
        },
        Brick::RepeatUntil { condition, body } => Action::RepeatUntil {
            target,
            condition: condition.clone(),
            body: compile_bricks(body, target),
            in_body: false,
        },
        Brick::Forever { body } => Action::Forever {
            body: compile_bricks(body, target),
        },
        Brick::IfElse {
            condition,
            then_branch,
            else_branch,
        } => Action::IfElse {
            target,
            condition: condition.clone(),
            then_branch: compile_bricks(then_branch, target),
            else_branch: else_branch
                .as_deref()
                .map(|bricks| compile_bricks(bricks, target))
                .unwrap_or_default(),
            chosen: None,
        },
    }
}
