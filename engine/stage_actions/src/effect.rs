//! One-step effects of leaf bricks.
//!
//! Formulas are evaluated first (reading the scene), then the change is
//! written, so an effect always sees the state left by the previous action.

use stage_formula::{interpret_number, interpret_value};
use stage_ir::{Formula, ListId, ListRef, Look, SpriteId, Value, VarRef, VariableId};

use crate::Stage;

/// Effect of a leaf brick, applied in a single step.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    MoveNSteps(Formula),
    ChangeXBy(Formula),
    ChangeYBy(Formula),
    SetX(Formula),
    SetY(Formula),
    PlaceAt(Formula, Formula),
    TurnLeft(Formula),
    TurnRight(Formula),
    PointInDirection(Formula),
    SetSize(Formula),
    ChangeSizeBy(Formula),
    SetTransparency(Formula),
    ChangeTransparencyBy(Formula),
    SetBrightness(Formula),
    ChangeBrightnessBy(Formula),
    ClearGraphicEffect,
    Show,
    Hide,
    SetVariable { variable: VarRef, value: Formula },
    ChangeVariable { variable: VarRef, value: Formula },
    AddItem { list: ListRef, item: Formula },
    DeleteItem { list: ListRef, index: Formula },
    InsertItem { list: ListRef, index: Formula, item: Formula },
    ReplaceItem { list: ListRef, index: Formula, item: Formula },
    /// Clone the named original, or the executing sprite.
    CloneSprite(Option<String>),
}

impl Effect {
    /// Apply the effect on behalf of `sprite`, which must be alive.
    pub(crate) fn apply<S: Stage>(&self, sprite: SpriteId, ctx: &mut S) {
        match self {
            Effect::MoveNSteps(steps) => {
                let steps = number(ctx, sprite, steps);
                edit_look(ctx, sprite, |look| {
                    let (sin, cos) = look.direction().to_radians().sin_cos();
                    look.x += steps * sin;
                    look.y += steps * cos;
                });
            }
            Effect::ChangeXBy(dx) => {
                let dx = number(ctx, sprite, dx);
                edit_look(ctx, sprite, |look| look.x += dx);
            }
            Effect::ChangeYBy(dy) => {
                let dy = number(ctx, sprite, dy);
                edit_look(ctx, sprite, |look| look.y += dy);
            }
            Effect::SetX(x) => {
                let x = number(ctx, sprite, x);
                edit_look(ctx, sprite, |look| look.x = x);
            }
            Effect::SetY(y) => {
                let y = number(ctx, sprite, y);
                edit_look(ctx, sprite, |look| look.y = y);
            }
            Effect::PlaceAt(x, y) => {
                let (x, y) = (number(ctx, sprite, x), number(ctx, sprite, y));
                edit_look(ctx, sprite, |look| look.set_position(x, y));
            }
            Effect::TurnLeft(degrees) => {
                let degrees = number(ctx, sprite, degrees);
                edit_look(ctx, sprite, |look| look.set_direction(look.direction() - degrees));
            }
            Effect::TurnRight(degrees) => {
                let degrees = number(ctx, sprite, degrees);
                edit_look(ctx, sprite, |look| look.set_direction(look.direction() + degrees));
            }
            Effect::PointInDirection(degrees) => {
                let degrees = number(ctx, sprite, degrees);
                edit_look(ctx, sprite, |look| look.set_direction(degrees));
            }
            Effect::SetSize(size) => {
                let size = number(ctx, sprite, size);
                edit_look(ctx, sprite, |look| look.set_size(size));
            }
            Effect::ChangeSizeBy(size) => {
                let delta = number(ctx, sprite, size);
                edit_look(ctx, sprite, |look| look.set_size(look.size() + delta));
            }
            Effect::SetTransparency(value) => {
                let value = number(ctx, sprite, value);
                edit_look(ctx, sprite, |look| look.set_transparency(value));
            }
            Effect::ChangeTransparencyBy(value) => {
                let delta = number(ctx, sprite, value);
                edit_look(ctx, sprite, |look| {
                    look.set_transparency(look.transparency() + delta);
                });
            }
            Effect::SetBrightness(value) => {
                let value = number(ctx, sprite, value);
                edit_look(ctx, sprite, |look| look.set_brightness(value));
            }
            Effect::ChangeBrightnessBy(value) => {
                let delta = number(ctx, sprite, value);
                edit_look(ctx, sprite, |look| look.set_brightness(look.brightness() + delta));
            }
            Effect::ClearGraphicEffect => edit_look(ctx, sprite, Look::clear_graphic_effects),
            Effect::Show => edit_look(ctx, sprite, |look| look.visible = true),
            Effect::Hide => edit_look(ctx, sprite, |look| look.visible = false),
            Effect::SetVariable { variable, value } => {
                let value = interpret_value(value, sprite, ctx);
                write_variable(ctx, sprite, variable, |_| value);
            }
            Effect::ChangeVariable { variable, value } => {
                let delta = number(ctx, sprite, value);
                write_variable(ctx, sprite, variable, |current| {
                    Value::Number(current.as_number().unwrap_or(0.0) + delta)
                });
            }
            Effect::AddItem { list, item } => {
                let item = interpret_value(item, sprite, ctx);
                edit_list(ctx, sprite, list, |items| items.push(item));
            }
            Effect::DeleteItem { list, index } => {
                let position = number(ctx, sprite, index);
                edit_list(ctx, sprite, list, |items| {
                    if let Some(i) = list_index(position, items.len()) {
                        items.remove(i);
                    }
                });
            }
            Effect::InsertItem { list, index, item } => {
                let position = number(ctx, sprite, index);
                let item = interpret_value(item, sprite, ctx);
                edit_list(ctx, sprite, list, |items| {
                    // One past the end appends.
                    if let Some(i) = list_index(position, items.len() + 1) {
                        items.insert(i, item);
                    }
                });
            }
            Effect::ReplaceItem { list, index, item } => {
                let position = number(ctx, sprite, index);
                let item = interpret_value(item, sprite, ctx);
                edit_list(ctx, sprite, list, |items| {
                    if let Some(i) = list_index(position, items.len()) {
                        items[i] = item;
                    }
                });
            }
            Effect::CloneSprite(target) => {
                let source = match target {
                    Some(name) => ctx.sprite_named(name),
                    None => Some(sprite),
                };
                match source {
                    Some(source) => ctx.request_clone(source),
                    None => tracing::debug!(clone_of = ?target, "clone target does not exist"),
                }
            }
        }
    }
}

fn number<S: Stage>(ctx: &S, sprite: SpriteId, formula: &Formula) -> f64 {
    interpret_number(formula, sprite, ctx)
}

fn edit_look<S: Stage>(ctx: &mut S, sprite: SpriteId, edit: impl FnOnce(&mut Look)) {
    if let Some(look) = ctx.look_mut(sprite) {
        edit(look);
    }
}

/// Zero-based index of a 1-based position within `len` slots.
fn list_index(position: f64, len: usize) -> Option<usize> {
    let position = position.floor();
    if position < 1.0 || !position.is_finite() {
        return None;
    }
    let index = position as usize - 1;
    (index < len).then_some(index)
}

fn variable_cell<S: Stage>(ctx: &S, sprite: SpriteId, variable: &VarRef) -> Option<VariableId> {
    let store = ctx.store();
    match variable.cell {
        Some(id) => store.resolve_variable_for(sprite, id),
        None => store.lookup_variable(sprite, &variable.name),
    }
}

fn list_cell<S: Stage>(ctx: &S, sprite: SpriteId, list: &ListRef) -> Option<ListId> {
    let store = ctx.store();
    match list.cell {
        Some(id) => store.resolve_list_for(sprite, id),
        None => store.lookup_list(sprite, &list.name),
    }
}

fn write_variable<S: Stage>(
    ctx: &mut S,
    sprite: SpriteId,
    variable: &VarRef,
    update: impl FnOnce(&Value) -> Value,
) {
    let Some(id) = variable_cell(ctx, sprite, variable) else {
        tracing::debug!(name = variable.name.as_str(), "variable no longer exists");
        return;
    };
    let store = ctx.store_mut();
    let Some(current) = store.variable(id) else {
        return;
    };
    let value = update(current);
    if let Err(error) = store.set_variable(id, value) {
        tracing::debug!(%error, "variable write skipped");
    }
}

fn edit_list<S: Stage>(
    ctx: &mut S,
    sprite: SpriteId,
    list: &ListRef,
    edit: impl FnOnce(&mut Vec<Value>),
) {
    let Some(id) = list_cell(ctx, sprite, list) else {
        tracing::debug!(name = list.name.as_str(), "list no longer exists");
        return;
    };
    match ctx.store_mut().list_mut(id) {
        Some(items) => edit(items),
        None => tracing::debug!(name = list.name.as_str(), "list no longer exists"),
    }
}
