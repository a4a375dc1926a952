//! Tests for brick compilation.

use pretty_assertions::assert_eq;
use stage_ir::{Brick, Formula, Script, SpriteId, Trigger};

use crate::{compile, compile_script, Action, Effect, Sequence};

#[test]
fn test_leaf_bricks_become_instant_actions() {
    let mut sequence = Sequence::new();
    let cat = SpriteId::new(0);
    compile(
        &Brick::SetX {
            x: Formula::number(4.0),
        },
        Some(cat),
        &mut sequence,
    );
    assert_eq!(
        sequence.actions(),
        &[Action::Instant {
            name: "set x",
            target: Some(cat),
            effect: Effect::SetX(Formula::number(4.0)),
        }]
    );
}

#[test]
fn test_control_bricks_compile_bodies_once() {
    let script = Script::new(
        Trigger::Start,
        vec![
            Brick::Forever {
                body: vec![
                    Brick::Show,
                    Brick::IfElse {
                        condition: Formula::boolean(true),
                        then_branch: vec![Brick::Hide, Brick::Show],
                        else_branch: None,
                    },
                ],
            },
            Brick::Hide,
        ],
    );
    let sequence = compile_script(&script, Some(SpriteId::new(3)));
    assert_eq!(sequence.len(), 2);

    let Action::Forever { body } = &sequence.actions()[0] else {
        panic!("expected forever, got {:?}", sequence.actions()[0]);
    };
    assert_eq!(body.len(), 2);
    let Action::IfElse {
        then_branch,
        else_branch,
        ..
    } = &body.actions()[1]
    else {
        panic!("expected if, got {:?}", body.actions()[1]);
    };
    assert_eq!(then_branch.len(), 2);
    assert!(else_branch.is_empty());
}

#[test]
fn test_action_names_match_bricks() {
    let bricks = [
        Brick::ClearGraphicEffect,
        Brick::Broadcast {
            message: "m".to_owned(),
        },
        Brick::Wait {
            seconds: Formula::number(1.0),
        },
        Brick::DeleteThisClone,
    ];
    for brick in &bricks {
        let mut sequence = Sequence::new();
        compile(brick, None, &mut sequence);
        assert_eq!(sequence.actions()[0].name(), brick.kind_name());
    }
}
