//! Tests for timed and control actions.

use pretty_assertions::assert_eq;
use stage_ir::{Brick, Formula, Value, VarRef};

use super::MockStage;
use crate::{compile_bricks, BroadcastTicket, StepStatus};

fn change_x(by: f64) -> Brick {
    Brick::ChangeXBy {
        dx: Formula::number(by),
    }
}

#[test]
fn test_instant_actions_share_one_tick() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(&[change_x(1.0), change_x(2.0), Brick::Hide], Some(cat));

    assert_eq!(sequence.step(0.1, &mut stage), Ok(StepStatus::Complete));
    assert!(sequence.is_finished());
    assert_eq!(stage.look_of(cat).x, 3.0);
    assert!(!stage.look_of(cat).visible);
}

#[test]
fn test_wait_accumulates_delta() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(
        &[
            Brick::Wait {
                seconds: Formula::number(1.0),
            },
            change_x(1.0),
        ],
        Some(cat),
    );

    assert_eq!(sequence.step(0.4, &mut stage), Ok(StepStatus::Running));
    assert_eq!(sequence.step(0.4, &mut stage), Ok(StepStatus::Running));
    assert_eq!(stage.look_of(cat).x, 0.0);
    assert_eq!(sequence.step(0.4, &mut stage), Ok(StepStatus::Complete));
    assert_eq!(stage.look_of(cat).x, 1.0);
}

#[test]
fn test_repeat_yields_after_each_iteration() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(
        &[
            Brick::Repeat {
                times: Formula::number(3.0),
                body: vec![change_x(1.0)],
            },
            Brick::Hide,
        ],
        Some(cat),
    );

    for expected in 1..=3 {
        assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));
        assert_eq!(stage.look_of(cat).x, f64::from(expected));
    }
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Complete));
    assert_eq!(stage.look_of(cat).x, 3.0);
    assert!(!stage.look_of(cat).visible);
}

#[test]
fn test_repeat_count_is_read_when_reached() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let id = stage.store.add_project_variable("n");
    let mut sequence = compile_bricks(
        &[
            Brick::SetVariable {
                variable: VarRef::bound("n", id),
                value: Formula::number(2.0),
            },
            Brick::Repeat {
                times: Formula::variable("n"),
                body: vec![change_x(1.0)],
            },
        ],
        Some(cat),
    );

    while sequence.step(0.0, &mut stage) == Ok(StepStatus::Running) {}
    assert_eq!(stage.look_of(cat).x, 2.0);
}

#[test]
fn test_repeat_zero_times_completes_at_once() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(
        &[Brick::Repeat {
            times: Formula::number(-4.0),
            body: vec![change_x(1.0)],
        }],
        Some(cat),
    );
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Complete));
    assert_eq!(stage.look_of(cat).x, 0.0);
}

#[test]
fn test_repeat_until_checks_before_each_iteration() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(
        &[Brick::RepeatUntil {
            condition: stage_formula::parse_formula("x_position >= 2").unwrap(),
            body: vec![change_x(1.0)],
        }],
        Some(cat),
    );

    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Complete));
    assert_eq!(stage.look_of(cat).x, 2.0);
}

#[test]
fn test_forever_never_completes() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(
        &[Brick::Forever {
            body: vec![change_x(1.0)],
        }],
        Some(cat),
    );
    for _ in 0..10 {
        assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));
    }
    assert_eq!(stage.look_of(cat).x, 10.0);
}

#[test]
fn test_if_else_decides_when_reached() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let branch = Brick::IfElse {
        condition: stage_formula::parse_formula("x_position > 0").unwrap(),
        then_branch: vec![Brick::Hide],
        else_branch: Some(vec![change_x(5.0)]),
    };
    // The first branch moves the sprite, so the second evaluation differs.
    let mut sequence = compile_bricks(&[branch.clone(), branch], Some(cat));

    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Complete));
    assert_eq!(stage.look_of(cat).x, 5.0);
    assert!(!stage.look_of(cat).visible);
}

#[test]
fn test_if_without_else_on_false_completes() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(
        &[Brick::IfElse {
            condition: Formula::boolean(false),
            then_branch: vec![Brick::Hide],
            else_branch: None,
        }],
        Some(cat),
    );
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Complete));
    assert!(stage.look_of(cat).visible);
}

#[test]
fn test_wait_until_polls_each_tick() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let flag = stage.store.add_project_variable("ready");
    let mut sequence = compile_bricks(
        &[Brick::WaitUntil {
            condition: Formula::variable("ready"),
        }],
        Some(cat),
    );

    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));
    stage.store.set_variable(flag, Value::Bool(true)).unwrap();
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Complete));
}

#[test]
fn test_broadcast_and_wait_holds_until_finished() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(
        &[
            Brick::BroadcastWait {
                message: "go".to_owned(),
            },
            Brick::Hide,
        ],
        Some(cat),
    );

    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));
    assert_eq!(stage.broadcasts, vec!["go".to_owned()]);
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));

    stage.finished.push(BroadcastTicket::new(1));
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Complete));
    assert!(!stage.look_of(cat).visible);
    assert_eq!(stage.broadcasts.len(), 1);
}

#[test]
fn test_delete_this_clone() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let clone = stage.add_sprite("cat");
    stage.clones.push(clone);

    assert_eq!(
        stage.run_once(&Brick::DeleteThisClone, Some(cat)),
        StepStatus::Complete
    );
    assert!(stage.removals.is_empty());

    let mut sequence = compile_bricks(&[Brick::DeleteThisClone, Brick::Hide], Some(clone));
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));
    assert_eq!(sequence.step(0.0, &mut stage), Ok(StepStatus::Running));
    assert_eq!(stage.removals, vec![clone]);
    assert!(stage.look_of(clone).visible);
}

#[test]
fn test_reset_reruns_a_finished_sequence() {
    let mut stage = MockStage::default();
    let cat = stage.add_sprite("cat");
    let mut sequence = compile_bricks(
        &[Brick::Repeat {
            times: Formula::number(1.0),
            body: vec![change_x(1.0)],
        }],
        Some(cat),
    );
    while sequence.step(0.0, &mut stage) == Ok(StepStatus::Running) {}
    sequence.reset();
    while sequence.step(0.0, &mut stage) == Ok(StepStatus::Running) {}
    assert_eq!(stage.look_of(cat).x, 2.0);
}
