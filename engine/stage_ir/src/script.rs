//! Scripts and sprite definitions.

use serde::{Deserialize, Serialize};

use crate::brick::{Brick, Resources};
use crate::formula::Formula;
use crate::look::Look;

/// Event that starts a script.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Program start. Runs once.
    Start,
    /// A broadcast message was received. Restartable.
    Broadcast(String),
    /// The sprite started touching `target` (any sprite when `None`). Restartable.
    Collision { target: Option<String> },
    /// The sprite was just created as a clone. Runs once per clone.
    CloneStart,
}

impl Trigger {
    /// Whether a completed script may run again on a later matching event.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Trigger::Broadcast(_) | Trigger::Collision { .. })
    }
}

/// An event-triggered ordered list of bricks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub trigger: Trigger,
    #[serde(default)]
    pub bricks: Vec<Brick>,
}

impl Script {
    pub fn new(trigger: Trigger, bricks: Vec<Brick>) -> Self {
        Script { trigger, bricks }
    }

    pub fn required_resources(&self) -> Resources {
        let mut resources = self
            .bricks
            .iter()
            .fold(Resources::empty(), |acc, brick| acc | brick.required_resources());
        if matches!(self.trigger, Trigger::Collision { .. }) {
            resources |= Resources::COLLISION;
        }
        resources
    }

    pub fn for_each_formula_mut(&mut self, visit: &mut dyn FnMut(&mut Formula)) {
        for brick in &mut self.bricks {
            brick.for_each_formula_mut(visit);
        }
    }
}

/// A sprite as written in a program: its name, initial look, and scripts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteDef {
    pub name: String,
    #[serde(default)]
    pub look: Look,
    #[serde(default)]
    pub scripts: Vec<Script>,
}

impl SpriteDef {
    pub fn new(name: impl Into<String>) -> Self {
        SpriteDef {
            name: name.into(),
            look: Look::default(),
            scripts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_look(mut self, look: Look) -> Self {
        self.look = look;
        self
    }

    #[must_use]
    pub fn with_script(mut self, script: Script) -> Self {
        self.scripts.push(script);
        self
    }
}
