//! Script instances and the per-tick scheduler.

use std::sync::Arc;

use stage_actions::{compile_script, ActionError, BroadcastTicket, Sequence, Stage, StepStatus};
use stage_collision::check_collision;
use stage_formula::SceneView;
use stage_ir::{Look, Script, SpriteDef, SpriteId, StageSize, Trigger};
use stage_store::Store;

use crate::config::RuntimeConfig;
use crate::external::PhysicsCollaborator;
use crate::world::World;

/// Lifecycle of one script on one sprite.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InstanceState {
    /// Never triggered.
    Idle,
    Running,
    /// Ran to the end, or stopped by a fault. Repeatable triggers restart it.
    Completed,
}

/// A script bound to the sprite (original or clone) executing it.
#[derive(Debug)]
pub struct ScriptInstance {
    sprite: SpriteId,
    script: usize,
    trigger: Trigger,
    sequence: Sequence,
    state: InstanceState,
    /// Broadcast that started the current run, if any.
    started_by: Option<BroadcastTicket>,
    /// Collision state seen last tick, for rising-edge detection.
    touching: bool,
}

impl ScriptInstance {
    fn new(sprite: SpriteId, script: usize, source: &Script) -> Self {
        ScriptInstance {
            sprite,
            script,
            trigger: source.trigger.clone(),
            sequence: compile_script(source, Some(sprite)),
            state: InstanceState::Idle,
            started_by: None,
            touching: false,
        }
    }

    pub fn sprite(&self) -> SpriteId {
        self.sprite
    }

    /// Index of the script within its sprite's script list.
    pub fn script(&self) -> usize {
        self.script
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// Whether a trigger may (re)start this instance right now.
    fn can_start(&self) -> bool {
        match self.state {
            InstanceState::Idle => true,
            InstanceState::Running | InstanceState::Completed => self.trigger.is_repeatable(),
        }
    }

    /// Rewind and mark running. Returns the ticket of an interrupted run.
    fn start(&mut self, ticket: Option<BroadcastTicket>) -> Option<BroadcastTicket> {
        let previous = if self.state == InstanceState::Running {
            self.started_by.take()
        } else {
            None
        };
        self.sequence.reset();
        self.state = InstanceState::Running;
        self.started_by = ticket;
        previous
    }

    /// Leave `Running`. Returns the ticket the run was started by.
    fn stop(&mut self) -> Option<BroadcastTicket> {
        self.state = InstanceState::Completed;
        self.started_by.take()
    }
}

/// A script stopped by a structural error.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptFault {
    pub sprite: SpriteId,
    pub script: usize,
    pub error: ActionError,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// 1-based tick number.
    pub tick: u64,
    /// Instances (re)started by triggers.
    pub started: usize,
    /// Instances stepped.
    pub stepped: usize,
    /// Instances that ran to completion.
    pub completed: usize,
    pub faults: Vec<ScriptFault>,
    pub clones_created: usize,
    pub sprites_removed: usize,
}

impl TickReport {
    pub fn has_faults(&self) -> bool {
        !self.faults.is_empty()
    }
}

/// A running scene: the world plus every script instance.
pub struct Runtime {
    pub(crate) world: World,
    instances: Vec<ScriptInstance>,
    physics: Box<dyn PhysicsCollaborator>,
    pub(crate) config: RuntimeConfig,
    pub(crate) stage: StageSize,
    pub(crate) scene_name: String,
    ticks: u64,
    pending_clone_starts: Vec<SpriteId>,
}

impl Runtime {
    pub(crate) fn new(
        world: World,
        mut physics: Box<dyn PhysicsCollaborator>,
        config: RuntimeConfig,
        stage: StageSize,
        scene_name: String,
    ) -> Self {
        physics.reset_world(stage.width, stage.height);
        Runtime {
            world,
            instances: Vec::new(),
            physics,
            config,
            stage,
            scene_name,
            ticks: 0,
            pending_clone_starts: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn store(&self) -> &Store {
        self.world.store()
    }

    pub fn store_mut(&mut self) -> &mut Store {
        self.world.store_mut()
    }

    pub fn look(&self, sprite: SpriteId) -> Option<&Look> {
        self.world.look(sprite)
    }

    pub fn look_mut(&mut self, sprite: SpriteId) -> Option<&mut Look> {
        self.world.look_mut(sprite)
    }

    pub fn sprite_named(&self, name: &str) -> Option<SpriteId> {
        self.world.sprite_named(name)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn stage_size(&self) -> StageSize {
        self.stage
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn instances(&self) -> &[ScriptInstance] {
        &self.instances
    }

    /// Instances of one sprite, in script order.
    pub fn instances_of(&self, sprite: SpriteId) -> impl Iterator<Item = &ScriptInstance> + '_ {
        self.instances.iter().filter(move |i| i.sprite == sprite)
    }

    /// Add an original sprite and instantiate its scripts.
    ///
    /// Brick references that are not bound to a cell resolve by name when
    /// they run.
    pub fn add_sprite(&mut self, def: SpriteDef) -> SpriteId {
        let sprite = self.world.add_sprite(&def.name, def.look, None);
        self.install_scripts(sprite, Arc::new(def.scripts));
        sprite
    }

    pub(crate) fn install_scripts(&mut self, sprite: SpriteId, scripts: Arc<Vec<Script>>) {
        self.instances.extend(
            scripts
                .iter()
                .enumerate()
                .map(|(index, script)| ScriptInstance::new(sprite, index, script)),
        );
        if let Some(slot) = self.world.slot_mut(sprite) {
            slot.scripts = scripts;
        }
    }

    /// Advance the scene by `delta` seconds.
    pub fn tick(&mut self, delta: f64) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };
        let _span = tracing::debug_span!("tick", tick = self.ticks, delta).entered();

        self.apply_physics(delta);
        self.deliver_triggers(&mut report);
        if self.config.collision_triggers {
            self.fire_collisions(&mut report);
        }
        self.step_instances(delta, &mut report);
        for sprite in self.world.take_removal_requests() {
            report.sprites_removed += self.remove_sprite(sprite);
        }
        self.create_clones(&mut report);

        tracing::debug!(
            started = report.started,
            stepped = report.stepped,
            completed = report.completed,
            faults = report.faults.len(),
            "tick done"
        );
        report
    }

    fn apply_physics(&mut self, delta: f64) {
        for body in self.physics.body_transforms(delta) {
            if let Some(look) = self.world.look_mut(body.sprite) {
                look.set_position(body.x, body.y);
                look.set_direction(body.direction);
            }
        }
    }

    fn deliver_triggers(&mut self, report: &mut TickReport) {
        if self.ticks == 1 {
            report.started += self.start_where(None, |trigger| *trigger == Trigger::Start);
        }

        for (message, ticket) in self.world.take_outbox() {
            let started = self.start_where(Some(ticket), |trigger| {
                matches!(trigger, Trigger::Broadcast(m) if *m == message)
            });
            tracing::debug!(message = %message, started, "broadcast delivered");
            self.world.ticket_delivered(ticket, started as u32);
            report.started += started;
        }

        for clone in std::mem::take(&mut self.pending_clone_starts) {
            for instance in &mut self.instances {
                if instance.sprite == clone
                    && instance.trigger == Trigger::CloneStart
                    && instance.can_start()
                {
                    instance.start(None);
                    report.started += 1;
                }
            }
        }
    }

    /// Start every startable instance whose trigger matches.
    fn start_where(
        &mut self,
        ticket: Option<BroadcastTicket>,
        matches: impl Fn(&Trigger) -> bool,
    ) -> usize {
        let mut started = 0;
        for instance in &mut self.instances {
            if !matches(&instance.trigger) || !instance.can_start() {
                continue;
            }
            if let Some(interrupted) = instance.start(ticket) {
                self.world.ticket_released(interrupted);
            }
            started += 1;
        }
        started
    }

    fn fire_collisions(&mut self, report: &mut TickReport) {
        for index in 0..self.instances.len() {
            let instance = &self.instances[index];
            let Trigger::Collision { target } = &instance.trigger else {
                continue;
            };
            let touching = self.is_touching(instance.sprite, target.as_deref());
            let instance = &mut self.instances[index];
            let rising = touching && !instance.touching;
            instance.touching = touching;
            if rising && instance.state != InstanceState::Running && instance.can_start() {
                tracing::debug!(sprite = instance.sprite.raw(), "collision script fired");
                instance.start(None);
                report.started += 1;
            }
        }
    }

    /// Whether `sprite` overlaps any sprite descending from `target`, or any
    /// other sprite at all when `target` is `None`.
    fn is_touching(&self, sprite: SpriteId, target: Option<&str>) -> bool {
        let Some(look) = self.world.look(sprite) else {
            return false;
        };
        let overlaps = |(other, other_look): (SpriteId, &Look)| {
            other != sprite && check_collision(look, other_look) > 0.0
        };
        match target {
            Some(name) => self
                .world
                .looks_named(name)
                .is_some_and(|looks| looks.into_iter().any(overlaps)),
            None => self
                .world
                .sprites()
                .filter_map(|other| Some((other, self.world.look(other)?)))
                .any(overlaps),
        }
    }

    fn step_instances(&mut self, delta: f64, report: &mut TickReport) {
        for instance in &mut self.instances {
            if instance.state != InstanceState::Running
                || self.world.is_pending_removal(instance.sprite)
            {
                continue;
            }
            report.stepped += 1;
            let released = match instance.sequence.step(delta, &mut self.world) {
                Ok(StepStatus::Running) => continue,
                Ok(StepStatus::Complete) => {
                    report.completed += 1;
                    instance.stop()
                }
                Err(error) => {
                    tracing::warn!(
                        sprite = instance.sprite.raw(),
                        script = instance.script,
                        %error,
                        "script stopped"
                    );
                    report.faults.push(ScriptFault {
                        sprite: instance.sprite,
                        script: instance.script,
                        error,
                    });
                    instance.stop()
                }
            };
            if let Some(ticket) = released {
                self.world.ticket_released(ticket);
            }
        }
    }

    fn create_clones(&mut self, report: &mut TickReport) {
        for source in self.world.take_clone_requests() {
            if self.world.clone_count() >= self.config.max_clones {
                tracing::warn!(
                    source = source.raw(),
                    max_clones = self.config.max_clones,
                    "clone limit reached"
                );
                continue;
            }
            let Some(slot) = self.world.slot(source) else {
                tracing::debug!(source = source.raw(), "clone source is gone");
                continue;
            };
            let (name, look, scripts, root) = (
                slot.name.clone(),
                slot.look.clone(),
                Arc::clone(&slot.scripts),
                slot.root,
            );
            let clone = self.world.add_sprite(&name, look, Some(root));
            self.world.store_mut().register_clone(clone, source);
            self.install_scripts(clone, scripts);
            self.pending_clone_starts.push(clone);
            report.clones_created += 1;
            tracing::debug!(clone = clone.raw(), source = source.raw(), "clone created");
        }
    }

    /// Remove a sprite now: cancel its scripts and purge its cells.
    ///
    /// Removing an original also removes all of its clones. Returns the number
    /// of sprites removed.
    pub fn remove_sprite(&mut self, sprite: SpriteId) -> usize {
        let Some(slot) = self.world.slot(sprite) else {
            return 0;
        };
        let mut doomed = vec![sprite];
        if slot.root == sprite {
            doomed.extend(self.world.clones_of(sprite));
        }

        for &id in &doomed {
            let mut released = Vec::new();
            self.instances.retain_mut(|instance| {
                if instance.sprite != id {
                    return true;
                }
                if instance.state == InstanceState::Running {
                    released.extend(instance.stop());
                }
                false
            });
            for ticket in released {
                self.world.ticket_released(ticket);
            }

            let is_clone = self.world.is_clone(id);
            self.world.take_slot(id);
            if is_clone {
                self.world.store_mut().remove_clone(id);
            } else {
                self.world.store_mut().remove_sprite(id);
            }
            tracing::debug!(sprite = id.raw(), is_clone, "sprite removed");
        }
        doomed.len()
    }
}
