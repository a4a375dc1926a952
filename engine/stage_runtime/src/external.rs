//! Collaborators the runtime talks to but does not implement.

use stage_ir::SpriteId;

/// Pose of one physics body after a simulation step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyTransform {
    pub sprite: SpriteId,
    pub x: f64,
    pub y: f64,
    pub direction: f64,
}

/// Rigid-body simulation driving sprite poses.
///
/// The runtime resets the world once with the stage size and then asks for
/// transforms at the start of every tick. Transforms for sprites that no
/// longer exist are ignored.
pub trait PhysicsCollaborator {
    fn reset_world(&mut self, width: u32, height: u32);

    fn body_transforms(&mut self, delta: f64) -> Vec<BodyTransform>;
}

/// Physics that never moves anything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoPhysics;

impl PhysicsCollaborator for NoPhysics {
    fn reset_world(&mut self, _width: u32, _height: u32) {}

    fn body_transforms(&mut self, _delta: f64) -> Vec<BodyTransform> {
        Vec::new()
    }
}

/// Source of device sensor values (`sensor(name)` in formulas).
pub trait SensorProvider {
    fn read(&self, name: &str) -> Option<f64>;
}

/// No device sensors; every read is unavailable.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoSensors;

impl SensorProvider for NoSensors {
    fn read(&self, _name: &str) -> Option<f64> {
        None
    }
}
