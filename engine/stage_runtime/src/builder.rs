//! `RuntimeBuilder` for assembling a [`Runtime`] with its collaborators.

use stage_ir::{ProjectFile, StageSize};

use crate::config::RuntimeConfig;
use crate::external::{NoPhysics, NoSensors, PhysicsCollaborator, SensorProvider};
use crate::load::{load_project, LoadError, Loaded};
use crate::scheduler::Runtime;
use crate::world::World;

/// Builder for [`Runtime`] instances.
///
/// Every collaborator has an inert default: no device sensors, no physics,
/// configuration from [`RuntimeConfig::default`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    sensors: Option<Box<dyn SensorProvider>>,
    physics: Option<Box<dyn PhysicsCollaborator>>,
    stage: StageSize,
    scene_name: String,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        RuntimeBuilder {
            config: RuntimeConfig::default(),
            sensors: None,
            physics: None,
            stage: StageSize::default(),
            scene_name: String::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the provider answering `sensor(name)` formulas.
    #[must_use]
    pub fn sensors(mut self, sensors: impl SensorProvider + 'static) -> Self {
        self.sensors = Some(Box::new(sensors));
        self
    }

    /// Set the physics collaborator. It is reset with the stage size on build.
    #[must_use]
    pub fn physics(mut self, physics: impl PhysicsCollaborator + 'static) -> Self {
        self.physics = Some(Box::new(physics));
        self
    }

    #[must_use]
    pub fn stage(mut self, stage: StageSize) -> Self {
        self.stage = stage;
        self
    }

    #[must_use]
    pub fn scene_name(mut self, name: impl Into<String>) -> Self {
        self.scene_name = name.into();
        self
    }

    /// Build an empty runtime.
    pub fn build(self) -> Runtime {
        let sensors = self.sensors.unwrap_or_else(|| Box::new(NoSensors));
        let physics = self.physics.unwrap_or_else(|| Box::new(NoPhysics));
        Runtime::new(
            World::new(sensors),
            physics,
            self.config,
            self.stage,
            self.scene_name,
        )
    }

    /// Build a runtime populated from a persisted project.
    ///
    /// The project's stage size and scene name replace the builder's.
    pub fn load(self, project: ProjectFile) -> Result<Loaded, LoadError> {
        load_project(project, self)
    }
}
