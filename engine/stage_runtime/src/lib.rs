//! Stage Runtime - drives compiled scripts frame by frame.
//!
//! The owner builds a [`Runtime`] (directly or by loading a persisted
//! [`ProjectFile`](stage_ir::ProjectFile)) and calls [`Runtime::tick`] once per
//! frame. Each tick:
//!
//! 1. applies body transforms from the physics collaborator
//! 2. starts scripts for pending triggers (program start, broadcasts raised
//!    during the previous tick, freshly created clones)
//! 3. starts collision scripts whose sprite just began touching its target
//! 4. steps every running script once, in sprite then script order
//! 5. removes sprites that asked to be deleted and creates requested clones
//!
//! The [`ViewSwitchGate`] is unrelated to ticking: it throttles externally
//! triggered view transitions on wall-clock time.

mod builder;
mod config;
mod external;
mod gate;
mod load;
mod scheduler;
mod world;

pub use builder::RuntimeBuilder;
pub use config::{RuntimeConfig, MAX_CLONES_ENV};
pub use external::{BodyTransform, NoPhysics, NoSensors, PhysicsCollaborator, SensorProvider};
pub use gate::{GateError, ViewSwitchGate, UNLOCK_TIMEOUT};
pub use load::{load_project, LoadError, Loaded};
pub use scheduler::{InstanceState, Runtime, ScriptFault, ScriptInstance, TickReport};
pub use world::World;
