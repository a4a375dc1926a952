//! Read-only execution context for formula evaluation.

use stage_ir::{Look, SpriteId};
use stage_store::Store;

/// Everything a formula may read while it is evaluated on behalf of a sprite.
///
/// Implemented by the runtime's world and, in tests, by small fixtures. There
/// is no global "current project": every evaluation receives its view.
pub trait SceneView {
    /// Current look of a live sprite (original or clone).
    fn look(&self, sprite: SpriteId) -> Option<&Look>;

    fn store(&self) -> &Store;

    /// Looks of every live sprite whose original is named `name`, clones
    /// included. `None` if no original of that name exists.
    fn looks_named(&self, name: &str) -> Option<Vec<(SpriteId, &Look)>>;

    /// Value of an external (device) sensor, `None` if nobody supplies it.
    fn external_sensor(&self, name: &str) -> Option<f64>;
}
