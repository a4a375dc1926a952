use stage_ir::SpriteId;

/// Structural failure of a stepping action.
///
/// Evaluation problems never show up here; formulas degrade to defaults. What
/// remains are program-integrity faults the scheduler must report.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("`{action}` has no target sprite")]
    NullTarget { action: &'static str },
    #[error("`{action}` targets sprite #{} which no longer exists", .sprite.raw())]
    TargetGone {
        action: &'static str,
        sprite: SpriteId,
    },
}

impl ActionError {
    /// Both variants are null-target failures; this names the action.
    pub fn action(&self) -> &'static str {
        match self {
            ActionError::NullTarget { action } | ActionError::TargetGone { action, .. } => action,
        }
    }
}
