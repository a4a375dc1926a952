//! One-time migration of legacy collision formulas.
//!
//! Before language version 0.993 a collision sensor stored a single token in
//! which sprite names were run together without a delimiter. Migration picks
//! the declared sprite name the token denotes:
//!
//! 1. a name equal to the whole token wins;
//! 2. otherwise, among names occurring contiguously inside the token, the
//!    longest wins; the sprite owning the formula is not a candidate here,
//!    since old projects prefixed the token with the owner's name;
//! 3. several distinct names of that longest length are ambiguous.
//!
//! Ambiguous and unresolved tokens are left as they are and reported; the
//! migrator never guesses.

use stage_ir::{Formula, FormulaNode, ProjectFile, CURRENT_LANGUAGE_VERSION};

use crate::MigrationIssue;

/// Result of migrating a whole project.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MigrationReport {
    /// Tokens rewritten to `collision(<sprite>)`.
    pub migrated: usize,
    /// Tokens left in place, with the name of the sprite owning the formula.
    pub issues: Vec<(String, MigrationIssue)>,
}

impl MigrationReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Sprite name a legacy collision token denotes.
///
/// `owner` is the sprite whose formula holds the token. It only matches when
/// it equals the whole token.
pub fn resolve_collision_token<S: AsRef<str>>(
    token: &str,
    owner: Option<&str>,
    sprite_names: &[S],
) -> Result<String, MigrationIssue> {
    if sprite_names.iter().any(|name| name.as_ref() == token) {
        return Ok(token.to_owned());
    }

    let mut candidates: Vec<&str> = Vec::new();
    for name in sprite_names.iter().map(AsRef::as_ref) {
        if name.is_empty() || Some(name) == owner {
            continue;
        }
        if token.contains(name) && !candidates.contains(&name) {
            candidates.push(name);
        }
    }
    let Some(longest) = candidates.iter().map(|name| name.len()).max() else {
        return Err(MigrationIssue::Unresolved {
            token: token.to_owned(),
        });
    };
    let mut best: Vec<&str> = candidates
        .into_iter()
        .filter(|name| name.len() == longest)
        .collect();
    if let [only] = best.as_slice() {
        return Ok((*only).to_owned());
    }
    best.sort_unstable();
    Err(MigrationIssue::Ambiguous {
        token: token.to_owned(),
        candidates: best.into_iter().map(str::to_owned).collect(),
    })
}

/// Rewrite every resolvable legacy token of one formula in place.
///
/// Returns the number of rewritten tokens and the issues for the rest.
pub fn migrate_formula<S: AsRef<str>>(
    formula: &mut Formula,
    owner: Option<&str>,
    sprite_names: &[S],
) -> (usize, Vec<MigrationIssue>) {
    let mut migrated = 0;
    let mut issues = Vec::new();
    formula.root_mut().walk_mut(&mut |node| {
        let FormulaNode::LegacyCollision(token) = node else {
            return;
        };
        match resolve_collision_token(token, owner, sprite_names) {
            Ok(target) => {
                *node = FormulaNode::Collision { target };
                migrated += 1;
            }
            Err(issue) => issues.push(issue),
        }
    });
    (migrated, issues)
}

/// Migrate a project written before the explicit collision syntax.
///
/// Does nothing for up-to-date projects. The language version is raised to
/// the current one even when issues remain; unresolved tokens stay in the
/// tree and evaluate as failures.
pub fn migrate_project(project: &mut ProjectFile) -> MigrationReport {
    let mut report = MigrationReport::default();
    if !project.needs_collision_migration() {
        return report;
    }

    let names: Vec<String> = project
        .scene
        .sprites
        .iter()
        .map(|sprite| sprite.name.clone())
        .collect();
    for sprite in &mut project.scene.sprites {
        let owner = sprite.name.clone();
        for script in &mut sprite.scripts {
            script.for_each_formula_mut(&mut |formula| {
                let (migrated, issues) = migrate_formula(formula, Some(owner.as_str()), &names);
                report.migrated += migrated;
                report
                    .issues
                    .extend(issues.into_iter().map(|issue| (owner.clone(), issue)));
            });
        }
    }

    for (sprite, issue) in &report.issues {
        tracing::warn!(sprite = sprite.as_str(), %issue, "legacy collision token left unmigrated");
    }
    tracing::debug!(
        from = project.language_version,
        to = CURRENT_LANGUAGE_VERSION,
        migrated = report.migrated,
        "migrated collision formulas"
    );
    project.language_version = CURRENT_LANGUAGE_VERSION;
    report
}
