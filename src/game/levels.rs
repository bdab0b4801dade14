//! Decorators for the two functions the game fetches level objects through.

use super::{names::OppositeNames, Level};

/// Wraps `GameLevelManager::getMainLevel`, which builds the levels on the main level pages.
pub fn get_main_level<L: Level>(
    names: &OppositeNames,
    proceed: impl FnOnce() -> Option<L>,
) -> Option<L> {
    names.rename(proceed())
}

/// Wraps `LevelTools::getLevel`, which the rest of the game uses to look levels up by ID.
pub fn get_level<L: Level>(
    names: &OppositeNames,
    proceed: impl FnOnce() -> Option<L>,
) -> Option<L> {
    names.rename(proceed())
}
