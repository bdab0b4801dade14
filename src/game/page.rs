//! The level page, which shows a level's name in a label that is built when the page is.
//!
//! Renaming the level before the page is built covers most cases, but the label is also set again
//! once the page has finished building in case the game got the name from somewhere else.

use super::{Label, Level, MainThreadQueue, Mod, Node};
use crate::settings::LabelFixupMode;

/// IDs the name label has been given, in the order they are tried.
const LABEL_IDS: [&str; 3] = ["level-name-label", "level-name", "title-label"];

/// Finds the label that shows the level's name.
///
/// If none of the known IDs are present, this falls back to the label's position in the level
/// button: the second child of the first child of the button's first child. That path depends on
/// the page layout and will find nothing if the layout changes.
pub fn find_name_label<N: Node>(page: &N) -> Option<N::Label> {
    LABEL_IDS
        .iter()
        .find_map(|id| page.child_by_id_recursive(id)?.as_label())
        .or_else(|| find_label_by_position(page))
}

fn find_label_by_position<N: Node>(page: &N) -> Option<N::Label> {
    page.child_by_id("level-menu")?
        .child_by_id("level-button")?
        .child_at(0)?
        .child_at(0)?
        .child_at(1)?
        .as_label()
}

/// Sets the name label on a level page once the page has been built.
pub struct LabelFixup<N> {
    page: N,
    name: String,
}

impl<N: Node> LabelFixup<N> {
    pub fn new(page: N, name: impl Into<String>) -> LabelFixup<N> {
        LabelFixup {
            page,
            name: name.into(),
        }
    }

    /// Does nothing if the label can't be found.
    pub fn run(self) {
        if let Some(label) = find_name_label(&self.page) {
            label.set_text(&self.name);
        }
    }
}

/// Wraps `LevelPage::init`. The level is renamed before the page is built from it, and if it has
/// an opposite a `LabelFixup` is queued to run after the page is finished.
pub fn level_page_init<L, N, Q>(
    state: &Mod,
    queue: &Q,
    page: N,
    level: Option<L>,
    proceed: impl FnOnce(Option<L>) -> bool,
) -> bool
where
    L: Level,
    N: Node + 'static,
    Q: MainThreadQueue,
{
    let level = state.names.rename(level);

    // Looked up after renaming, so levels that were only matched by name don't get a fixup.
    let opposite = level
        .as_ref()
        .and_then(|level| state.names.opposite_of(level));

    if !proceed(level) {
        return false;
    }

    if state.options.label_fixup == LabelFixupMode::Disabled {
        return true;
    }

    if let Some(opposite) = opposite {
        let fixup = LabelFixup::new(page, opposite);
        queue.queue(Box::new(move || fixup.run()));
    }

    true
}
