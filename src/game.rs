//! The level renaming itself. Game objects are only touched through the traits here, so the
//! decorators don't care whether they are running against the real game or the test doubles.

use eyre::{eyre, Result};
use once_cell::sync::OnceCell;

use crate::{host::Host, settings::Options};

mod hooks;
pub mod layers;
pub mod levels;
pub mod names;
pub mod page;


use names::OppositeNames;

/// A playable level owned by the game.
pub trait Level {
    fn id(&self) -> i32;

    /// The level's current display name.
    fn name(&self) -> String;

    fn set_name(&mut self, name: &str);
}

impl<L: Level + ?Sized> Level for &mut L {
    fn id(&self) -> i32 {
        (**self).id()
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn set_name(&mut self, name: &str) {
        (**self).set_name(name)
    }
}

/// A text label in the game's UI.
pub trait Label {
    fn set_text(&self, text: &str);
}

/// A node in the game's UI tree.
pub trait Node: Sized {
    type Label: Label;

    /// Finds a direct child by its string ID.
    fn child_by_id(&self, id: &str) -> Option<Self>;

    /// Finds a descendant at any depth by its string ID.
    fn child_by_id_recursive(&self, id: &str) -> Option<Self>;

    /// Returns the child at `index`, or `None` if there are not that many children.
    fn child_at(&self, index: usize) -> Option<Self>;

    /// Returns this node as a label if that's what it is.
    fn as_label(&self) -> Option<Self::Label>;
}

/// The game's queue of work to run on a later iteration of the main loop.
pub trait MainThreadQueue {
    fn queue(&self, task: Box<dyn FnOnce()>);
}

/// Everything the hooks need to decide how to rename a level. Built once when the mod loads.
#[derive(Debug, Clone, Default)]
pub struct Mod {
    pub names: OppositeNames,
    pub options: Options,
}

impl Mod {
    pub fn new(names: OppositeNames, options: Options) -> Mod {
        Mod { names, options }
    }
}

static STATE: OnceCell<Mod> = OnceCell::new();

/// Returns the loaded mod state, if `init` has run.
fn state() -> Option<&'static Mod> {
    STATE.get()
}

pub fn init(host: &'static Host, options: Options) -> Result<()> {
    let state = Mod::new(OppositeNames::official(), options);

    log::info!("{} levels have opposites", state.names.len());

    STATE
        .set(state)
        .map_err(|_| eyre!("level hooks have already been installed"))?;

    hooks::install(host);

    Ok(())
}
