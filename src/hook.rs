//! Provides types and macros for hooking game functions through the mod framework.

use std::{ffi::c_void, sync::Mutex};

use eyre::{Result, WrapErr};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::host::Host;

/// Priority that puts a hook ahead of other mods' hooks on the same function.
pub const EARLY_PRIORITY: i32 = -1000;

/// The game functions we hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
pub enum Target {
    #[strum(serialize = "GameLevelManager::getMainLevel")]
    GetMainLevel,

    #[strum(serialize = "LevelTools::getLevel")]
    GetLevel,

    #[strum(serialize = "MenuLayer::init")]
    MenuLayerInit,

    #[strum(serialize = "LevelSelectLayer::init")]
    LevelSelectInit,

    #[strum(serialize = "LevelPage::init")]
    LevelPageInit,
}

impl Target {
    /// The name the framework knows the function by.
    pub fn symbol(self) -> &'static str {
        self.into()
    }

    pub fn priority(self) -> i32 {
        match self {
            // The level has to be renamed before anything else builds the page from it.
            Target::LevelPageInit => EARLY_PRIORITY,
            _ => 0,
        }
    }
}

/// A hook on one game function, which holds the original implementation once installed.
pub struct Hook<FnType> {
    target: Target,
    original_fn: Mutex<Option<FnType>>,
}

impl<FnType: Copy> Hook<FnType> {
    /// Creates a new hook for the given target. This does not install the hook.
    pub const fn new(target: Target) -> Hook<FnType> {
        Hook {
            target,
            original_fn: Mutex::new(None),
        }
    }

    /// Replaces the target function's implementation with that of the function given. The
    /// original function pointer can be obtained by calling `original()`.
    pub fn install(&self, host: &Host, replacement: FnType) -> Result<()> {
        debug_assert_eq!(
            std::mem::size_of::<FnType>(),
            std::mem::size_of::<*const c_void>(),
            "hooks must be function pointers"
        );

        let replacement: *const c_void = unsafe { std::mem::transmute_copy(&replacement) };

        let original = host
            .hook(self.target.symbol(), self.target.priority(), replacement)
            .wrap_err_with(|| format!("failed to hook {}", self.target))?;

        *self.lock() = Some(unsafe { std::mem::transmute_copy(&original) });

        Ok(())
    }

    /// Returns the original implementation of the hooked function, if the hook is installed.
    pub fn original(&self) -> Option<FnType> {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<FnType>> {
        self.original_fn
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[macro_export]
macro_rules! create_soft_target {
    ($name:ident, $target:ident, $sig:ty) => {
        #[allow(dead_code)]
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            pub static HOOK: $crate::hook::Hook<$sig> =
                $crate::hook::Hook::new($crate::hook::Target::$target);

            pub fn install(host: &$crate::host::Host, replacement: $sig) -> eyre::Result<()> {
                HOOK.install(host, replacement)
            }
        }
    };
}

/// Calls the original implementation behind a target, yielding `None` if it isn't hooked.
#[macro_export]
macro_rules! call_original {
    ($hook_module:path) => {{
        use $hook_module as base;
        #[allow(unused_unsafe)]
        let result = base::HOOK.original().map(|original| unsafe { original() });
        result
    }};
    ($hook_module:path, $($args:expr),+) => {{
        // Workaround for $hook_module::x not working - see #48067.
        use $hook_module as base;
        #[allow(unused_unsafe)]
        let result = base::HOOK.original().map(|original| unsafe { original($($args),+) });
        result
    }}
}
