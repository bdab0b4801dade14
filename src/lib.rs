//! Opposite Dash renames the official levels to their opposites when the game loads them.

use eyre::{eyre, Result};

pub mod game;
mod hook;
pub mod host;
mod logging;
pub mod settings;

use host::HostApi;
use settings::Options;

mod targets {
    use super::create_soft_target;
    use std::ffi::c_void;

    create_soft_target!(
        get_main_level,
        GetMainLevel,
        unsafe extern "C" fn(*mut c_void, i32, bool) -> *mut c_void
    );

    create_soft_target!(
        get_level,
        GetLevel,
        unsafe extern "C" fn(i32, bool) -> *mut c_void
    );

    create_soft_target!(
        menu_layer_init,
        MenuLayerInit,
        unsafe extern "C" fn(*mut c_void) -> bool
    );

    create_soft_target!(
        level_select_init,
        LevelSelectInit,
        unsafe extern "C" fn(*mut c_void, i32) -> bool
    );

    create_soft_target!(
        level_page_init,
        LevelPageInit,
        unsafe extern "C" fn(*mut c_void, *mut c_void) -> bool
    );
}

#[cfg(not(test))]
#[ctor::ctor]
fn load() {
    // Set up logging before anything else so messages from the load call are kept.
    logging::init();
}

fn start(api: *const HostApi) -> Result<()> {
    let api = unsafe { api.as_ref() }.ok_or_else(|| eyre!("host table is null"))?;
    let host = host::install(api.resolve()?);

    let dir = host.mod_directory();

    match dir.as_deref() {
        Some(dir) => {
            if let Err(err) = logging::start_writer(dir) {
                log::warn!("Not writing a log file: {err:?}");
            }
        }

        None => log::warn!("The framework gave no mod directory."),
    }

    let options = Options::load(dir.as_deref());
    logging::set_level(options.log_level.filter());

    log::info!("Options: {options:#?}");

    if !options.enabled {
        log::info!("Disabled in settings, so no levels will be renamed.");
        return Ok(());
    }

    game::init(host, options)
}

/// Called by the framework once when the mod is loaded.
///
/// # Safety
///
/// `api` must be null or point to a `HostApi` that stays valid for the life of the process.
#[no_mangle]
pub unsafe extern "C" fn opposite_dash_loaded(api: *const HostApi) -> bool {
    log::info!("Opposite Dash: Mod loaded");
    log::info!("Cargo package version is {}", env!("CARGO_PKG_VERSION"));

    match start(api) {
        Ok(()) => true,

        Err(err) => {
            log::error!("Failed to start: {err:?}");
            false
        }
    }
}
