//! The replacements the framework calls in place of the game's functions. These turn the raw
//! pointers into handles and hand off to the decorators.

use std::{ffi::c_void, ptr::null_mut};

use crate::{
    call_original,
    host::{Host, HostLevel, HostNode, MainThread},
    hook::Target,
    targets,
};

use super::{layers, levels, page, Mod};

fn context() -> Option<(&'static Host, &'static Mod)> {
    Some((crate::host::get()?, super::state()?))
}

unsafe extern "C" fn get_main_level(
    this: *mut c_void,
    level_id: i32,
    dont_get_level_string: bool,
) -> *mut c_void {
    let original = || {
        call_original!(targets::get_main_level, this, level_id, dont_get_level_string)
            .unwrap_or(null_mut())
    };

    let Some((host, state)) = context() else {
        return original();
    };

    levels::get_main_level(&state.names, || HostLevel::from_raw(host, original()))
        .map_or(null_mut(), |level| level.as_ptr())
}

unsafe extern "C" fn get_level(level_id: i32, dont_get_level_string: bool) -> *mut c_void {
    let original = || {
        call_original!(targets::get_level, level_id, dont_get_level_string).unwrap_or(null_mut())
    };

    let Some((host, state)) = context() else {
        return original();
    };

    levels::get_level(&state.names, || HostLevel::from_raw(host, original()))
        .map_or(null_mut(), |level| level.as_ptr())
}

unsafe extern "C" fn menu_layer_init(this: *mut c_void) -> bool {
    layers::menu_layer_init(|| call_original!(targets::menu_layer_init, this).unwrap_or(false))
}

unsafe extern "C" fn level_select_init(this: *mut c_void, page: i32) -> bool {
    layers::level_select_init(page, |page| {
        call_original!(targets::level_select_init, this, page).unwrap_or(false)
    })
}

unsafe extern "C" fn level_page_init(this: *mut c_void, level: *mut c_void) -> bool {
    let original = |level: *mut c_void| {
        call_original!(targets::level_page_init, this, level).unwrap_or(false)
    };

    let Some((host, state)) = context() else {
        return original(level);
    };

    let Some(level_page) = HostNode::from_raw(host, this) else {
        return original(level);
    };

    page::level_page_init(
        state,
        &MainThread::new(host),
        level_page,
        HostLevel::from_raw(host, level),
        |level| original(level.map_or(null_mut(), |level| level.as_ptr())),
    )
}

/// Logs a hook that couldn't be installed. The others are still worth installing, since each one
/// renames levels in a different place.
fn report(target: Target, result: eyre::Result<()>) -> bool {
    match result {
        Ok(()) => {
            log::debug!("hooked {target}");
            true
        }

        Err(err) => {
            log::error!("{err:?}");
            false
        }
    }
}

pub fn install(host: &Host) {
    log::info!("installing level hooks...");

    let installed = [
        report(
            Target::GetMainLevel,
            targets::get_main_level::install(host, get_main_level),
        ),
        report(Target::GetLevel, targets::get_level::install(host, get_level)),
        report(
            Target::MenuLayerInit,
            targets::menu_layer_init::install(host, menu_layer_init),
        ),
        report(
            Target::LevelSelectInit,
            targets::level_select_init::install(host, level_select_init),
        ),
        report(
            Target::LevelPageInit,
            targets::level_page_init::install(host, level_page_init),
        ),
    ];

    let count = installed.iter().filter(|&&ok| ok).count();
    log::info!("{count} of {} level hooks installed", installed.len());
}
