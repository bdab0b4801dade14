//! The function table the mod framework hands us when we're loaded, and handles over the game
//! objects it lets us reach.

use std::{
    ffi::{c_void, CStr, CString},
    path::PathBuf,
    ptr::NonNull,
};

use eyre::{eyre, Result};
use libc::c_char;
use once_cell::sync::OnceCell;

use crate::game::{Label, Level, MainThreadQueue, Node};

/// The version of `HostApi` this library was built against.
pub const HOST_ABI_VERSION: u32 = 1;

type RawObject = *mut c_void;

pub type HookFunctionFn = unsafe extern "C" fn(
    symbol: *const c_char,
    priority: i32,
    replacement: *const c_void,
    original_out: *mut *const c_void,
) -> bool;

pub type TaskFn = unsafe extern "C" fn(data: *mut c_void);
pub type QueueInMainThreadFn = unsafe extern "C" fn(task: TaskFn, data: *mut c_void);
pub type ModDirectoryFn = unsafe extern "C" fn() -> *const c_char;
pub type LevelIdFn = unsafe extern "C" fn(level: RawObject) -> i32;
pub type LevelNameFn =
    unsafe extern "C" fn(level: RawObject, len_out: *mut usize) -> *const c_char;
pub type SetLevelNameFn =
    unsafe extern "C" fn(level: RawObject, name: *const c_char, len: usize);
pub type ChildByIdFn = unsafe extern "C" fn(node: RawObject, id: *const c_char) -> RawObject;
pub type ChildCountFn = unsafe extern "C" fn(node: RawObject) -> usize;
pub type ChildAtFn = unsafe extern "C" fn(node: RawObject, index: usize) -> RawObject;
pub type AsLabelFn = unsafe extern "C" fn(node: RawObject) -> RawObject;
pub type SetLabelStringFn = unsafe extern "C" fn(label: RawObject, text: *const c_char);
pub type NodeRefFn = unsafe extern "C" fn(node: RawObject);

/// The table passed to `opposite_dash_loaded`. Every entry may be null; `resolve` checks that
/// the ones we need are there.
#[repr(C)]
#[derive(Default)]
pub struct HostApi {
    pub abi_version: u32,

    /// Installs a replacement over a named game function. Lower priorities run first. The next
    /// implementation in the chain is written to `original_out`.
    pub hook_function: Option<HookFunctionFn>,

    /// Queues `task(data)` to run on a later iteration of the main loop.
    pub queue_in_main_thread: Option<QueueInMainThreadFn>,

    /// The directory the mod may write its settings and logs to.
    pub mod_directory: Option<ModDirectoryFn>,

    pub level_id: Option<LevelIdFn>,

    /// Returns a pointer to the UTF-8 name and writes its length to `len_out`.
    pub level_name: Option<LevelNameFn>,

    pub set_level_name: Option<SetLevelNameFn>,

    pub child_by_id: Option<ChildByIdFn>,
    pub child_by_id_recursive: Option<ChildByIdFn>,
    pub child_count: Option<ChildCountFn>,
    pub child_at: Option<ChildAtFn>,

    /// Returns the node if it is a text label, or null otherwise.
    pub as_label: Option<AsLabelFn>,
    pub set_label_string: Option<SetLabelStringFn>,

    pub retain_node: Option<NodeRefFn>,
    pub release_node: Option<NodeRefFn>,
}

/// A `HostApi` that has every entry we need.
#[derive(Clone, Copy)]
pub struct Host {
    hook_function: HookFunctionFn,
    queue_in_main_thread: QueueInMainThreadFn,
    mod_directory: Option<ModDirectoryFn>,
    level_id: LevelIdFn,
    level_name: LevelNameFn,
    set_level_name: SetLevelNameFn,
    child_by_id: ChildByIdFn,
    child_by_id_recursive: ChildByIdFn,
    child_count: ChildCountFn,
    child_at: ChildAtFn,
    as_label: AsLabelFn,
    set_label_string: SetLabelStringFn,
    retain_node: NodeRefFn,
    release_node: NodeRefFn,
}

macro_rules! require {
    ($api:expr, $entry:ident) => {
        $api.$entry
            .ok_or_else(|| eyre!("host table has no `{}`", stringify!($entry)))?
    };
}

impl HostApi {
    pub fn resolve(&self) -> Result<Host> {
        if self.abi_version != HOST_ABI_VERSION {
            return Err(eyre!(
                "host table is version {}, but version {} is required",
                self.abi_version,
                HOST_ABI_VERSION
            ));
        }

        Ok(Host {
            hook_function: require!(self, hook_function),
            queue_in_main_thread: require!(self, queue_in_main_thread),
            mod_directory: self.mod_directory,
            level_id: require!(self, level_id),
            level_name: require!(self, level_name),
            set_level_name: require!(self, set_level_name),
            child_by_id: require!(self, child_by_id),
            child_by_id_recursive: require!(self, child_by_id_recursive),
            child_count: require!(self, child_count),
            child_at: require!(self, child_at),
            as_label: require!(self, as_label),
            set_label_string: require!(self, set_label_string),
            retain_node: require!(self, retain_node),
            release_node: require!(self, release_node),
        })
    }
}

#[cfg(test)]
pub mod testing;

static HOST: OnceCell<Host> = OnceCell::new();

/// Stores the host for the rest of the process. If a host has already been stored, that one is
/// kept.
pub fn install(host: Host) -> &'static Host {
    HOST.get_or_init(|| host)
}

pub fn get() -> Option<&'static Host> {
    HOST.get()
}

impl Host {
    /// Asks the framework to hook `symbol`, returning the original implementation.
    pub fn hook(
        &self,
        symbol: &str,
        priority: i32,
        replacement: *const c_void,
    ) -> Result<*const c_void> {
        let symbol_c = CString::new(symbol)?;
        let mut original = std::ptr::null();

        let hooked = unsafe {
            (self.hook_function)(symbol_c.as_ptr(), priority, replacement, &mut original)
        };

        if !hooked {
            return Err(eyre!("host refused to hook {symbol}"));
        }

        if original.is_null() {
            return Err(eyre!("host hooked {symbol} but gave no original"));
        }

        Ok(original)
    }

    pub fn mod_directory(&self) -> Option<PathBuf> {
        let ptr = unsafe { (self.mod_directory?)() };

        if ptr.is_null() {
            return None;
        }

        let path = unsafe { CStr::from_ptr(ptr) }.to_str().ok()?;
        Some(PathBuf::from(path))
    }
}

/// A level object owned by the game.
pub struct HostLevel {
    ptr: NonNull<c_void>,
    host: &'static Host,
}

impl HostLevel {
    pub fn from_raw(host: &'static Host, ptr: *mut c_void) -> Option<HostLevel> {
        NonNull::new(ptr).map(|ptr| HostLevel { ptr, host })
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }
}

impl Level for HostLevel {
    fn id(&self) -> i32 {
        unsafe { (self.host.level_id)(self.as_ptr()) }
    }

    fn name(&self) -> String {
        let mut len = 0;
        let ptr = unsafe { (self.host.level_name)(self.as_ptr(), &mut len) };

        if ptr.is_null() {
            return String::new();
        }

        let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, len) };
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn set_name(&mut self, name: &str) {
        let (ptr, len) = (name.as_ptr() as *const c_char, name.len());

        unsafe { (self.host.set_level_name)(self.as_ptr(), ptr, len) }
    }
}

/// A UI node. The node is retained for as long as the handle exists, so a handle captured by a
/// queued task keeps its node alive until the task has run.
pub struct HostNode {
    ptr: NonNull<c_void>,
    host: &'static Host,
}

impl HostNode {
    pub fn from_raw(host: &'static Host, ptr: *mut c_void) -> Option<HostNode> {
        let ptr = NonNull::new(ptr)?;

        unsafe { (host.retain_node)(ptr.as_ptr()) };

        Some(HostNode { ptr, host })
    }

    fn child_by(&self, find: ChildByIdFn, id: &str) -> Option<HostNode> {
        let id = CString::new(id).ok()?;
        let child = unsafe { find(self.ptr.as_ptr(), id.as_ptr()) };

        HostNode::from_raw(self.host, child)
    }
}

impl Clone for HostNode {
    fn clone(&self) -> Self {
        unsafe { (self.host.retain_node)(self.ptr.as_ptr()) };

        HostNode {
            ptr: self.ptr,
            host: self.host,
        }
    }
}

impl Drop for HostNode {
    fn drop(&mut self) {
        unsafe { (self.host.release_node)(self.ptr.as_ptr()) };
    }
}

impl Node for HostNode {
    type Label = HostLabel;

    fn child_by_id(&self, id: &str) -> Option<HostNode> {
        self.child_by(self.host.child_by_id, id)
    }

    fn child_by_id_recursive(&self, id: &str) -> Option<HostNode> {
        self.child_by(self.host.child_by_id_recursive, id)
    }

    fn child_at(&self, index: usize) -> Option<HostNode> {
        let count = unsafe { (self.host.child_count)(self.ptr.as_ptr()) };

        if index >= count {
            return None;
        }

        HostNode::from_raw(self.host, unsafe {
            (self.host.child_at)(self.ptr.as_ptr(), index)
        })
    }

    fn as_label(&self) -> Option<HostLabel> {
        let label = unsafe { (self.host.as_label)(self.ptr.as_ptr()) };

        HostNode::from_raw(self.host, label).map(HostLabel)
    }
}

/// A node that is known to be a text label.
pub struct HostLabel(HostNode);

impl Label for HostLabel {
    fn set_text(&self, text: &str) {
        let text = match CString::new(text) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("not setting label text: {err}");
                return;
            }
        };

        unsafe { (self.0.host.set_label_string)(self.0.ptr.as_ptr(), text.as_ptr()) };
    }
}

/// The framework's main thread queue.
pub struct MainThread(&'static Host);

impl MainThread {
    pub fn new(host: &'static Host) -> MainThread {
        MainThread(host)
    }
}

unsafe extern "C" fn run_task(data: *mut c_void) {
    let task = Box::from_raw(data as *mut Box<dyn FnOnce()>);
    task();
}

impl MainThreadQueue for MainThread {
    fn queue(&self, task: Box<dyn FnOnce()>) {
        let data = Box::into_raw(Box::new(task)) as *mut c_void;

        unsafe { (self.0.queue_in_main_thread)(run_task, data) };
    }
}
