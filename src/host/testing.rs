//! A stand-in for the mod framework. Game objects are plain Rust values whose addresses are
//! handed across the table, so each test owns the objects it works with.
//!
//! The host and the mod state are stored once per process, so every test goes through `host()`.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    ffi::{c_void, CStr},
    sync::Mutex,
};

use libc::c_char;

use super::{Host, HostApi, RawObject, TaskFn, HOST_ABI_VERSION};

/// The one symbol this host won't hook.
pub const REFUSED_SYMBOL: &str = "MenuLayer::init";

static HOOKED: Mutex<Vec<(String, i32)>> = Mutex::new(Vec::new());

thread_local! {
    // Tests run on their own threads, so each one sees only what it queued.
    static QUEUED: RefCell<VecDeque<(TaskFn, usize)>> = RefCell::new(VecDeque::new());
}

pub struct FakeLevel {
    id: i32,
    name: RefCell<String>,
}

impl FakeLevel {
    pub fn new(id: i32, name: &str) -> FakeLevel {
        FakeLevel {
            id,
            name: RefCell::new(name.to_string()),
        }
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn as_raw(&self) -> *mut c_void {
        self as *const FakeLevel as *mut c_void
    }
}

/// Hands back its level from `getMainLevel`.
pub struct FakeLevelManager {
    pub level: FakeLevel,
}

impl FakeLevelManager {
    pub fn as_raw(&self) -> *mut c_void {
        self as *const FakeLevelManager as *mut c_void
    }
}

pub struct FakeNode {
    id: String,
    children: Vec<FakeNode>,
    text: Option<RefCell<String>>,
    refs: Cell<i32>,
}

impl FakeNode {
    pub fn new(id: &str) -> FakeNode {
        FakeNode {
            id: id.to_string(),
            children: vec![],
            text: None,
            refs: Cell::new(0),
        }
    }

    pub fn label(id: &str, text: &str) -> FakeNode {
        FakeNode {
            text: Some(RefCell::new(text.to_string())),
            ..FakeNode::new(id)
        }
    }

    pub fn with_child(mut self, child: FakeNode) -> FakeNode {
        self.children.push(child);
        self
    }

    pub fn find(&self, id: &str) -> Option<&FakeNode> {
        self.children.iter().find_map(|child| {
            if child.id == id {
                Some(child)
            } else {
                child.find(id)
            }
        })
    }

    pub fn text(&self) -> Option<String> {
        self.text.as_ref().map(|text| text.borrow().clone())
    }

    pub fn set_text(&self, text: &str) {
        if let Some(current) = &self.text {
            *current.borrow_mut() = text.to_string();
        }
    }

    /// Retains minus releases.
    pub fn refs(&self) -> i32 {
        self.refs.get()
    }

    pub fn as_raw(&self) -> *mut c_void {
        self as *const FakeNode as *mut c_void
    }
}

unsafe fn level<'a>(ptr: RawObject) -> &'a FakeLevel {
    &*(ptr as *const FakeLevel)
}

unsafe fn node<'a>(ptr: RawObject) -> &'a FakeNode {
    &*(ptr as *const FakeNode)
}

fn raw_or_null(node: Option<&FakeNode>) -> RawObject {
    node.map_or(std::ptr::null_mut(), FakeNode::as_raw)
}

// The game's own implementations.

unsafe extern "C" fn original_get_main_level(this: RawObject, _: i32, _: bool) -> RawObject {
    (*(this as *const FakeLevelManager)).level.as_raw()
}

unsafe extern "C" fn original_get_level(_: i32, _: bool) -> RawObject {
    std::ptr::null_mut()
}

unsafe extern "C" fn original_level_select_init(_: RawObject, page: i32) -> bool {
    page >= 0
}

/// Builds the page by copying the level's name into the "level-name" label.
unsafe extern "C" fn original_level_page_init(this: RawObject, level_ptr: RawObject) -> bool {
    if level_ptr.is_null() {
        return true;
    }

    if let Some(label) = node(this).find("level-name") {
        label.set_text(&level(level_ptr).name());
    }

    true
}

// The table entries.

unsafe extern "C" fn hook_function(
    symbol: *const c_char,
    priority: i32,
    _replacement: *const c_void,
    original_out: *mut *const c_void,
) -> bool {
    let symbol = CStr::from_ptr(symbol).to_string_lossy().into_owned();

    let original = match symbol.as_str() {
        "GameLevelManager::getMainLevel" => original_get_main_level as *const c_void,
        "LevelTools::getLevel" => original_get_level as *const c_void,
        "LevelSelectLayer::init" => original_level_select_init as *const c_void,
        "LevelPage::init" => original_level_page_init as *const c_void,
        _ => return false,
    };

    HOOKED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .push((symbol, priority));

    *original_out = original;
    true
}

unsafe extern "C" fn queue_in_main_thread(task: TaskFn, data: *mut c_void) {
    QUEUED.with(|queued| queued.borrow_mut().push_back((task, data as usize)));
}

unsafe extern "C" fn level_id(ptr: RawObject) -> i32 {
    level(ptr).id
}

unsafe extern "C" fn level_name(ptr: RawObject, len_out: *mut usize) -> *const c_char {
    let name = level(ptr).name.borrow();
    *len_out = name.len();
    name.as_ptr() as *const c_char
}

unsafe extern "C" fn set_level_name(ptr: RawObject, name: *const c_char, len: usize) {
    let bytes = std::slice::from_raw_parts(name as *const u8, len);
    *level(ptr).name.borrow_mut() = String::from_utf8_lossy(bytes).into_owned();
}

unsafe extern "C" fn child_by_id(ptr: RawObject, id: *const c_char) -> RawObject {
    let id = CStr::from_ptr(id).to_string_lossy();
    raw_or_null(node(ptr).children.iter().find(|child| child.id == id))
}

unsafe extern "C" fn child_by_id_recursive(ptr: RawObject, id: *const c_char) -> RawObject {
    let id = CStr::from_ptr(id).to_string_lossy();
    raw_or_null(node(ptr).find(&id))
}

unsafe extern "C" fn child_count(ptr: RawObject) -> usize {
    node(ptr).children.len()
}

unsafe extern "C" fn child_at(ptr: RawObject, index: usize) -> RawObject {
    raw_or_null(node(ptr).children.get(index))
}

unsafe extern "C" fn as_label(ptr: RawObject) -> RawObject {
    if node(ptr).text.is_some() {
        ptr
    } else {
        std::ptr::null_mut()
    }
}

unsafe extern "C" fn set_label_string(ptr: RawObject, text: *const c_char) {
    node(ptr).set_text(&CStr::from_ptr(text).to_string_lossy());
}

unsafe extern "C" fn retain_node(ptr: RawObject) {
    let refs = &node(ptr).refs;
    refs.set(refs.get() + 1);
}

unsafe extern "C" fn release_node(ptr: RawObject) {
    let refs = &node(ptr).refs;
    refs.set(refs.get() - 1);
}

/// A table with every entry filled in.
pub fn api() -> HostApi {
    HostApi {
        abi_version: HOST_ABI_VERSION,
        hook_function: Some(hook_function),
        queue_in_main_thread: Some(queue_in_main_thread),
        mod_directory: None,
        level_id: Some(level_id),
        level_name: Some(level_name),
        set_level_name: Some(set_level_name),
        child_by_id: Some(child_by_id),
        child_by_id_recursive: Some(child_by_id_recursive),
        child_count: Some(child_count),
        child_at: Some(child_at),
        as_label: Some(as_label),
        set_label_string: Some(set_label_string),
        retain_node: Some(retain_node),
        release_node: Some(release_node),
    }
}

/// The process-wide host, installed from `api()`.
pub fn host() -> &'static Host {
    super::install(api().resolve().expect("fake table should resolve"))
}

/// Every `(symbol, priority)` the host has agreed to hook so far.
pub fn hooked() -> Vec<(String, i32)> {
    HOOKED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
}

/// The number of tasks this thread has queued that haven't run.
pub fn queued() -> usize {
    QUEUED.with(|queued| queued.borrow().len())
}

/// Runs this thread's queued tasks in order.
pub fn run_queued() {
    loop {
        let next = QUEUED.with(|queued| queued.borrow_mut().pop_front());

        match next {
            Some((task, data)) => unsafe { task(data as *mut c_void) },
            None => break,
        }
    }
}
