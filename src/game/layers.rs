//! The menu and level select layers. Neither renames anything itself; the levels they show have
//! already been through `levels`.

pub fn menu_layer_init(proceed: impl FnOnce() -> bool) -> bool {
    proceed()
}

pub fn level_select_init(page: i32, proceed: impl FnOnce(i32) -> bool) -> bool {
    proceed(page)
}
