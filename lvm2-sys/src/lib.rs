//! Raw FFI surface for the LVM2 application library (liblvm2app).
//!
//! The declarations mirror `lvm2app.h`. They are maintained by hand rather
//! than generated: the header set is small, frozen, and no longer shipped by
//! current LVM2 releases, which rules out running bindgen at build time.
//!
//! Nothing here is safe to call without holding the handles the library hands
//! out; all checking lives in the `lvm2-rs` wrapper crate.

#![allow(non_camel_case_types)]

use libc::{c_char, c_int};

/// Base library handle. Opens the LVM session and carries the per-session
/// error state queried with [`lvm_errno`] and [`lvm_errmsg`].
#[repr(C)]
pub struct lvm {
    _unused: [u8; 0],
}
pub type lvm_t = *mut lvm;

/// Volume group handle, read-only or read-write depending on how it was
/// obtained. PV and LV handles are bound to it and share its mode.
#[repr(C)]
pub struct volume_group {
    _unused: [u8; 0],
}
pub type vg_t = *mut volume_group;

#[repr(C)]
pub struct physical_volume {
    _unused: [u8; 0],
}
pub type pv_t = *mut physical_volume;

#[repr(C)]
pub struct logical_volume {
    _unused: [u8; 0],
}
pub type lv_t = *mut logical_volume;

/// Circular doubly linked list node from libdevmapper.
///
/// A list is addressed by a sentinel head node. The head of an empty list
/// points back at itself; element records embed a `dm_list` as their first
/// field and are chained through it.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct dm_list {
    pub p: *mut dm_list,
    pub n: *mut dm_list,
}

/// Entry record of the read-only string lists returned by calls such as
/// [`lvm_list_vg_names`] and [`lvm_vg_get_tags`].
#[repr(C)]
pub struct lvm_str_list {
    pub list: dm_list,
    pub str_: *const c_char,
}

#[repr(C)]
pub struct lvm_pv_list {
    pub list: dm_list,
    pub pv: pv_t,
}

#[repr(C)]
pub struct lvm_lv_list {
    pub list: dm_list,
    pub lv: lv_t,
}

extern "C" {
    // Session lifecycle and error state.
    pub fn lvm_init(system_dir: *const c_char) -> lvm_t;
    pub fn lvm_quit(libh: lvm_t);
    pub fn lvm_errno(libh: lvm_t) -> c_int;
    pub fn lvm_errmsg(libh: lvm_t) -> *const c_char;
    pub fn lvm_library_get_version() -> *const c_char;

    // Configuration.
    pub fn lvm_config_reload(libh: lvm_t) -> c_int;
    pub fn lvm_config_override(libh: lvm_t, config_string: *const c_char) -> c_int;
    pub fn lvm_config_find_bool(libh: lvm_t, config_path: *const c_char, fail: c_int) -> c_int;

    // Scanning and name services.
    pub fn lvm_scan(libh: lvm_t) -> c_int;
    pub fn lvm_list_vg_names(libh: lvm_t) -> *mut dm_list;
    pub fn lvm_list_vg_uuids(libh: lvm_t) -> *mut dm_list;
    pub fn lvm_vgname_from_pvid(libh: lvm_t, pvid: *const c_char) -> *const c_char;
    pub fn lvm_vgname_from_device(libh: lvm_t, device: *const c_char) -> *const c_char;
    pub fn lvm_vg_name_validate(libh: lvm_t, vg_name: *const c_char) -> c_int;

    // Session-scoped physical volume management. The list returned by
    // lvm_list_pvs holds VG handles open internally and must be released
    // with lvm_list_pvs_free, unlike the VG-owned lists below.
    pub fn lvm_list_pvs(libh: lvm_t) -> *mut dm_list;
    pub fn lvm_list_pvs_free(pvlist: *mut dm_list) -> c_int;
    pub fn lvm_pv_create(libh: lvm_t, pv_name: *const c_char, size: u64) -> c_int;
    pub fn lvm_pv_remove(libh: lvm_t, pv_name: *const c_char) -> c_int;

    // Volume group lifecycle.
    pub fn lvm_vg_open(libh: lvm_t, vgname: *const c_char, mode: *const c_char, flags: u32)
        -> vg_t;
    pub fn lvm_vg_create(libh: lvm_t, vg_name: *const c_char) -> vg_t;
    pub fn lvm_vg_close(vg: vg_t) -> c_int;
    pub fn lvm_vg_write(vg: vg_t) -> c_int;
    pub fn lvm_vg_remove(vg: vg_t) -> c_int;

    // Volume group getters.
    pub fn lvm_vg_get_name(vg: vg_t) -> *const c_char;
    pub fn lvm_vg_get_uuid(vg: vg_t) -> *const c_char;
    pub fn lvm_vg_get_seqno(vg: vg_t) -> u64;
    pub fn lvm_vg_get_size(vg: vg_t) -> u64;
    pub fn lvm_vg_get_free_size(vg: vg_t) -> u64;
    pub fn lvm_vg_get_extent_size(vg: vg_t) -> u64;
    pub fn lvm_vg_get_extent_count(vg: vg_t) -> u64;
    pub fn lvm_vg_get_free_extent_count(vg: vg_t) -> u64;
    pub fn lvm_vg_get_pv_count(vg: vg_t) -> u64;
    pub fn lvm_vg_get_max_pv(vg: vg_t) -> u64;
    pub fn lvm_vg_get_max_lv(vg: vg_t) -> u64;
    pub fn lvm_vg_is_clustered(vg: vg_t) -> c_int;
    pub fn lvm_vg_is_exported(vg: vg_t) -> c_int;
    pub fn lvm_vg_is_partial(vg: vg_t) -> c_int;
    pub fn lvm_vg_get_tags(vg: vg_t) -> *mut dm_list;

    // Volume group mutators.
    pub fn lvm_vg_set_extent_size(vg: vg_t, new_size: u32) -> c_int;
    pub fn lvm_vg_add_tag(vg: vg_t, tag: *const c_char) -> c_int;
    pub fn lvm_vg_remove_tag(vg: vg_t, tag: *const c_char) -> c_int;
    pub fn lvm_vg_extend(vg: vg_t, device: *const c_char) -> c_int;
    pub fn lvm_vg_reduce(vg: vg_t, device: *const c_char) -> c_int;

    // Volume group owned lists and lookups.
    pub fn lvm_vg_list_pvs(vg: vg_t) -> *mut dm_list;
    pub fn lvm_vg_list_lvs(vg: vg_t) -> *mut dm_list;
    pub fn lvm_vg_create_lv_linear(vg: vg_t, name: *const c_char, size: u64) -> lv_t;
    pub fn lvm_lv_from_name(vg: vg_t, name: *const c_char) -> lv_t;
    pub fn lvm_lv_from_uuid(vg: vg_t, uuid: *const c_char) -> lv_t;
    pub fn lvm_pv_from_name(vg: vg_t, name: *const c_char) -> pv_t;
    pub fn lvm_pv_from_uuid(vg: vg_t, uuid: *const c_char) -> pv_t;

    // Physical volume getters.
    pub fn lvm_pv_get_name(pv: pv_t) -> *const c_char;
    pub fn lvm_pv_get_uuid(pv: pv_t) -> *const c_char;
    pub fn lvm_pv_get_mda_count(pv: pv_t) -> u64;
    pub fn lvm_pv_get_dev_size(pv: pv_t) -> u64;
    pub fn lvm_pv_get_size(pv: pv_t) -> u64;
    pub fn lvm_pv_get_free(pv: pv_t) -> u64;

    // Logical volume getters and mutators.
    pub fn lvm_lv_get_name(lv: lv_t) -> *const c_char;
    pub fn lvm_lv_get_uuid(lv: lv_t) -> *const c_char;
    pub fn lvm_lv_get_size(lv: lv_t) -> u64;
    pub fn lvm_lv_get_attr(lv: lv_t) -> *const c_char;
    pub fn lvm_lv_get_origin(lv: lv_t) -> *const c_char;
    pub fn lvm_lv_is_active(lv: lv_t) -> u64;
    pub fn lvm_lv_is_suspended(lv: lv_t) -> u64;
    pub fn lvm_lv_activate(lv: lv_t) -> c_int;
    pub fn lvm_lv_deactivate(lv: lv_t) -> c_int;
    pub fn lvm_vg_remove_lv(lv: lv_t) -> c_int;
}
