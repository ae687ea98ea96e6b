//! The `lvm_*` symbol surface, implemented over the in-memory store.
//!
//! Handle types mirror the native ownership tree: the session handle owns
//! its retained lists, a VG handle owns the PV/LV handles and lists it hands
//! out, and closing a handle drops everything below it. Mutations follow the
//! engine's commit model: tag/extent/remove changes live in the handle's
//! working copy until `lvm_vg_write`, while LV creation, removal and
//! (de)activation are committed to the store immediately.

use std::ffi::{CStr, CString};
use std::ptr;
use std::sync::Mutex;

use libc::{c_char, c_int, EEXIST, EINVAL, ENOENT, ENOSPC, EPERM};
use once_cell::sync::Lazy;

use lvm2_sys::{dm_list, lv_t, lvm_lv_list, lvm_pv_list, lvm_t, pv_t, vg_t};

use crate::list::{link, sentinel, StrList};
use crate::store::{lock_store, LvSpec, PvSpec, VgSpec};

static VERSION: Lazy<CString> =
    Lazy::new(|| CString::new("2.02.187(2) (2020-03-24)").unwrap());

pub(crate) struct LvmHandle {
    errno: c_int,
    errmsg: CString,
    retained: Vec<CString>,
    str_lists: Vec<StrList>,
}

pub(crate) struct VgHandle {
    lvm: *mut LvmHandle,
    writable: bool,
    removed: bool,
    work: VgSpec,
    retained: Vec<CString>,
    str_lists: Vec<StrList>,
    pv_lists: Vec<PvListAlloc>,
    lv_lists: Vec<LvListAlloc>,
    lv_handles: Vec<Box<LvHandle>>,
    pv_handles: Vec<Box<PvHandle>>,
}

pub(crate) struct LvHandle {
    vg: *mut VgHandle,
    name: String,
    retained: Vec<CString>,
}

pub(crate) struct PvHandle {
    name: CString,
    uuid: CString,
    mda_count: u64,
    dev_size: u64,
    size: u64,
    free: u64,
}

impl PvHandle {
    fn from_spec(spec: &PvSpec) -> PvHandle {
        PvHandle {
            name: CString::new(spec.name.clone()).unwrap(),
            uuid: CString::new(spec.uuid.clone()).unwrap(),
            mda_count: spec.mda_count,
            dev_size: spec.dev_size,
            size: spec.size,
            free: spec.free,
        }
    }
}

pub(crate) struct PvListAlloc {
    head: Box<dm_list>,
    _nodes: Vec<Box<lvm_pv_list>>,
    _handles: Vec<Box<PvHandle>>,
}

impl PvListAlloc {
    fn new(specs: &[PvSpec]) -> PvListAlloc {
        let mut handles: Vec<Box<PvHandle>> =
            specs.iter().map(|s| Box::new(PvHandle::from_spec(s))).collect();
        let mut nodes: Vec<Box<lvm_pv_list>> = handles
            .iter_mut()
            .map(|h| {
                Box::new(lvm_pv_list {
                    list: dm_list {
                        p: ptr::null_mut(),
                        n: ptr::null_mut(),
                    },
                    pv: (&mut **h as *mut PvHandle) as pv_t,
                })
            })
            .collect();
        let head = sentinel();
        let node_ptrs: Vec<*mut dm_list> = nodes
            .iter_mut()
            .map(|n| &mut n.list as *mut dm_list)
            .collect();
        link(&*head as *const dm_list as *mut dm_list, &node_ptrs);
        PvListAlloc {
            head,
            _nodes: nodes,
            _handles: handles,
        }
    }

    fn head_ptr(&self) -> *mut dm_list {
        &*self.head as *const dm_list as *mut dm_list
    }
}

pub(crate) struct LvListAlloc {
    head: Box<dm_list>,
    _nodes: Vec<Box<lvm_lv_list>>,
    _handles: Vec<Box<LvHandle>>,
}

impl LvListAlloc {
    fn new(vg: *mut VgHandle, specs: &[LvSpec]) -> LvListAlloc {
        let mut handles: Vec<Box<LvHandle>> = specs
            .iter()
            .map(|s| {
                Box::new(LvHandle {
                    vg,
                    name: s.name.clone(),
                    retained: Vec::new(),
                })
            })
            .collect();
        let mut nodes: Vec<Box<lvm_lv_list>> = handles
            .iter_mut()
            .map(|h| {
                Box::new(lvm_lv_list {
                    list: dm_list {
                        p: ptr::null_mut(),
                        n: ptr::null_mut(),
                    },
                    lv: (&mut **h as *mut LvHandle) as lv_t,
                })
            })
            .collect();
        let head = sentinel();
        let node_ptrs: Vec<*mut dm_list> = nodes
            .iter_mut()
            .map(|n| &mut n.list as *mut dm_list)
            .collect();
        link(&*head as *const dm_list as *mut dm_list, &node_ptrs);
        LvListAlloc {
            head,
            _nodes: nodes,
            _handles: handles,
        }
    }

    fn head_ptr(&self) -> *mut dm_list {
        &*self.head as *const dm_list as *mut dm_list
    }
}

/// Session-scoped PV lists are released through `lvm_list_pvs_free`, which
/// only receives the list pointer, so they are kept in a registry rather
/// than on the session handle. Single-threaded under the test lock.
struct SessionLists(Vec<PvListAlloc>);
unsafe impl Send for SessionLists {}

static SESSION_PV_LISTS: Lazy<Mutex<SessionLists>> =
    Lazy::new(|| Mutex::new(SessionLists(Vec::new())));

unsafe fn session<'a>(libh: lvm_t) -> &'a mut LvmHandle {
    &mut *(libh as *mut LvmHandle)
}

unsafe fn group<'a>(vg: vg_t) -> &'a mut VgHandle {
    &mut *(vg as *mut VgHandle)
}

unsafe fn logical<'a>(lv: lv_t) -> &'a mut LvHandle {
    &mut *(lv as *mut LvHandle)
}

unsafe fn physical<'a>(pv: pv_t) -> &'a mut PvHandle {
    &mut *(pv as *mut PvHandle)
}

fn set_err(s: &mut LvmHandle, errno: c_int, msg: &str) {
    s.errno = errno;
    s.errmsg = CString::new(msg).unwrap();
}

/// Consume a pending injected fault, recording it as the session error.
fn injected(s: &mut LvmHandle) -> bool {
    let fault = lock_store().fail_next.take();
    match fault {
        Some((errno, msg)) => {
            set_err(s, errno, &msg);
            true
        }
        None => false,
    }
}

unsafe fn arg(p: *const c_char) -> String {
    CStr::from_ptr(p).to_string_lossy().into_owned()
}

fn retain(retained: &mut Vec<CString>, s: &str) -> *const c_char {
    retained.push(CString::new(s).unwrap());
    retained.last().unwrap().as_ptr()
}

fn commit(work: &VgSpec) {
    let mut st = lock_store();
    match st.vg_mut(&work.name) {
        Some(vg) => *vg = work.clone(),
        None => st.vgs.push(work.clone()),
    }
}

fn require_write(g: &mut VgHandle) -> bool {
    if g.writable {
        true
    } else {
        unsafe { set_err(&mut *g.lvm, EPERM, "Volume group is opened read-only") };
        false
    }
}

// ---- session lifecycle and error state ----

#[no_mangle]
pub unsafe extern "C" fn lvm_init(_system_dir: *const c_char) -> lvm_t {
    let mut st = lock_store();
    if st.fail_next.take().is_some() {
        return ptr::null_mut();
    }
    st.counters.init += 1;
    drop(st);
    let handle = Box::new(LvmHandle {
        errno: 0,
        errmsg: CString::new("").unwrap(),
        retained: Vec::new(),
        str_lists: Vec::new(),
    });
    Box::into_raw(handle) as lvm_t
}

#[no_mangle]
pub unsafe extern "C" fn lvm_quit(libh: lvm_t) {
    lock_store().counters.quit += 1;
    drop(Box::from_raw(libh as *mut LvmHandle));
}

#[no_mangle]
pub unsafe extern "C" fn lvm_errno(libh: lvm_t) -> c_int {
    session(libh).errno
}

#[no_mangle]
pub unsafe extern "C" fn lvm_errmsg(libh: lvm_t) -> *const c_char {
    session(libh).errmsg.as_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn lvm_library_get_version() -> *const c_char {
    VERSION.as_ptr()
}

// ---- configuration ----

#[no_mangle]
pub unsafe extern "C" fn lvm_config_reload(libh: lvm_t) -> c_int {
    if injected(session(libh)) {
        return -1;
    }
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_config_override(libh: lvm_t, _config: *const c_char) -> c_int {
    if injected(session(libh)) {
        return -1;
    }
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_config_find_bool(
    _libh: lvm_t,
    _config_path: *const c_char,
    fail: c_int,
) -> c_int {
    // The mock has no configuration tree, every path is "not found".
    fail
}

// ---- scanning and name services ----

#[no_mangle]
pub unsafe extern "C" fn lvm_scan(libh: lvm_t) -> c_int {
    if injected(session(libh)) {
        return -1;
    }
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_list_vg_names(libh: lvm_t) -> *mut dm_list {
    let s = session(libh);
    if injected(s) {
        return ptr::null_mut();
    }
    let names: Vec<Vec<u8>> = lock_store()
        .vgs
        .iter()
        .map(|vg| vg.name.clone().into_bytes())
        .collect();
    s.str_lists.push(StrList::new(&names));
    s.str_lists.last().unwrap().head_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn lvm_list_vg_uuids(libh: lvm_t) -> *mut dm_list {
    let s = session(libh);
    if injected(s) {
        return ptr::null_mut();
    }
    let uuids: Vec<Vec<u8>> = lock_store()
        .vgs
        .iter()
        .map(|vg| vg.uuid.clone().into_bytes())
        .collect();
    s.str_lists.push(StrList::new(&uuids));
    s.str_lists.last().unwrap().head_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vgname_from_pvid(libh: lvm_t, pvid: *const c_char) -> *const c_char {
    let s = session(libh);
    let pvid = arg(pvid);
    let name = lock_store()
        .vgs
        .iter()
        .find(|vg| vg.pvs.iter().any(|pv| pv.uuid == pvid))
        .map(|vg| vg.name.clone());
    match name {
        Some(name) => retain(&mut s.retained, &name),
        None => ptr::null(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vgname_from_device(
    libh: lvm_t,
    device: *const c_char,
) -> *const c_char {
    let s = session(libh);
    let device = arg(device);
    let name = lock_store()
        .vgs
        .iter()
        .find(|vg| vg.pvs.iter().any(|pv| pv.name == device))
        .map(|vg| vg.name.clone());
    match name {
        Some(name) => retain(&mut s.retained, &name),
        None => ptr::null(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_name_validate(libh: lvm_t, vg_name: *const c_char) -> c_int {
    let s = session(libh);
    let name = arg(vg_name);
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'));
    if valid {
        0
    } else {
        set_err(s, EINVAL, "New volume group name is invalid");
        -1
    }
}

// ---- session-scoped physical volumes ----

#[no_mangle]
pub unsafe extern "C" fn lvm_list_pvs(libh: lvm_t) -> *mut dm_list {
    let s = session(libh);
    if injected(s) {
        return ptr::null_mut();
    }
    let mut specs: Vec<PvSpec> = Vec::new();
    {
        let st = lock_store();
        for vg in &st.vgs {
            specs.extend(vg.pvs.iter().cloned());
        }
        specs.extend(st.orphan_pvs.iter().cloned());
    }
    let alloc = PvListAlloc::new(&specs);
    let head = alloc.head_ptr();
    SESSION_PV_LISTS
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .0
        .push(alloc);
    head
}

#[no_mangle]
pub unsafe extern "C" fn lvm_list_pvs_free(pvlist: *mut dm_list) -> c_int {
    lock_store().counters.pv_list_free += 1;
    SESSION_PV_LISTS
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .0
        .retain(|alloc| alloc.head_ptr() != pvlist);
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_create(libh: lvm_t, pv_name: *const c_char, size: u64) -> c_int {
    let s = session(libh);
    if injected(s) {
        return -1;
    }
    let name = arg(pv_name);
    let mut st = lock_store();
    let size = if size == 0 {
        1024 * crate::store::EXTENT_SIZE
    } else {
        size
    };
    let uuid = st.next_uuid("pv");
    st.orphan_pvs.push(PvSpec::new(&name, &uuid, size));
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_remove(libh: lvm_t, pv_name: *const c_char) -> c_int {
    let s = session(libh);
    if injected(s) {
        return -1;
    }
    let name = arg(pv_name);
    let mut st = lock_store();
    let before = st.orphan_pvs.len();
    st.orphan_pvs.retain(|pv| pv.name != name);
    if st.orphan_pvs.len() == before {
        drop(st);
        set_err(s, ENOENT, "Physical volume not found");
        return -1;
    }
    0
}

// ---- volume group lifecycle ----

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_open(
    libh: lvm_t,
    vgname: *const c_char,
    mode: *const c_char,
    _flags: u32,
) -> vg_t {
    let s = session(libh);
    if injected(s) {
        return ptr::null_mut();
    }
    let name = arg(vgname);
    let writable = arg(mode).starts_with('w');
    let work = {
        let mut st = lock_store();
        match st.vg_mut(&name) {
            Some(vg) => {
                let work = vg.clone();
                st.counters.vg_open += 1;
                work
            }
            None => {
                drop(st);
                set_err(s, ENOENT, &format!("Volume group \"{}\" not found", name));
                return ptr::null_mut();
            }
        }
    };
    let handle = Box::new(VgHandle {
        lvm: s as *mut LvmHandle,
        writable,
        removed: false,
        work,
        retained: Vec::new(),
        str_lists: Vec::new(),
        pv_lists: Vec::new(),
        lv_lists: Vec::new(),
        lv_handles: Vec::new(),
        pv_handles: Vec::new(),
    });
    Box::into_raw(handle) as vg_t
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_create(libh: lvm_t, vg_name: *const c_char) -> vg_t {
    let s = session(libh);
    if injected(s) {
        return ptr::null_mut();
    }
    let name = arg(vg_name);
    let work = {
        let mut st = lock_store();
        if st.vg_mut(&name).is_some() {
            drop(st);
            set_err(s, EEXIST, &format!("Volume group \"{}\" already exists", name));
            return ptr::null_mut();
        }
        let uuid = st.next_uuid("vg");
        st.counters.vg_open += 1;
        VgSpec::new(&name, &uuid)
    };
    let handle = Box::new(VgHandle {
        lvm: s as *mut LvmHandle,
        writable: true,
        removed: false,
        work,
        retained: Vec::new(),
        str_lists: Vec::new(),
        pv_lists: Vec::new(),
        lv_lists: Vec::new(),
        lv_handles: Vec::new(),
        pv_handles: Vec::new(),
    });
    Box::into_raw(handle) as vg_t
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_close(vg: vg_t) -> c_int {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return -1;
    }
    lock_store().counters.vg_close += 1;
    drop(Box::from_raw(vg as *mut VgHandle));
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_write(vg: vg_t) -> c_int {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return -1;
    }
    if !require_write(g) {
        return -1;
    }
    if g.removed {
        let name = g.work.name.clone();
        lock_store().vgs.retain(|vg| vg.name != name);
        return 0;
    }
    g.work.seqno += 1;
    commit(&g.work);
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_remove(vg: vg_t) -> c_int {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return -1;
    }
    if !require_write(g) {
        return -1;
    }
    g.removed = true;
    0
}

// ---- volume group getters ----

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_name(vg: vg_t) -> *const c_char {
    let g = group(vg);
    let name = g.work.name.clone();
    retain(&mut g.retained, &name)
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_uuid(vg: vg_t) -> *const c_char {
    let g = group(vg);
    let uuid = g.work.uuid.clone();
    retain(&mut g.retained, &uuid)
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_seqno(vg: vg_t) -> u64 {
    group(vg).work.seqno
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_size(vg: vg_t) -> u64 {
    let g = group(vg);
    g.work.extent_size * g.work.extent_count
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_free_size(vg: vg_t) -> u64 {
    let g = group(vg);
    g.work.extent_size * g.work.free_extent_count
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_extent_size(vg: vg_t) -> u64 {
    group(vg).work.extent_size
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_extent_count(vg: vg_t) -> u64 {
    group(vg).work.extent_count
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_free_extent_count(vg: vg_t) -> u64 {
    group(vg).work.free_extent_count
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_pv_count(vg: vg_t) -> u64 {
    group(vg).work.pvs.len() as u64
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_max_pv(vg: vg_t) -> u64 {
    group(vg).work.max_pv
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_max_lv(vg: vg_t) -> u64 {
    group(vg).work.max_lv
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_is_clustered(vg: vg_t) -> c_int {
    group(vg).work.clustered as c_int
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_is_exported(vg: vg_t) -> c_int {
    group(vg).work.exported as c_int
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_is_partial(vg: vg_t) -> c_int {
    group(vg).work.partial as c_int
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_get_tags(vg: vg_t) -> *mut dm_list {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return ptr::null_mut();
    }
    let tags = g.work.tags.clone();
    g.str_lists.push(StrList::new(&tags));
    g.str_lists.last().unwrap().head_ptr()
}

// ---- volume group mutators ----

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_set_extent_size(vg: vg_t, new_size: u32) -> c_int {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return -1;
    }
    if !require_write(g) {
        return -1;
    }
    if new_size == 0 || !new_size.is_power_of_two() {
        set_err(&mut *g.lvm, EINVAL, "Extent size must be a power of two");
        return -1;
    }
    g.work.extent_size = new_size as u64;
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_add_tag(vg: vg_t, tag: *const c_char) -> c_int {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return -1;
    }
    if !require_write(g) {
        return -1;
    }
    let tag = CStr::from_ptr(tag).to_bytes().to_vec();
    if !g.work.tags.contains(&tag) {
        g.work.tags.push(tag);
    }
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_remove_tag(vg: vg_t, tag: *const c_char) -> c_int {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return -1;
    }
    if !require_write(g) {
        return -1;
    }
    let tag = CStr::from_ptr(tag).to_bytes().to_vec();
    match g.work.tags.iter().position(|t| *t == tag) {
        Some(idx) => {
            g.work.tags.remove(idx);
            0
        }
        None => {
            set_err(&mut *g.lvm, ENOENT, "Tag not found on volume group");
            -1
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_extend(vg: vg_t, device: *const c_char) -> c_int {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return -1;
    }
    if !require_write(g) {
        return -1;
    }
    let device = arg(device);
    let mut st = lock_store();
    match st.orphan_pvs.iter().position(|pv| pv.name == device) {
        Some(idx) => {
            let pv = st.orphan_pvs.remove(idx);
            drop(st);
            let extents = pv.size / g.work.extent_size;
            g.work.extent_count += extents;
            g.work.free_extent_count += extents;
            g.work.pvs.push(pv);
            0
        }
        None => {
            drop(st);
            set_err(&mut *g.lvm, ENOENT, "Device is not an initialized physical volume");
            -1
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_reduce(vg: vg_t, device: *const c_char) -> c_int {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return -1;
    }
    if !require_write(g) {
        return -1;
    }
    let device = arg(device);
    match g.work.pvs.iter().position(|pv| pv.name == device) {
        Some(idx) => {
            let pv = g.work.pvs.remove(idx);
            let extents = pv.size / g.work.extent_size;
            g.work.extent_count = g.work.extent_count.saturating_sub(extents);
            g.work.free_extent_count = g.work.free_extent_count.saturating_sub(extents);
            let mut st = lock_store();
            st.orphan_pvs.push(pv);
            0
        }
        None => {
            set_err(&mut *g.lvm, ENOENT, "Physical volume not in volume group");
            -1
        }
    }
}

// ---- volume group owned lists and lookups ----

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_list_pvs(vg: vg_t) -> *mut dm_list {
    let g = group(vg);
    if g.work.pvs.is_empty() {
        return ptr::null_mut();
    }
    let alloc = PvListAlloc::new(&g.work.pvs);
    g.pv_lists.push(alloc);
    g.pv_lists.last().unwrap().head_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_list_lvs(vg: vg_t) -> *mut dm_list {
    let g = group(vg);
    if g.work.lvs.is_empty() {
        return ptr::null_mut();
    }
    let specs = g.work.lvs.clone();
    let alloc = LvListAlloc::new(g as *mut VgHandle, &specs);
    g.lv_lists.push(alloc);
    g.lv_lists.last().unwrap().head_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_create_lv_linear(
    vg: vg_t,
    name: *const c_char,
    size: u64,
) -> lv_t {
    let g = group(vg);
    if injected(&mut *g.lvm) {
        return ptr::null_mut();
    }
    if !require_write(g) {
        return ptr::null_mut();
    }
    let name = arg(name);
    if g.work.lvs.iter().any(|lv| lv.name == name) {
        set_err(
            &mut *g.lvm,
            EEXIST,
            &format!("Logical volume \"{}\" already exists", name),
        );
        return ptr::null_mut();
    }
    if size == 0 {
        set_err(&mut *g.lvm, EINVAL, "Logical volume size must not be zero");
        return ptr::null_mut();
    }
    if size > g.work.free_extent_count {
        set_err(&mut *g.lvm, ENOSPC, "Insufficient free extents in volume group");
        return ptr::null_mut();
    }
    let uuid = lock_store().next_uuid("lv");
    g.work.lvs.push(LvSpec::new(&name, &uuid, size));
    g.work.free_extent_count -= size;
    g.work.seqno += 1;
    // LV creation is committed by the engine without a separate write call.
    commit(&g.work);
    let vg_ptr = g as *mut VgHandle;
    g.lv_handles.push(Box::new(LvHandle {
        vg: vg_ptr,
        name,
        retained: Vec::new(),
    }));
    (&mut **g.lv_handles.last_mut().unwrap() as *mut LvHandle) as lv_t
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_from_name(vg: vg_t, name: *const c_char) -> lv_t {
    let g = group(vg);
    let name = arg(name);
    if !g.work.lvs.iter().any(|lv| lv.name == name) {
        set_err(
            &mut *g.lvm,
            ENOENT,
            &format!("Logical volume \"{}\" not found", name),
        );
        return ptr::null_mut();
    }
    let vg_ptr = g as *mut VgHandle;
    g.lv_handles.push(Box::new(LvHandle {
        vg: vg_ptr,
        name,
        retained: Vec::new(),
    }));
    (&mut **g.lv_handles.last_mut().unwrap() as *mut LvHandle) as lv_t
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_from_uuid(vg: vg_t, uuid: *const c_char) -> lv_t {
    let g = group(vg);
    let uuid = arg(uuid);
    let name = match g.work.lvs.iter().find(|lv| lv.uuid == uuid) {
        Some(lv) => lv.name.clone(),
        None => {
            set_err(
                &mut *g.lvm,
                ENOENT,
                &format!("Logical volume uuid \"{}\" not found", uuid),
            );
            return ptr::null_mut();
        }
    };
    let vg_ptr = g as *mut VgHandle;
    g.lv_handles.push(Box::new(LvHandle {
        vg: vg_ptr,
        name,
        retained: Vec::new(),
    }));
    (&mut **g.lv_handles.last_mut().unwrap() as *mut LvHandle) as lv_t
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_from_name(vg: vg_t, name: *const c_char) -> pv_t {
    let g = group(vg);
    let name = arg(name);
    match g.work.pvs.iter().find(|pv| pv.name == name) {
        Some(spec) => {
            g.pv_handles.push(Box::new(PvHandle::from_spec(spec)));
            (&mut **g.pv_handles.last_mut().unwrap() as *mut PvHandle) as pv_t
        }
        None => {
            set_err(
                &mut *g.lvm,
                ENOENT,
                &format!("Physical volume \"{}\" not found", name),
            );
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_from_uuid(vg: vg_t, uuid: *const c_char) -> pv_t {
    let g = group(vg);
    let uuid = arg(uuid);
    match g.work.pvs.iter().find(|pv| pv.uuid == uuid) {
        Some(spec) => {
            g.pv_handles.push(Box::new(PvHandle::from_spec(spec)));
            (&mut **g.pv_handles.last_mut().unwrap() as *mut PvHandle) as pv_t
        }
        None => {
            set_err(
                &mut *g.lvm,
                ENOENT,
                &format!("Physical volume uuid \"{}\" not found", uuid),
            );
            ptr::null_mut()
        }
    }
}

// ---- physical volume getters ----

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_get_name(pv: pv_t) -> *const c_char {
    physical(pv).name.as_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_get_uuid(pv: pv_t) -> *const c_char {
    physical(pv).uuid.as_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_get_mda_count(pv: pv_t) -> u64 {
    physical(pv).mda_count
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_get_dev_size(pv: pv_t) -> u64 {
    physical(pv).dev_size
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_get_size(pv: pv_t) -> u64 {
    physical(pv).size
}

#[no_mangle]
pub unsafe extern "C" fn lvm_pv_get_free(pv: pv_t) -> u64 {
    physical(pv).free
}

// ---- logical volume getters and mutators ----

unsafe fn lv_spec<'a>(h: &LvHandle) -> &'a LvSpec {
    (*h.vg)
        .work
        .lvs
        .iter()
        .find(|lv| lv.name == h.name)
        .expect("mock LV handle outlived its logical volume")
}

unsafe fn lv_spec_mut<'a>(h: &LvHandle) -> &'a mut LvSpec {
    (*h.vg)
        .work
        .lvs
        .iter_mut()
        .find(|lv| lv.name == h.name)
        .expect("mock LV handle outlived its logical volume")
}

/// Propagate kernel-state changes (activation) to the committed store
/// without committing pending metadata edits.
fn sync_lv_state(vg_name: &str, lv_name: &str, active: bool) {
    let mut st = lock_store();
    if let Some(vg) = st.vg_mut(vg_name) {
        if let Some(lv) = vg.lvs.iter_mut().find(|lv| lv.name == lv_name) {
            lv.active = active;
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_get_name(lv: lv_t) -> *const c_char {
    let h = logical(lv);
    let name = lv_spec(h).name.clone();
    retain(&mut h.retained, &name)
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_get_uuid(lv: lv_t) -> *const c_char {
    let h = logical(lv);
    let uuid = lv_spec(h).uuid.clone();
    retain(&mut h.retained, &uuid)
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_get_size(lv: lv_t) -> u64 {
    lv_spec(logical(lv)).size
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_get_attr(lv: lv_t) -> *const c_char {
    let h = logical(lv);
    let spec = lv_spec(h);
    let attr = format!(
        "{}wi{}{}-----",
        if spec.origin.is_some() { 's' } else { '-' },
        if spec.active { 'a' } else { '-' },
        if spec.suspended { 's' } else { '-' },
    );
    retain(&mut h.retained, &attr)
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_get_origin(lv: lv_t) -> *const c_char {
    let h = logical(lv);
    match lv_spec(h).origin.clone() {
        Some(origin) => retain(&mut h.retained, &origin),
        None => ptr::null(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_is_active(lv: lv_t) -> u64 {
    lv_spec(logical(lv)).active as u64
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_is_suspended(lv: lv_t) -> u64 {
    lv_spec(logical(lv)).suspended as u64
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_activate(lv: lv_t) -> c_int {
    let h = logical(lv);
    if injected(&mut *(*h.vg).lvm) {
        return -1;
    }
    let spec = lv_spec_mut(h);
    spec.active = true;
    let vg_name = (*h.vg).work.name.clone();
    sync_lv_state(&vg_name, &h.name, true);
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_lv_deactivate(lv: lv_t) -> c_int {
    let h = logical(lv);
    if injected(&mut *(*h.vg).lvm) {
        return -1;
    }
    let spec = lv_spec_mut(h);
    spec.active = false;
    let vg_name = (*h.vg).work.name.clone();
    sync_lv_state(&vg_name, &h.name, false);
    0
}

#[no_mangle]
pub unsafe extern "C" fn lvm_vg_remove_lv(lv: lv_t) -> c_int {
    let h = logical(lv);
    let g = &mut *h.vg;
    if injected(&mut *g.lvm) {
        return -1;
    }
    if !require_write(g) {
        return -1;
    }
    let idx = match g.work.lvs.iter().position(|s| s.name == h.name) {
        Some(idx) => idx,
        None => {
            set_err(&mut *g.lvm, ENOENT, "Logical volume not found");
            return -1;
        }
    };
    let spec = g.work.lvs.remove(idx);
    g.work.free_extent_count += spec.extents();
    g.work.seqno += 1;
    // Removal commits without a separate write call, like creation.
    commit(&g.work);
    0
}
