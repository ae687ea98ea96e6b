//! The in-memory "disk state" behind the mock engine, plus the knobs the
//! tests turn: seeding, fault injection and lifecycle counters.

use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

pub const EXTENT_SIZE: u64 = 4 * 1024 * 1024;

/// Extents granted to a freshly created volume group. The mock engine does
/// not model devices behind `lvm_vg_create`, so new groups start with a
/// fixed capacity instead of zero.
pub const FRESH_VG_EXTENTS: u64 = 2560;

#[derive(Debug, Clone)]
pub struct PvSpec {
    pub name: String,
    pub uuid: String,
    pub mda_count: u64,
    pub dev_size: u64,
    pub size: u64,
    pub free: u64,
}

impl PvSpec {
    pub fn new(name: &str, uuid: &str, size: u64) -> Self {
        PvSpec {
            name: name.to_string(),
            uuid: uuid.to_string(),
            mda_count: 1,
            dev_size: size,
            size,
            free: size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LvSpec {
    pub name: String,
    pub uuid: String,
    /// Size in bytes, always a whole number of extents.
    pub size: u64,
    pub active: bool,
    pub suspended: bool,
    pub origin: Option<String>,
}

impl LvSpec {
    pub fn new(name: &str, uuid: &str, extents: u64) -> Self {
        LvSpec {
            name: name.to_string(),
            uuid: uuid.to_string(),
            size: extents * EXTENT_SIZE,
            active: true,
            suspended: false,
            origin: None,
        }
    }

    pub fn extents(&self) -> u64 {
        self.size / EXTENT_SIZE
    }
}

#[derive(Debug, Clone)]
pub struct VgSpec {
    pub name: String,
    pub uuid: String,
    pub seqno: u64,
    pub extent_size: u64,
    pub extent_count: u64,
    pub free_extent_count: u64,
    pub max_pv: u64,
    pub max_lv: u64,
    pub clustered: bool,
    pub exported: bool,
    pub partial: bool,
    /// Raw tag bytes; not forced to be valid text so decode failures can be
    /// provoked.
    pub tags: Vec<Vec<u8>>,
    pub pvs: Vec<PvSpec>,
    pub lvs: Vec<LvSpec>,
}

impl VgSpec {
    pub fn new(name: &str, uuid: &str) -> Self {
        VgSpec {
            name: name.to_string(),
            uuid: uuid.to_string(),
            seqno: 1,
            extent_size: EXTENT_SIZE,
            extent_count: FRESH_VG_EXTENTS,
            free_extent_count: FRESH_VG_EXTENTS,
            max_pv: 0,
            max_lv: 0,
            clustered: false,
            exported: false,
            partial: false,
            tags: Vec::new(),
            pvs: Vec::new(),
            lvs: Vec::new(),
        }
    }
}

/// Lifecycle call counts, for asserting the exactly-once release rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counters {
    pub init: usize,
    pub quit: usize,
    pub vg_open: usize,
    pub vg_close: usize,
    pub pv_list_free: usize,
}

#[derive(Default)]
pub(crate) struct Store {
    pub vgs: Vec<VgSpec>,
    /// PVs initialized with lvm_pv_create but not yet in any group.
    pub orphan_pvs: Vec<PvSpec>,
    pub counters: Counters,
    pub fail_next: Option<(i32, String)>,
    pub uuid_counter: u64,
}

impl Store {
    pub fn next_uuid(&mut self, kind: &str) -> String {
        self.uuid_counter += 1;
        format!("{}-mock-{:06}", kind, self.uuid_counter)
    }

    pub fn vg_mut(&mut self, name: &str) -> Option<&mut VgSpec> {
        self.vgs.iter_mut().find(|vg| vg.name == name)
    }
}

pub(crate) static STORE: Lazy<Mutex<Store>> = Lazy::new(|| Mutex::new(Store::default()));

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub(crate) fn lock_store() -> MutexGuard<'static, Store> {
    STORE.lock().unwrap_or_else(|e| e.into_inner())
}

/// Serialize tests that share the global store. Each test taking the guard
/// gets the engine to itself for its whole scenario.
pub fn test_lock() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Clear the store, the counters and any pending fault.
pub fn reset() {
    let mut st = lock_store();
    *st = Store::default();
}

/// Seed the canonical test layout: one volume group `vg0` with a PV, three
/// LVs (one a snapshot of `root`) and one orphan PV.
pub fn seed_default() {
    let mut st = lock_store();

    let mut vg0 = VgSpec::new("vg0", "vg-mock-vg0");
    vg0.pvs.push(PvSpec::new(
        "/dev/sdb1",
        "pv-mock-sdb1",
        FRESH_VG_EXTENTS * EXTENT_SIZE,
    ));
    let mut root = LvSpec::new("root", "lv-mock-root", 512);
    root.active = true;
    let mut home = LvSpec::new("home", "lv-mock-home", 256);
    home.active = false;
    let mut snap = LvSpec::new("snap0", "lv-mock-snap0", 64);
    snap.origin = Some("root".to_string());
    vg0.lvs.push(root);
    vg0.lvs.push(home);
    vg0.lvs.push(snap);
    vg0.free_extent_count = FRESH_VG_EXTENTS - (512 + 256 + 64);
    st.vgs.push(vg0);

    st.orphan_pvs
        .push(PvSpec::new("/dev/sdc", "pv-mock-sdc", 1024 * EXTENT_SIZE));
}

/// Insert a volume group as committed disk state.
pub fn seed_vg(vg: VgSpec) {
    lock_store().vgs.push(vg);
}

/// Attach raw tag bytes to a committed volume group.
pub fn seed_tag_bytes(vg: &str, bytes: &[u8]) {
    let mut st = lock_store();
    let vg = st.vg_mut(vg).expect("no such vg in mock store");
    vg.tags.push(bytes.to_vec());
}

/// Make the next engine call fail with this errno/message pair.
pub fn fail_next(errno: i32, msg: &str) {
    lock_store().fail_next = Some((errno, msg.to_string()));
}

pub fn counters() -> Counters {
    lock_store().counters
}

/// Committed state of a volume group, if present.
pub fn vg(name: &str) -> Option<VgSpec> {
    lock_store().vgs.iter().find(|vg| vg.name == name).cloned()
}
