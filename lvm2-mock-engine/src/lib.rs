//! An in-process stand-in for the lvm2app engine.
//!
//! Exports every `lvm_*` symbol the bindings link against, backed by an
//! in-memory store instead of real block devices, so the binding crate's
//! tests run without LVM installed or root privileges. The public surface
//! of this crate is the test harness side: seeding disk state, injecting
//! faults, and reading back lifecycle counters and committed state.
//!
//! The store is process-global; tests hold [`test_lock`] and call [`reset`]
//! before seeding so scenarios do not interleave.

mod engine;
mod list;
mod store;

pub use crate::store::{
    counters, fail_next, reset, seed_default, seed_tag_bytes, seed_vg, test_lock, vg, Counters,
    LvSpec, PvSpec, VgSpec, EXTENT_SIZE, FRESH_VG_EXTENTS,
};
