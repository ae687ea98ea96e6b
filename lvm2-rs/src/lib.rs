//! Safe bindings for the LVM2 application library.
//!
//! The API mirrors the shape of liblvm2app: a session handle ([`Lvm`]) is
//! opened first and provides the error state for every other call; volume
//! groups ([`VolumeGroup`]) are opened or created from it, and physical and
//! logical volumes ([`PhysicalVolume`], [`LogicalVolume`]) are enumerated or
//! looked up within an open volume group. All volume management logic lives
//! in the engine; this layer contributes lifecycle safety (every native
//! handle is released exactly once, on every exit path), translation of the
//! engine's circular `dm_list` results into `Vec`s, and translation of
//! native return codes into structured errors.
//!
//! Parent/child validity is expressed through borrows: a `VolumeGroup`
//! borrows its `Lvm`, and PV/LV wrappers borrow their `VolumeGroup`, so a
//! child handle cannot be used once its parent is gone. The engine's
//! single-threaded contract for a session handle is inherited: the wrapper
//! types hold raw handles and are not `Send` or `Sync`.
//!
//! Mutating calls follow the engine's commit model: metadata changes (tags,
//! extent size, extend/reduce, VG removal) require [`VolumeGroup::write`],
//! while LV creation, removal and (de)activation are committed immediately.

mod dm_list;
mod error;
mod logical_volume;
mod lvm;
mod physical_volume;
mod volume_group;

pub use crate::error::{LvmError, LvmResult};
pub use crate::logical_volume::LogicalVolume;
pub use crate::lvm::Lvm;
pub use crate::physical_volume::{PhysicalVolume, PvList};
pub use crate::volume_group::{VgMode, VolumeGroup};

// Unit tests link the lvm_* symbols from the in-process mock engine.
#[cfg(test)]
use lvm2_mock_engine as _;
