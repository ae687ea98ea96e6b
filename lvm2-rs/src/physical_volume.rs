use std::marker::PhantomData;

use crate::dm_list::{decode_cstr, DmListIter};
use crate::error::LvmResult;

/// A physical volume view.
///
/// The native handle is owned by the parent (the session for [`PvList`],
/// the volume group for VG listings and lookups); this wrapper never frees
/// it and cannot outlive the parent. Attributes are read-only snapshots
/// valid while the owning handle stays open.
#[derive(Debug)]
pub struct PhysicalVolume<'a> {
    handle: lvm2_sys::pv_t,
    _parent: PhantomData<&'a ()>,
}

impl PhysicalVolume<'_> {
    pub(crate) fn from_handle(handle: lvm2_sys::pv_t) -> Self {
        PhysicalVolume {
            handle,
            _parent: PhantomData,
        }
    }

    pub fn name(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_pv_get_name(self.handle)) }
    }

    pub fn uuid(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_pv_get_uuid(self.handle)) }
    }

    /// Number of metadata areas on the PV.
    pub fn mda_count(&self) -> u64 {
        unsafe { lvm2_sys::lvm_pv_get_mda_count(self.handle) }
    }

    /// Size in bytes of the underlying device.
    pub fn dev_size(&self) -> u64 {
        unsafe { lvm2_sys::lvm_pv_get_dev_size(self.handle) }
    }

    /// Size in bytes of the physical volume.
    pub fn size(&self) -> u64 {
        unsafe { lvm2_sys::lvm_pv_get_size(self.handle) }
    }

    /// Unallocated space in bytes.
    pub fn free(&self) -> u64 {
        unsafe { lvm2_sys::lvm_pv_get_free(self.handle) }
    }
}

/// Session-scoped physical volume listing.
///
/// The engine ties the lifetime of the PV handles to the list itself, so the
/// list is kept alive for as long as any of the views are in use and the
/// single matching free call is issued when this is dropped.
#[derive(Debug)]
pub struct PvList<'a> {
    head: *mut lvm2_sys::dm_list,
    pvs: Vec<PhysicalVolume<'a>>,
}

impl<'a> PvList<'a> {
    /// # Safety
    ///
    /// `head` must be the list returned by `lvm_list_pvs` on a live session
    /// handle outliving `'a`; ownership of the list transfers to the result.
    pub(crate) unsafe fn from_head(head: *mut lvm2_sys::dm_list) -> Self {
        let mut pvs = Vec::new();
        for node in DmListIter::new(head) {
            let entry = node as *const lvm2_sys::lvm_pv_list;
            pvs.push(PhysicalVolume::from_handle((*entry).pv));
        }
        PvList { head, pvs }
    }

    pub fn as_slice(&self) -> &[PhysicalVolume<'a>] {
        &self.pvs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhysicalVolume<'a>> {
        self.pvs.iter()
    }

    pub fn len(&self) -> usize {
        self.pvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pvs.is_empty()
    }
}

impl Drop for PvList<'_> {
    fn drop(&mut self) {
        unsafe {
            lvm2_sys::lvm_list_pvs_free(self.head);
        }
    }
}
