use std::mem::ManuallyDrop;

use tracing::warn;

use crate::dm_list::{decode_cstr, decode_str_list, DmListIter};
use crate::error::{LookupError, LvCreateError, LvmResult, VgCreateError, VgOpenError};
use crate::logical_volume::LogicalVolume;
use crate::lvm::{to_cstring, Lvm};
use crate::physical_volume::PhysicalVolume;

/// Access mode fixed when a volume group is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VgMode {
    ReadOnly,
    ReadWrite,
}

impl VgMode {
    fn as_ptr(self) -> *const libc::c_char {
        match self {
            VgMode::ReadOnly => b"r\0".as_ptr() as *const libc::c_char,
            VgMode::ReadWrite => b"w\0".as_ptr() as *const libc::c_char,
        }
    }
}

/// An open volume group handle.
///
/// Obtained from [`Lvm::vg_open`] or [`Lvm::vg_create`] and closed exactly
/// once: either explicitly through [`VolumeGroup::close`], which surfaces the
/// engine's close status, or on drop. PV and LV wrappers borrow this handle
/// and are freed by the engine together with it; they never release anything
/// themselves.
///
/// Metadata mutations (tags, extent size, extend/reduce, [`VolumeGroup::remove`])
/// only reach disk after [`VolumeGroup::write`]. LV creation and removal are
/// committed immediately by the engine; that asymmetry is the engine's
/// documented behavior and is preserved here.
///
/// Closing consumes the wrapper, so a handle cannot be used after close:
///
/// ```compile_fail
/// use lvm2_rs::{Lvm, VgMode};
///
/// let lvm = Lvm::init(None).unwrap();
/// let vg = lvm.vg_open("vg0", VgMode::ReadOnly, 0).unwrap();
/// vg.close().unwrap();
/// vg.name().unwrap(); // error: vg was moved by close()
/// ```
#[derive(Debug)]
pub struct VolumeGroup<'a> {
    handle: lvm2_sys::vg_t,
    lvm: &'a Lvm,
}

impl<'a> VolumeGroup<'a> {
    pub(crate) fn open(lvm: &'a Lvm, name: &str, mode: VgMode, flags: u32) -> LvmResult<Self> {
        let cname = to_cstring(name)?;
        let handle =
            unsafe { lvm2_sys::lvm_vg_open(lvm.raw(), cname.as_ptr(), mode.as_ptr(), flags) };
        if handle.is_null() {
            // Acquisition failed, there is nothing to close.
            let (errno, msg) = lvm.error_state();
            return VgOpenError { name, errno, msg }.fail();
        }
        Ok(VolumeGroup { handle, lvm })
    }

    pub(crate) fn create(lvm: &'a Lvm, name: &str) -> LvmResult<Self> {
        let cname = to_cstring(name)?;
        let handle = unsafe { lvm2_sys::lvm_vg_create(lvm.raw(), cname.as_ptr()) };
        if handle.is_null() {
            let (errno, msg) = lvm.error_state();
            return VgCreateError { name, errno, msg }.fail();
        }
        Ok(VolumeGroup { handle, lvm })
    }

    pub(crate) fn lvm(&self) -> &'a Lvm {
        self.lvm
    }

    pub(crate) fn raw(&self) -> lvm2_sys::vg_t {
        self.handle
    }

    pub fn name(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_vg_get_name(self.handle)) }
    }

    pub fn uuid(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_vg_get_uuid(self.handle)) }
    }

    /// Metadata sequence number, incremented by the engine on each committed
    /// metadata change.
    pub fn seqno(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_seqno(self.handle) }
    }

    /// Total size in bytes.
    pub fn size(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_size(self.handle) }
    }

    /// Unallocated space in bytes.
    pub fn free_size(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_free_size(self.handle) }
    }

    /// Extent size in bytes.
    pub fn extent_size(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_extent_size(self.handle) }
    }

    pub fn extent_count(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_extent_count(self.handle) }
    }

    pub fn free_extent_count(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_free_extent_count(self.handle) }
    }

    pub fn pv_count(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_pv_count(self.handle) }
    }

    pub fn max_pv(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_max_pv(self.handle) }
    }

    pub fn max_lv(&self) -> u64 {
        unsafe { lvm2_sys::lvm_vg_get_max_lv(self.handle) }
    }

    pub fn is_clustered(&self) -> bool {
        unsafe { lvm2_sys::lvm_vg_is_clustered(self.handle) == 1 }
    }

    pub fn is_exported(&self) -> bool {
        unsafe { lvm2_sys::lvm_vg_is_exported(self.handle) == 1 }
    }

    pub fn is_partial(&self) -> bool {
        unsafe { lvm2_sys::lvm_vg_is_partial(self.handle) == 1 }
    }

    /// Tags attached to the volume group. The native list is owned by the
    /// VG handle and is not freed here.
    pub fn tags(&self) -> LvmResult<Vec<String>> {
        let head = unsafe { lvm2_sys::lvm_vg_get_tags(self.handle) };
        if head.is_null() {
            return self.lvm.list_error("lvm_vg_get_tags");
        }
        unsafe { decode_str_list(head) }
    }

    /// Set the extent size in bytes. Takes effect on disk after
    /// [`VolumeGroup::write`].
    pub fn set_extent_size(&self, new_size: u32) -> LvmResult<()> {
        let rc = unsafe { lvm2_sys::lvm_vg_set_extent_size(self.handle, new_size) };
        self.lvm.check("lvm_vg_set_extent_size", rc)
    }

    /// Add a tag. Requires [`VolumeGroup::write`] to persist.
    pub fn add_tag(&self, tag: &str) -> LvmResult<()> {
        let tag = to_cstring(tag)?;
        let rc = unsafe { lvm2_sys::lvm_vg_add_tag(self.handle, tag.as_ptr()) };
        self.lvm.check("lvm_vg_add_tag", rc)
    }

    /// Remove a tag. Requires [`VolumeGroup::write`] to persist.
    pub fn remove_tag(&self, tag: &str) -> LvmResult<()> {
        let tag = to_cstring(tag)?;
        let rc = unsafe { lvm2_sys::lvm_vg_remove_tag(self.handle, tag.as_ptr()) };
        self.lvm.check("lvm_vg_remove_tag", rc)
    }

    /// Commit the in-memory volume group metadata to disk.
    pub fn write(&self) -> LvmResult<()> {
        let rc = unsafe { lvm2_sys::lvm_vg_write(self.handle) };
        self.lvm.check("lvm_vg_write", rc)
    }

    /// Mark the volume group for removal. The removal reaches disk on
    /// [`VolumeGroup::write`].
    pub fn remove(&self) -> LvmResult<()> {
        let rc = unsafe { lvm2_sys::lvm_vg_remove(self.handle) };
        self.lvm.check("lvm_vg_remove", rc)
    }

    /// Extend the volume group with a device.
    pub fn extend(&self, device: &str) -> LvmResult<()> {
        let device = to_cstring(device)?;
        let rc = unsafe { lvm2_sys::lvm_vg_extend(self.handle, device.as_ptr()) };
        self.lvm.check("lvm_vg_extend", rc)
    }

    /// Remove an unused device from the volume group.
    pub fn reduce(&self, device: &str) -> LvmResult<()> {
        let device = to_cstring(device)?;
        let rc = unsafe { lvm2_sys::lvm_vg_reduce(self.handle, device.as_ptr()) };
        self.lvm.check("lvm_vg_reduce", rc)
    }

    /// Physical volumes backing this volume group. The native list is owned
    /// by the VG handle; the returned wrappers borrow this handle.
    pub fn physical_volumes(&self) -> LvmResult<Vec<PhysicalVolume<'_>>> {
        let head = unsafe { lvm2_sys::lvm_vg_list_pvs(self.handle) };
        if head.is_null() {
            // The engine returns no list for a VG without PVs.
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        unsafe {
            for node in DmListIter::new(head) {
                let entry = node as *const lvm2_sys::lvm_pv_list;
                out.push(PhysicalVolume::from_handle((*entry).pv));
            }
        }
        Ok(out)
    }

    /// Logical volumes allocated in this volume group.
    pub fn logical_volumes(&self) -> LvmResult<Vec<LogicalVolume<'_>>> {
        let head = unsafe { lvm2_sys::lvm_vg_list_lvs(self.handle) };
        if head.is_null() {
            // No LVs yet; the engine hands back no list rather than an
            // empty one.
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        unsafe {
            for node in DmListIter::new(head) {
                let entry = node as *const lvm2_sys::lvm_lv_list;
                out.push(LogicalVolume::from_handle((*entry).lv, self));
            }
        }
        Ok(out)
    }

    /// Look up a logical volume by name.
    pub fn lv_from_name(&self, name: &str) -> LvmResult<LogicalVolume<'_>> {
        let cname = to_cstring(name)?;
        let handle = unsafe { lvm2_sys::lvm_lv_from_name(self.handle, cname.as_ptr()) };
        if handle.is_null() {
            let (errno, msg) = self.lvm.error_state();
            return LookupError { name, errno, msg }.fail();
        }
        Ok(LogicalVolume::from_handle(handle, self))
    }

    /// Look up a logical volume by UUID.
    pub fn lv_from_uuid(&self, uuid: &str) -> LvmResult<LogicalVolume<'_>> {
        let cuuid = to_cstring(uuid)?;
        let handle = unsafe { lvm2_sys::lvm_lv_from_uuid(self.handle, cuuid.as_ptr()) };
        if handle.is_null() {
            let (errno, msg) = self.lvm.error_state();
            return LookupError { name: uuid, errno, msg }.fail();
        }
        Ok(LogicalVolume::from_handle(handle, self))
    }

    /// Look up a physical volume by name.
    pub fn pv_from_name(&self, name: &str) -> LvmResult<PhysicalVolume<'_>> {
        let cname = to_cstring(name)?;
        let handle = unsafe { lvm2_sys::lvm_pv_from_name(self.handle, cname.as_ptr()) };
        if handle.is_null() {
            let (errno, msg) = self.lvm.error_state();
            return LookupError { name, errno, msg }.fail();
        }
        Ok(PhysicalVolume::from_handle(handle))
    }

    /// Look up a physical volume by UUID.
    pub fn pv_from_uuid(&self, uuid: &str) -> LvmResult<PhysicalVolume<'_>> {
        let cuuid = to_cstring(uuid)?;
        let handle = unsafe { lvm2_sys::lvm_pv_from_uuid(self.handle, cuuid.as_ptr()) };
        if handle.is_null() {
            let (errno, msg) = self.lvm.error_state();
            return LookupError { name: uuid, errno, msg }.fail();
        }
        Ok(PhysicalVolume::from_handle(handle))
    }

    /// Create a linear logical volume of `extents` extents.
    ///
    /// The engine commits this immediately; no [`VolumeGroup::write`] is
    /// required and the new LV is visible in the listings at once.
    pub fn create_lv_linear(&self, name: &str, extents: u64) -> LvmResult<LogicalVolume<'_>> {
        let cname = to_cstring(name)?;
        let handle =
            unsafe { lvm2_sys::lvm_vg_create_lv_linear(self.handle, cname.as_ptr(), extents) };
        if handle.is_null() {
            let (errno, msg) = self.lvm.error_state();
            return LvCreateError { name, errno, msg }.fail();
        }
        Ok(LogicalVolume::from_handle(handle, self))
    }

    /// Close the volume group and surface the engine's close status.
    ///
    /// Dropping the wrapper closes it as well; the explicit form exists for
    /// callers that need the failure.
    pub fn close(self) -> LvmResult<()> {
        let vg = ManuallyDrop::new(self);
        let rc = unsafe { lvm2_sys::lvm_vg_close(vg.handle) };
        vg.lvm.check("lvm_vg_close", rc)
    }
}

impl Drop for VolumeGroup<'_> {
    fn drop(&mut self) {
        let rc = unsafe { lvm2_sys::lvm_vg_close(self.handle) };
        if rc != 0 {
            let (errno, msg) = self.lvm.error_state();
            warn!(errno, %msg, "lvm_vg_close failed");
        }
    }
}
