use crate::dm_list::decode_cstr;
use crate::error::LvmResult;
use crate::volume_group::VolumeGroup;

/// A logical volume within an open volume group.
///
/// The native handle is owned by the parent volume group and freed with it;
/// this wrapper never issues a release of its own. Activation state is
/// kernel state: [`LogicalVolume::activate`] and
/// [`LogicalVolume::deactivate`] take effect immediately, as does
/// [`LogicalVolume::remove`], without a `VolumeGroup::write`.
#[derive(Debug)]
pub struct LogicalVolume<'a> {
    handle: lvm2_sys::lv_t,
    vg: &'a VolumeGroup<'a>,
}

impl<'a> LogicalVolume<'a> {
    pub(crate) fn from_handle(handle: lvm2_sys::lv_t, vg: &'a VolumeGroup<'a>) -> Self {
        LogicalVolume { handle, vg }
    }

    pub fn name(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_lv_get_name(self.handle)) }
    }

    pub fn uuid(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_lv_get_uuid(self.handle)) }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        unsafe { lvm2_sys::lvm_lv_get_size(self.handle) }
    }

    /// lvs-style attribute string.
    pub fn attr(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_lv_get_attr(self.handle)) }
    }

    /// Origin LV name when this volume is a snapshot, `None` otherwise.
    /// The engine reports "not a snapshot" as an absent string, which is not
    /// collapsed into an empty name here.
    pub fn origin(&self) -> LvmResult<Option<String>> {
        let ptr = unsafe { lvm2_sys::lvm_lv_get_origin(self.handle) };
        if ptr.is_null() {
            Ok(None)
        } else {
            unsafe { decode_cstr(ptr) }.map(Some)
        }
    }

    /// Whether the LV is active in the kernel.
    pub fn is_active(&self) -> bool {
        unsafe { lvm2_sys::lvm_lv_is_active(self.handle) == 1 }
    }

    /// Whether the LV is suspended in the kernel.
    pub fn is_suspended(&self) -> bool {
        unsafe { lvm2_sys::lvm_lv_is_suspended(self.handle) == 1 }
    }

    /// Activate the LV, the equivalent of `lvchange -ay`.
    pub fn activate(&self) -> LvmResult<()> {
        let rc = unsafe { lvm2_sys::lvm_lv_activate(self.handle) };
        self.vg.lvm().check("lvm_lv_activate", rc)
    }

    /// Deactivate the LV, the equivalent of `lvchange -an`.
    pub fn deactivate(&self) -> LvmResult<()> {
        let rc = unsafe { lvm2_sys::lvm_lv_deactivate(self.handle) };
        self.vg.lvm().check("lvm_lv_deactivate", rc)
    }

    /// Remove the LV from its volume group. Committed immediately by the
    /// engine; consumes the wrapper since the handle is gone afterwards.
    pub fn remove(self) -> LvmResult<()> {
        let rc = unsafe { lvm2_sys::lvm_vg_remove_lv(self.handle) };
        self.vg.lvm().check("lvm_vg_remove_lv", rc)
    }
}
