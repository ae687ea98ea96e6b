use std::ffi::CString;
use std::ptr;

use libc::c_int;
use snafu::ResultExt;

use crate::dm_list::{decode_cstr, decode_str_list};
use crate::error::{CommandError, InitError, ListError, LvmResult, StringWithNul};
use crate::physical_volume::PvList;
use crate::volume_group::{VgMode, VolumeGroup};

pub(crate) fn to_cstring(s: &str) -> LvmResult<CString> {
    CString::new(s).context(StringWithNul {})
}

/// The LVM session handle.
///
/// Owns the one top-level engine handle; all other wrapper types borrow it,
/// directly or through a [`VolumeGroup`], and therefore cannot outlive it.
/// The engine releases the session when this is dropped.
///
/// The engine does not support using one session handle from multiple
/// threads; this type holds a raw handle and is accordingly neither `Send`
/// nor `Sync`.
#[derive(Debug)]
pub struct Lvm {
    handle: lvm2_sys::lvm_t,
}

impl Lvm {
    /// Open an LVM session, optionally with a non-default system directory
    /// for the engine configuration.
    pub fn init(system_dir: Option<&str>) -> LvmResult<Lvm> {
        let dir = match system_dir {
            Some(d) => Some(to_cstring(d)?),
            None => None,
        };
        let handle = unsafe {
            lvm2_sys::lvm_init(dir.as_ref().map_or(ptr::null(), |d| d.as_ptr()))
        };
        if handle.is_null() {
            // No session exists to query, only the OS error is available.
            return Err(std::io::Error::last_os_error()).context(InitError {});
        }
        Ok(Lvm { handle })
    }

    pub(crate) fn raw(&self) -> lvm2_sys::lvm_t {
        self.handle
    }

    /// Error number of the last failed engine call on this session.
    ///
    /// The engine overwrites this on every call; read it immediately after a
    /// failure. The structured errors returned by this crate already carry
    /// the value captured at the moment of failure.
    pub fn errno(&self) -> i32 {
        unsafe { lvm2_sys::lvm_errno(self.handle) }
    }

    /// Message of the last failed engine call on this session.
    pub fn errmsg(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_errmsg(self.handle)) }
    }

    /// Snapshot of the session error state for error construction. Decoded
    /// lossily: a garbled message must not mask the engine failure that is
    /// being reported.
    pub(crate) fn error_state(&self) -> (i32, String) {
        let errno = unsafe { lvm2_sys::lvm_errno(self.handle) };
        let msg = unsafe {
            let ptr = lvm2_sys::lvm_errmsg(self.handle);
            if ptr.is_null() {
                String::new()
            } else {
                std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        };
        (errno, msg)
    }

    /// Translate an integer engine return code. Zero is success, anything
    /// else fails with the session error state.
    pub(crate) fn check(&self, op: &'static str, rc: c_int) -> LvmResult<()> {
        if rc == 0 {
            Ok(())
        } else {
            let (errno, msg) = self.error_state();
            CommandError { op, errno, msg }.fail()
        }
    }

    pub(crate) fn list_error<T>(&self, op: &'static str) -> LvmResult<T> {
        let (errno, msg) = self.error_state();
        ListError { op, errno, msg }.fail()
    }

    /// Version string of the loaded engine library.
    pub fn library_version(&self) -> LvmResult<String> {
        unsafe { decode_cstr(lvm2_sys::lvm_library_get_version()) }
    }

    /// Scan all devices on the system for VGs and LVM metadata. Blocks until
    /// the engine finishes the scan.
    pub fn scan(&self) -> LvmResult<()> {
        let rc = unsafe { lvm2_sys::lvm_scan(self.handle) };
        self.check("lvm_scan", rc)
    }

    /// Names of the volume groups known to the system.
    ///
    /// The list memory is owned by the session handle and is not freed here.
    /// This does not scan devices; use [`Lvm::scan`] first if needed.
    pub fn list_vg_names(&self) -> LvmResult<Vec<String>> {
        let head = unsafe { lvm2_sys::lvm_list_vg_names(self.handle) };
        if head.is_null() {
            return self.list_error("lvm_list_vg_names");
        }
        unsafe { decode_str_list(head) }
    }

    /// UUIDs of the volume groups known to the system.
    pub fn list_vg_uuids(&self) -> LvmResult<Vec<String>> {
        let head = unsafe { lvm2_sys::lvm_list_vg_uuids(self.handle) };
        if head.is_null() {
            return self.list_error("lvm_list_vg_uuids");
        }
        unsafe { decode_str_list(head) }
    }

    /// Volume group name for a PV UUID, or `None` when the PV is not part of
    /// a volume group.
    pub fn vg_name_from_pvid(&self, pvid: &str) -> LvmResult<Option<String>> {
        let pvid = to_cstring(pvid)?;
        let name = unsafe { lvm2_sys::lvm_vgname_from_pvid(self.handle, pvid.as_ptr()) };
        if name.is_null() {
            Ok(None)
        } else {
            unsafe { decode_cstr(name) }.map(Some)
        }
    }

    /// Volume group name for a device path, or `None` when the device is not
    /// an LVM device.
    pub fn vg_name_from_device(&self, device: &str) -> LvmResult<Option<String>> {
        let device = to_cstring(device)?;
        let name = unsafe { lvm2_sys::lvm_vgname_from_device(self.handle, device.as_ptr()) };
        if name.is_null() {
            Ok(None)
        } else {
            unsafe { decode_cstr(name) }.map(Some)
        }
    }

    /// Whether `name` is acceptable as a new volume group name.
    pub fn vg_name_validate(&self, name: &str) -> LvmResult<bool> {
        let name = to_cstring(name)?;
        let rc = unsafe { lvm2_sys::lvm_vg_name_validate(self.handle, name.as_ptr()) };
        Ok(rc == 0)
    }

    /// Reload the engine configuration from the system directory.
    pub fn config_reload(&self) -> LvmResult<()> {
        let rc = unsafe { lvm2_sys::lvm_config_reload(self.handle) };
        self.check("lvm_config_reload", rc)
    }

    /// Override the engine configuration with a configuration string in
    /// lvm.conf syntax.
    pub fn config_override(&self, config: &str) -> LvmResult<()> {
        let config = to_cstring(config)?;
        let rc = unsafe { lvm2_sys::lvm_config_override(self.handle, config.as_ptr()) };
        self.check("lvm_config_override", rc)
    }

    /// Boolean configuration value at `config_path`, or `fail` when the path
    /// is not found.
    pub fn config_find_bool(&self, config_path: &str, fail: bool) -> LvmResult<bool> {
        let path = to_cstring(config_path)?;
        let rc = unsafe {
            lvm2_sys::lvm_config_find_bool(self.handle, path.as_ptr(), fail as c_int)
        };
        Ok(rc == 1)
    }

    /// Initialize a device as a physical volume. A size of 0 uses the whole
    /// device.
    pub fn pv_create(&self, device: &str, size: u64) -> LvmResult<()> {
        let device = to_cstring(device)?;
        let rc = unsafe { lvm2_sys::lvm_pv_create(self.handle, device.as_ptr(), size) };
        self.check("lvm_pv_create", rc)
    }

    /// Remove a physical volume label from a device.
    pub fn pv_remove(&self, device: &str) -> LvmResult<()> {
        let device = to_cstring(device)?;
        let rc = unsafe { lvm2_sys::lvm_pv_remove(self.handle, device.as_ptr()) };
        self.check("lvm_pv_remove", rc)
    }

    /// All physical volumes visible to the session.
    ///
    /// Unlike the VG-owned listings this list must be released with a
    /// matching free call; the returned [`PvList`] holds the native list
    /// alive and issues that call exactly once when dropped.
    pub fn physical_volumes(&self) -> LvmResult<PvList<'_>> {
        let head = unsafe { lvm2_sys::lvm_list_pvs(self.handle) };
        if head.is_null() {
            return self.list_error("lvm_list_pvs");
        }
        Ok(unsafe { PvList::from_head(head) })
    }

    /// Open an existing volume group.
    ///
    /// `flags` is passed to the engine unchanged; no flags are currently
    /// defined by `lvm2app.h`.
    pub fn vg_open(&self, name: &str, mode: VgMode, flags: u32) -> LvmResult<VolumeGroup<'_>> {
        VolumeGroup::open(self, name, mode, flags)
    }

    /// Create a new volume group. The returned handle is read-write; the
    /// group reaches disk on [`VolumeGroup::write`].
    pub fn vg_create(&self, name: &str) -> LvmResult<VolumeGroup<'_>> {
        VolumeGroup::create(self, name)
    }
}

impl Drop for Lvm {
    fn drop(&mut self) {
        unsafe { lvm2_sys::lvm_quit(self.handle) }
    }
}
