//! Physical volume enumeration at both scopes: the session-wide list that
//! must be freed exactly once, and the VG-owned listings that must not be.

use lvm2_mock_engine as mock;
use lvm2_rs::{Lvm, LvmError, VgMode};

#[test]
fn session_list_is_freed_exactly_once() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    {
        let pvs = lvm.physical_volumes().unwrap();
        assert_eq!(pvs.len(), 2);
        let mut names: Vec<String> = pvs.iter().map(|pv| pv.name().unwrap()).collect();
        names.sort();
        assert_eq!(names, vec!["/dev/sdb1", "/dev/sdc"]);
        // Entries stay valid for the whole lifetime of the list.
        assert_eq!(pvs.as_slice()[0].mda_count(), 1);
        assert_eq!(mock::counters().pv_list_free, 0);
    }
    assert_eq!(mock::counters().pv_list_free, 1);
}

#[test]
fn empty_session_list_is_ok_and_still_freed() {
    let _guard = mock::test_lock();
    mock::reset();

    let lvm = Lvm::init(None).unwrap();
    {
        let pvs = lvm.physical_volumes().unwrap();
        assert!(pvs.is_empty());
    }
    assert_eq!(mock::counters().pv_list_free, 1);
}

#[test]
fn session_list_failure_maps_to_list_error() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    mock::fail_next(libc::EIO, "scan failed");
    let err = lvm.physical_volumes().unwrap_err();
    match err {
        LvmError::ListError { op, errno, msg } => {
            assert_eq!(op, "lvm_list_pvs");
            assert_eq!(errno, libc::EIO);
            assert_eq!(msg, "scan failed");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // A failed listing allocates nothing and frees nothing.
    assert_eq!(mock::counters().pv_list_free, 0);
}

#[test]
fn vg_owned_listing_and_lookups() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadOnly, 0).unwrap();

    let pvs = vg.physical_volumes().unwrap();
    assert_eq!(pvs.len(), 1);
    assert_eq!(pvs[0].name().unwrap(), "/dev/sdb1");
    assert_eq!(pvs[0].uuid().unwrap(), "pv-mock-sdb1");
    assert_eq!(pvs[0].size(), mock::FRESH_VG_EXTENTS * mock::EXTENT_SIZE);
    assert_eq!(pvs[0].dev_size(), mock::FRESH_VG_EXTENTS * mock::EXTENT_SIZE);

    let pv = vg.pv_from_name("/dev/sdb1").unwrap();
    assert_eq!(pv.uuid().unwrap(), "pv-mock-sdb1");
    let pv = vg.pv_from_uuid("pv-mock-sdb1").unwrap();
    assert_eq!(pv.name().unwrap(), "/dev/sdb1");

    let err = vg.pv_from_name("/dev/sdz").unwrap_err();
    assert!(matches!(err, LvmError::LookupError { errno, .. } if errno == libc::ENOENT));

    vg.close().unwrap();
    // VG-owned lists are released with the VG handle, never separately.
    assert_eq!(mock::counters().pv_list_free, 0);
}

#[test]
fn group_without_volumes_lists_empty() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_vg(mock::VgSpec::new("bare", "vg-mock-bare"));

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("bare", VgMode::ReadOnly, 0).unwrap();
    assert!(vg.physical_volumes().unwrap().is_empty());
    assert!(vg.logical_volumes().unwrap().is_empty());
    vg.close().unwrap();
}

#[test]
fn orphan_pvs_are_created_and_removed_at_session_scope() {
    let _guard = mock::test_lock();
    mock::reset();

    let lvm = Lvm::init(None).unwrap();
    lvm.pv_create("/dev/sdd", 0).unwrap();
    {
        let pvs = lvm.physical_volumes().unwrap();
        assert_eq!(pvs.len(), 1);
        assert_eq!(pvs.iter().next().unwrap().name().unwrap(), "/dev/sdd");
    }

    lvm.pv_remove("/dev/sdd").unwrap();
    let err = lvm.pv_remove("/dev/sdd").unwrap_err();
    assert!(matches!(err, LvmError::CommandError { errno, .. } if errno == libc::ENOENT));
}
