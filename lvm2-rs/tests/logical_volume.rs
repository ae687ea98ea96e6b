//! Logical volume creation, lookup, activation and removal. LV changes are
//! committed by the engine immediately, without a volume group write.

use lvm2_mock_engine as mock;
use lvm2_rs::{Lvm, LvmError, VgMode};

#[test]
fn linear_creation_is_visible_without_a_write() {
    let _guard = mock::test_lock();
    mock::reset();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_create("vgtest").unwrap();

    let lv = vg.create_lv_linear("lv0", 100).unwrap();
    assert_eq!(lv.name().unwrap(), "lv0");
    assert_eq!(lv.size(), 100 * mock::EXTENT_SIZE);
    drop(lv);

    // Committed by the engine without an explicit vg write.
    let committed = mock::vg("vgtest").unwrap();
    assert_eq!(committed.lvs.len(), 1);
    assert_eq!(committed.lvs[0].name, "lv0");
    assert_eq!(committed.lvs[0].size, 100 * mock::EXTENT_SIZE);
    assert_eq!(
        committed.free_extent_count,
        mock::FRESH_VG_EXTENTS - 100
    );

    let names: Vec<String> = vg
        .logical_volumes()
        .unwrap()
        .iter()
        .map(|lv| lv.name().unwrap())
        .collect();
    assert_eq!(names, vec!["lv0"]);

    vg.close().unwrap();
}

#[test]
fn duplicate_creation_fails_with_engine_state() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadWrite, 0).unwrap();
    let err = vg.create_lv_linear("root", 8).unwrap_err();
    match err {
        LvmError::LvCreateError { name, errno, .. } => {
            assert_eq!(name, "root");
            assert_eq!(errno, libc::EEXIST);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    vg.close().unwrap();
}

#[test]
fn creation_beyond_free_space_fails() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadWrite, 0).unwrap();
    let err = vg
        .create_lv_linear("huge", vg.free_extent_count() + 1)
        .unwrap_err();
    assert!(matches!(err, LvmError::LvCreateError { errno, .. } if errno == libc::ENOSPC));
    vg.close().unwrap();
}

#[test]
fn lookup_by_name_and_uuid() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadOnly, 0).unwrap();

    let root = vg.lv_from_name("root").unwrap();
    assert_eq!(root.uuid().unwrap(), "lv-mock-root");
    assert_eq!(root.size(), 512 * mock::EXTENT_SIZE);

    let by_uuid = vg.lv_from_uuid("lv-mock-home").unwrap();
    assert_eq!(by_uuid.name().unwrap(), "home");

    let err = vg.lv_from_name("nope").unwrap_err();
    match err {
        LvmError::LookupError { name, errno, .. } => {
            assert_eq!(name, "nope");
            assert_eq!(errno, libc::ENOENT);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    vg.close().unwrap();
}

#[test]
fn snapshot_origin_is_optional() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadOnly, 0).unwrap();

    let snap = vg.lv_from_name("snap0").unwrap();
    assert_eq!(snap.origin().unwrap(), Some("root".to_string()));

    let root = vg.lv_from_name("root").unwrap();
    assert_eq!(root.origin().unwrap(), None);

    vg.close().unwrap();
}

#[test]
fn activation_changes_kernel_state_immediately() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadWrite, 0).unwrap();

    // A pending metadata edit must stay pending across the activation.
    vg.add_tag("pending").unwrap();

    let home = vg.lv_from_name("home").unwrap();
    assert!(!home.is_active());
    assert!(!home.is_suspended());

    home.activate().unwrap();
    assert!(home.is_active());
    let committed = mock::vg("vg0").unwrap();
    assert!(committed.lvs.iter().find(|lv| lv.name == "home").unwrap().active);
    assert!(committed.tags.is_empty());

    home.deactivate().unwrap();
    assert!(!home.is_active());
    let committed = mock::vg("vg0").unwrap();
    assert!(!committed.lvs.iter().find(|lv| lv.name == "home").unwrap().active);

    vg.close().unwrap();
}

#[test]
fn removal_is_committed_and_returns_extents() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadWrite, 0).unwrap();
    let free = vg.free_extent_count();

    let home = vg.lv_from_name("home").unwrap();
    home.remove().unwrap();

    assert_eq!(vg.free_extent_count(), free + 256);
    let committed = mock::vg("vg0").unwrap();
    assert!(committed.lvs.iter().all(|lv| lv.name != "home"));
    assert_eq!(committed.free_extent_count, free + 256);

    vg.close().unwrap();
}

#[test]
fn activation_failure_carries_engine_error_state() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadWrite, 0).unwrap();
    let home = vg.lv_from_name("home").unwrap();

    mock::fail_next(libc::EBUSY, "device mapper table busy");
    let err = home.activate().unwrap_err();
    match err {
        LvmError::CommandError { op, errno, msg } => {
            assert_eq!(op, "lvm_lv_activate");
            assert_eq!(errno, libc::EBUSY);
            assert_eq!(msg, "device mapper table busy");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    vg.close().unwrap();
}
