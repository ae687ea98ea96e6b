//! Handle lifecycle: every native handle is released exactly once, on every
//! exit path, and never when acquisition failed.

use lvm2_mock_engine as mock;
use lvm2_rs::{Lvm, LvmError, VgMode};

#[test]
fn session_is_released_on_drop() {
    let _guard = mock::test_lock();
    mock::reset();

    {
        let _lvm = Lvm::init(None).unwrap();
    }

    let counters = mock::counters();
    assert_eq!(counters.init, 1);
    assert_eq!(counters.quit, 1);
}

#[test]
fn failed_init_surfaces_an_error() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::fail_next(libc::ENOMEM, "out of memory");

    let err = Lvm::init(None).unwrap_err();
    assert!(matches!(err, LvmError::InitError { .. }));
    assert_eq!(mock::counters().quit, 0);
}

#[test]
fn dropping_an_open_group_closes_it_once() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    {
        let _vg = lvm.vg_open("vg0", VgMode::ReadOnly, 0).unwrap();
    }

    let counters = mock::counters();
    assert_eq!(counters.vg_open, 1);
    assert_eq!(counters.vg_close, 1);
}

#[test]
fn explicit_close_counts_once_and_reports_status() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadOnly, 0).unwrap();
    vg.close().unwrap();

    assert_eq!(mock::counters().vg_close, 1);
}

#[test]
fn close_failure_is_surfaced_not_swallowed() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let vg = lvm.vg_open("vg0", VgMode::ReadOnly, 0).unwrap();

    mock::fail_next(libc::EIO, "metadata flush failed");
    let err = vg.close().unwrap_err();
    match err {
        LvmError::CommandError { op, errno, msg } => {
            assert_eq!(op, "lvm_vg_close");
            assert_eq!(errno, libc::EIO);
            assert_eq!(msg, "metadata flush failed");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn failed_open_issues_no_close() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    let err = lvm.vg_open("missing", VgMode::ReadOnly, 0).unwrap_err();
    match err {
        LvmError::VgOpenError { name, errno, .. } => {
            assert_eq!(name, "missing");
            assert_eq!(errno, libc::ENOENT);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let counters = mock::counters();
    assert_eq!(counters.vg_open, 0);
    assert_eq!(counters.vg_close, 0);
}

#[test]
fn injected_open_failure_carries_engine_error_state() {
    let _guard = mock::test_lock();
    mock::reset();
    mock::seed_default();

    let lvm = Lvm::init(None).unwrap();
    mock::fail_next(libc::EBUSY, "device held by another process");
    let err = lvm.vg_open("vg0", VgMode::ReadOnly, 0).unwrap_err();
    match err {
        LvmError::VgOpenError { errno, msg, .. } => {
            assert_eq!(errno, libc::EBUSY);
            assert_eq!(msg, "device held by another process");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(mock::counters().vg_close, 0);
}
