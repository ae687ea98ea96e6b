//! Session-level calls: version, scan, configuration and raw error state.

use lvm2_mock_engine as mock;
use lvm2_rs::{Lvm, LvmError};

#[test]
fn library_version_is_readable() {
    let _guard = mock::test_lock();
    mock::reset();

    let lvm = Lvm::init(None).unwrap();
    assert!(lvm.library_version().unwrap().starts_with("2.02"));
}

#[test]
fn scan_propagates_engine_failure() {
    let _guard = mock::test_lock();
    mock::reset();

    let lvm = Lvm::init(None).unwrap();
    lvm.scan().unwrap();

    mock::fail_next(libc::EIO, "device scan failed");
    let err = lvm.scan().unwrap_err();
    match err {
        LvmError::CommandError { op, errno, msg } => {
            assert_eq!(op, "lvm_scan");
            assert_eq!(errno, libc::EIO);
            assert_eq!(msg, "device scan failed");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // The raw error state on the session matches what the error carried.
    assert_eq!(lvm.errno(), libc::EIO);
    assert_eq!(lvm.errmsg().unwrap(), "device scan failed");
}

#[test]
fn configuration_calls_succeed_and_fall_back() {
    let _guard = mock::test_lock();
    mock::reset();

    let lvm = Lvm::init(None).unwrap();
    lvm.config_reload().unwrap();
    lvm.config_override("global { }").unwrap();
    // Unknown paths fall back to the caller's default.
    assert!(lvm.config_find_bool("global/missing", true).unwrap());
    assert!(!lvm.config_find_bool("global/missing", false).unwrap());
}
