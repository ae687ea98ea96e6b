use snafu::Snafu;

/// Failures surfaced by the binding layer.
///
/// Engine failures carry the errno/message pair read from the owning context
/// immediately after the failing call; the set of native error codes is
/// defined by the engine and is not classified here. Decode failures are
/// wrapper-level and never conflated with an engine error.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
#[snafu(visibility = "pub(crate)")]
pub enum LvmError {
    #[snafu(display("lvm_init failed: {}", source))]
    InitError { source: std::io::Error },
    #[snafu(display("Failed to open volume group {}: {} ({})", name, msg, errno))]
    VgOpenError { name: String, errno: i32, msg: String },
    #[snafu(display("Failed to create volume group {}: {} ({})", name, msg, errno))]
    VgCreateError { name: String, errno: i32, msg: String },
    #[snafu(display("{} failed: {} ({})", op, msg, errno))]
    CommandError {
        op: &'static str,
        errno: i32,
        msg: String,
    },
    #[snafu(display("Lookup of {} failed: {} ({})", name, msg, errno))]
    LookupError { name: String, errno: i32, msg: String },
    #[snafu(display("Failed to create logical volume {}: {} ({})", name, msg, errno))]
    LvCreateError { name: String, errno: i32, msg: String },
    #[snafu(display("{} returned no list: {} ({})", op, msg, errno))]
    ListError {
        op: &'static str,
        errno: i32,
        msg: String,
    },
    #[snafu(display("Engine string is not valid text: {}", source))]
    DecodeError { source: std::str::Utf8Error },
    #[snafu(display("String contains an interior nul byte: {}", source))]
    StringWithNul { source: std::ffi::NulError },
}

pub type LvmResult<T> = Result<T, LvmError>;
