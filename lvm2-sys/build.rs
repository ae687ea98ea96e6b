fn main() {
    if std::env::var_os("CARGO_FEATURE_SYSTEM_LVM2").is_some() {
        println!("cargo:rustc-link-lib=dylib=lvm2app");
    }
}
