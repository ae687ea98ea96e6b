//! A small vgs/lvs style frontend over the lvm2 bindings, mostly useful for
//! poking at the library against a real system.

extern crate clap;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use lvm2_rs::{Lvm, VgMode};

fn main() -> Result<(), String> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let matches = App::new("lvmadm")
        .version("0.1.0")
        .about("Inspect and manage LVM volume groups")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(SubCommand::with_name("version").about("Print the lvm2 library version"))
        .subcommand(SubCommand::with_name("vgs").about("List volume group names and uuids"))
        .subcommand(SubCommand::with_name("pvs").about("List all physical volumes"))
        .subcommand(
            SubCommand::with_name("vgshow")
                .about("Show a volume group with its physical and logical volumes")
                .arg(Arg::with_name("VG").help("Volume group name").required(true).index(1)),
        )
        .subcommand(
            SubCommand::with_name("lvcreate")
                .about("Create a linear logical volume")
                .arg(Arg::with_name("VG").help("Volume group name").required(true).index(1))
                .arg(Arg::with_name("LV").help("Logical volume name").required(true).index(2))
                .arg(
                    Arg::with_name("extents")
                        .short("l")
                        .long("extents")
                        .value_name("COUNT")
                        .help("Size of the new volume in extents")
                        .required(true)
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("lvremove")
                .about("Remove a logical volume")
                .arg(Arg::with_name("VG").help("Volume group name").required(true).index(1))
                .arg(Arg::with_name("LV").help("Logical volume name").required(true).index(2)),
        )
        .subcommand(
            SubCommand::with_name("activate")
                .about("Activate a logical volume")
                .arg(Arg::with_name("VG").help("Volume group name").required(true).index(1))
                .arg(Arg::with_name("LV").help("Logical volume name").required(true).index(2)),
        )
        .subcommand(
            SubCommand::with_name("deactivate")
                .about("Deactivate a logical volume")
                .arg(Arg::with_name("VG").help("Volume group name").required(true).index(1))
                .arg(Arg::with_name("LV").help("Logical volume name").required(true).index(2)),
        )
        .get_matches();

    let lvm = Lvm::init(None).map_err(|e| e.to_string())?;

    match matches.subcommand() {
        ("version", Some(_)) => {
            println!("{}", lvm.library_version().map_err(|e| e.to_string())?);
        }
        ("vgs", Some(_)) => {
            let names = lvm.list_vg_names().map_err(|e| e.to_string())?;
            let uuids = lvm.list_vg_uuids().map_err(|e| e.to_string())?;
            for (name, uuid) in names.iter().zip(uuids.iter()) {
                println!("{}\t{}", name, uuid);
            }
        }
        ("pvs", Some(_)) => {
            let pvs = lvm.physical_volumes().map_err(|e| e.to_string())?;
            for pv in pvs.iter() {
                println!(
                    "{}\t{}\t{}",
                    pv.name().map_err(|e| e.to_string())?,
                    pv.uuid().map_err(|e| e.to_string())?,
                    pv.size()
                );
            }
        }
        ("vgshow", Some(args)) => {
            let vg = open(&lvm, args, VgMode::ReadOnly)?;
            println!(
                "{}: size {} free {} extent_size {}",
                vg.name().map_err(|e| e.to_string())?,
                vg.size(),
                vg.free_size(),
                vg.extent_size()
            );
            for pv in vg.physical_volumes().map_err(|e| e.to_string())? {
                println!("  PV {}", pv.name().map_err(|e| e.to_string())?);
            }
            for lv in vg.logical_volumes().map_err(|e| e.to_string())? {
                println!(
                    "  LV {} size {} active {}",
                    lv.name().map_err(|e| e.to_string())?,
                    lv.size(),
                    lv.is_active()
                );
            }
            vg.close().map_err(|e| e.to_string())?;
        }
        ("lvcreate", Some(args)) => {
            let extents: u64 = args
                .value_of("extents")
                .unwrap()
                .parse()
                .map_err(|e| format!("invalid extent count: {}", e))?;
            let vg = open(&lvm, args, VgMode::ReadWrite)?;
            let lv = vg
                .create_lv_linear(args.value_of("LV").unwrap(), extents)
                .map_err(|e| e.to_string())?;
            println!("created {}", lv.name().map_err(|e| e.to_string())?);
            drop(lv);
            vg.close().map_err(|e| e.to_string())?;
        }
        ("lvremove", Some(args)) => {
            let vg = open(&lvm, args, VgMode::ReadWrite)?;
            let lv = vg
                .lv_from_name(args.value_of("LV").unwrap())
                .map_err(|e| e.to_string())?;
            lv.remove().map_err(|e| e.to_string())?;
            vg.close().map_err(|e| e.to_string())?;
        }
        ("activate", Some(args)) => {
            let vg = open(&lvm, args, VgMode::ReadWrite)?;
            let lv = vg
                .lv_from_name(args.value_of("LV").unwrap())
                .map_err(|e| e.to_string())?;
            lv.activate().map_err(|e| e.to_string())?;
            drop(lv);
            vg.close().map_err(|e| e.to_string())?;
        }
        ("deactivate", Some(args)) => {
            let vg = open(&lvm, args, VgMode::ReadWrite)?;
            let lv = vg
                .lv_from_name(args.value_of("LV").unwrap())
                .map_err(|e| e.to_string())?;
            lv.deactivate().map_err(|e| e.to_string())?;
            drop(lv);
            vg.close().map_err(|e| e.to_string())?;
        }
        _ => return Err("Unknown subcommand".to_string()),
    }

    Ok(())
}

fn open<'a>(
    lvm: &'a Lvm,
    args: &ArgMatches,
    mode: VgMode,
) -> Result<lvm2_rs::VolumeGroup<'a>, String> {
    lvm.vg_open(args.value_of("VG").unwrap(), mode, 0)
        .map_err(|e| e.to_string())
}
