//! Demo installer
//!
//! Build a self-contained copy with `genesis build demo`, then run
//! `genesis.x install`, `genesis.x status` and `genesis.x remove`.

use anyhow::Result;
use genesis::modules::{BlockInFile, CopyFile, FileMode, LineInFile, Mkdir, Template};
use genesis::{Installer, Section};
use std::process::ExitCode;

const DEMO_DIR: &str = "/tmp/genesis_example";

fn main() -> Result<ExitCode> {
    let mut installer = Installer::new()?;
    let store = installer.store().clone();

    installer.add_task(Mkdir::new(DEMO_DIR));

    let mut files = Section::new("Create some files");
    files
        .add_task(
            Template::new(
                installer.resource("files/file.txt.tmpl"),
                format!("{DEMO_DIR}/file.txt"),
                &store,
            )
            .vars(installer.facts()),
        )
        .add_task(CopyFile::new(
            installer.resource("files/hello.sh"),
            format!("{DEMO_DIR}/hello.sh"),
            &store,
        ))
        .add_task(FileMode::new(format!("{DEMO_DIR}/hello.sh"), 0o755));
    installer.add(files);

    let interfaces = format!("{DEMO_DIR}/interfaces");
    let mut network = Section::new("Configure the network");
    network
        .add_task(
            LineInFile::new(&interfaces, "auto eth1", &store)
                .success("^auto eth1$")
                .label("auto_eth1"),
        )
        .add_task(
            BlockInFile::new(
                &interfaces,
                "^iface eth1",
                "^\\s+netmask",
                [
                    "iface eth1 inet static",
                    "    address 192.168.56.10",
                    "    netmask 255.255.255.0",
                ],
                &store,
            )
            .label("iface_eth1"),
        );
    installer.add(network);

    let counts = installer.done()?;
    Ok(if counts.fail > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
