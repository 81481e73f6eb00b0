//! # List Command Module / 列表命令模块
//!
//! Prints one line per job of an archive directory. Never waits.
//! 为归档目录中的每个作业打印一行。从不等待。

use anyhow::{Result, bail};

use crate::{
    core::watcher,
    infra::{
        fs::{FsResultStore, is_directory},
        logging, t,
    },
    reporting::console::print_listing,
};

pub fn execute(archive_dir: &std::path::Path, verbose: bool) -> Result<()> {
    let _log = logging::init(verbose, None)?;

    if !is_directory(archive_dir) {
        bail!(t!("archive_not_directory", path = archive_dir.display()).to_string());
    }

    let store = FsResultStore::new(archive_dir);
    let listings = watcher::list_jobs(&store)?;
    print_listing(&listings, verbose);
    Ok(())
}
