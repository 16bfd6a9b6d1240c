//! Script discovery and load order.
//!
//! Every `*.rhai` file in the config directory is evaluated in file name
//! order, then the reserved `rat.rhai` last so it can override anything the
//! others set up.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{ScriptError, ScriptVm};

pub const SCRIPT_EXTENSION: &str = "rhai";
pub const RESERVED_SCRIPT: &str = "rat.rhai";

/// Scripts in `dir` in evaluation order. An unreadable directory yields no
/// scripts.
pub fn script_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list scripts in {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {e}", dir.display());
                None
            }
        })
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION))
        .filter(|path| path.file_name().is_some_and(|name| name != RESERVED_SCRIPT))
        .collect();
    files.sort();

    let reserved = dir.join(RESERVED_SCRIPT);
    if reserved.is_file() {
        files.push(reserved);
    }
    files
}

/// Evaluates every script in `dir`. Returns how many were evaluated.
///
/// A file that cannot be read is skipped; a script that fails to compile or
/// run aborts loading.
pub fn load_scripts(vm: &mut ScriptVm, dir: &Path) -> Result<usize, ScriptError> {
    let mut loaded = 0;
    for path in script_files(dir) {
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                warn!("Skipping unreadable script {}: {e}", path.display());
                continue;
            }
        };
        vm.eval(&path, &source)?;
        loaded += 1;
    }
    info!("Loaded {loaded} script(s) from {}", dir.display());
    Ok(loaded)
}
