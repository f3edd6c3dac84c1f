use std::collections::BTreeSet;
use std::env;
use std::fs::{metadata, read_dir};
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;

use log::{debug, error};

/// Names of executables on `PATH` that start with `prefix`.
pub fn executables_with_prefix(prefix: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let env_path = match env::var("PATH") {
        Ok(x) => x,
        Err(e) => {
            error!("mishell: error with env PATH: {:?}", e);
            return found;
        }
    };

    for p in env_path.split(':').filter(|p| !p.is_empty()) {
        match read_dir(p) {
            Ok(list) => {
                for entry in list.flatten() {
                    let Ok(name) = entry.file_name().into_string() else {
                        continue;
                    };
                    if !name.starts_with(prefix) || found.contains(&name) {
                        continue;
                    }
                    // follow symlinks, most of /usr/bin is links
                    let metadata = match metadata(entry.path()) {
                        Ok(x) => x,
                        Err(e) => {
                            debug!("mishell: metadata error: {:?}", e);
                            continue;
                        }
                    };
                    if metadata.is_file() && metadata.permissions().mode() & 0o111 != 0 {
                        found.insert(name);
                    }
                }
            }
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    continue;
                }
                error!("mishell: fs read_dir error: {}: {}", p, e);
            }
        }
    }
    found
}

pub fn current_dir() -> String {
    let current_dir = match env::current_dir() {
        Ok(x) => x,
        Err(e) => {
            error!("mishell: PROMPT: env current_dir error: {}", e);
            return String::new();
        }
    };
    current_dir.to_string_lossy().into_owned()
}
