use std::io;
use std::path::{Path, PathBuf};

use crate::cfg;
use crate::model::Configuration;
use crate::watcher::{conf_pattern, expand};

/// Parse every `*.conf` export in a directory.
///
/// Files that fail to parse are logged and left out. The result is
/// sorted by path. Only a directory that cannot be listed is an error.
pub fn parse_dir(dir: impl AsRef<Path>) -> io::Result<Vec<(PathBuf, Configuration)>> {
    let files = expand(&conf_pattern(dir.as_ref()))?;
    let mut configs = Vec::with_capacity(files.len());
    for path in files {
        match cfg::from_file(&path) {
            Ok(cfg) => {
                info!(
                    "{}: {} {} ({})",
                    path.display(),
                    cfg.model,
                    cfg.firmware_version,
                    cfg.display_name()
                );
                configs.push((path, cfg));
            }
            Err(e) => error!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn skips_broken_files() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.conf"), include_str!("../testdata/gs108tv2.conf")).unwrap();
        fs::write(dir.path().join("a.conf"), include_str!("../testdata/gs724tv4.conf")).unwrap();
        fs::write(dir.path().join("broken.conf"), "configure\nexit\n").unwrap();
        fs::write(dir.path().join("readme.txt"), "not an export").unwrap();

        let configs = parse_dir(dir.path()).unwrap();
        let names: Vec<_> = configs
            .iter()
            .map(|(p, c)| (p.file_name().unwrap().to_string_lossy().to_string(), c.model.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("a.conf".to_string(), "GS724Tv4"), ("b.conf".to_string(), "GS108Tv2")]
        );
    }

    #[test]
    fn empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_dir(dir.path()).unwrap().is_empty());
    }
}
