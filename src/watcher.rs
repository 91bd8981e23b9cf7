use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Extension of configuration exports.
pub const CONF_EXTENSION: &str = "conf";

/// Glob pattern matching all exports in `dir`.
pub(crate) fn conf_pattern(dir: &Path) -> String {
    dir.join(format!("*.{}", CONF_EXTENSION)).to_string_lossy().to_string()
}

/// Expand a glob pattern into a sorted list of paths.
pub(crate) fn expand(pattern: &str) -> io::Result<Vec<PathBuf>> {
    let globresult = glob::glob(pattern).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{}: {}", pattern, e.msg))
    })?;
    let mut files = globresult.collect::<Result<Vec<_>, _>>().map_err(|e| {
        io::Error::new(e.error().kind(), format!("{}: {}", e.path().display(), e.error()))
    })?;
    files.sort();
    Ok(files)
}

// A glob pattern and the modification times of the files it matched.
struct Snapshot {
    pattern: String,
    paths: BTreeMap<PathBuf, SystemTime>,
}

impl Snapshot {
    fn take(pattern: &str) -> io::Result<Snapshot> {
        let mut paths = BTreeMap::new();
        for file in expand(pattern)? {
            let modified = fs::metadata(&file).and_then(|m| m.modified()).map_err(|e| {
                io::Error::new(e.kind(), format!("{}: {}", file.display(), e))
            })?;
            paths.insert(file, modified);
        }
        Ok(Snapshot {
            pattern: pattern.to_string(),
            paths,
        })
    }

    fn changed(&self) -> bool {
        match Snapshot::take(&self.pattern) {
            Ok(new) => new.paths != self.paths,
            Err(e) => {
                debug!("{}", e);
                true
            }
        }
    }
}

/// Check if the exports in a directory have changed on disk.
///
/// A `Watcher` remembers which `*.conf` files were present and when
/// they were last modified. Files that are added, removed or modified
/// since the last [`rescan`](Watcher::rescan) make [`changed`](Watcher::changed)
/// return `true`.
#[derive(Clone)]
pub struct Watcher {
    inner: Arc<Mutex<Snapshot>>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap();
        write!(f, "Watcher({}, {} files)", inner.pattern, inner.paths.len())
    }
}

impl Watcher {
    /// Start watching the exports in `dir`.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Watcher> {
        let snapshot = Snapshot::take(&conf_pattern(dir.as_ref()))?;
        Ok(Watcher {
            inner: Arc::new(Mutex::new(snapshot)),
        })
    }

    /// Check if any files have been added, removed or modified.
    pub fn changed(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.changed()
    }

    /// Remember the current state of the directory.
    pub fn rescan(&self) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        *inner = Snapshot::take(&inner.pattern)?;
        Ok(())
    }

    /// Files seen by the last scan.
    pub fn files(&self) -> Vec<PathBuf> {
        let inner = self.inner.lock().unwrap();
        inner.paths.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pattern() {
        assert_eq!(conf_pattern(Path::new("/tmp/switches")), "/tmp/switches/*.conf");
    }

    #[test]
    fn watch() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.conf"), "a").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let watcher = Watcher::new(dir.path()).unwrap();
        assert_eq!(watcher.files(), vec![dir.path().join("a.conf")]);
        assert!(!watcher.changed());

        fs::write(dir.path().join("notes.txt"), "y").unwrap();
        assert!(!watcher.changed());

        fs::write(dir.path().join("b.conf"), "b").unwrap();
        assert!(watcher.changed());
        watcher.rescan().unwrap();
        assert!(!watcher.changed());
        assert_eq!(watcher.files().len(), 2);

        let file = fs::OpenOptions::new().write(true).open(dir.path().join("a.conf")).unwrap();
        let later = SystemTime::now() + Duration::from_secs(60);
        file.set_modified(later).unwrap();
        drop(file);
        assert!(watcher.changed());
        watcher.rescan().unwrap();

        fs::remove_file(dir.path().join("b.conf")).unwrap();
        assert!(watcher.changed());
    }
}
