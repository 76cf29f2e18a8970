//! Helpers for tests that fake the external tools.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

// PATH is process-wide, so tests that install fake tools serialize here.
static PATH_LOCK: Mutex<()> = Mutex::new(());

/// A fake executable prepended to PATH, removed again on drop.
pub(crate) struct FakeTool {
    _guard: MutexGuard<'static, ()>,
    saved_path: String,
}

impl FakeTool {
    /// Write `script` as an executable named `name` into `dir` and put
    /// `dir` at the front of PATH.
    pub(crate) fn install(dir: &Path, name: &str, script: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let guard = PATH_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let saved_path = std::env::var("PATH").unwrap_or_default();
        std::env::set_var("PATH", format!("{}:{}", dir.display(), saved_path));

        Self {
            _guard: guard,
            saved_path,
        }
    }
}

impl Drop for FakeTool {
    fn drop(&mut self) {
        std::env::set_var("PATH", &self.saved_path);
    }
}
