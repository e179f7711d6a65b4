use std::path::{Path, PathBuf};

/// Absolute form of `path` without touching the filesystem.
///
/// The benchmark binary runs with its own working directory, so every path we
/// hand it (config file, results log) must already be absolute. Canonicalize
/// is unsuitable here: the results file does not exist yet when its path goes
/// into the config.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_pass_through() {
        let p = Path::new("/tmp/results.json");
        assert_eq!(absolutize(p), p);
    }

    #[test]
    fn relative_paths_are_anchored_to_cwd() {
        let p = absolutize(Path::new("out/results.json"));
        assert!(p.is_absolute());
        assert!(p.ends_with("out/results.json"));
    }
}
