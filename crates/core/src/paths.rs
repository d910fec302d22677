//! Path helpers for resources referenced from asset JSON files.
//!
//! Assets store their textures and models relative to the directory of
//! their own JSON file (`textures/pink.png` next to `props/tree/tree.json`).
//! These helpers convert between that stored form and absolute paths.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors produced while resolving a stored resource reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The resource shares no directory with the asset beyond the root/drive.
    #[error("'{}' shares no directories with asset directory '{}'", .file.display(), .asset_dir.display())]
    Disjoint {
        /// Directory holding the asset JSON.
        asset_dir: PathBuf,
        /// The absolute resource path that was requested.
        file: PathBuf,
    },
}

/// Remove `.` components and fold `..` lexically (no filesystem access).
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_lexically(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize_lexically(&cwd.join(path)),
        Err(_) => normalize_lexically(path),
    }
}

fn asset_dir(asset_json: &Path) -> Option<&Path> {
    asset_json
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// True if `file` lives inside the directory of `asset_json`.
pub fn can_truncate_path(asset_json: &Path, file: &Path) -> bool {
    if asset_json.as_os_str().is_empty() || file.as_os_str().is_empty() {
        return false;
    }
    let asset_json = absolutize(asset_json);
    let Some(dir) = asset_dir(&asset_json) else {
        return false;
    };
    absolutize(file).starts_with(dir)
}

/// Strip the leading directories `file` shares with the asset's directory,
/// producing the relative form stored in JSON.
pub fn truncate_path(asset_json: &Path, file: &Path) -> PathBuf {
    if file.as_os_str().is_empty() {
        return PathBuf::new();
    }
    let Some(dir) = asset_dir(asset_json) else {
        return file.to_path_buf();
    };

    let dir = normalize_lexically(dir);
    let file = normalize_lexically(file);
    let common = dir
        .components()
        .zip(file.components())
        .take_while(|(a, b)| a == b)
        .count();
    file.components().skip(common).collect()
}

/// Expand a stored reference back into a path usable on disk.
///
/// Relative references are joined onto the asset directory. Leading segments
/// of the reference that repeat the tail of the asset directory are
/// collapsed first, so `props/tree/model.obj` stored in
/// `.../props/tree/tree.json` still resolves to `.../props/tree/model.obj`.
/// Absolute references are accepted only if they share at least one
/// directory with the asset.
pub fn resolve_sub_file(asset_json: &Path, file: &Path) -> Result<PathBuf, PathError> {
    let Some(dir) = asset_dir(asset_json) else {
        return Ok(file.to_path_buf());
    };
    let dir = normalize_lexically(dir);
    let file = normalize_lexically(file);

    if file.is_absolute() {
        let shared = dir
            .components()
            .zip(file.components())
            .take_while(|(a, b)| a == b)
            .filter(|(a, _)| matches!(a, Component::Normal(_)))
            .count();
        if shared == 0 {
            return Err(PathError::Disjoint {
                asset_dir: dir,
                file,
            });
        }
        return Ok(file);
    }

    let dir_parts: Vec<Component<'_>> = dir.components().collect();
    let file_parts: Vec<Component<'_>> = file.components().collect();
    let max_overlap = dir_parts.len().min(file_parts.len().saturating_sub(1));
    let overlap = (1..=max_overlap)
        .rev()
        .find(|&k| dir_parts[dir_parts.len() - k..] == file_parts[..k])
        .unwrap_or(0);

    let rest: PathBuf = file_parts[overlap..].iter().collect();
    Ok(normalize_lexically(&dir.join(rest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_lexically(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize_lexically(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn truncate_strips_common_prefix() {
        let asset = Path::new("/root/pw-assets/maps/mars/mars.json");
        let file = Path::new("/root/pw-assets/maps/mars/textures/rock.png");
        assert_eq!(truncate_path(asset, file), PathBuf::from("textures/rock.png"));
    }

    #[test]
    fn truncate_handles_empty_inputs() {
        assert_eq!(
            truncate_path(Path::new("/a/b.json"), Path::new("")),
            PathBuf::new()
        );
        assert_eq!(
            truncate_path(Path::new("b.json"), Path::new("/x/y.png")),
            PathBuf::from("/x/y.png")
        );
    }

    #[test]
    fn can_truncate_only_inside_asset_dir() {
        let asset = Path::new("/root/pw-assets/props/tree.json");
        assert!(can_truncate_path(
            asset,
            Path::new("/root/pw-assets/props/models/tree.obj")
        ));
        assert!(!can_truncate_path(asset, Path::new("/home/me/tree.obj")));
        assert!(!can_truncate_path(asset, Path::new("")));
    }

    #[test]
    fn resolve_joins_relative_reference() {
        let asset = Path::new("/root/pw-assets/props/test/testprop.json");
        assert_eq!(
            resolve_sub_file(asset, Path::new("textures/pink.png")).unwrap(),
            PathBuf::from("/root/pw-assets/props/test/textures/pink.png")
        );
    }

    #[test]
    fn resolve_collapses_repeated_directories() {
        let asset = Path::new("/root/pw-assets/props/test/testprop.json");
        assert_eq!(
            resolve_sub_file(asset, Path::new("props/test/model.obj")).unwrap(),
            PathBuf::from("/root/pw-assets/props/test/model.obj")
        );
    }

    #[test]
    fn resolve_absolute_inside_tree_is_kept() {
        let asset = Path::new("/root/pw-assets/props/test/testprop.json");
        let file = Path::new("/root/pw-assets/shared/model.obj");
        assert_eq!(resolve_sub_file(asset, file).unwrap(), file.to_path_buf());
    }

    #[test]
    fn resolve_disjoint_absolute_is_an_error() {
        let asset = Path::new("/root/pw-assets/props/test/testprop.json");
        let err = resolve_sub_file(asset, Path::new("/elsewhere/model.obj")).unwrap_err();
        assert!(matches!(err, PathError::Disjoint { .. }));
    }

    #[test]
    fn resolve_without_directory_returns_reference() {
        assert_eq!(
            resolve_sub_file(Path::new("tree.json"), Path::new("m.obj")).unwrap(),
            PathBuf::from("m.obj")
        );
    }

    #[test]
    fn truncate_then_resolve_round_trips() {
        let asset = Path::new("/lib/pw-assets/materials/stone.json");
        let texture = Path::new("/lib/pw-assets/materials/textures/stone.png");
        let stored = truncate_path(asset, texture);
        assert_eq!(resolve_sub_file(asset, &stored).unwrap(), texture);
    }
}
