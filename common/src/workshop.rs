//! Wallpaper Engine ワークショップディレクトリの走査と資産コピー
//!
//! 入力ディレクトリの直下から preview.jpg / preview.gif を持つ壁紙
//! フォルダを列挙する。PKG を含まない壁紙（シーンではなく素材置き場）
//! は RePKG を通さず、画像・動画ファイルをそのままコピーして取り出す。

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{RepkgError, Result};

/// PKG を含まない壁紙からコピーする資産の拡張子
const ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "mp4"];

const PREVIEW_NAMES: &[&str] = &["preview.jpg", "preview.gif"];

/// プレビュー画像を持つワークショップ項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperEntry {
    /// フォルダ名（ワークショップ ID）
    pub name: String,
    pub path: PathBuf,
    pub preview: PathBuf,
    /// 直下に .pkg があるか。なければ資産コピーで取り出す
    pub has_pkg: bool,
}

/// dir 直下のサブディレクトリからプレビュー画像を持つものを列挙する。
/// 存在しない・読めないパスは空リストを返す（入力途中のパスを許容する）。
/// 結果は名前順にソートする
pub fn scan_wallpapers(dir: &Path) -> Vec<WallpaperEntry> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut wallpapers = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(preview) = PREVIEW_NAMES
            .iter()
            .map(|name| path.join(name))
            .find(|p| p.is_file())
        else {
            continue;
        };
        let has_pkg = fs::read_dir(&path)
            .map(|it| {
                it.filter_map(|e| e.ok()).any(|e| {
                    let p = e.path();
                    p.is_file()
                        && p.extension()
                            .map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case("pkg"))
                })
            })
            .unwrap_or(false);

        wallpapers.push(WallpaperEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            path,
            preview,
            has_pkg,
        });
    }

    wallpapers.sort_by(|a, b| a.name.cmp(&b.name));
    wallpapers
}

/// src 以下の画像・動画資産を、ディレクトリ構造を保ったまま dest へ
/// コピーする。コピーしたファイル数を返す。
/// 対象ファイルのある場所だけディレクトリを作る
pub fn copy_assets(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(RepkgError::FolderNotFound(src.display().to_string()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || !is_asset(path) {
            continue;
        }
        let relative = path.strip_prefix(src).unwrap_or(path);
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &target)?;
        copied += 1;
    }
    Ok(copied)
}

fn is_asset(path: &Path) -> bool {
    path.extension().map_or(false, |ext| {
        let ext = ext.to_string_lossy();
        ASSET_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_scan_wallpapers_missing_dir_is_empty() {
        assert!(scan_wallpapers(Path::new("/nonexistent/workshop")).is_empty());
    }

    #[test]
    fn test_scan_wallpapers_requires_preview() {
        let temp = tempfile::tempdir().unwrap();
        let with_jpg = temp.path().join("100200");
        fs::create_dir(&with_jpg).unwrap();
        touch(&with_jpg.join("preview.jpg"));
        touch(&with_jpg.join("scene.pkg"));

        let with_gif = temp.path().join("100100");
        fs::create_dir(&with_gif).unwrap();
        touch(&with_gif.join("preview.gif"));

        let no_preview = temp.path().join("100300");
        fs::create_dir(&no_preview).unwrap();
        touch(&no_preview.join("scene.pkg"));

        // 直下のファイルは無視される
        touch(&temp.path().join("preview.jpg"));

        let wallpapers = scan_wallpapers(temp.path());
        assert_eq!(wallpapers.len(), 2);
        // 名前順
        assert_eq!(wallpapers[0].name, "100100");
        assert_eq!(wallpapers[0].preview, with_gif.join("preview.gif"));
        assert!(!wallpapers[0].has_pkg);
        assert_eq!(wallpapers[1].name, "100200");
        assert!(wallpapers[1].has_pkg);
    }

    #[test]
    fn test_scan_wallpapers_detects_pkg_case_insensitively() {
        let temp = tempfile::tempdir().unwrap();
        let item = temp.path().join("200100");
        fs::create_dir(&item).unwrap();
        touch(&item.join("preview.jpg"));
        touch(&item.join("SCENE.PKG"));

        let wallpapers = scan_wallpapers(temp.path());
        assert_eq!(wallpapers.len(), 1);
        assert!(wallpapers[0].has_pkg);
    }

    #[test]
    fn test_copy_assets_missing_src() {
        let temp = tempfile::tempdir().unwrap();
        let result = copy_assets(Path::new("/nonexistent/wallpaper"), temp.path());
        assert!(matches!(result, Err(RepkgError::FolderNotFound(_))));
    }

    #[test]
    fn test_copy_assets_keeps_structure_and_counts() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("materials")).unwrap();
        touch(&src.join("preview.jpg"));
        touch(&src.join("video.MP4"));
        touch(&src.join("project.json"));
        touch(&src.join("materials").join("wall.png"));

        let dest = temp.path().join("dest");
        let copied = copy_assets(&src, &dest).unwrap();

        assert_eq!(copied, 3);
        assert!(dest.join("preview.jpg").is_file());
        assert!(dest.join("video.MP4").is_file());
        assert!(dest.join("materials").join("wall.png").is_file());
        // 資産以外はコピーされない
        assert!(!dest.join("project.json").exists());
    }

    #[test]
    fn test_copy_assets_skips_empty_subdirs() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("shaders")).unwrap();
        touch(&src.join("shaders").join("effect.frag"));
        touch(&src.join("bg.jpeg"));

        let dest = temp.path().join("dest");
        let copied = copy_assets(&src, &dest).unwrap();

        assert_eq!(copied, 1);
        assert!(dest.join("bg.jpeg").is_file());
        // 資産のないサブディレクトリは作られない
        assert!(!dest.join("shaders").exists());
    }
}
