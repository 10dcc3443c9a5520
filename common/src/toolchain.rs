//! RePKG 実行ファイルの探索とパス正規化
//!
//! 実行ファイルは GUI バイナリと同じディレクトリ以下の
//! `resources/<platform-arch>/` に同梱される前提。

use std::path::{Path, PathBuf};

use crate::error::{RepkgError, Result};

#[cfg(windows)]
const PLATFORM_DIR: &str = "win-x64";
#[cfg(not(windows))]
const PLATFORM_DIR: &str = "osx-arm64";

#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "RePKG.exe";
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "RePKG";

/// 解決済みの RePKG 実行環境
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// RePKG 実行ファイルの絶対パス
    pub executable: PathBuf,
    /// 実行時の作業ディレクトリ（resources/<platform-arch>）
    pub working_dir: PathBuf,
    /// 既定の出力先（<base>/outputs）
    pub default_output_dir: PathBuf,
}

impl Toolchain {
    /// 実行中のバイナリの場所を基準に RePKG を探す
    pub fn locate() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let base = exe
            .parent()
            .ok_or_else(|| RepkgError::ExecutableNotFound(exe.clone()))?;
        Self::from_base_dir(base)
    }

    pub fn from_base_dir(base: &Path) -> Result<Self> {
        let working_dir = base.join("resources").join(PLATFORM_DIR);
        let executable = working_dir.join(EXECUTABLE_NAME);

        if !executable.exists() {
            return Err(RepkgError::ExecutableNotFound(executable));
        }

        // 出力先はベストエフォートで作成。失敗しても続行する
        let default_output_dir = base.join("outputs");
        let _ = std::fs::create_dir_all(&default_output_dir);

        Ok(Self {
            executable,
            working_dir,
            default_output_dir,
        })
    }

    /// Unix では同梱バイナリに実行権限が付いていないことがある。
    /// 付与に失敗した場合は警告文を返し、起動自体は続行する
    /// （その後の実行時に OS のエラーとして表面化する）。
    pub fn ensure_executable(&self) -> Option<String> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = match std::fs::metadata(&self.executable) {
                Ok(m) => m,
                Err(e) => return Some(format!("実行権限を確認できません: {e}")),
            };
            if metadata.permissions().mode() & 0o111 != 0 {
                return None;
            }
            let mut permissions = metadata.permissions();
            permissions.set_mode(0o755);
            if let Err(e) = std::fs::set_permissions(&self.executable, permissions) {
                return Some(format!(
                    "実行権限を自動設定できませんでした ({e})。手動で実行してください: chmod +x {}",
                    self.executable.display()
                ));
            }
            None
        }
        #[cfg(not(unix))]
        {
            None
        }
    }
}

/// OS に合わせてパス表記を修正する。
/// Windows 以外では Windows 風のバックスラッシュ区切りをスラッシュに置き換える。
pub fn fix_path(path: &str) -> String {
    #[cfg(not(windows))]
    {
        path.replace('\\', "/")
    }
    #[cfg(windows)]
    {
        path.to_string()
    }
}

/// ユーザー入力のパスを絶対パスへ変換する。
/// 外部コマンドは固定の作業ディレクトリで実行するため、
/// 相対パスは起動前にここで解決しておく必要がある。
pub fn absolutize(path: &str) -> Result<PathBuf> {
    let fixed = fix_path(path);
    Ok(std::path::absolute(Path::new(&fixed))?)
}
