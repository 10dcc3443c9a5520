use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepkgError {
    #[error("RePKG 実行ファイルが見つかりません: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("外部コマンドの起動に失敗 ({}): {source}", executable.display())]
    Launch {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RepkgError>;
