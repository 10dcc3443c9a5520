//! RePKG GUI Common Library
//!
//! GUI本体から分離した、外部 RePKG 実行ファイルの呼び出しロジック
//! （実行ファイル探索・引数組み立て・プロセス実行・バッチ処理）

pub mod batch;
pub mod command;
pub mod error;
pub mod runner;
pub mod toolchain;
pub mod workshop;

pub use batch::{collect_targets, run_batch, FileReport};
pub use command::{
    strip_recursive, validate_input, with_input, ExtractOptions, HelpTopic, InfoOptions, SortKey,
};
pub use error::{RepkgError, Result};
pub use runner::{run_streaming, RunLog, LOG_WINDOW};
pub use toolchain::{absolutize, fix_path, Toolchain};
pub use workshop::{copy_assets, scan_wallpapers, WallpaperEntry};
