//! UI の入力状態から RePKG のコマンドライン引数を組み立てる
//!
//! フラグの並び順は RePKG のヘルプ表記に合わせた固定順。
//! 位置引数（入力パス）は常に最後に置く。

use std::path::Path;

/// extract サブコマンドのオプション一式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// 出力ディレクトリ (-o)
    pub output_dir: String,
    /// 無視する拡張子リスト (-i)
    pub ignore_exts: String,
    /// 抽出対象を絞る拡張子リスト (-e)
    pub only_exts: String,
    /// デバッグ情報を出力 (-d)
    pub debug_info: bool,
    /// TEX を画像へ変換 (-t)
    pub convert_tex: bool,
    /// 単一ディレクトリへ展開 (-s)
    pub single_dir: bool,
    /// ディレクトリを再帰的に探索 (-r)
    pub recursive: bool,
    /// project.json とプレビューをコピー (-c)
    pub copy_project: bool,
    /// プロジェクト名をフォルダ名に使う (-n)
    pub use_project_name: bool,
    /// PKG 展開時に TEX を変換しない (--no-tex-convert)
    pub no_tex_convert: bool,
    /// 既存ファイルを上書き (--overwrite)
    pub overwrite: bool,
}

impl ExtractOptions {
    /// 入力パスを除いた引数列を返す。
    /// 空のテキスト欄はフラグごと省略し、矛盾するフラグの検証は行わない
    /// （RePKG 側の判断に委ねる）。
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["extract".to_string()];
        if !self.output_dir.is_empty() {
            args.push("-o".to_string());
            args.push(self.output_dir.clone());
        }
        if !self.ignore_exts.is_empty() {
            args.push("-i".to_string());
            args.push(self.ignore_exts.clone());
        }
        if !self.only_exts.is_empty() {
            args.push("-e".to_string());
            args.push(self.only_exts.clone());
        }
        if self.debug_info {
            args.push("-d".to_string());
        }
        if self.convert_tex {
            args.push("-t".to_string());
        }
        if self.single_dir {
            args.push("-s".to_string());
        }
        if self.recursive {
            args.push("-r".to_string());
        }
        if self.copy_project {
            args.push("-c".to_string());
        }
        if self.use_project_name {
            args.push("-n".to_string());
        }
        if self.no_tex_convert {
            args.push("--no-tex-convert".to_string());
        }
        if self.overwrite {
            args.push("--overwrite".to_string());
        }
        args
    }
}

/// info サブコマンドの並べ替えキー (-b)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Name,
    Extension,
    Size,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Extension => "extension",
            SortKey::Size => "size",
        }
    }
}

/// info サブコマンドのオプション一式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoOptions {
    /// 並べ替えを有効化 (-s)
    pub sort_enabled: bool,
    /// 並べ替えキー (-b)。sort_enabled が真のときだけ出力する
    pub sort_by: SortKey,
    /// TEX の詳細を表示 (-t)
    pub tex_info: bool,
    /// project.json の表示フィールド (-p)
    pub project_info: String,
    /// パッケージ内エントリを列挙 (-e)
    pub print_entries: bool,
    /// タイトルでの絞り込み (--title-filter)
    pub title_filter: String,
}

impl InfoOptions {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["info".to_string()];
        if self.sort_enabled {
            args.push("-s".to_string());
            args.push("-b".to_string());
            args.push(self.sort_by.as_str().to_string());
        }
        if self.tex_info {
            args.push("-t".to_string());
        }
        if !self.project_info.is_empty() {
            args.push("-p".to_string());
            args.push(self.project_info.clone());
        }
        if self.print_entries {
            args.push("-e".to_string());
        }
        if !self.title_filter.is_empty() {
            args.push("--title-filter".to_string());
            args.push(self.title_filter.clone());
        }
        args
    }
}

/// help サブコマンドの対象
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HelpTopic {
    #[default]
    General,
    Extract,
    Info,
}

impl HelpTopic {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            HelpTopic::General => vec!["help".to_string()],
            HelpTopic::Extract => vec!["help".to_string(), "extract".to_string()],
            HelpTopic::Info => vec!["help".to_string(), "info".to_string()],
        }
    }
}

/// 位置引数（入力パス）を末尾に追加する
pub fn with_input(mut args: Vec<String>, input: &Path) -> Vec<String> {
    args.push(input.display().to_string());
    args
}

/// 入力パス欄の事前検証。空・空白のみなら None を返し、
/// 呼び出し側はプロセスを起動せず警告表示だけで終える。
/// 有効な場合は前後の空白を除いたパスを返す
pub fn validate_input(path: &str) -> Option<&str> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// バッチ実行用に再帰フラグ (-r) を取り除く。
/// ディレクトリ走査はバッチ側が済ませているため、RePKG へは渡さない。
/// 他のフラグの相対順は保存される。
pub fn strip_recursive(args: &[String]) -> Vec<String> {
    args.iter()
        .filter(|a| a.as_str() != "-r")
        .cloned()
        .collect()
}
