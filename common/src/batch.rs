//! ディレクトリ単位のバッチ実行
//!
//! 対象ファイルを先に列挙し、1ファイルずつ順番に RePKG を呼ぶ。
//! 途中で失敗したファイルがあっても残りの処理は継続する。

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::command::strip_recursive;
use crate::error::{RepkgError, Result};
use crate::runner::run_streaming;

/// バッチ対象の拡張子（大文字小文字を区別しない）
const BATCH_EXTENSIONS: &[&str] = &["pkg", "tex"];

/// バッチ内の1ファイル分の実行結果
#[derive(Debug)]
pub struct FileReport {
    pub index: usize,
    pub path: PathBuf,
    /// Ok(終了コード) または起動失敗
    pub outcome: Result<i32>,
}

impl FileReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Ok(0))
    }
}

/// root 以下の .pkg / .tex を列挙する。
/// recursive が偽なら直下のみ。走査順は OS 依存のためパスでソートして返す
pub fn collect_targets(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(RepkgError::FolderNotFound(root.display().to_string()));
    }

    let mut walker = WalkDir::new(root);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut targets = Vec::new();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy();
            if BATCH_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
                targets.push(path.to_path_buf());
            }
        }
    }

    targets.sort();
    Ok(targets)
}

/// 対象ファイルを順番に処理する。
///
/// `base_args` から -r を除いたうえで各ファイルのパスを末尾に付けて実行する
/// （再帰はここまでの列挙で済んでいる）。1件の失敗（起動失敗を含む）は
/// バッチ全体を中断させない。開始は `on_file_start(index, total, path)`、
/// 出力行は `on_line(index, line)`、完了は `on_file_done(&report)` で
/// 逐次通知し、ファイルごとのログは混ざらない。
pub fn run_batch<S, L, D>(
    executable: &Path,
    working_dir: &Path,
    base_args: &[String],
    targets: &[PathBuf],
    mut on_file_start: S,
    mut on_line: L,
    mut on_file_done: D,
) -> Vec<FileReport>
where
    S: FnMut(usize, usize, &Path),
    L: FnMut(usize, String),
    D: FnMut(&FileReport),
{
    let flags = strip_recursive(base_args);
    let total = targets.len();

    targets
        .iter()
        .enumerate()
        .map(|(index, path)| {
            on_file_start(index, total, path);
            let mut args = flags.clone();
            args.push(path.display().to_string());
            let outcome = run_streaming(executable, working_dir, &args, |line| {
                on_line(index, line);
            });
            let report = FileReport {
                index,
                path: path.clone(),
                outcome,
            };
            on_file_done(&report);
            report
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_collect_targets_missing_root() {
        let result = collect_targets(Path::new("/nonexistent/pkgs"), true);
        assert!(matches!(result, Err(RepkgError::FolderNotFound(_))));
    }

    #[test]
    fn test_collect_targets_case_insensitive_filter() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("x.pkg"));
        touch(&temp.path().join("y.TEX"));
        touch(&temp.path().join("z.txt"));

        let targets = collect_targets(temp.path(), false).unwrap();
        assert_eq!(
            targets,
            vec![temp.path().join("x.pkg"), temp.path().join("y.TEX")]
        );
    }

    #[test]
    fn test_collect_targets_non_recursive_stays_in_first_level() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("top.pkg"));
        let nested = temp.path().join("sub");
        fs::create_dir(&nested).unwrap();
        touch(&nested.join("deep.pkg"));

        let flat = collect_targets(temp.path(), false).unwrap();
        assert_eq!(flat, vec![temp.path().join("top.pkg")]);

        let deep = collect_targets(temp.path(), true).unwrap();
        assert_eq!(deep.len(), 2);
        assert!(deep.contains(&nested.join("deep.pkg")));
    }

    #[test]
    fn test_collect_targets_empty_plan() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("readme.txt"));
        let targets = collect_targets(temp.path(), true).unwrap();
        assert!(targets.is_empty());
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, script_body: &str) -> PathBuf {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-repkg");
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "#!/bin/sh\n{script_body}").unwrap();
        }
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_run_batch_continues_past_failures() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("a_bad.pkg"));
        touch(&temp.path().join("b_good.pkg"));

        // 最後の引数に bad を含むときだけ失敗する疑似ツール
        let tool = fake_tool(
            temp.path(),
            r#"for last in "$@"; do :; done
echo "processing $last"
case "$last" in *bad*) exit 7;; esac"#,
        );

        let targets = collect_targets(temp.path(), false).unwrap();
        assert_eq!(targets.len(), 2);

        let base_args: Vec<String> = ["extract", "-r", "--overwrite"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut progress = Vec::new();
        let mut logs: Vec<(usize, String)> = Vec::new();
        let mut done_order = Vec::new();
        let reports = run_batch(
            &tool,
            temp.path(),
            &base_args,
            &targets,
            |index, total, _path| progress.push((index + 1, total)),
            |index, line| logs.push((index, line)),
            |report| done_order.push(report.index),
        );

        assert_eq!(progress, vec![(1, 2), (2, 2)]);
        assert_eq!(done_order, vec![0, 1]);
        assert_eq!(reports.len(), 2);
        // 1件目が失敗しても2件目は実行される
        assert!(matches!(reports[0].outcome, Ok(7)));
        assert!(!reports[0].succeeded());
        assert!(reports[1].succeeded());
        // ログはファイルの添字で分離される
        assert!(logs.iter().any(|(i, l)| *i == 0 && l.contains("a_bad.pkg")));
        assert!(logs.iter().any(|(i, l)| *i == 1 && l.contains("b_good.pkg")));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_batch_strips_recursive_flag() {
        let temp = tempfile::tempdir().unwrap();
        touch(&temp.path().join("one.pkg"));

        // 受け取った引数をそのまま出力する疑似ツール
        let tool = fake_tool(temp.path(), r#"echo "$@""#);
        let targets = collect_targets(temp.path(), false).unwrap();
        let base_args: Vec<String> = ["extract", "-t", "-r", "-c"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut lines = Vec::new();
        let reports = run_batch(
            &tool,
            temp.path(),
            &base_args,
            &targets,
            |_, _, _| {},
            |_, line| lines.push(line),
            |_| {},
        );

        assert!(reports[0].succeeded());
        let echoed = lines.join("\n");
        assert!(echoed.contains("extract -t -c"));
        assert!(!echoed.contains("-r"));
        assert!(echoed.trim_end().ends_with("one.pkg"));
    }
}
