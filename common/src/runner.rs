//! 外部 RePKG プロセスの起動と出力ストリーミング
//!
//! stdout と stderr をひとつのチャネルにまとめ、到着順に1行ずつ
//! 呼び出し側へ渡す。呼び出し側から見ると同期・ブロッキングの実行。

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use crate::error::{RepkgError, Result};

/// ログ表示の上限行数。内部の保持は無制限で、表示だけを絞る
pub const LOG_WINDOW: usize = 500;

/// 1回の実行で蓄積される出力ログ
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 表示用に末尾 LOG_WINDOW 行を結合して返す
    pub fn visible(&self) -> String {
        let start = self.lines.len().saturating_sub(LOG_WINDOW);
        self.lines[start..].join("\n")
    }
}

/// 外部コマンドを起動し、出力を1行ずつ `on_line` に流して終了コードを返す。
///
/// stderr は stdout と同じチャネルへ合流させる。行の到着を待つ間
/// このスレッドはブロックするため、GUI からはワーカースレッド経由で呼ぶこと。
/// シグナルで終了した場合は -1 を返す。
pub fn run_streaming<F>(
    executable: &Path,
    working_dir: &Path,
    args: &[String],
    mut on_line: F,
) -> Result<i32>
where
    F: FnMut(String),
{
    let mut child = Command::new(executable)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RepkgError::Launch {
            executable: executable.to_path_buf(),
            source: e,
        })?;

    let (tx, rx) = mpsc::channel::<String>();
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_line_reader(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_line_reader(stderr, tx.clone()));
    }
    drop(tx);

    // 両ストリームが閉じるまで到着順に流す
    for line in rx {
        on_line(line);
    }
    for handle in readers {
        let _ = handle.join();
    }

    let status = child.wait()?;
    Ok(status.code().unwrap_or(-1))
}

fn spawn_line_reader<R>(stream: R, tx: mpsc::Sender<String>) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_empty_renders_empty() {
        let log = RunLog::default();
        assert!(log.is_empty());
        assert_eq!(log.visible(), "");
    }

    #[test]
    fn test_run_log_window_is_last_500_lines() {
        let mut log = RunLog::default();
        for i in 0..10_000 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), 10_000);

        let visible = log.visible();
        let shown: Vec<&str> = visible.lines().collect();
        assert_eq!(shown.len(), LOG_WINDOW);
        assert_eq!(shown[0], "line 9500");
        assert_eq!(shown[LOG_WINDOW - 1], "line 9999");
    }

    #[test]
    fn test_run_log_short_history_shown_whole() {
        let mut log = RunLog::default();
        log.push("a");
        log.push("b");
        assert_eq!(log.visible(), "a\nb");
    }

    #[test]
    fn test_launch_error_is_not_a_panic() {
        let result = run_streaming(
            Path::new("/nonexistent/RePKG"),
            Path::new("."),
            &[],
            |_| {},
        );
        assert!(matches!(result, Err(RepkgError::Launch { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_streams_merged_lines_and_exit_code() {
        let temp = tempfile::tempdir().unwrap();
        let args: Vec<String> = ["-c", "echo out1; echo err1 1>&2; echo out2; exit 3"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut lines = Vec::new();
        let code = run_streaming(Path::new("/bin/sh"), temp.path(), &args, |line| {
            lines.push(line);
        })
        .unwrap();

        assert_eq!(code, 3);
        // stdout と stderr の相対順は保証しないので所属だけ確認する
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"out1".to_string()));
        assert!(lines.contains(&"err1".to_string()));
        assert!(lines.contains(&"out2".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_code() {
        let temp = tempfile::tempdir().unwrap();
        let args: Vec<String> = vec!["-c".to_string(), "true".to_string()];
        let code = run_streaming(Path::new("/bin/sh"), temp.path(), &args, |_| {}).unwrap();
        assert_eq!(code, 0);
    }
}
