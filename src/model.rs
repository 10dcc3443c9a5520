use repkg_common::{ExtractOptions, HelpTopic, InfoOptions, RunLog};

/// Per-session form state for the Extract tab. Survives re-renders and is
/// only mutated by text edits or picker confirmations.
#[derive(Debug, Clone)]
pub struct ExtractForm {
    pub input_path: String,
    pub options: ExtractOptions,
    /// Directory input + per-file fault isolation (batch mode).
    pub fault_tolerant: bool,
}

impl ExtractForm {
    pub fn new(default_output_dir: String) -> Self {
        Self {
            input_path: String::new(),
            options: ExtractOptions {
                output_dir: default_output_dir,
                recursive: true,
                ..Default::default()
            },
            fault_tolerant: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InfoForm {
    pub input_path: String,
    pub options: InfoOptions,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub extract: ExtractForm,
    pub info: InfoForm,
    pub help_topic: HelpTopic,
}

impl SessionState {
    pub fn new(default_output_dir: String) -> Self {
        Self {
            extract: ExtractForm::new(default_output_dir),
            info: InfoForm::default(),
            help_topic: HelpTopic::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed(i32),
    Error(String),
}

/// Messages streamed from the worker thread back to the UI.
pub enum WorkerMsg {
    Line(String),
    Finished(RunStatus),
    BatchPlanned { total: usize },
    FileStarted { index: usize, total: usize, path: String },
    FileLine { index: usize, line: String },
    FileFinished { index: usize, status: RunStatus },
    BatchDone { failed: usize, total: usize },
    Notice(String),
}

/// Display state of the current (or last) run. Replaced wholesale when a
/// new run starts.
#[derive(Default)]
pub struct RunView {
    pub command_line: String,
    pub log: RunLog,
    pub batch: Vec<BatchEntry>,
    pub progress: Option<(usize, usize)>,
    pub status: Option<RunStatus>,
    pub notice: Option<String>,
}

/// One batch file's isolated log, addressed by its index.
pub struct BatchEntry {
    pub path: String,
    pub log: RunLog,
    pub status: Option<RunStatus>,
}
