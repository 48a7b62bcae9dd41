#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressPhase {
    Classifying,
    Extracting,
    Resolving,
}

#[derive(Clone, Debug)]
pub enum ProgressMessage {
    Started {
        phase: ProgressPhase,
        total: usize,
    },
    Progress {
        phase: ProgressPhase,
        current: usize,
        file: Option<String>,
    },
    Finished {
        phase: ProgressPhase,
    },
    Skipped(String),
}
