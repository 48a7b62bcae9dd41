use crate::ui::theme::is_quiet;
use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::thread;
use std::time::Duration;

fn visible() -> bool {
    console::Term::stdout().is_term() && !is_quiet()
}

fn file_bar(mp: &MultiProgress, message: &str) -> ProgressBar {
    if !visible() {
        return ProgressBar::hidden();
    }
    let bar = mp.add(ProgressBar::new(0).with_message(message.to_string()));
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg:<24} [{bar:30}] {pos}/{len}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Progress bars for an indexing run, driven by messages from the indexer
pub struct ProgressManager {
    mp: MultiProgress,
    _handle: thread::JoinHandle<()>,
}

impl ProgressManager {
    pub fn new() -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();

        let mp = MultiProgress::new();
        let classifying = if visible() {
            mp.add(ProgressBar::new_spinner().with_message("Classifying files"))
        } else {
            ProgressBar::hidden()
        };
        let extracting = file_bar(&mp, "Extracting declarations");
        let resolving = file_bar(&mp, "Resolving usages");

        let handle = thread::spawn(move || {
            let bar = |phase: ProgressPhase| match phase {
                ProgressPhase::Classifying => &classifying,
                ProgressPhase::Extracting => &extracting,
                ProgressPhase::Resolving => &resolving,
            };
            for msg in rx {
                match msg {
                    ProgressMessage::Started { phase, total } => {
                        let pb = bar(phase);
                        if phase == ProgressPhase::Classifying {
                            pb.enable_steady_tick(Duration::from_millis(100));
                        } else {
                            pb.set_length(total as u64);
                        }
                    }
                    ProgressMessage::Progress { phase, current: _, file } => {
                        let pb = bar(phase);
                        pb.inc(1);
                        if let Some(ref f) = file {
                            pb.set_message(f.clone());
                        }
                    }
                    ProgressMessage::Finished { phase } => {
                        bar(phase).finish_with_message("Done");
                    }
                    ProgressMessage::Skipped(path) => {
                        extracting.println(format!("{} skipped {}", Icons::WARN, path));
                    }
                }
            }
        });

        (Self { mp, _handle: handle }, tx)
    }

    pub fn clear(&self) {
        self.mp.clear().ok();
    }

    pub fn finish_with_summary(&self, duration: Duration, files: usize, symbols: usize, usages: usize) {
        self.clear();
        println!();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        println!(
            "  {} {}  {} {}  {} {}",
            Icons::FILE.style(theme().info.clone()),
            files,
            Icons::PACKAGE.style(theme().info.clone()),
            symbols,
            Icons::LINK.style(theme().info.clone()),
            usages
        );
    }
}
