pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, info, label, location, section, status, success, summary_row, symbol_heading, unused, warn};
pub use progress::ProgressManager;
pub use progress_message::{ProgressMessage, ProgressPhase};
pub use table::{listing_table, stats_table, ListingRow, TableBuilder};
pub use theme::{is_quiet, theme, Theme};
