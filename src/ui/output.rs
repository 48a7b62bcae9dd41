use crate::report::NO_USE;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().label.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().label.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

/// Heading of one symbol's where-used block: `<kind> <name>`
pub fn symbol_heading(kind: &str, name: &str) {
    println!();
    println!(
        "{} {} {}",
        Icons::LINK,
        kind.style(theme().label.clone()),
        name.style(theme().symbol.clone())
    );
}

pub fn location(path: &str, line: u32) -> String {
    format!("{}:{}", path, line).style(theme().location.clone()).to_string()
}

/// The "no use found" marker
pub fn unused() -> String {
    NO_USE.style(theme().unused.clone()).to_string()
}

pub fn label(text: &str) -> String {
    text.style(theme().label.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label.clone()), value);
}
