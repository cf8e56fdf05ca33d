use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().banner.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().failure.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().caution.clone()));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, label.style(theme().label.clone()), value);
}

pub fn dim(text: &str) -> String {
    text.style(theme().label.clone()).to_string()
}

pub fn phase(name: &str) {
    println!();
    println!("{} {}", Icons::GEAR, name.style(theme().phase.clone()));
}

pub fn file_written(path: &str) {
    println!("  {} {}", Icons::FILE, path.style(theme().path.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {:<14} {}", label.style(theme().label.clone()), value.style(theme().count.clone()));
}
