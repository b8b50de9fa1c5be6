use colored::*;

pub const TOTAL_WIDTH: usize = 64;

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    println!("{line}");
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    println!("{sep}");
}

pub fn status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".bright_black();
    println!("{} {}", prefix, msg.as_ref());
}

pub fn blank() {
    println!();
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().cyan());
    println!("{} {}", idx_str.bright_black(), name.bright_white().bold());
}

pub fn tree_item(key: &str, value: &str, last: bool) {
    let branch: &str = if last { "╰─" } else { "├─" };
    println!(
        "  {} {}{} {}",
        branch.bright_black(),
        key.cyan(),
        ":".bright_black(),
        value
    );
}
