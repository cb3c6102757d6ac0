use unicode_width::UnicodeWidthChar;

pub const LCD_COLUMNS: usize = 16;
pub const BAR_WIDTH: usize = 10;

/// Text progress bar, `current` out of `total` filled cells
pub fn progress_bar(current: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "█".repeat(width);
    }
    let filled = (width as u64 * current as u64 / total as u64) as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Clip `line` so it occupies at most `columns` display cells
pub fn fit_line(line: &str, columns: usize) -> String {
    let mut used = 0;
    line.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= columns
        })
        .collect()
}
