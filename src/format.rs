use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn cpu_label(cpu_percent: f64) -> String {
    format!("CPU Usage: {cpu_percent:.2}%")
}

pub fn memory_label(memory_load_percent: u32) -> String {
    format!("Memory Usage: {memory_load_percent}%")
}

pub fn cpu_cell(cpu_percent: f32) -> String {
    format!("{cpu_percent:.2}")
}

pub fn memory_share_cell(memory_percent: f32) -> String {
    format!("{memory_percent:.1}")
}
