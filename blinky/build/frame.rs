//! Framed build error messages

/// Width of a message line inside the frame
const LINE_WIDTH: usize = 62;

/// Shorten `line` to `width` characters, ending in "..." when cut
pub fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() > width {
        let head: String = line.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

/// Render a titled error box around `lines`
pub fn framed(title: &str, lines: &[String]) -> String {
    format!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| format!("║  • {:<LINE_WIDTH$} ║", truncate(line, LINE_WIDTH)))
            .collect::<Vec<_>>()
            .join("\n")
    )
}
