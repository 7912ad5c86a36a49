/// Diagnostic rendering for the host. The scanner and parser only signal
/// that and where an error occurred; turning that into output happens here.
pub fn render(source: &str, kind: &str, line: usize, message: &str, hint: Option<&str>) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let line_idx = line.saturating_sub(1);
    let source_line = lines.get(line_idx).unwrap_or(&"");

    let line_num = line.to_string();
    let gutter_width = line_num.len();

    let mut out = String::new();

    // error[kind]: message
    out.push_str(&format!("error[{}]: {}\n", kind, message));

    // --> line
    out.push_str(&format!("{:>width$}--> line {}\n", " ", line, width = gutter_width));

    // empty gutter line
    out.push_str(&format!("{:>width$} |\n", " ", width = gutter_width));

    // source line
    out.push_str(&format!(
        "{:>width$} | {}\n",
        line,
        source_line,
        width = gutter_width
    ));

    // hint
    if let Some(hint) = hint {
        out.push_str(&format!("{:>width$} |\n", " ", width = gutter_width));
        out.push_str(&format!(
            "{:>width$} = hint: {}\n",
            " ",
            hint,
            width = gutter_width
        ));
    }

    out
}

pub fn suggest_hint(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("invalid assignment target") {
        return Some("only variables and object properties can be assigned to".into());
    }

    if msg.contains("unterminated string") {
        return Some("add a closing '\"' before the end of the file".into());
    }

    if msg.contains("expected ';'") {
        return Some("statements end with a semicolon".into());
    }

    None
}
