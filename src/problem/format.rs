use owo_colors::OwoColorize;
use std::path::Path;

use super::Diagnostic;

/// Format a warning with full details including source code context
pub fn full_warning<'i>(diagnostic: &Diagnostic, filename: &'i Path, source: &'i str) -> String {
    let offset = diagnostic
        .offset
        .min(source.len());

    let i = calculate_line_number(source, offset);
    let j = calculate_column_number(source, offset);

    let code = source
        .lines()
        .nth(i)
        .unwrap_or("?");
    let line = i + 1;
    let column = j + 1;
    let width = 3.max(
        line.to_string()
            .len(),
    );

    format!(
        r#"
{}: {}:{}:{} {}

{:width$} {}
{:width$} {} {}
{:width$} {} {:>column$}

{}
        "#,
        "warning".bright_yellow(),
        filename.to_string_lossy(),
        line,
        column,
        diagnostic
            .message
            .bold(),
        ' ',
        '|'.bright_blue(),
        line.bright_blue(),
        '|'.bright_blue(),
        code,
        ' ',
        '|'.bright_blue(),
        '^'.bright_yellow(),
        diagnostic.rule
    )
    .trim_ascii()
    .to_string()
}

/// Format a warning with concise single-line output
pub fn concise_warning<'i>(diagnostic: &Diagnostic, filename: &'i Path, source: &'i str) -> String {
    let offset = diagnostic
        .offset
        .min(source.len());
    let i = calculate_line_number(source, offset);
    let j = calculate_column_number(source, offset);
    let line = i + 1;
    let column = j + 1;

    format!(
        "{}: {}:{}:{} {}",
        "warning".bright_yellow(),
        filename.to_string_lossy(),
        line,
        column,
        diagnostic
            .message
            .bold(),
    )
}

// Helper functions for line/column calculation
fn calculate_line_number(content: &str, offset: usize) -> usize {
    content[..offset]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
}

fn calculate_column_number(content: &str, offset: usize) -> usize {
    let before = &content[..offset];
    match before.rfind('\n') {
        Some(start) => content[start + 1..offset]
            .chars()
            .count(),
        None => before
            .chars()
            .count(),
    }
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn line_and_column_from_offset() {
        let source = "first line\nsecond line\n";
        assert_eq!(calculate_line_number(source, 0), 0);
        assert_eq!(calculate_column_number(source, 0), 0);
        assert_eq!(calculate_line_number(source, 11), 1);
        assert_eq!(calculate_column_number(source, 11), 0);
        assert_eq!(calculate_line_number(source, 18), 1);
        assert_eq!(calculate_column_number(source, 18), 7);
    }

    #[test]
    fn concise_form_names_the_location() {
        let diagnostic = Diagnostic {
            rule: "example",
            message: "something looks off".to_string(),
            offset: 11,
        };
        let rendered = concise_warning(&diagnostic, Path::new("doc.html"), "first line\nsecond");
        assert!(rendered.contains("doc.html:2:1"));
        assert!(rendered.contains("something looks off"));
    }
}
