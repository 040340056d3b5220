#![cfg(feature = "egui")]

use eframe::egui::{Color32, FontId, TextFormat};
use egui::text::LayoutJob;

const CODE_FONT_SIZE: f32 = 13.0;

/// Layout job for edge source text in the overlay window.
///
/// With the `highlight` feature the text is coloured as Python; otherwise it
/// is laid out as plain monospace.
pub fn code_job(code: &str) -> LayoutJob {
    #[cfg(feature = "highlight")]
    {
        python_syntax_job(code)
    }
    #[cfg(not(feature = "highlight"))]
    {
        plain_code_job(code)
    }
}

/// Monospace, single-colour job.
pub fn plain_code_job(code: &str) -> LayoutJob {
    let mut job = LayoutJob::default();
    job.append(
        code,
        0.0,
        TextFormat {
            font_id: FontId::monospace(CODE_FONT_SIZE),
            color: Color32::from_rgb(30, 30, 30),
            ..Default::default()
        },
    );
    job
}

/// Python highlighter using syntect. Lazily loads the syntax set and theme.
#[cfg(feature = "highlight")]
pub fn python_syntax_job(code: &str) -> LayoutJob {
    use once_cell::sync::OnceCell;
    use syntect::easy::HighlightLines;
    use syntect::highlighting::{Style, ThemeSet};
    use syntect::parsing::SyntaxSet;
    use syntect::util::LinesWithEndings;

    static SYNTAX_SET: OnceCell<SyntaxSet> = OnceCell::new();
    static THEME_SET: OnceCell<ThemeSet> = OnceCell::new();

    let ss = SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines);
    let ts = THEME_SET.get_or_init(ThemeSet::load_defaults);
    let syntax = ss
        .find_syntax_by_extension("py")
        .or_else(|| ss.find_syntax_by_name("Python"))
        .unwrap_or_else(|| ss.find_syntax_plain_text());
    let Some(theme) = ts
        .themes
        .get("InspiredGitHub")
        .or_else(|| ts.themes.values().next())
    else {
        return plain_code_job(code);
    };

    let mut h = HighlightLines::new(syntax, theme);
    let mut job = LayoutJob::default();
    let mono = FontId::monospace(CODE_FONT_SIZE);
    for line in LinesWithEndings::from(code) {
        let regions: Vec<(Style, &str)> = h.highlight(line, ss);
        for (style, text) in regions {
            let color = Color32::from_rgba_premultiplied(
                style.foreground.r,
                style.foreground.g,
                style.foreground.b,
                style.foreground.a,
            );
            let tf = TextFormat {
                font_id: mono.clone(),
                color,
                ..Default::default()
            };
            job.append(text, 0.0, tf);
        }
    }
    job
}
