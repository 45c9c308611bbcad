//! Line rendering for each [`View`].

use recipes_tui::{
    visible_width, wrap_text_with_ansi, BorderBox, BorderStyle, Component, SelectListTheme,
    Spinner,
};

use crate::app::{Presenter, View};
use crate::document::{compose_document, DocumentRenderer, DocumentTheme};
use crate::operation::OperationContext;
use crate::style;

pub const WELCOME_MESSAGE: &str =
    "Thank you for trying the experimental version of Gatsby Recipes!";
pub const UMBRELLA_ISSUE_MESSAGE: &str = "Please ask questions, share your recipes, report bugs, and subscribe for updates in our umbrella issue at https://github.com/gatsbyjs/gatsby/issues/22991";
pub const CATALOG_TITLE: &str = "Select a recipe to run";
pub const LOADING_MESSAGE: &str = "Loading recipe";
pub const DEVELOP_MODE_MARKER: &str = "DEVELOP MODE";
pub const INSTALL_HINT: &str = "To install this recipe, run:";

const BANNER_MARGIN: usize = 2;

pub fn catalog_list_theme() -> SelectListTheme {
    SelectListTheme {
        selected_indicator: Box::new(style::yellow),
        unselected_indicator: Box::new(style::magenta_bright),
        label: Box::new(style::magenta_bright),
        scroll_info: Box::new(style::dim),
    }
}

/// Double-bordered thank-you box followed by the umbrella issue link.
pub fn welcome_banner(width: usize) -> Vec<String> {
    let margin = " ".repeat(BANNER_MARGIN);
    let box_width = width.saturating_sub(BANNER_MARGIN * 2).max(8);
    let mut lines: Vec<String> = BorderBox::new(BorderStyle::Double, 1, 1)
        .frame(&[WELCOME_MESSAGE.to_string()], box_width, &style::magenta_bright)
        .into_iter()
        .map(|line| format!("{margin}{line}"))
        .collect();
    lines.push(String::new());

    for line in wrap_text_with_ansi(UMBRELLA_ISSUE_MESSAGE, width.max(1)) {
        let indent = width.saturating_sub(visible_width(&line)) / 2;
        lines.push(format!("{}{line}", " ".repeat(indent)));
    }
    lines.push(String::new());
    lines.push(String::new());
    lines
}

/// One entry per plan step: done steps show their message, pending ones a spinner.
pub fn progress_lines(context: &OperationContext, spinner: &Spinner, width: usize) -> Vec<String> {
    let elapsed = (context.elapsed > 0.0)
        .then(|| format!(" ({}s elapsed)", context.elapsed_seconds()))
        .unwrap_or_default();

    let mut lines = Vec::new();
    for step in &context.plan {
        lines.push(style::italic(&format!("{}:", step.resource_name)));
        let status = if step.is_done {
            format!(" ✅  {}", step.message.as_deref().unwrap_or_default())
        } else {
            format!(" {}  {}", spinner.frame(), step.describe)
        };
        lines.extend(wrap_text_with_ansi(&format!("{status}{elapsed}"), width));
    }
    lines
}

/// Pretty-printed `context.error` in red; empty when the executor sent none.
pub fn error_lines(context: &OperationContext) -> Vec<String> {
    let Some(error) = context.error.as_ref() else {
        return Vec::new();
    };
    let pretty = serde_json::to_string_pretty(error).unwrap_or_else(|_| error.to_string());
    pretty.lines().map(style::red).collect()
}

pub struct Screen {
    theme: DocumentTheme,
    spinner: Spinner,
}

impl Screen {
    pub fn new(theme: DocumentTheme) -> Self {
        Self {
            theme,
            spinner: Spinner::new(),
        }
    }

    pub fn tick(&mut self) {
        self.spinner.tick();
    }

    pub fn render(&mut self, presenter: &mut Presenter, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut lines = vec![String::new()];
        match presenter.view() {
            View::CatalogSelection => {
                lines.extend(welcome_banner(width));
                lines.push(style::bold(&style::underline(CATALOG_TITLE)));
                lines.extend(presenter.catalog_mut().render(width));
            }
            View::Loading => lines.push(format!("{} {LOADING_MESSAGE}", self.spinner.frame())),
            View::PlanPresented => self.render_plan(presenter, width, &mut lines),
            View::Installing | View::Done => {
                if let Some(state) = presenter.latest_state() {
                    lines.extend(progress_lines(&state.context, &self.spinner, width));
                }
            }
            View::DoneError => {
                if let Some(state) = presenter.latest_state() {
                    lines.extend(error_lines(&state.context));
                }
            }
        }
        lines
    }

    fn render_plan(&self, presenter: &Presenter, width: usize, lines: &mut Vec<String>) {
        lines.extend(welcome_banner(width));
        if presenter.options().develop {
            lines.push(style::bold(&style::underline(DEVELOP_MODE_MARKER)));
            lines.push(String::new());
            lines.push(String::new());
        }

        if let Some(state) = presenter.latest_state() {
            let document = compose_document(&state.context.exports, &state.context.steps);
            let renderer = DocumentRenderer::new(&self.theme, presenter.registry());
            lines.extend(renderer.render(&document, width));
        }

        lines.push(String::new());
        lines.push("------".to_string());
        lines.push(String::new());
        lines.push(style::yellow(INSTALL_HINT));
        lines.push(String::new());
        lines.push(format!(
            "  gatsby recipes {} --install",
            presenter.recipe().unwrap_or_default()
        ));
        lines.push(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::PlanStep;
    use recipes_tui::strip_ansi;
    use serde_json::json;

    #[test]
    fn banner_frames_welcome_message() {
        let lines: Vec<String> = welcome_banner(80).iter().map(|l| strip_ansi(l)).collect();
        assert!(lines[0].starts_with("  ╔"));
        assert!(lines.iter().any(|line| line.contains(WELCOME_MESSAGE)));
        assert!(lines.iter().any(|line| line.contains("issues/22991")));
    }

    #[test]
    fn progress_shows_message_or_describe() {
        let context = OperationContext {
            plan: vec![
                PlanStep {
                    resource_name: "NPMPackage".to_string(),
                    describe: "Install jest".to_string(),
                    is_done: true,
                    message: Some("Installed jest".to_string()),
                    ..PlanStep::default()
                },
                PlanStep {
                    resource_name: "File".to_string(),
                    describe: "Write jest.config.js".to_string(),
                    ..PlanStep::default()
                },
            ],
            elapsed: 2500.0,
            ..OperationContext::default()
        };
        let lines: Vec<String> = progress_lines(&context, &Spinner::new(), 80)
            .iter()
            .map(|l| strip_ansi(l))
            .collect();
        assert_eq!(
            lines,
            vec![
                "NPMPackage:",
                " ✅  Installed jest (2.5s elapsed)",
                "File:",
                " ⠋  Write jest.config.js (2.5s elapsed)",
            ]
        );
    }

    #[test]
    fn error_block_is_pretty_json() {
        let context = OperationContext {
            error: Some(json!({ "code": "E1" })),
            ..OperationContext::default()
        };
        let lines: Vec<String> = error_lines(&context).iter().map(|l| strip_ansi(l)).collect();
        assert_eq!(lines, vec!["{", "  \"code\": \"E1\"", "}"]);
        assert!(error_lines(&OperationContext::default()).is_empty());
    }
}
