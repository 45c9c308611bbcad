use pretty_assertions::assert_eq;
use recipes::document::{DocumentRenderer, DocumentTheme};
use recipes::operation::PlanStep;
use recipes::registry::ResourceRegistry;
use recipes_tui::strip_ansi;

const WIDTH: usize = 40;

fn resource(name: &str, key: &str, describe: &str) -> PlanStep {
    PlanStep {
        resource_name: name.to_string(),
        describe: describe.to_string(),
        key: Some(key.to_string()),
        ..PlanStep::default()
    }
}

fn render_with(theme: &DocumentTheme, registry: &ResourceRegistry, document: &str) -> Vec<String> {
    DocumentRenderer::new(theme, registry).render(document, WIDTH)
}

fn render(registry: &ResourceRegistry, document: &str) -> Vec<String> {
    render_with(&DocumentTheme::plain(), registry, document)
}

#[test]
fn recipe_renders_heading_prose_resource_and_code() {
    let registry = ResourceRegistry::from_plan(&[resource(
        "File",
        "jest.config.js",
        "Create jest.config.js",
    )]);
    let document = "export const x = 1\n\n# Add Jest\n\nJest is a delightful\nframework.\n\n<File _key=\"jest.config.js\" />\n\n```js\nmodule.exports = {}\n```";

    assert_eq!(
        render(&registry, document),
        vec![
            "Add Jest",
            "",
            "Jest is a delightful framework.",
            "File:",
            "Create jest.config.js",
            "",
            "```js",
            "module.exports = {}",
            "```",
            "",
        ]
    );
}

#[test]
fn recipe_step_is_framed_with_its_number() {
    let registry = ResourceRegistry::new();
    let document = "<RecipeStep step=\"1\">\n\nInstall jest\n\n</RecipeStep>";
    let lines = DocumentRenderer::new(&DocumentTheme::plain(), &registry).render(document, 20);

    assert_eq!(
        lines,
        vec![
            "┌──────────────────┐",
            "│                  │",
            "│ 1) Install jest  │",
            "│                  │",
            "└──────────────────┘",
        ]
    );
}

#[test]
fn hidden_unknown_and_unresolved_elements_render_nothing() {
    let registry = ResourceRegistry::new();
    let document = "<Config name=\"x\" />\n\n<Marquee />\n\n<File _key=\"missing\" />";

    assert!(render(&registry, document).is_empty());
}

#[test]
fn inline_resource_splits_the_paragraph() {
    let registry = ResourceRegistry::from_plan(&[resource("File", "k", "Create k")]);

    assert_eq!(
        render(&registry, "See <File _key=\"k\" /> now"),
        vec!["See", "File:", "Create k", "", "now"]
    );
}

#[test]
fn resource_diff_follows_description() {
    let step = PlanStep {
        diff: Some("- a\n+ b".to_string()),
        ..resource("File", "k", "Create k")
    };
    let registry = ResourceRegistry::from_plan(&[step]);

    assert_eq!(
        render(&registry, "<File _key=\"k\" />"),
        vec!["File:", "Create k", "", "- a", "+ b", ""]
    );
}

#[test]
fn resource_resolves_by_uuid_without_key() {
    let step = PlanStep {
        resource_name: "NPMPackage".to_string(),
        describe: "Install ava".to_string(),
        uuid: Some("u-1".to_string()),
        ..PlanStep::default()
    };
    let registry = ResourceRegistry::from_plan(&[step]);

    assert_eq!(
        render(&registry, "<NPMPackage _uuid=\"u-1\" />"),
        vec!["NPMPackage:", "Install ava", ""]
    );
}

#[test]
fn invalid_mdx_falls_back_to_markdown() {
    let registry = ResourceRegistry::new();

    assert_eq!(
        render(&registry, "<File _key=\"a\" />\n\nUse {braces"),
        vec!["<File _key=\"a\" />", "Use {braces"]
    );
}

#[test]
fn paragraph_continuation_starting_with_import_is_kept() {
    let registry = ResourceRegistry::new();
    let document = "To use Jest you need to\nimport it in your test files.\n\nNext paragraph.";
    let lines = DocumentRenderer::new(&DocumentTheme::plain(), &registry).render(document, 80);

    assert_eq!(
        lines,
        vec![
            "To use Jest you need to import it in your test files.",
            "Next paragraph.",
        ]
    );
}

#[test]
fn lists_are_bulleted_and_followed_by_a_blank_line() {
    let registry = ResourceRegistry::new();

    assert_eq!(
        render(&registry, "- one\n- two\n\nafter"),
        vec!["* one", "* two", "", "after"]
    );
}

#[test]
fn code_keeps_line_breaks_that_prose_collapses() {
    let registry = ResourceRegistry::new();
    let document = "one\ntwo\nthree\n\n```sh\n\nnpm install\nnpm test\n\n```";

    assert_eq!(
        render(&registry, document),
        vec!["one two three", "```sh", "npm install", "npm test", "```", ""]
    );
}

#[test]
fn untagged_fence_uses_default_tag() {
    let registry = ResourceRegistry::new();

    assert_eq!(
        render(&registry, "```\nplain\n```"),
        vec!["``````", "plain", "```", ""]
    );
}

#[test]
fn rendering_is_deterministic() {
    let registry = ResourceRegistry::from_plan(&[resource("File", "k", "Create k")]);
    let document = "# Title\n\nBody text\n\n<File _key=\"k\" />\n\n<div>\n\nInside\n\n</div>";
    let theme = DocumentTheme::terminal(false);

    assert_eq!(
        render_with(&theme, &registry, document),
        render_with(&theme, &registry, document)
    );
}

#[test]
fn terminal_theme_styles_top_level_heading() {
    let registry = ResourceRegistry::new();
    let lines = render_with(&DocumentTheme::terminal(false), &registry, "# Title");

    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\x1b[1m"));
    assert!(lines[0].contains("\x1b[4m"));
    assert_eq!(strip_ansi(&lines[0]), "Title");
}

#[test]
fn links_go_through_the_theme() {
    let registry = ResourceRegistry::new();
    let theme = DocumentTheme {
        link: Box::new(|url, text| format!("{text} <{url}>")),
        ..DocumentTheme::plain()
    };

    assert_eq!(
        render_with(&theme, &registry, "Read [the docs](https://gatsbyjs.org)."),
        vec!["Read the docs <https://gatsbyjs.org>."]
    );
}
