//! Recipes offered when no recipe is named on the command line.

use recipes_tui::SelectItem;

const RECIPE_EXTENSION: &str = ".mdx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub label: &'static str,
    pub value: &'static str,
}

impl CatalogEntry {
    const fn new(label: &'static str, value: &'static str) -> Self {
        Self { label, value }
    }

    pub fn recipe(&self) -> &'static str {
        recipe_identifier(self.value)
    }
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry::new("Add a custom ESLint config", "eslint.mdx"),
    CatalogEntry::new("Add Jest", "jest.mdx"),
    CatalogEntry::new("Add Gatsby Theme Blog", "gatsby-theme-blog"),
    CatalogEntry::new("Add Gatsby Theme Blog Core", "gatsby-theme-blog-core"),
    CatalogEntry::new("Add Gatsby Theme Notes", "gatsby-theme-notes"),
    CatalogEntry::new(
        "Add persistent layout component with gatsby-plugin-layout",
        "gatsby-plugin-layout",
    ),
    CatalogEntry::new("Add Theme UI", "theme-ui.mdx"),
    CatalogEntry::new("Add Emotion", "emotion.mdx"),
    CatalogEntry::new("Add support for MDX Pages", "mdx-pages.mdx"),
    CatalogEntry::new("Add support for MDX Pages with images", "mdx-images.mdx"),
    CatalogEntry::new("Add Styled Components", "styled-components.mdx"),
    CatalogEntry::new("Add Tailwind", "tailwindcss.mdx"),
    CatalogEntry::new("Add Sass", "sass.mdx"),
    CatalogEntry::new("Add Typescript", "typescript.mdx"),
    CatalogEntry::new("Add Cypress testing", "cypress.mdx"),
    CatalogEntry::new(
        "Add animated page transition support",
        "animated-page-transitions.mdx",
    ),
    CatalogEntry::new("Add plugins to make site a PWA", "pwa.mdx"),
    CatalogEntry::new("Add React Helmet", "gatsby-plugin-react-helmet.mdx"),
    CatalogEntry::new(
        "Add GitHub Pages deployment with Travis CI",
        "travis-deploy-github-pages.mdx",
    ),
    CatalogEntry::new("Add Headless WordPress integration", "wordpress.mdx"),
    CatalogEntry::new("Add Storybook - JavaScript", "storybook-js.mdx"),
    CatalogEntry::new("Add Storybook - TypeScript", "storybook-ts.mdx"),
    CatalogEntry::new("Add AVA", "ava.mdx"),
    CatalogEntry::new("Add Preact", "preact.mdx"),
    CatalogEntry::new("Add GitLab CI/CD", "gitlab-ci-cd.mdx"),
];

/// Strips the `.mdx` suffix; values without one are returned unchanged.
pub fn recipe_identifier(value: &str) -> &str {
    value.strip_suffix(RECIPE_EXTENSION).unwrap_or(value)
}

pub fn select_items(entries: &[CatalogEntry]) -> Vec<SelectItem> {
    entries
        .iter()
        .map(|entry| SelectItem::new(entry.value, entry.label))
        .collect()
}
