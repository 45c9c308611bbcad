use std::io;
use std::path::PathBuf;

use clap::Parser;
use recipes_transport::config::{DEFAULT_HOST, DEFAULT_PORT};
use recipes_transport::TransportConfig;

use crate::app::PresenterOptions;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gatsby-recipes",
    version,
    about = "Run a Gatsby recipe against a local recipes server"
)]
pub struct Cli {
    /// Recipe to run; omit it to choose one from the catalog.
    pub recipe: Option<String>,

    /// Keep the plan preview open instead of exiting after it renders.
    #[arg(long)]
    pub develop: bool,

    /// Apply the recipe instead of previewing its plan.
    #[arg(long)]
    pub install: bool,

    #[arg(long, env = "RECIPES_GRAPHQL_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = "RECIPES_GRAPHQL_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Site the recipe is applied to. Defaults to the current directory.
    #[arg(long, value_name = "PATH")]
    pub project_root: Option<PathBuf>,
}

impl Cli {
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.host.clone(), self.port)
            .with_user_agent(concat!("gatsby-recipes/", env!("CARGO_PKG_VERSION")))
    }

    pub fn resolve_project_root(&self) -> io::Result<String> {
        let root = match &self.project_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        Ok(root.to_string_lossy().into_owned())
    }

    pub fn presenter_options(&self, project_root: String) -> PresenterOptions {
        PresenterOptions {
            recipe: self.recipe.clone(),
            develop: self.develop,
            install: self.install,
            project_root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enter_catalog_on_default_port() {
        let cli = Cli::try_parse_from(["gatsby-recipes"]).unwrap();
        assert_eq!(cli.recipe, None);
        assert!(!cli.install);
        assert_eq!(cli.transport_config().http_url(), "http://localhost:50400/graphql");
    }

    #[test]
    fn flags_flow_into_presenter_options() {
        let cli = Cli::try_parse_from([
            "gatsby-recipes",
            "jest",
            "--install",
            "--port",
            "4000",
            "--project-root",
            "/site",
        ])
        .unwrap();
        assert_eq!(cli.transport_config().ws_url(), "ws://localhost:4000/graphql");
        assert_eq!(cli.resolve_project_root().unwrap(), "/site");
        let options = cli.presenter_options("/site".to_string());
        assert_eq!(options.recipe.as_deref(), Some("jest"));
        assert!(options.install);
        assert!(!options.develop);
    }
}
