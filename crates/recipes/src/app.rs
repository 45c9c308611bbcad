//! View-state machine for a recipe run.
//!
//! The [`Presenter`] owns all run-scoped state and reacts to three inputs:
//! subscription (re)connects, operation snapshots and key presses. Side
//! effects go through [`HostOps`] so flows can be driven without a network
//! or terminal.

use recipes_tui::{InputEvent, SelectList, SelectOutcome};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::{recipe_identifier, select_items, CATALOG};
use crate::dispatch::CONTINUE_EVENT;
use crate::operation::{OperationState, OperationStateClient, Phase};
use crate::registry::ResourceRegistry;
use crate::view::catalog_list_theme;

const CATALOG_VISIBLE_ROWS: usize = 12;
const COMPLETION_MESSAGE: &str = "\n\n---\n\n\nThe recipe finished successfully!\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Catalog,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    CatalogSelection,
    Loading,
    PlanPresented,
    Installing,
    Done,
    DoneError,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The recipe was applied.
    Finished,
    /// The plan was previewed without installing.
    PlanShown,
    Failed,
    Interrupted,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Finished | Outcome::PlanShown => 0,
            Outcome::Failed => 1,
            Outcome::Interrupted => 130,
        }
    }

    /// Printed after the terminal has been restored.
    pub fn completion_message(self) -> Option<&'static str> {
        match self {
            Outcome::Finished => Some(COMPLETION_MESSAGE),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenterOptions {
    /// Recipe named on the command line; `None` opens the catalog.
    pub recipe: Option<String>,
    pub develop: bool,
    pub install: bool,
    pub project_root: String,
}

pub trait HostOps {
    fn create_operation(&mut self, recipe_path: &str, project_root: &str);
    fn send_event(&mut self, event: &str, input: Option<Value>);
    fn request_render(&mut self);
    /// Records the outcome; the host tears down after the current frame.
    fn schedule_shutdown(&mut self, outcome: Outcome);
}

pub struct Presenter {
    options: PresenterOptions,
    mode: Mode,
    recipe: Option<String>,
    sent_continue: bool,
    operation: OperationStateClient,
    registry: ResourceRegistry,
    catalog: SelectList,
    outcome: Option<Outcome>,
}

impl Presenter {
    pub fn new(options: PresenterOptions) -> Self {
        let recipe = options
            .recipe
            .clone()
            .filter(|recipe| !recipe.trim().is_empty());
        let mode = if recipe.is_some() {
            Mode::Running
        } else {
            Mode::Catalog
        };
        Self {
            options,
            mode,
            recipe,
            sent_continue: false,
            operation: OperationStateClient::new(),
            registry: ResourceRegistry::new(),
            catalog: SelectList::new(
                select_items(CATALOG),
                CATALOG_VISIBLE_ROWS,
                catalog_list_theme(),
            ),
            outcome: None,
        }
    }

    pub fn options(&self) -> &PresenterOptions {
        &self.options
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn recipe(&self) -> Option<&str> {
        self.recipe.as_deref()
    }

    pub fn sent_continue(&self) -> bool {
        self.sent_continue
    }

    pub fn latest_state(&self) -> Option<&OperationState> {
        self.operation.latest()
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn catalog_mut(&mut self) -> &mut SelectList {
        &mut self.catalog
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn view(&self) -> View {
        if self.mode == Mode::Catalog {
            return View::CatalogSelection;
        }
        match self.operation.phase() {
            Some(Phase::DoneError) => View::DoneError,
            Some(Phase::Done) => View::Done,
            Some(Phase::Installing) if self.options.install => View::Installing,
            Some(Phase::PlanPresented) if !self.options.install => View::PlanPresented,
            _ => View::Loading,
        }
    }

    /// Whether the current view animates a spinner.
    pub fn needs_spinner(&self) -> bool {
        matches!(self.view(), View::Loading | View::Installing)
    }

    /// Re-issues `createOperation` after every (re)connect once a recipe is chosen.
    pub fn on_connected(&mut self, host: &mut impl HostOps) {
        if self.mode == Mode::Catalog {
            return;
        }
        if let Some(recipe) = self.recipe.as_deref() {
            debug!(recipe, "creating operation");
            host.create_operation(recipe, &self.options.project_root);
        }
    }

    pub fn on_snapshot(&mut self, raw: &str, host: &mut impl HostOps) {
        if self.outcome.is_some() {
            debug!("ignoring snapshot after run ended");
            return;
        }

        let phase = match self.operation.apply_snapshot(raw) {
            Ok(state) => {
                self.registry = ResourceRegistry::from_plan(&state.context.plan);
                state.phase()
            }
            Err(err) => {
                warn!(%err, "dropping undecodable snapshot");
                return;
            }
        };
        debug!(?phase, "operation snapshot applied");

        if self.mode == Mode::Running
            && self.options.install
            && phase == Phase::PlanPresented
            && !self.sent_continue
        {
            self.sent_continue = true;
            host.send_event(CONTINUE_EVENT, None);
        }

        match self.view() {
            View::Done => self.finish(Outcome::Finished, host),
            View::DoneError => self.finish(Outcome::Failed, host),
            View::PlanPresented if !self.options.develop => self.finish(Outcome::PlanShown, host),
            _ => {}
        }
        host.request_render();
    }

    pub fn on_event(&mut self, event: &InputEvent, host: &mut impl HostOps) {
        if let Some(key_id) = event.key_id() {
            self.on_key(key_id, host);
        }
    }

    pub fn on_key(&mut self, key_id: &str, host: &mut impl HostOps) {
        if self.outcome.is_some() {
            return;
        }
        if key_id == "ctrl+c" {
            self.on_interrupt(host);
            return;
        }
        match self.mode {
            Mode::Catalog => self.on_catalog_key(key_id, host),
            Mode::Running if key_id == "enter" => host.send_event(CONTINUE_EVENT, None),
            Mode::Running => {}
        }
    }

    pub fn on_catalog_key(&mut self, key_id: &str, host: &mut impl HostOps) {
        match self.catalog.handle_key(key_id) {
            SelectOutcome::Moved => host.request_render(),
            SelectOutcome::Selected(item) => {
                let recipe = recipe_identifier(&item.value).to_string();
                info!(recipe = %recipe, "recipe selected from catalog");
                self.mode = Mode::Running;
                host.create_operation(&recipe, &self.options.project_root);
                self.recipe = Some(recipe);
                host.request_render();
            }
            SelectOutcome::Cancelled | SelectOutcome::Ignored => {}
        }
    }

    /// Ctrl+C or an exit signal.
    pub fn on_interrupt(&mut self, host: &mut impl HostOps) {
        if self.outcome.is_none() {
            self.finish(Outcome::Interrupted, host);
        }
    }

    fn finish(&mut self, outcome: Outcome, host: &mut impl HostOps) {
        if self.outcome.is_some() {
            return;
        }
        info!(?outcome, "run finished");
        self.outcome = Some(outcome);
        host.schedule_shutdown(outcome);
    }
}
