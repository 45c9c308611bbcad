//! Reusable widgets built on [`crate::core::component::Component`].

pub mod border_box;
pub mod select_list;
pub mod spinner;

pub use border_box::{BorderBox, BorderStyle};
pub use select_list::{SelectItem, SelectList, SelectListTheme, SelectOutcome};
pub use spinner::{Spinner, SPINNER_FRAMES, SPINNER_INTERVAL};
