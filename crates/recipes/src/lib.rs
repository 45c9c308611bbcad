//! Terminal client for Gatsby recipes.
//!
//! A recipe runs on a remote executor reached over GraphQL. This crate
//! subscribes to the executor's operation state, renders it inline in the
//! terminal and sends commands such as `CONTINUE` back.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod operation;
pub mod registry;
pub mod runtime;
pub mod style;
pub mod view;
