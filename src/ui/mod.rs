// UI module - Interactive terminal frontend
//
// The prompt layer (Selector) is the only place that talks to the user. The
// controller drives the workflow through it, and ConsoleReporter prints migration
// progress.

pub mod console;
pub mod controller;
pub mod prompt;

pub use console::ConsoleReporter;
pub use controller::{RunOutcome, WorkflowController, WorkflowError, WorkflowOptions};
pub use prompt::{InquireSelector, Notice, PromptError, Selector};
