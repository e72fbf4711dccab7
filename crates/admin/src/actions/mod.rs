#![forbid(unsafe_code)]

//! Bulk actions on a changelist selection.
//!
//! Every action is a two-phase workflow. Without `confirmed` it only reads and returns a
//! [`Confirmation`] describing what the caller must submit; with `confirmed` it validates the
//! submitted form and either mutates the store or reports why it did not. Each applied call
//! ends in exactly one [`Feedback`] message.

mod relocate;
mod sections;


use crate::site::ModelAdmin;
use inv_core::params::FormParams;
use inv_storage::{SqliteStore, StoreError};
use serde::Serialize;

pub(crate) const NOTHING_SELECTED: &str =
    "Items must be selected in order to perform actions on them. No items have been changed.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActionKind {
    MoveToOtherLocation,
    ChangeCategory,
    CreateSections,
}

impl ActionKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            ActionKind::MoveToOtherLocation => "move_to_other_location",
            ActionKind::ChangeCategory => "change_category",
            ActionKind::CreateSections => "create_sections",
        }
    }

    pub(crate) fn description(self) -> &'static str {
        match self {
            ActionKind::MoveToOtherLocation => "Move items to another location",
            ActionKind::ChangeCategory => "Change items categories",
            ActionKind::CreateSections => "Create sections",
        }
    }

    pub(crate) fn run(
        self,
        store: &mut SqliteStore,
        actor: &str,
        admin: &ModelAdmin,
        request: ActionRequest,
    ) -> Result<ActionOutcome, StoreError> {
        tracing::debug!(
            action = self.name(),
            selected = request.selection.len(),
            confirmed = request.confirmed,
            "running action"
        );
        match self {
            ActionKind::MoveToOtherLocation => {
                relocate::move_to_other_location(store, actor, admin, request)
            }
            ActionKind::ChangeCategory => relocate::change_category(store, actor, admin, request),
            ActionKind::CreateSections => sections::create_sections(store, actor, admin, request),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ActionRequest {
    /// Ids of the selected records of the action's model.
    pub(crate) selection: Vec<i64>,
    /// Set once the caller has seen the confirmation and submits the form.
    pub(crate) confirmed: bool,
    pub(crate) form: FormParams,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Feedback {
    pub(crate) level: Severity,
    pub(crate) message: String,
}

impl Feedback {
    pub(crate) fn info(message: impl Into<String>) -> Self {
        Self {
            level: Severity::Info,
            message: message.into(),
        }
    }

    pub(crate) fn success(message: impl Into<String>) -> Self {
        Self {
            level: Severity::Success,
            message: message.into(),
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            level: Severity::Error,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct SelectedObject {
    pub(crate) id: i64,
    pub(crate) display: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct TargetChoice {
    pub(crate) id: i64,
    pub(crate) label: String,
}

/// What the confirmation page needs: the selection, the form to submit and its choices.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Confirmation {
    pub(crate) action: &'static str,
    pub(crate) title: String,
    pub(crate) objects_name: String,
    pub(crate) model_count: usize,
    pub(crate) selection: Vec<SelectedObject>,
    /// Form fields with their initial values.
    pub(crate) fields: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) targets: Vec<TargetChoice>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum ActionOutcome {
    Confirm(Confirmation),
    Done { messages: Vec<Feedback> },
}

impl ActionOutcome {
    pub(crate) fn done(feedback: Feedback) -> Self {
        match feedback.level {
            Severity::Error => tracing::warn!(message = %feedback.message, "action rejected"),
            Severity::Info | Severity::Success => {
                tracing::info!(message = %feedback.message, "action finished")
            }
        }
        ActionOutcome::Done {
            messages: vec![feedback],
        }
    }

    /// The single feedback message of a finished action.
    pub(crate) fn feedback(&self) -> Option<&Feedback> {
        match self {
            ActionOutcome::Confirm(_) => None,
            ActionOutcome::Done { messages } => messages.first(),
        }
    }
}
