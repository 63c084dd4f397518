//! Command loop that owns the publication controller.
//!
//! UI layers send [`UiCommand`]s; each one runs to completion before the next
//! is read, and the resulting state is emitted back as a snapshot.

use crate::dashboard::{MutationOutcome, PublicationController};
use crate::model::{DashboardEvent, UiCommand};
use crate::store::PaperStore;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

fn describe(action: &str, outcome: MutationOutcome) -> String {
    match outcome {
        MutationOutcome::Synced => format!("{action}: saved"),
        MutationOutcome::PushFailed => format!("{action}: save failed, showing local copy"),
        MutationOutcome::Rejected => format!("{action}: title is required"),
        MutationOutcome::NoMatch => format!("{action}: paper not found"),
    }
}

fn emit<S: PaperStore>(
    controller: &PublicationController<S>,
    event_tx: &UnboundedSender<DashboardEvent>,
    info: String,
) {
    let _ = event_tx.send(DashboardEvent::Snapshot(controller.state().snapshot()));
    let _ = event_tx.send(DashboardEvent::Info(info));
}

/// Run controller operations for UI commands until `Quit` or the command
/// channel closes.
pub(crate) async fn run_controller<S: PaperStore>(
    mut controller: PublicationController<S>,
    event_tx: UnboundedSender<DashboardEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> PublicationController<S> {
    let loaded = controller.refresh().await;
    emit(
        &controller,
        &event_tx,
        if loaded {
            "Loaded".into()
        } else {
            "Could not reach store; press r to retry".into()
        },
    );

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            UiCommand::Refresh => {
                let info = if controller.refresh().await {
                    "Refreshed".to_string()
                } else {
                    "Refresh failed; nothing updated".to_string()
                };
                emit(&controller, &event_tx, info);
            }
            // Form bookkeeping only; the UI keeps its own text buffers.
            UiCommand::OpenAddForm => controller.open_add_form(),
            UiCommand::BeginEdit { id } => {
                controller.begin_edit(id);
            }
            UiCommand::CancelForms => controller.cancel_forms(),
            UiCommand::Add { title, status } => {
                controller.set_add_draft(title, status);
                let outcome = controller.save_add_draft().await;
                emit(&controller, &event_tx, describe("Add", outcome));
            }
            UiCommand::Edit { id, title, status } => {
                let outcome = if controller.begin_edit(id) {
                    controller.set_edit_draft(title, status);
                    controller.save_edit_draft().await
                } else {
                    MutationOutcome::NoMatch
                };
                emit(&controller, &event_tx, describe(&format!("Edit #{id}"), outcome));
            }
            UiCommand::Delete { id } => {
                let outcome = controller.delete(id).await;
                emit(&controller, &event_tx, describe(&format!("Delete #{id}"), outcome));
            }
            UiCommand::Quit => break,
        }
    }

    controller
}
