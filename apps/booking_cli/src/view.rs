//! Plain-text projection of workflow snapshots.

use booking_client::{WorkflowSnapshot, WorkflowState};
use shared::domain::Catalog;

pub fn render_catalog(snapshot: &WorkflowSnapshot) -> String {
    let mut lines = Vec::new();
    if let Some(notice) = &snapshot.catalog_notice {
        lines.push(format!("notice: {}", notice.message()));
    }

    let selected = snapshot
        .state
        .draft()
        .and_then(|draft| draft.vehicle_id.as_ref());

    if snapshot.catalog.is_empty() {
        lines.push("No vehicles available.".to_string());
    }
    for vehicle in snapshot.catalog.vehicles() {
        let marker = if selected == Some(&vehicle.id) { '*' } else { ' ' };
        lines.push(format!("{marker} {:<8} {}", vehicle.id, vehicle.option_label()));
    }
    lines.join("\n")
}

pub fn render_state(state: &WorkflowState, catalog: &Catalog) -> String {
    match state {
        WorkflowState::Confirmed { reservation } => {
            let vehicle = catalog
                .find(&reservation.vehicle_id)
                .map(|vehicle| vehicle.display_name.clone())
                .unwrap_or_else(|| reservation.vehicle_id.to_string());
            format!(
                "Booking Confirmed!\nThank you! We'll contact you soon.\n{vehicle}: {} to {} ({} days)",
                reservation.pickup_date,
                reservation.return_date,
                reservation.rental_days()
            )
        }
        WorkflowState::Editing {
            error: Some(error), ..
        } => format!("error: {}", error.message()),
        WorkflowState::Editing { error: None, .. } => "Booking not submitted.".to_string(),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
