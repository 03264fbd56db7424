use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::selector::{select_optimal_partner, SelectionContext};
use crate::error::SelectionError;
use crate::models::selection::{SelectionOutcome, SelectionRecord};
use crate::models::shipment::ShipmentRequest;
use crate::state::AppState;

/// Runs a selection against the current catalog snapshot, records it for
/// audit and publishes it to live subscribers.
pub fn route_shipment(
    state: &AppState,
    request: ShipmentRequest,
) -> Result<SelectionRecord, SelectionError> {
    let start = Instant::now();

    match select(state, &request) {
        Ok(outcome) => {
            let elapsed = start.elapsed().as_secs_f64();
            let label = outcome.label();
            state
                .metrics
                .selection_latency_seconds
                .with_label_values(&[label])
                .observe(elapsed);
            state
                .metrics
                .selections_total
                .with_label_values(&[label])
                .inc();
            for exclusion in outcome.excluded() {
                for reason in &exclusion.reasons {
                    state
                        .metrics
                        .partner_exclusions_total
                        .with_label_values(&[reason.as_str()])
                        .inc();
                }
            }

            let record = SelectionRecord {
                id: Uuid::new_v4(),
                request,
                outcome,
                selected_at: Utc::now(),
            };

            match &record.outcome {
                SelectionOutcome::Selected(selection) => {
                    state
                        .metrics
                        .selection_candidates
                        .observe(selection.candidates.len() as f64);
                    info!(
                        selection_id = %record.id,
                        partner_id = %selection.winner.partner_id,
                        score = selection.winner.score,
                        cost = selection.winner.cost,
                        candidates = selection.candidates.len(),
                        "partner selected"
                    );
                }
                SelectionOutcome::NoService(no_service) => {
                    state.metrics.selection_candidates.observe(0.0);
                    warn!(
                        selection_id = %record.id,
                        origin = %record.request.origin_pincode,
                        destination = %record.request.destination_pincode,
                        excluded = no_service.excluded.len(),
                        "no serviceable partner"
                    );
                }
            }

            let evicted = state.selections.record(record.clone());
            if evicted > 0 {
                state.metrics.audit_evictions_total.inc_by(evicted as u64);
            }
            let _ = state.selection_events_tx.send(record.clone());

            Ok(record)
        }
        Err(err) => {
            let elapsed = start.elapsed().as_secs_f64();
            let label = match &err {
                SelectionError::Validation(_) => "invalid",
                SelectionError::System(_) => "error",
            };
            state
                .metrics
                .selection_latency_seconds
                .with_label_values(&[label])
                .observe(elapsed);
            state
                .metrics
                .selections_total
                .with_label_values(&[label])
                .inc();
            if let SelectionError::System(source_err) = &err {
                error!(error = %source_err, "selection failed");
            }
            Err(err)
        }
    }
}

fn select(state: &AppState, request: &ShipmentRequest) -> Result<SelectionOutcome, SelectionError> {
    let fetched = state.cache.snapshot()?;
    if fetched.refreshed {
        state.metrics.catalog_refreshes_total.inc();
    }

    let client_weights = request
        .client_id
        .as_ref()
        .and_then(|id| state.client_weights.get(id).map(|entry| *entry.value()));

    let ctx = SelectionContext::new(&fetched.snapshot, &state.policy)
        .with_client_weights(client_weights);

    select_optimal_partner(request, &ctx)
}
