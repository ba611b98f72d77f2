//! Parallel evaluation of independent admission requests.
//!
//! Requests are fanned out over a channel to scoped worker threads. Each
//! request gets its own decision cache, so workers never share memoised state.

use std::thread;

use crossbeam_channel::{bounded, unbounded};
use tracing::{debug, warn};

use super::api::{evaluate_request, AdmissionDecision, AdmissionRequest};
use crate::config::ConfigSource;
use crate::core::{CapacityEngine, CapacityResult, CommitmentSource, PeriodLookup};

/// Evaluate `requests` on up to `workers` threads; results keep request order.
///
/// `None` uses one worker per CPU. Requests left unprocessed because a worker
/// could not be spawned are evaluated on the calling thread.
pub fn evaluate_batch<S, P, C>(
    engine: &CapacityEngine<S, P, C>,
    requests: &[AdmissionRequest],
    workers: Option<usize>,
) -> Vec<CapacityResult<AdmissionDecision>>
where
    S: CommitmentSource + Sync,
    P: PeriodLookup + Sync,
    C: ConfigSource + Sync,
{
    let worker_count = workers
        .unwrap_or_else(num_cpus::get)
        .clamp(1, requests.len().max(1));
    let mut results: Vec<Option<CapacityResult<AdmissionDecision>>> =
        std::iter::repeat_with(|| None).take(requests.len()).collect();

    if worker_count > 1 {
        let (job_tx, job_rx) = bounded::<(usize, &AdmissionRequest)>(requests.len());
        let (result_tx, result_rx) = unbounded();
        for job in requests.iter().enumerate() {
            // Capacity matches the job count, so this cannot block.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        thread::scope(|scope| {
            for worker_id in 0..worker_count {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("capacity-worker-{worker_id}"))
                    .spawn_scoped(scope, move || {
                        for (index, request) in job_rx {
                            let _ = result_tx.send((index, evaluate_request(engine, request)));
                        }
                        debug!(worker_id, "batch worker finished");
                    });
                if let Err(err) = spawned {
                    warn!(worker_id, error = %err, "failed to spawn batch worker");
                }
            }
        });
        drop(result_tx);

        for (index, outcome) in result_rx {
            results[index] = Some(outcome);
        }
    }

    results
        .into_iter()
        .zip(requests)
        .map(|(outcome, request)| outcome.unwrap_or_else(|| evaluate_request(engine, request)))
        .collect()
}
