use chrono::Utc;
use std::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::backend::{DeliveryService, OutboundReport};
use crate::model::{Channel, DeliveryStatus, NotificationAttempt, Student};
use crate::report;

/// Aggregate counts over the attempt log. `sent + pending + failed` always
/// equals the log length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub sent: usize,
    pub pending: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct SingleOutcome {
    pub attempt: NotificationAttempt,
    pub acknowledgment: String,
}

#[derive(Debug, Clone)]
pub struct BulkOutcome {
    pub delivered: bool,
    pub students: usize,
    pub acknowledgment: String,
}

/// Owns the session's append-only notification log and orchestrates sends
/// against a [`DeliveryService`].
///
/// A delivery failure never escapes an operation here; it is recorded as a
/// `Failed` attempt and surfaced in the returned acknowledgment. The log is
/// guarded by a mutex whose lock is never held across an await, so sends for
/// different students (or repeats for the same student) may be in flight
/// concurrently.
pub struct DispatchTracker {
    log: Mutex<Vec<NotificationAttempt>>,
}

impl DispatchTracker {
    pub fn new() -> Self {
        Self {
            log: Mutex::new(Vec::new()),
        }
    }

    /// Generate and deliver one student's report, tracking the attempt from
    /// `Pending` to its terminal state.
    #[instrument(skip_all, fields(student_id = %student.id, channel = channel.as_str()))]
    pub async fn send_single(
        &self,
        delivery: &dyn DeliveryService,
        student: &Student,
        channel: Channel,
    ) -> SingleOutcome {
        let message = report::generate_report(student);
        let attempt = NotificationAttempt {
            id: Uuid::new_v4(),
            student_id: student.id.clone(),
            parent_contact: student.parent_contact.clone(),
            parent_whatsapp: student.parent_whatsapp.clone(),
            message: message.clone(),
            channel,
            status: DeliveryStatus::Pending,
            created_at: Utc::now(),
            sent_at: None,
        };
        let attempt_id = attempt.id;
        self.append(attempt.clone());

        let outbound = OutboundReport {
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            parent_name: student.parent_name.clone(),
            parent_contact: student.parent_contact.clone(),
            parent_whatsapp: student.parent_whatsapp.clone(),
            message,
        };

        match delivery.send_notification(&outbound, channel).await {
            Ok(()) => {
                info!(%attempt_id, "notification delivered");
                let resolved = self
                    .resolve(attempt_id, DeliveryStatus::Sent)
                    .unwrap_or(attempt);
                SingleOutcome {
                    acknowledgment: format!(
                        "Report sent to {} via {}.",
                        student.parent_name,
                        channel.as_str()
                    ),
                    attempt: resolved,
                }
            }
            Err(err) => {
                warn!(?err, %attempt_id, "notification failed");
                let resolved = self
                    .resolve(attempt_id, DeliveryStatus::Failed)
                    .unwrap_or(attempt);
                SingleOutcome {
                    acknowledgment: format!(
                        "Failed to send report to {}; nothing was delivered.",
                        student.parent_name
                    ),
                    attempt: resolved,
                }
            }
        }
    }

    /// Deliver reports for every given student in one backend call.
    ///
    /// The batch is accounted for as a whole: no per-student attempts are
    /// appended to the log, and a batch failure produces no `Failed` entries.
    #[instrument(skip_all, fields(students = students.len()))]
    pub async fn send_bulk(
        &self,
        delivery: &dyn DeliveryService,
        students: &[Student],
    ) -> BulkOutcome {
        let reports: Vec<OutboundReport> = students
            .iter()
            .map(|student| OutboundReport {
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                parent_name: student.parent_name.clone(),
                parent_contact: student.parent_contact.clone(),
                parent_whatsapp: student.parent_whatsapp.clone(),
                message: report::generate_report(student),
            })
            .collect();

        match delivery.send_bulk(&reports).await {
            Ok(()) => {
                info!("bulk send succeeded");
                BulkOutcome {
                    delivered: true,
                    students: students.len(),
                    acknowledgment: format!(
                        "Performance reports sent for all {} students.",
                        students.len()
                    ),
                }
            }
            Err(err) => {
                warn!(?err, "bulk send failed");
                BulkOutcome {
                    delivered: false,
                    students: students.len(),
                    acknowledgment: "Bulk send failed; no reports were delivered.".to_string(),
                }
            }
        }
    }

    pub fn counts(&self) -> StatusCounts {
        let log = self.log.lock().expect("attempt log poisoned");
        let mut counts = StatusCounts {
            sent: 0,
            pending: 0,
            failed: 0,
        };
        for attempt in log.iter() {
            match attempt.status {
                DeliveryStatus::Sent => counts.sent += 1,
                DeliveryStatus::Pending => counts.pending += 1,
                DeliveryStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// All attempts referencing the student, in creation order.
    pub fn history_for(&self, student_id: &str) -> Vec<NotificationAttempt> {
        let log = self.log.lock().expect("attempt log poisoned");
        log.iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect()
    }

    /// Snapshot of the whole log in creation order.
    pub fn attempts(&self) -> Vec<NotificationAttempt> {
        self.log.lock().expect("attempt log poisoned").clone()
    }

    fn append(&self, attempt: NotificationAttempt) {
        self.log.lock().expect("attempt log poisoned").push(attempt);
    }

    /// Move a pending attempt to its terminal state. Attempts already
    /// resolved are left untouched.
    fn resolve(&self, id: Uuid, status: DeliveryStatus) -> Option<NotificationAttempt> {
        let mut log = self.log.lock().expect("attempt log poisoned");
        let attempt = log
            .iter_mut()
            .find(|a| a.id == id && a.status == DeliveryStatus::Pending)?;
        attempt.status = status;
        if status == DeliveryStatus::Sent {
            attempt.sent_at = Some(Utc::now());
        }
        Some(attempt.clone())
    }
}

impl Default for DispatchTracker {
    fn default() -> Self {
        Self::new()
    }
}
