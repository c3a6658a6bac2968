use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Whatsapp,
    Both,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
            Channel::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

/// Coarse performance/attendance bucket derived from a percentage threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Excellent,
    Good,
    Average,
    Poor,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::Average => "average",
            Tier::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub total_marks: u32,
    pub obtained_marks: u32,
    pub grade: String,
    pub performance: Tier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub percentage: f64,
    pub status: Tier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub overall_grade: String,
    pub percentage: f64,
    pub rank: u32,
    pub total_students: u32,
    pub ai_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class: String,
    pub roll_number: String,
    pub parent_contact: String,
    pub parent_whatsapp: String,
    pub parent_name: String,
    pub subjects: Vec<Subject>,
    pub attendance: AttendanceRecord,
    pub overall_performance: PerformanceMetrics,
}

/// One record of a single notification dispatch action and its outcome.
///
/// Created in `Pending` state before the delivery call is issued, then
/// resolved in place exactly once to `Sent` or `Failed`. `sent_at` is set
/// only on the `Sent` transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAttempt {
    pub id: Uuid,
    pub student_id: String,
    pub parent_contact: String,
    pub parent_whatsapp: String,
    pub message: String,
    pub channel: Channel,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}
