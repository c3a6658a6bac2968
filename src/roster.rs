//! Student roster, loaded once at startup and immutable for the session.
use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::model::Student;

static CONTACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,}$").expect("valid contact regex"));

#[derive(Debug)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read roster file {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let students: Vec<Student> =
            serde_json::from_str(content).context("invalid roster JSON")?;
        for student in &students {
            validate_student(student)?;
        }
        Ok(Self { students })
    }

    pub fn find(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

/// Reject records that break the roster invariants: attendance day counts
/// must sum, the stored percentage must match the day counts within 0.1,
/// rank must fall within the class, and delivery contacts must look like
/// phone numbers.
fn validate_student(student: &Student) -> Result<()> {
    let att = &student.attendance;
    if att.present_days + att.absent_days != att.total_days {
        return Err(anyhow!(
            "student {}: attendance days do not sum ({} + {} != {})",
            student.id,
            att.present_days,
            att.absent_days,
            att.total_days
        ));
    }
    if att.total_days == 0 {
        return Err(anyhow!("student {}: attendance has zero total days", student.id));
    }
    let recomputed = att.present_days as f64 / att.total_days as f64 * 100.0;
    if (recomputed - att.percentage).abs() > 0.1 {
        return Err(anyhow!(
            "student {}: attendance percentage {} does not match {}/{} days",
            student.id,
            att.percentage,
            att.present_days,
            att.total_days
        ));
    }

    let perf = &student.overall_performance;
    if perf.rank < 1 || perf.rank > perf.total_students {
        return Err(anyhow!(
            "student {}: rank {} out of range 1..={}",
            student.id,
            perf.rank,
            perf.total_students
        ));
    }

    for (label, contact) in [
        ("parent_contact", &student.parent_contact),
        ("parent_whatsapp", &student.parent_whatsapp),
    ] {
        if !CONTACT_RE.is_match(contact) {
            return Err(anyhow!(
                "student {}: {} '{}' is not a phone number",
                student.id,
                label,
                contact
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttendanceRecord, PerformanceMetrics, Tier};

    fn valid_student() -> Student {
        Student {
            id: "1".into(),
            name: "Test Student".into(),
            class: "10th Grade".into(),
            roll_number: "S001".into(),
            parent_contact: "+91 9876543210".into(),
            parent_whatsapp: "+91 9876543210".into(),
            parent_name: "Test Parent".into(),
            subjects: vec![],
            attendance: AttendanceRecord {
                total_days: 120,
                present_days: 115,
                absent_days: 5,
                percentage: 95.8,
                status: Tier::Excellent,
            },
            overall_performance: PerformanceMetrics {
                overall_grade: "A".into(),
                percentage: 88.0,
                rank: 2,
                total_students: 45,
                ai_insights: vec![],
                recommendations: vec![],
                strengths: vec![],
                improvements: vec![],
            },
        }
    }

    #[test]
    fn accepts_valid_student() {
        validate_student(&valid_student()).unwrap();
    }

    #[test]
    fn rejects_mismatched_attendance_days() {
        let mut student = valid_student();
        student.attendance.absent_days = 4;
        assert!(validate_student(&student).is_err());
    }

    #[test]
    fn rejects_stale_attendance_percentage() {
        let mut student = valid_student();
        student.attendance.percentage = 90.0;
        let err = validate_student(&student).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn rejects_rank_out_of_range() {
        let mut student = valid_student();
        student.overall_performance.rank = 0;
        assert!(validate_student(&student).is_err());

        let mut student = valid_student();
        student.overall_performance.rank = 46;
        assert!(validate_student(&student).is_err());
    }

    #[test]
    fn rejects_bad_contact() {
        let mut student = valid_student();
        student.parent_whatsapp = "not a number".into();
        assert!(validate_student(&student).is_err());
    }

    #[test]
    fn from_json_round_trip() {
        let json = serde_json::to_string(&vec![valid_student()]).unwrap();
        let roster = Roster::from_json(&json).unwrap();
        assert_eq!(roster.len(), 1);
        assert!(roster.find("1").is_some());
        assert!(roster.find("2").is_none());
    }
}
