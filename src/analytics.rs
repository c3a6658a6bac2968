//! Class-level display statistics: single-pass reductions over the roster.
use crate::model::Student;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeDistribution {
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub poor: usize,
}

#[derive(Debug, Clone)]
pub struct ClassSummary {
    pub total_students: usize,
    pub average_percentage: f64,
    pub average_attendance: f64,
    pub class_grade: &'static str,
    pub distribution: GradeDistribution,
}

/// Letter grade for the class average.
pub fn class_grade(average_percentage: f64) -> &'static str {
    if average_percentage >= 85.0 {
        "A"
    } else if average_percentage >= 75.0 {
        "B"
    } else if average_percentage >= 65.0 {
        "C"
    } else {
        "D"
    }
}

pub fn summarize(students: &[Student]) -> ClassSummary {
    let total = students.len();
    let mut distribution = GradeDistribution {
        excellent: 0,
        good: 0,
        average: 0,
        poor: 0,
    };
    let mut percentage_sum = 0.0;
    let mut attendance_sum = 0.0;
    for student in students {
        let pct = student.overall_performance.percentage;
        percentage_sum += pct;
        attendance_sum += student.attendance.percentage;
        if pct >= 90.0 {
            distribution.excellent += 1;
        } else if pct >= 75.0 {
            distribution.good += 1;
        } else if pct >= 60.0 {
            distribution.average += 1;
        } else {
            distribution.poor += 1;
        }
    }

    let average_percentage = if total == 0 {
        0.0
    } else {
        percentage_sum / total as f64
    };
    let average_attendance = if total == 0 {
        0.0
    } else {
        attendance_sum / total as f64
    };

    ClassSummary {
        total_students: total,
        average_percentage,
        average_attendance,
        class_grade: class_grade(average_percentage),
        distribution,
    }
}

/// Top `n` students by overall percentage, descending. Ties keep roster order.
pub fn top_performers(students: &[Student], n: usize) -> Vec<&Student> {
    let mut ranked: Vec<&Student> = students.iter().collect();
    ranked.sort_by(|a, b| {
        b.overall_performance
            .percentage
            .total_cmp(&a.overall_performance.percentage)
    });
    ranked.truncate(n);
    ranked
}

/// Students below 70% overall, lowest first.
pub fn needs_attention(students: &[Student]) -> Vec<&Student> {
    let mut flagged: Vec<&Student> = students
        .iter()
        .filter(|s| s.overall_performance.percentage < 70.0)
        .collect();
    flagged.sort_by(|a, b| {
        a.overall_performance
            .percentage
            .total_cmp(&b.overall_performance.percentage)
    });
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttendanceRecord, PerformanceMetrics, Tier};

    fn student(id: &str, percentage: f64, attendance: f64) -> Student {
        Student {
            id: id.into(),
            name: format!("Student {}", id),
            class: "10th Grade".into(),
            roll_number: format!("S{}", id),
            parent_contact: "+91 9876543210".into(),
            parent_whatsapp: "+91 9876543210".into(),
            parent_name: "Parent".into(),
            subjects: vec![],
            attendance: AttendanceRecord {
                total_days: 100,
                present_days: 90,
                absent_days: 10,
                percentage: attendance,
                status: Tier::Good,
            },
            overall_performance: PerformanceMetrics {
                overall_grade: "B".into(),
                percentage,
                rank: 1,
                total_students: 4,
                ai_insights: vec![],
                recommendations: vec![],
                strengths: vec![],
                improvements: vec![],
            },
        }
    }

    #[test]
    fn summarize_buckets_and_averages() {
        let students = vec![
            student("1", 92.0, 95.0),
            student("2", 80.0, 90.0),
            student("3", 65.0, 85.0),
            student("4", 55.0, 70.0),
        ];
        let summary = summarize(&students);
        assert_eq!(summary.total_students, 4);
        assert!((summary.average_percentage - 73.0).abs() < 1e-9);
        assert!((summary.average_attendance - 85.0).abs() < 1e-9);
        assert_eq!(summary.class_grade, "C");
        assert_eq!(summary.distribution.excellent, 1);
        assert_eq!(summary.distribution.good, 1);
        assert_eq!(summary.distribution.average, 1);
        assert_eq!(summary.distribution.poor, 1);
    }

    #[test]
    fn summarize_empty_roster() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_students, 0);
        assert_eq!(summary.average_percentage, 0.0);
        assert_eq!(summary.class_grade, "D");
    }

    #[test]
    fn class_grade_thresholds() {
        assert_eq!(class_grade(85.0), "A");
        assert_eq!(class_grade(75.0), "B");
        assert_eq!(class_grade(65.0), "C");
        assert_eq!(class_grade(64.9), "D");
    }

    #[test]
    fn top_performers_descending_and_stable() {
        let students = vec![
            student("1", 80.0, 90.0),
            student("2", 92.0, 90.0),
            student("3", 80.0, 90.0),
        ];
        let top = top_performers(&students, 3);
        let ids: Vec<&str> = top.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn needs_attention_lowest_first() {
        let students = vec![
            student("1", 68.0, 80.0),
            student("2", 85.0, 95.0),
            student("3", 55.0, 60.0),
        ];
        let flagged = needs_attention(&students);
        let ids: Vec<&str> = flagged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }
}
