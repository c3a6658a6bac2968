//! Parent-facing performance report text.
//!
//! Pure functions over a [`Student`] record: same input, byte-identical
//! output. Delivery is the dispatcher's concern.
use std::fmt::Write;

use crate::model::{Student, Subject};

/// Overall performance label for the report body.
pub fn performance_level(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "excellent"
    } else if percentage >= 75.0 {
        "good"
    } else if percentage >= 60.0 {
        "average"
    } else {
        "needs attention"
    }
}

/// Attendance label for the report body. Anything under 80% is flagged.
pub fn attendance_level(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "excellent"
    } else if percentage >= 80.0 {
        "good"
    } else {
        "concerning"
    }
}

/// Top `n` subjects by obtained marks, descending. Ties keep their relative
/// order from the input sequence.
pub fn top_subjects(subjects: &[Subject], n: usize) -> Vec<&Subject> {
    let mut ranked: Vec<&Subject> = subjects.iter().collect();
    ranked.sort_by(|a, b| b.obtained_marks.cmp(&a.obtained_marks));
    ranked.truncate(n);
    ranked
}

/// Render the full report for one student.
pub fn generate_report(student: &Student) -> String {
    let perf = &student.overall_performance;
    let attendance = &student.attendance;

    let mut out = String::new();
    let _ = writeln!(out, "🎓 STUDENT PERFORMANCE REPORT - {}", student.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "📊 ACADEMIC PERFORMANCE:");
    let _ = writeln!(
        out,
        "• Overall Grade: {} ({}%)",
        perf.overall_grade, perf.percentage
    );
    let _ = writeln!(
        out,
        "• Class Rank: #{} out of {}",
        perf.rank, perf.total_students
    );
    let _ = writeln!(
        out,
        "• Performance Level: {}",
        performance_level(perf.percentage).to_uppercase()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "📚 TOP SUBJECTS:");
    for subject in top_subjects(&student.subjects, 3) {
        let _ = writeln!(
            out,
            "• {}: {}/{} ({})",
            subject.name, subject.obtained_marks, subject.total_marks, subject.grade
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "📅 ATTENDANCE:");
    let _ = writeln!(
        out,
        "• {}% ({}/{} days)",
        attendance.percentage, attendance.present_days, attendance.total_days
    );
    let _ = writeln!(
        out,
        "• Status: {}",
        attendance_level(attendance.percentage).to_uppercase()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "🤖 AI INSIGHTS:");
    for insight in perf.ai_insights.iter().take(2) {
        let _ = writeln!(out, "• {}", insight);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "🎯 RECOMMENDATIONS:");
    for rec in perf.recommendations.iter().take(2) {
        let _ = writeln!(out, "• {}", rec);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "For detailed analysis, contact the school.");
    let _ = write!(out, "Best regards, Academic AI Assistant");

    out
}
