use serde::Serialize;

use crate::model::{Class, Notice, Priority, Status, Student, Teacher, SUBJECTS};

pub const RECENT_STUDENTS: usize = 5;

/// Half-up rounding to one decimal, the way scores are shown on the cards.
pub fn round_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut n: usize = 0;
    let mut sum = 0.0;
    for v in values {
        n += 1;
        sum += v;
    }
    if n == 0 {
        None
    } else {
        Some(round_1_decimal(sum / n as f64))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassPerformance {
    pub class_id: String,
    pub name: String,
    pub student_count: usize,
    pub average_score: Option<f64>,
}

pub fn class_performance(classes: &[Class], students: &[Student]) -> Vec<ClassPerformance> {
    classes
        .iter()
        .map(|c| {
            let members: Vec<&Student> = students.iter().filter(|s| s.class_id == c.id).collect();
            ClassPerformance {
                class_id: c.id.clone(),
                name: c.name.clone(),
                student_count: members.len(),
                average_score: mean(members.iter().map(|s| s.average_score)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectCount {
    pub subject: String,
    pub teachers: usize,
}

/// Catalogue subjects always appear (possibly with zero); anything else a
/// teacher lists follows in first-seen order.
pub fn subject_distribution(teachers: &[Teacher]) -> Vec<SubjectCount> {
    let mut out: Vec<SubjectCount> = SUBJECTS
        .iter()
        .map(|s| SubjectCount {
            subject: s.to_string(),
            teachers: 0,
        })
        .collect();
    for t in teachers {
        for subject in &t.subjects {
            match out.iter_mut().find(|c| c.subject == *subject) {
                Some(c) => c.teachers += 1,
                None => out.push(SubjectCount {
                    subject: subject.clone(),
                    teachers: 1,
                }),
            }
        }
    }
    out
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBands {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

pub fn attendance_bands(students: &[Student]) -> AttendanceBands {
    let mut bands = AttendanceBands::default();
    for s in students {
        if s.attendance >= 90.0 {
            bands.high += 1;
        } else if s.attendance >= 75.0 {
            bands.medium += 1;
        } else {
            bands.low += 1;
        }
    }
    bands
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PriorityBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

pub fn priority_breakdown(notices: &[Notice]) -> PriorityBreakdown {
    let mut out = PriorityBreakdown::default();
    for n in notices {
        match n.priority {
            Priority::Low => out.low += 1,
            Priority::Medium => out.medium += 1,
            Priority::High => out.high += 1,
        }
    }
    out
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub total_teachers: usize,
    pub total_classes: usize,
    pub total_notices: usize,
    pub active_students: usize,
    pub average_attendance: Option<f64>,
    pub average_performance: Option<f64>,
    pub recent_students: Vec<Student>,
    pub class_performance: Vec<ClassPerformance>,
}

pub fn dashboard_summary(
    students: &[Student],
    teachers: &[Teacher],
    classes: &[Class],
    notices: &[Notice],
) -> DashboardSummary {
    DashboardSummary {
        total_students: students.len(),
        total_teachers: teachers.len(),
        total_classes: classes.len(),
        total_notices: notices.len(),
        active_students: students
            .iter()
            .filter(|s| s.status == Status::Active)
            .count(),
        average_attendance: mean(students.iter().map(|s| s.attendance)),
        average_performance: mean(students.iter().map(|s| s.average_score)),
        recent_students: students.iter().take(RECENT_STUDENTS).cloned().collect(),
        class_performance: class_performance(classes, students),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub class_performance: Vec<ClassPerformance>,
    pub subject_distribution: Vec<SubjectCount>,
    pub attendance_bands: AttendanceBands,
    pub priority_breakdown: PriorityBreakdown,
}

pub fn analytics_overview(
    students: &[Student],
    teachers: &[Teacher],
    classes: &[Class],
    notices: &[Notice],
) -> AnalyticsOverview {
    AnalyticsOverview {
        class_performance: class_performance(classes, students),
        subject_distribution: subject_distribution(teachers),
        attendance_bands: attendance_bands(students),
        priority_breakdown: priority_breakdown(notices),
    }
}
