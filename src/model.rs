use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Status::Active),
            "inactive" => Some(Status::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    All,
    Teachers,
    Students,
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Teachers => "teachers",
            Audience::Students => "students",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Audience::All),
            "teachers" => Some(Audience::Teachers),
            "students" => Some(Audience::Students),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub roll_number: String,
    pub class_id: String,
    pub status: Status,
    pub average_score: f64,
    pub attendance: f64,
    pub role: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub password: String,
    pub roll_number: String,
    pub class_id: String,
    pub status: Option<Status>,
    pub average_score: Option<f64>,
    pub attendance: Option<f64>,
}

/// Fields a grading or attendance flow may change after enrolment.
#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub status: Option<Status>,
    pub average_score: Option<f64>,
    pub attendance: Option<f64>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.average_score.is_none() && self.attendance.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub status: Status,
    pub total_quizzes: u32,
    pub role: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct NewTeacher {
    pub name: String,
    pub email: String,
    pub password: String,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub status: Option<Status>,
    pub total_quizzes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
    pub teacher_id: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Default)]
pub struct NewClass {
    pub name: String,
    pub teacher_id: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub author: String,
    pub priority: Priority,
    pub audience: Audience,
}

#[derive(Debug, Clone)]
pub struct NewNotice {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub audience: Audience,
    pub date: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlot {
    pub class_id: String,
    pub day: String,
    pub time: String,
    pub subject: String,
    pub teacher: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Students,
    Teachers,
    Classes,
    Notices,
    Timetable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEvent {
    pub revision: u64,
    pub collection: Collection,
    pub kind: ChangeKind,
    pub id: String,
}

pub const SUBJECTS: [&str; 8] = [
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "English",
    "History",
    "Geography",
    "Computer Science",
];

pub const DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

pub const TIME_SLOTS: [&str; 7] = [
    "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "01:00 PM", "02:00 PM", "03:00 PM",
];

pub const DEFAULT_NOTICE_AUTHOR: &str = "Admin";
pub const DEFAULT_AVERAGE_SCORE: f64 = 0.0;
pub const DEFAULT_ATTENDANCE: f64 = 100.0;
