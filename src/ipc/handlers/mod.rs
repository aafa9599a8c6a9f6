pub mod analytics;
pub mod classes;
pub mod core;
pub mod dashboard;
pub mod notices;
pub mod students;
pub mod teachers;
pub mod timetable;
