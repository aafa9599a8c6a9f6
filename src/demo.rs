use crate::model::{
    Audience, NewClass, NewNotice, NewStudent, NewTeacher, Priority, Status, TimetableSlot,
};
use crate::store::Store;

/// Fills an empty store with a small sample school: three teachers, four
/// classes, a handful of students, one notice and a week of slots for 10-A.
pub fn seed(store: &mut Store) -> anyhow::Result<()> {
    let teachers = [
        ("Sarah Wilson", "sarah.wilson@school.edu", &["Mathematics"][..]),
        ("Mike Brown", "mike.brown@school.edu", &["Physics", "Chemistry"][..]),
        ("Emily Clark", "emily.clark@school.edu", &["English", "History"][..]),
    ];
    let mut teacher_ids = Vec::new();
    for (name, email, subjects) in teachers {
        let t = store.add_teacher(NewTeacher {
            name: name.to_string(),
            email: email.to_string(),
            password: "teacher123".to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })?;
        teacher_ids.push(t.id);
    }

    let classes = [("10-A", 0), ("10-B", 1), ("11-A", 2), ("11-B", 0)];
    let mut class_ids = Vec::new();
    for (name, teacher) in classes {
        let c = store.add_class(NewClass {
            name: name.to_string(),
            teacher_id: teacher_ids[teacher].clone(),
            capacity: 30,
        })?;
        class_ids.push(c.id);
    }

    let students = [
        ("Alice Johnson", "A001", 0, 88.0, 96.0, Status::Active),
        ("Brian Lee", "A002", 0, 74.5, 91.0, Status::Active),
        ("Chloe Martin", "B001", 1, 67.0, 82.0, Status::Active),
        ("Daniel Kim", "C001", 2, 92.0, 98.0, Status::Active),
        ("Eva Rossi", "D001", 3, 58.0, 70.0, Status::Inactive),
    ];
    for (name, roll, class, score, attendance, status) in students {
        let login = name.to_lowercase().replace(' ', ".");
        store.add_student(NewStudent {
            name: name.to_string(),
            email: format!("{login}@student.school.edu"),
            password: "student123".to_string(),
            roll_number: roll.to_string(),
            class_id: class_ids[class].clone(),
            status: Some(status),
            average_score: Some(score),
            attendance: Some(attendance),
        })?;
    }

    store.add_notice(NewNotice {
        title: "Term 1 exam schedule".to_string(),
        content: "The exam timetable for Term 1 is now available.".to_string(),
        priority: Priority::High,
        audience: Audience::All,
        date: None,
        author: None,
    })?;

    let slots = [
        ("Monday", "09:00 AM", "Mathematics", "Sarah Wilson"),
        ("Monday", "11:00 AM", "Physics", "Mike Brown"),
        ("Tuesday", "10:00 AM", "English", "Emily Clark"),
    ];
    for (day, time, subject, teacher) in slots {
        store.set_timetable_slot(TimetableSlot {
            class_id: class_ids[0].clone(),
            day: day.to_string(),
            time: time.to_string(),
            subject: subject.to_string(),
            teacher: teacher.to_string(),
        })?;
    }

    tracing::info!(revision = store.revision(), "demo data seeded");
    Ok(())
}
