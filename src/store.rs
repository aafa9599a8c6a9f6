use std::sync::mpsc::{self, Receiver, Sender};

use rusqlite::{types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db;
use crate::model::{
    Audience, ChangeKind, Class, Collection, NewClass, NewNotice, NewStudent, NewTeacher, Notice,
    Priority, Status, StoreEvent, Student, StudentPatch, Teacher, TimetableSlot,
    DEFAULT_ATTENDANCE, DEFAULT_AVERAGE_SCORE, DEFAULT_NOTICE_AUTHOR, DAYS, SUBJECTS, TIME_SLOTS,
};

const STUDENT_COLUMNS: &str =
    "id, name, email, password, roll_number, class_id, status, average_score, attendance";
const TEACHER_COLUMNS: &str =
    "id, name, email, password, subjects_json, classes_json, status, total_quizzes";

/// Shared school state: the record collections every view reads, plus the
/// append operations that feed them.
///
/// Reads return snapshots in insertion order. Writes never reject their input;
/// soft references (`classId`, `teacherId`) are stored as given.
pub struct Store {
    conn: Connection,
    revision: u64,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl Store {
    pub fn open() -> anyhow::Result<Self> {
        Ok(Self {
            conn: db::open_memory_db()?,
            revision: 0,
            subscribers: Vec::new(),
        })
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers a consumer. Every later mutation is delivered once to the
    /// returned receiver; dropping it unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, collection: Collection, kind: ChangeKind, id: &str) {
        self.revision += 1;
        let event = StoreEvent {
            revision: self.revision,
            collection,
            kind,
            id: id.to_string(),
        };
        tracing::debug!(
            revision = event.revision,
            collection = ?collection,
            kind = ?kind,
            id,
            "store changed"
        );
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subjects(&self) -> Vec<String> {
        SUBJECTS.iter().map(|s| s.to_string()).collect()
    }

    // --- students ---

    pub fn students(&self) -> anyhow::Result<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY sort_order"
        ))?;
        let rows = stmt
            .query_map([], student_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_student(&self, id: &str) -> anyhow::Result<Option<Student>> {
        let s = self
            .conn
            .query_row(
                &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"),
                [id],
                student_from_row,
            )
            .optional()?;
        Ok(s)
    }

    pub fn add_student(&mut self, new: NewStudent) -> anyhow::Result<Student> {
        let student = Student {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            password: new.password,
            roll_number: new.roll_number,
            class_id: new.class_id,
            status: new.status.unwrap_or_default(),
            average_score: new.average_score.unwrap_or(DEFAULT_AVERAGE_SCORE),
            attendance: new.attendance.unwrap_or(DEFAULT_ATTENDANCE),
            role: "student",
        };
        let sort_order = db::next_sort_order(&self.conn, "students")?;
        self.conn.execute(
            "INSERT INTO students(
               id, name, email, password, roll_number, class_id,
               status, average_score, attendance, sort_order
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &student.id,
                &student.name,
                &student.email,
                &student.password,
                &student.roll_number,
                &student.class_id,
                student.status.as_str(),
                student.average_score,
                student.attendance,
                sort_order,
            ),
        )?;
        self.publish(Collection::Students, ChangeKind::Added, &student.id);
        Ok(student)
    }

    /// Applies a grading/attendance patch. `None` when the id is unknown.
    pub fn update_student(
        &mut self,
        id: &str,
        patch: StudentPatch,
    ) -> anyhow::Result<Option<Student>> {
        let Some(mut student) = self.find_student(id)? else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(student));
        }
        if let Some(status) = patch.status {
            student.status = status;
        }
        if let Some(score) = patch.average_score {
            student.average_score = score;
        }
        if let Some(attendance) = patch.attendance {
            student.attendance = attendance;
        }
        self.conn.execute(
            "UPDATE students SET status = ?, average_score = ?, attendance = ? WHERE id = ?",
            (
                student.status.as_str(),
                student.average_score,
                student.attendance,
                id,
            ),
        )?;
        self.publish(Collection::Students, ChangeKind::Updated, id);
        Ok(Some(student))
    }

    // --- teachers ---

    pub fn teachers(&self) -> anyhow::Result<Vec<Teacher>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers ORDER BY sort_order"
        ))?;
        let rows = stmt
            .query_map([], teacher_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_teacher(&self, id: &str) -> anyhow::Result<Option<Teacher>> {
        let t = self
            .conn
            .query_row(
                &format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = ?"),
                [id],
                teacher_from_row,
            )
            .optional()?;
        Ok(t)
    }

    pub fn add_teacher(&mut self, new: NewTeacher) -> anyhow::Result<Teacher> {
        let teacher = Teacher {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            password: new.password,
            subjects: new.subjects,
            classes: new.classes,
            status: new.status.unwrap_or_default(),
            total_quizzes: new.total_quizzes.unwrap_or(0),
            role: "teacher",
        };
        let sort_order = db::next_sort_order(&self.conn, "teachers")?;
        self.conn.execute(
            "INSERT INTO teachers(
               id, name, email, password, subjects_json, classes_json,
               status, total_quizzes, sort_order
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &teacher.id,
                &teacher.name,
                &teacher.email,
                &teacher.password,
                serde_json::to_string(&teacher.subjects)?,
                serde_json::to_string(&teacher.classes)?,
                teacher.status.as_str(),
                teacher.total_quizzes,
                sort_order,
            ),
        )?;
        self.publish(Collection::Teachers, ChangeKind::Added, &teacher.id);
        Ok(teacher)
    }

    // --- classes ---

    pub fn classes(&self) -> anyhow::Result<Vec<Class>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, teacher_id, capacity FROM classes ORDER BY sort_order",
        )?;
        let rows = stmt
            .query_map([], class_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_class(&self, id: &str) -> anyhow::Result<Option<Class>> {
        let c = self
            .conn
            .query_row(
                "SELECT id, name, teacher_id, capacity FROM classes WHERE id = ?",
                [id],
                class_from_row,
            )
            .optional()?;
        Ok(c)
    }

    pub fn add_class(&mut self, new: NewClass) -> anyhow::Result<Class> {
        let class = Class {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            teacher_id: new.teacher_id,
            capacity: new.capacity,
        };
        let sort_order = db::next_sort_order(&self.conn, "classes")?;
        self.conn.execute(
            "INSERT INTO classes(id, name, teacher_id, capacity, sort_order) VALUES(?, ?, ?, ?, ?)",
            (
                &class.id,
                &class.name,
                &class.teacher_id,
                class.capacity,
                sort_order,
            ),
        )?;
        self.publish(Collection::Classes, ChangeKind::Added, &class.id);
        Ok(class)
    }

    // --- notices ---

    pub fn notices(&self) -> anyhow::Result<Vec<Notice>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, date, author, priority, audience
             FROM notices
             ORDER BY sort_order",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let priority: String = row.get(5)?;
                let audience: String = row.get(6)?;
                Ok(Notice {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                    date: row.get(3)?,
                    author: row.get(4)?,
                    priority: Priority::parse(&priority).unwrap_or(Priority::Low),
                    audience: Audience::parse(&audience).unwrap_or(Audience::All),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Omitted (or blank) `date` becomes today's local date; omitted `author`
    /// becomes the default author.
    pub fn add_notice(&mut self, new: NewNotice) -> anyhow::Result<Notice> {
        let date = new
            .date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        let author = new
            .author
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NOTICE_AUTHOR.to_string());
        let notice = Notice {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            content: new.content,
            date,
            author,
            priority: new.priority,
            audience: new.audience,
        };
        let sort_order = db::next_sort_order(&self.conn, "notices")?;
        self.conn.execute(
            "INSERT INTO notices(id, title, content, date, author, priority, audience, sort_order)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &notice.id,
                &notice.title,
                &notice.content,
                &notice.date,
                &notice.author,
                notice.priority.as_str(),
                notice.audience.as_str(),
                sort_order,
            ),
        )?;
        self.publish(Collection::Notices, ChangeKind::Added, &notice.id);
        Ok(notice)
    }

    // --- timetable ---

    /// Slots for one class, ordered by weekday then time of day.
    pub fn timetable(&self, class_id: &str) -> anyhow::Result<Vec<TimetableSlot>> {
        let mut stmt = self.conn.prepare(
            "SELECT class_id, day, time, subject, teacher
             FROM timetable_slots
             WHERE class_id = ?",
        )?;
        let mut slots = stmt
            .query_map([class_id], |row| {
                Ok(TimetableSlot {
                    class_id: row.get(0)?,
                    day: row.get(1)?,
                    time: row.get(2)?,
                    subject: row.get(3)?,
                    teacher: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        slots.sort_by_key(|s| (grid_position(&DAYS, &s.day), grid_position(&TIME_SLOTS, &s.time)));
        Ok(slots)
    }

    /// Replaces whatever occupied (class, day, time).
    pub fn set_timetable_slot(&mut self, slot: TimetableSlot) -> anyhow::Result<TimetableSlot> {
        self.conn.execute(
            "INSERT INTO timetable_slots(class_id, day, time, subject, teacher)
             VALUES(?, ?, ?, ?, ?)
             ON CONFLICT(class_id, day, time) DO UPDATE SET
               subject = excluded.subject,
               teacher = excluded.teacher",
            (
                &slot.class_id,
                &slot.day,
                &slot.time,
                &slot.subject,
                &slot.teacher,
            ),
        )?;
        self.publish(Collection::Timetable, ChangeKind::Updated, &slot.class_id);
        Ok(slot)
    }

    pub fn clear_timetable_slot(
        &mut self,
        class_id: &str,
        day: &str,
        time: &str,
    ) -> anyhow::Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM timetable_slots WHERE class_id = ? AND day = ? AND time = ?",
            (class_id, day, time),
        )?;
        if n == 0 {
            return Ok(false);
        }
        self.publish(Collection::Timetable, ChangeKind::Removed, class_id);
        Ok(true)
    }
}

fn grid_position(grid: &[&str], value: &str) -> usize {
    grid.iter().position(|g| *g == value).unwrap_or(grid.len())
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    let status: String = row.get(6)?;
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        roll_number: row.get(4)?,
        class_id: row.get(5)?,
        status: Status::parse(&status).unwrap_or_default(),
        average_score: row.get(7)?,
        attendance: row.get(8)?,
        role: "student",
    })
}

fn teacher_from_row(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    let status: String = row.get(6)?;
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        subjects: json_list(row, 4)?,
        classes: json_list(row, 5)?,
        status: Status::parse(&status).unwrap_or_default(),
        total_quizzes: row.get(7)?,
        role: "teacher",
    })
}

fn class_from_row(row: &Row<'_>) -> rusqlite::Result<Class> {
    Ok(Class {
        id: row.get(0)?,
        name: row.get(1)?,
        teacher_id: row.get(2)?,
        capacity: row.get(3)?,
    })
}

fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
