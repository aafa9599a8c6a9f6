use rusqlite::Connection;

/// Opens the session database. Nothing is written to disk; the data lives as
/// long as the connection.
pub fn open_memory_db() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            password TEXT NOT NULL,
            roll_number TEXT NOT NULL,
            class_id TEXT NOT NULL,
            status TEXT NOT NULL,
            average_score REAL NOT NULL,
            attendance REAL NOT NULL,
            sort_order INTEGER NOT NULL
        )",
        [],
    )?;
    // class_id is a soft reference: no FOREIGN KEY on purpose.
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_sort ON students(sort_order)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            password TEXT NOT NULL,
            subjects_json TEXT NOT NULL,
            classes_json TEXT NOT NULL,
            status TEXT NOT NULL,
            total_quizzes INTEGER NOT NULL,
            sort_order INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS classes(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            capacity INTEGER NOT NULL,
            sort_order INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS notices(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            date TEXT NOT NULL,
            author TEXT NOT NULL,
            priority TEXT NOT NULL,
            audience TEXT NOT NULL,
            sort_order INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS timetable_slots(
            class_id TEXT NOT NULL,
            day TEXT NOT NULL,
            time TEXT NOT NULL,
            subject TEXT NOT NULL,
            teacher TEXT NOT NULL,
            PRIMARY KEY(class_id, day, time)
        )",
        [],
    )?;

    Ok(conn)
}

/// Next insertion position for an append-only table.
pub fn next_sort_order(conn: &Connection, table: &str) -> anyhow::Result<i64> {
    let sql = format!("SELECT COALESCE(MAX(sort_order), -1) + 1 FROM {table}");
    let v: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_created_empty() {
        let conn = open_memory_db().expect("open");
        for table in ["students", "teachers", "classes", "notices", "timetable_slots"] {
            let n: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
                .expect("count");
            assert_eq!(n, 0, "{table}");
        }
        assert_eq!(next_sort_order(&conn, "students").expect("sort"), 0);
    }
}
