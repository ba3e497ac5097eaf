use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::PerCourse;
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub rejected: usize,
}

#[derive(Deserialize)]
struct StudentRow {
    first_name: String,
    last_name: String,
    email: String,
}

#[derive(Deserialize)]
struct PointsRow {
    email: String,
    python: u64,
    dsa: u64,
    databases: u64,
    flask: u64,
}

pub fn load_students(registry: &mut Registry, reader: impl Read) -> anyhow::Result<ImportSummary> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut summary = ImportSummary::default();

    for (index, result) in reader.deserialize::<StudentRow>().enumerate() {
        let row = result.with_context(|| format!("malformed student row {}", index + 1))?;
        match registry.add_student(row.first_name.trim(), row.last_name.trim(), row.email.trim()) {
            Ok(_) => summary.added += 1,
            Err(err) => {
                tracing::warn!(row = index + 1, email = %row.email, error = %err, "Student row rejected");
                summary.rejected += 1;
            }
        }
    }

    Ok(summary)
}

pub fn load_points(registry: &mut Registry, reader: impl Read) -> anyhow::Result<ImportSummary> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut summary = ImportSummary::default();

    for (index, result) in reader.deserialize::<PointsRow>().enumerate() {
        let row = result.with_context(|| format!("malformed points row {}", index + 1))?;
        let Some(id) = registry.find_by_email(row.email.trim()).map(|student| student.id) else {
            tracing::warn!(row = index + 1, email = %row.email, "Points row for unknown student");
            summary.rejected += 1;
            continue;
        };
        let points = PerCourse::from([row.python, row.dsa, row.databases, row.flask]);
        registry.apply_points(id, &points)?;
        summary.added += 1;
    }

    Ok(summary)
}

pub fn load_students_file(registry: &mut Registry, path: &Path) -> anyhow::Result<ImportSummary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    load_students(registry, file)
}

pub fn load_points_file(registry: &mut Registry, path: &Path) -> anyhow::Result<ImportSummary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    load_points(registry, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;

    const STUDENTS: &str = "\
first_name,last_name,email
Avery,Lee,avery.lee@example.com
Jules,Moreno Diaz,jules.moreno@example.com
K,Patel,kiara.patel@example.com
Avery,Lee,avery.lee@example.com
";

    #[test]
    fn student_rows_are_validated_individually() {
        let mut registry = Registry::new();
        let summary = load_students(&mut registry, STUDENTS.as_bytes()).unwrap();

        assert_eq!(summary, ImportSummary { added: 2, rejected: 2 });
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.all_students()[1].last_name, "Moreno Diaz");
    }

    #[test]
    fn points_rows_map_emails_to_students() {
        let mut registry = Registry::new();
        load_students(&mut registry, STUDENTS.as_bytes()).unwrap();

        let points = "\
email,python,dsa,databases,flask
avery.lee@example.com,10,0,5,0
nobody@example.com,1,1,1,1
avery.lee@example.com,5,0,0,0
";
        let summary = load_points(&mut registry, points.as_bytes()).unwrap();
        assert_eq!(summary, ImportSummary { added: 2, rejected: 1 });

        let student = registry.find_by_email("avery.lee@example.com").unwrap();
        assert_eq!(student.progress[Course::Python], 15);
        assert_eq!(student.submissions[Course::Python], 2);
        assert_eq!(student.progress[Course::Databases], 5);
    }

    #[test]
    fn negative_points_fail_the_import() {
        let mut registry = Registry::new();
        load_students(&mut registry, STUDENTS.as_bytes()).unwrap();

        let points = "email,python,dsa,databases,flask\navery.lee@example.com,-1,0,0,0\n";
        assert!(load_points(&mut registry, points.as_bytes()).is_err());
    }
}
