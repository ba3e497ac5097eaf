use std::io::{self, BufRead, Write};

use crate::models::{Course, Student};
use crate::notify::dispatch_notifications;
use crate::registry::{
    parse_id, split_registration_line, LookupError, PointsUpdate, Registry,
};
use crate::report;
use crate::stats::CourseStats;

const INCORRECT_CREDENTIALS: &str = "Incorrect credentials.";
const INCORRECT_POINTS: &str = "Incorrect points format";

/// Interactive command loop over a registry.
///
/// End of input acts as `back` inside a sub-menu and as `exit` at the top
/// level.
pub struct Session<'a, R, W> {
    registry: &'a mut Registry,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(registry: &'a mut Registry, input: R, output: W) -> Self {
        Session {
            registry,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Learning Progress Tracker")?;
        while let Some(line) = self.next_line()? {
            match line.to_lowercase().as_str() {
                "exit" => break,
                "add students" => self.add_students()?,
                "list" => self.list()?,
                "add points" => self.add_points()?,
                "find" => self.find()?,
                "statistics" => self.statistics()?,
                "notify" => self.notify()?,
                "back" => writeln!(self.output, "Enter 'exit' to exit the program.")?,
                "" => writeln!(self.output, "No input")?,
                _ => writeln!(self.output, "Error: unknown command")?,
            }
        }
        writeln!(self.output, "Bye!")?;
        self.output.flush()
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buffer = String::new();
        if self.input.read_line(&mut buffer)? == 0 {
            return Ok(None);
        }
        Ok(Some(buffer.trim().to_string()))
    }

    fn next_entry(&mut self) -> io::Result<Option<String>> {
        Ok(self
            .next_line()?
            .filter(|line| !line.eq_ignore_ascii_case("back")))
    }

    fn add_students(&mut self) -> io::Result<()> {
        writeln!(self.output, "Enter student credentials or 'back' to return:")?;
        let mut added = 0usize;
        while let Some(line) = self.next_entry()? {
            if line.split(' ').count() < 3 {
                writeln!(self.output, "{INCORRECT_CREDENTIALS}")?;
                continue;
            }
            let Some((first, last, email)) = split_registration_line(&line) else {
                writeln!(self.output, "{INCORRECT_CREDENTIALS}")?;
                continue;
            };
            match self.registry.add_student(first, last, email) {
                Ok(_) => {
                    added += 1;
                    writeln!(self.output, "The student has been added.")?;
                }
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
        writeln!(self.output, "Total {added} students were added")
    }

    fn list(&mut self) -> io::Result<()> {
        if self.registry.is_empty() {
            return writeln!(self.output, "No students found.");
        }
        writeln!(self.output, "Students:")?;
        for student in self.registry.all_students() {
            writeln!(self.output, "{}", student.id)?;
        }
        Ok(())
    }

    fn add_points(&mut self) -> io::Result<()> {
        writeln!(self.output, "Enter an id and points or 'back' to return")?;
        while let Some(line) = self.next_entry()? {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 5 {
                writeln!(self.output, "{INCORRECT_POINTS}")?;
                continue;
            }
            if self.lookup(tokens[0]).is_none() {
                writeln!(self.output, "{}", LookupError::NotFound(tokens[0].to_string()))?;
                continue;
            }
            let Ok(update) = PointsUpdate::parse(&line) else {
                writeln!(self.output, "{INCORRECT_POINTS}")?;
                continue;
            };
            match self.registry.apply_points(update.student_id, &update.points) {
                Ok(()) => writeln!(self.output, "Points updated.")?,
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
        Ok(())
    }

    fn find(&mut self) -> io::Result<()> {
        writeln!(self.output, "Enter an id or 'back' to return")?;
        while let Some(line) = self.next_entry()? {
            let found = self
                .lookup(&line)
                .and_then(|id| self.registry.find_by_id(id))
                .map(points_line);
            match found {
                Some(points) => writeln!(self.output, "{points}")?,
                None => writeln!(self.output, "{}", LookupError::NotFound(line))?,
            }
        }
        Ok(())
    }

    fn statistics(&mut self) -> io::Result<()> {
        writeln!(
            self.output,
            "Type the name of a course to see details or 'back' to quit:"
        )?;
        let summary = CourseStats::new(self.registry).summary();
        for line in report::summary_lines(&summary) {
            writeln!(self.output, "{line}")?;
        }

        while let Some(line) = self.next_entry()? {
            match Course::from_name(&line) {
                Some(course) => {
                    let standings = CourseStats::new(self.registry).course_details(course);
                    write!(self.output, "{}", report::course_table(course, &standings))?;
                }
                None => writeln!(self.output, "Unknown course")?,
            }
        }
        Ok(())
    }

    fn notify(&mut self) -> io::Result<()> {
        let dispatch = dispatch_notifications(self.registry);
        for notification in &dispatch.notifications {
            write!(self.output, "{}", report::notification_text(notification))?;
        }
        writeln!(self.output, "{}", report::notified_total(dispatch.students_notified))
    }

    fn lookup(&self, token: &str) -> Option<u64> {
        parse_id(token).filter(|id| self.registry.find_by_id(*id).is_some())
    }
}

fn points_line(student: &Student) -> String {
    let progress = &student.progress;
    format!(
        "{} points: Python={}; DSA={}; Databases={}; Flask={}",
        student.id,
        progress[Course::Python],
        progress[Course::Dsa],
        progress[Course::Databases],
        progress[Course::Flask]
    )
}
