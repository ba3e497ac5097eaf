use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{PerCourse, Student};

static FIRST_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+(?:['-][A-Za-z]+)*$").expect("static pattern"));
static LAST_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+(?:[' -][A-Za-z]+)*$").expect("static pattern"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z0-9]+$").expect("static pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Incorrect first name.")]
    InvalidFirstName,
    #[error("Incorrect last name.")]
    InvalidLastName,
    #[error("Incorrect email.")]
    InvalidEmail,
    #[error("This email is already taken.")]
    DuplicateEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("No student is found for id={0}.")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointsError {
    #[error("expected an id and four point values")]
    WrongTokenCount,
    #[error("student id must be numeric")]
    InvalidId,
    #[error("point values must be non-negative integers")]
    InvalidPoints,
}

pub fn validate_first_name(name: &str) -> bool {
    FIRST_NAME.is_match(name) && long_enough(name)
}

pub fn validate_last_name(name: &str) -> bool {
    LAST_NAME.is_match(name) && long_enough(name)
}

pub fn validate_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

fn long_enough(name: &str) -> bool {
    name.len() > 1 && name.split(' ').all(|part| part.len() > 1)
}

/// Splits `First Last [Last...] email` into its three fields.
///
/// The first space ends the first name and the last space starts the email,
/// so everything in between is the last name. Returns `None` when the line
/// has fewer than two spaces.
pub fn split_registration_line(line: &str) -> Option<(&str, &str, &str)> {
    let (first, rest) = line.split_once(' ')?;
    let (last, email) = rest.rsplit_once(' ')?;
    Some((first, last, email))
}

/// Parses the four point values of an update, in course order.
pub fn parse_points<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<PerCourse<u64>, PointsError> {
    let mut values = [0u64; 4];
    let mut count = 0;
    for token in tokens {
        let slot = values.get_mut(count).ok_or(PointsError::InvalidPoints)?;
        *slot = parse_point(token).ok_or(PointsError::InvalidPoints)?;
        count += 1;
    }
    if count != values.len() {
        return Err(PointsError::InvalidPoints);
    }
    Ok(PerCourse::from(values))
}

/// A non-negative integer. Negative zero (`-0`, `-00`) counts as 0.
fn parse_point(token: &str) -> Option<u64> {
    match token.strip_prefix('-') {
        Some(zeros) => (!zeros.is_empty() && zeros.bytes().all(|b| b == b'0')).then_some(0),
        None => token.parse().ok(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointsUpdate {
    pub student_id: u64,
    pub points: PerCourse<u64>,
}

impl PointsUpdate {
    /// Parses `<id> <python> <dsa> <databases> <flask>`.
    pub fn parse(line: &str) -> Result<Self, PointsError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 5 {
            return Err(PointsError::WrongTokenCount);
        }
        let student_id = parse_id(tokens[0]).ok_or(PointsError::InvalidId)?;
        let points = parse_points(tokens[1..].iter().copied())?;
        Ok(PointsUpdate { student_id, points })
    }
}

/// Accepts only plain digit strings as ids.
pub fn parse_id(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[derive(Debug, Default)]
pub struct Registry {
    students: Vec<Student>,
    emails: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates in order first name, last name, email, uniqueness.
    pub fn add_student(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<u64, RegistrationError> {
        if !validate_first_name(first_name) {
            return Err(RegistrationError::InvalidFirstName);
        }
        if !validate_last_name(last_name) {
            return Err(RegistrationError::InvalidLastName);
        }
        if !validate_email(email) {
            return Err(RegistrationError::InvalidEmail);
        }
        if self.emails.contains(email) {
            return Err(RegistrationError::DuplicateEmail);
        }

        let student = Student::new(first_name, last_name, email);
        let id = student.id;
        self.emails.insert(student.email.clone());
        self.students.push(student);
        tracing::debug!(student_id = id, "Student registered");
        Ok(id)
    }

    pub fn find_by_id(&self, id: u64) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Student> {
        if !self.emails.contains(email) {
            return None;
        }
        self.students.iter().find(|student| student.email == email)
    }

    pub fn apply_points(&mut self, id: u64, points: &PerCourse<u64>) -> Result<(), LookupError> {
        let student = self
            .students
            .iter_mut()
            .find(|student| student.id == id)
            .ok_or_else(|| LookupError::NotFound(id.to_string()))?;
        student.update_points(points);
        tracing::debug!(student_id = id, ?points, "Points applied");
        Ok(())
    }

    pub fn all_students(&self) -> &[Student] {
        &self.students
    }

    pub(crate) fn students_mut(&mut self) -> &mut [Student] {
        &mut self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;

    #[test]
    fn first_names_allow_hyphen_and_apostrophe_segments() {
        assert!(validate_first_name("John"));
        assert!(validate_first_name("Anne-Marie"));
        assert!(validate_first_name("O'Neill"));
        assert!(!validate_first_name("J"));
        assert!(!validate_first_name("John123"));
        assert!(!validate_first_name(""));
        assert!(!validate_first_name("Anne Marie"));
        assert!(!validate_first_name("-Anne"));
    }

    #[test]
    fn last_names_also_allow_spaces() {
        assert!(validate_last_name("Doe"));
        assert!(validate_last_name("O'Connor"));
        assert!(validate_last_name("Smith-Jones"));
        assert!(validate_last_name("Smith Jones"));
        assert!(!validate_last_name("D"));
        assert!(!validate_last_name("Doe1"));
        assert!(!validate_last_name(""));
        assert!(!validate_last_name("Van D"));
    }

    #[test]
    fn emails_need_local_part_domain_and_tld() {
        assert!(validate_email("john.doe@example.com"));
        assert!(validate_email("alice@example.co.uk"));
        assert!(validate_email("user+name@example.com"));
        assert!(!validate_email("john.doe"));
        assert!(!validate_email("john.doe@com"));
        assert!(!validate_email("john.doe@.com"));
    }

    #[test]
    fn registration_line_splits_on_first_and_last_space() {
        assert_eq!(
            split_registration_line("John Doe john@example.com"),
            Some(("John", "Doe", "john@example.com"))
        );
        assert_eq!(
            split_registration_line("John Smith Jr. john.smith@example.com"),
            Some(("John", "Smith Jr.", "john.smith@example.com"))
        );
        assert_eq!(split_registration_line("JohnDoejohn@example.com"), None);
        assert_eq!(split_registration_line("John Doe"), None);
    }

    #[test]
    fn add_student_reports_first_failure() {
        let mut registry = Registry::new();
        assert!(registry.add_student("John", "Doe", "john.doe@example.com").is_ok());
        assert_eq!(registry.len(), 1);

        assert_eq!(
            registry.add_student("J", "D", "bad"),
            Err(RegistrationError::InvalidFirstName)
        );
        assert_eq!(
            registry.add_student("John", "D", "john.doe2@example.com"),
            Err(RegistrationError::InvalidLastName)
        );
        assert_eq!(
            registry.add_student("Jane", "Smith", "jane.smith"),
            Err(RegistrationError::InvalidEmail)
        );
        assert_eq!(
            registry.add_student("Jane", "Doe", "john.doe@example.com"),
            Err(RegistrationError::DuplicateEmail)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn find_by_id_returns_registered_student() {
        let mut registry = Registry::new();
        let id = registry
            .add_student("John", "Doe", "john.doe@example.com")
            .expect("valid student");

        let student = registry.find_by_id(id).expect("student present");
        assert_eq!(student.email, "john.doe@example.com");
        assert!(registry.find_by_id(id.wrapping_add(1)).is_none());
        assert_eq!(registry.find_by_email("john.doe@example.com").map(|s| s.id), Some(id));
    }

    #[test]
    fn apply_points_to_unknown_student_fails() {
        let mut registry = Registry::new();
        let result = registry.apply_points(42, &PerCourse::from([1, 2, 3, 4]));
        assert_eq!(result, Err(LookupError::NotFound("42".to_string())));
    }

    #[test]
    fn apply_points_accumulates_positive_deltas_only() {
        let mut registry = Registry::new();
        let id = registry
            .add_student("John", "Doe", "john.doe@example.com")
            .expect("valid student");

        registry.apply_points(id, &PerCourse::from([5, 10, 15, 20])).unwrap();
        registry.apply_points(id, &PerCourse::from([0, 0, 0, 0])).unwrap();
        registry.apply_points(id, &PerCourse::from([1, 0, 0, 0])).unwrap();

        let student = registry.find_by_id(id).unwrap();
        assert_eq!(student.progress[Course::Python], 6);
        assert_eq!(student.submissions[Course::Python], 2);
        assert_eq!(student.progress[Course::Flask], 20);
        assert_eq!(student.submissions[Course::Flask], 1);
    }

    #[test]
    fn points_update_requires_five_valid_tokens() {
        let update = PointsUpdate::parse("12345 10 20 30 40").unwrap();
        assert_eq!(update.student_id, 12345);
        assert_eq!(update.points, PerCourse::from([10, 20, 30, 40]));

        assert_eq!(
            PointsUpdate::parse("12345 10 20 30"),
            Err(PointsError::WrongTokenCount)
        );
        assert_eq!(
            PointsUpdate::parse("12345 10 20 30 40 50"),
            Err(PointsError::WrongTokenCount)
        );
        assert_eq!(
            PointsUpdate::parse("12345 -10 20 30 40"),
            Err(PointsError::InvalidPoints)
        );
        assert_eq!(
            PointsUpdate::parse("invalid_id 10 20 30 40"),
            Err(PointsError::InvalidId)
        );
        assert_eq!(
            PointsUpdate::parse("12345 ten 20 30 40"),
            Err(PointsError::InvalidPoints)
        );
    }

    #[test]
    fn negative_zero_points_count_as_zero() {
        let update = PointsUpdate::parse("12345 -0 -00 5 0").unwrap();
        assert_eq!(update.points, PerCourse::from([0, 0, 5, 0]));

        assert_eq!(parse_points(["-", "0", "0", "0"]), Err(PointsError::InvalidPoints));
        assert_eq!(parse_points(["-01", "0", "0", "0"]), Err(PointsError::InvalidPoints));
    }
}
