use std::fmt;
use std::ops::{Index, IndexMut};

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Namespace for deriving student ids from email addresses.
const STUDENT_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_4b2e_93d7_4a0c_b5e8_2f71_d0a9_c364);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Course {
    Python,
    #[serde(rename = "DSA")]
    Dsa,
    Databases,
    Flask,
}

impl Course {
    /// Fixed order used for point updates and every per-course listing.
    pub const ALL: [Course; 4] = [Course::Python, Course::Dsa, Course::Databases, Course::Flask];

    pub fn name(self) -> &'static str {
        match self {
            Course::Python => "Python",
            Course::Dsa => "DSA",
            Course::Databases => "Databases",
            Course::Flask => "Flask",
        }
    }

    /// Points needed for 100% completion.
    pub fn threshold(self) -> u64 {
        match self {
            Course::Python => 600,
            Course::Dsa => 400,
            Course::Databases => 480,
            Course::Flask => 550,
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(input: &str) -> Option<Course> {
        Course::ALL
            .into_iter()
            .find(|course| course.name().eq_ignore_ascii_case(input.trim()))
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per course, indexed by [`Course`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerCourse<T>([T; 4]);

impl<T> PerCourse<T> {
    pub fn from_fn(mut f: impl FnMut(Course) -> T) -> Self {
        PerCourse(Course::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Course, &T)> {
        Course::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> From<[T; 4]> for PerCourse<T> {
    fn from(values: [T; 4]) -> Self {
        PerCourse(values)
    }
}

impl<T> Index<Course> for PerCourse<T> {
    type Output = T;

    fn index(&self, course: Course) -> &T {
        &self.0[course.index()]
    }
}

impl<T> IndexMut<Course> for PerCourse<T> {
    fn index_mut(&mut self, course: Course) -> &mut T {
        &mut self.0[course.index()]
    }
}

impl<T: Serialize> Serialize for PerCourse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for (course, value) in self.iter() {
            map.serialize_entry(course.name(), value)?;
        }
        map.end()
    }
}

/// A per-course statistic, or n/a when the course has no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric<T> {
    NotApplicable,
    Value(T),
}

impl<T: Copy> Metric<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Metric::NotApplicable => None,
            Metric::Value(value) => Some(*value),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::NotApplicable => f.write_str("n/a"),
            Metric::Value(value) => value.fmt(f),
        }
    }
}

/// Courses selected by a ranking query. Empty renders as n/a.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct CourseSet(pub Vec<Course>);

impl CourseSet {
    pub fn contains(&self, course: Course) -> bool {
        self.0.contains(&course)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CourseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("n/a");
        }
        let names: Vec<&str> = self.0.iter().map(|course| course.name()).collect();
        f.write_str(&names.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub progress: PerCourse<u64>,
    pub submissions: PerCourse<u64>,
    pub completed: PerCourse<bool>,
    pub notified: PerCourse<bool>,
}

impl Student {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Student {
            id: student_id(email),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            progress: PerCourse::default(),
            submissions: PerCourse::default(),
            completed: PerCourse::default(),
            notified: PerCourse::default(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_enrolled(&self, course: Course) -> bool {
        self.progress[course] > 0
    }

    /// Adds every strictly positive delta and counts it as one submission.
    pub fn update_points(&mut self, points: &PerCourse<u64>) {
        for (course, &delta) in points.iter() {
            if delta > 0 {
                self.progress[course] = self.progress[course].saturating_add(delta);
                self.submissions[course] += 1;
            }
        }
    }
}

/// Stable id for an email: the high 64 bits of its UUID v5.
pub fn student_id(email: &str) -> u64 {
    Uuid::new_v5(&STUDENT_NAMESPACE, email.as_bytes()).as_u64_pair().0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub student_id: u64,
    pub course: Course,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseStanding {
    pub student_id: u64,
    pub points: u64,
    pub completion: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSummary {
    pub popularity: PerCourse<Metric<usize>>,
    pub activity: PerCourse<Metric<u64>>,
    pub difficulty: PerCourse<Metric<f64>>,
    pub most_popular: CourseSet,
    pub least_popular: CourseSet,
    pub highest_activity: CourseSet,
    pub lowest_activity: CourseSet,
    pub easiest: CourseSet,
    pub hardest: CourseSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_id_is_stable_per_email() {
        assert_eq!(student_id("john.doe@example.com"), student_id("john.doe@example.com"));
        assert_ne!(student_id("john.doe@example.com"), student_id("jane.doe@example.com"));
    }

    #[test]
    fn update_points_skips_zero_deltas() {
        let mut student = Student::new("John", "Doe", "john.doe@example.com");
        student.update_points(&PerCourse::from([5, 10, 15, 20]));
        student.update_points(&PerCourse::from([0, 0, 0, 0]));

        assert_eq!(student.progress, PerCourse::from([5, 10, 15, 20]));
        assert_eq!(student.submissions, PerCourse::from([1, 1, 1, 1]));
        assert_eq!(student.completed, PerCourse::default());
        assert_eq!(student.notified, PerCourse::default());
    }

    #[test]
    fn enrollment_follows_positive_progress() {
        let mut student = Student::new("John", "Doe", "john.doe@example.com");
        assert!(!student.is_enrolled(Course::Python));

        student.update_points(&PerCourse::from([5, 0, 10, 0]));
        assert!(student.is_enrolled(Course::Python));
        assert!(!student.is_enrolled(Course::Dsa));
        assert!(student.is_enrolled(Course::Databases));
        assert!(!student.is_enrolled(Course::Flask));
    }

    #[test]
    fn course_names_parse_case_insensitively() {
        assert_eq!(Course::from_name("dsa"), Some(Course::Dsa));
        assert_eq!(Course::from_name("PYTHON"), Some(Course::Python));
        assert_eq!(Course::from_name("Rust"), None);
    }

    #[test]
    fn empty_course_set_renders_as_na() {
        assert_eq!(CourseSet::default().to_string(), "n/a");
        assert_eq!(
            CourseSet(vec![Course::Python, Course::Flask]).to_string(),
            "Python, Flask"
        );
    }
}
