use std::collections::HashSet;

use chrono::Utc;

use crate::models::{Course, Notification, Student};
use crate::registry::Registry;
use crate::stats::completion_percentage;

pub const SUBJECT: &str = "Your Learning Progress";

#[derive(Debug, Clone, Default)]
pub struct Dispatch {
    pub notifications: Vec<Notification>,
    /// Distinct students that received at least one notification.
    pub students_notified: usize,
}

/// Flags every enrolled student at or above the course threshold as completed.
pub fn mark_completions(registry: &mut Registry, course: Course) {
    for student in registry.students_mut() {
        if student.is_enrolled(course)
            && !student.completed[course]
            && completion_percentage(course, student.progress[course]) >= 100.0
        {
            student.completed[course] = true;
            tracing::debug!(student_id = student.id, %course, "Course completed");
        }
    }
}

/// Emits one notification per newly completed course. Already notified
/// courses are never sent again.
pub fn dispatch_notifications(registry: &mut Registry) -> Dispatch {
    for course in Course::ALL {
        mark_completions(registry, course);
    }

    let mut dispatch = Dispatch::default();
    let mut notified = HashSet::new();
    for student in registry.students_mut() {
        for course in Course::ALL {
            if student.completed[course] && !student.notified[course] {
                dispatch.notifications.push(compose(student, course));
                student.notified[course] = true;
                notified.insert(student.id);
            }
        }
    }
    dispatch.students_notified = notified.len();

    tracing::info!(
        notifications = dispatch.notifications.len(),
        students = dispatch.students_notified,
        "Notifications dispatched"
    );
    dispatch
}

fn compose(student: &Student, course: Course) -> Notification {
    Notification {
        student_id: student.id,
        course,
        to: student.email.clone(),
        subject: SUBJECT.to_string(),
        body: format!(
            "Hello, {}! You have accomplished our {} course!",
            student.full_name(),
            course
        ),
        sent_at: Utc::now(),
    }
}
