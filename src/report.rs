use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Course, CourseStanding, Notification, StatisticsSummary};

pub fn summary_lines(summary: &StatisticsSummary) -> Vec<String> {
    vec![
        format!("Most popular: {}", summary.most_popular),
        format!("Least popular: {}", summary.least_popular),
        format!("Highest activity: {}", summary.highest_activity),
        format!("Lowest activity: {}", summary.lowest_activity),
        format!("Easiest course: {}", summary.easiest),
        format!("Hardest course: {}", summary.hardest),
    ]
}

pub fn course_table(course: Course, standings: &[CourseStanding]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{course}");
    let _ = writeln!(output, "{:<24} {:<12} {:<12}", "id", "points", "completed");
    for standing in standings {
        let _ = writeln!(
            output,
            "{:<24} {:<12} {:.1}%",
            standing.student_id, standing.points, standing.completion
        );
    }
    output
}

pub fn notification_text(notification: &Notification) -> String {
    format!(
        "To: {}\nRe: {}\n{}\n",
        notification.to, notification.subject, notification.body
    )
}

pub fn notified_total(students: usize) -> String {
    let plural = if students == 1 { "" } else { "s" };
    format!("Total {students} student{plural} have been notified.")
}

pub fn build_markdown(
    generated_on: NaiveDate,
    summary: &StatisticsSummary,
    details: &[(Course, Vec<CourseStanding>)],
    notifications: &[Notification],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Learning Progress Report");
    let _ = writeln!(output, "Generated on {generated_on}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Course Statistics");
    for line in summary_lines(summary) {
        let _ = writeln!(output, "- {line}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "| Course | Enrolled | Submissions | Avg points |");
    let _ = writeln!(output, "| --- | --- | --- | --- |");
    for course in Course::ALL {
        let difficulty = match summary.difficulty[course].value() {
            Some(avg) => format!("{avg:.1}"),
            None => "n/a".to_string(),
        };
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            course, summary.popularity[course], summary.activity[course], difficulty
        );
    }

    for (course, standings) in details {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {course}");
        if standings.is_empty() {
            let _ = writeln!(output, "No students enrolled.");
            continue;
        }
        let _ = writeln!(output, "| Id | Points | Completed |");
        let _ = writeln!(output, "| --- | --- | --- |");
        for standing in standings {
            let _ = writeln!(
                output,
                "| {} | {} | {:.1}% |",
                standing.student_id, standing.points, standing.completion
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Notifications");
    if notifications.is_empty() {
        let _ = writeln!(output, "No new course completions.");
    } else {
        for notification in notifications {
            let _ = writeln!(output, "- {}: {}", notification.to, notification.body);
        }
    }

    output
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_on: NaiveDate,
    statistics: &'a StatisticsSummary,
    courses: Vec<JsonCourse<'a>>,
    notifications: &'a [Notification],
}

#[derive(Serialize)]
struct JsonCourse<'a> {
    course: Course,
    students: &'a [CourseStanding],
}

pub fn build_json(
    generated_on: NaiveDate,
    summary: &StatisticsSummary,
    details: &[(Course, Vec<CourseStanding>)],
    notifications: &[Notification],
) -> serde_json::Result<String> {
    let report = JsonReport {
        generated_on,
        statistics: summary,
        courses: details
            .iter()
            .map(|(course, students)| JsonCourse {
                course: *course,
                students,
            })
            .collect(),
        notifications,
    };
    serde_json::to_string_pretty(&report)
}
