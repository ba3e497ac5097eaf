use std::cmp::Ordering;

use crate::models::{Course, CourseSet, CourseStanding, Metric, PerCourse, StatisticsSummary, Student};
use crate::registry::Registry;

/// Read-only aggregation over the registry. Every query recomputes from the
/// current roster.
pub struct CourseStats<'a> {
    registry: &'a Registry,
}

impl<'a> CourseStats<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        CourseStats { registry }
    }

    pub fn enrolled_students(&self, course: Course) -> Vec<&'a Student> {
        self.registry
            .all_students()
            .iter()
            .filter(|student| student.is_enrolled(course))
            .collect()
    }

    /// Enrolled student count per course. All courses are n/a when nobody is
    /// enrolled anywhere.
    pub fn popularity(&self) -> PerCourse<Metric<usize>> {
        let counts = PerCourse::from_fn(|course| self.enrolled_students(course).len());
        let total: usize = counts.iter().map(|(_, count)| count).sum();
        PerCourse::from_fn(|course| match counts[course] {
            _ if total == 0 => Metric::NotApplicable,
            0 => Metric::NotApplicable,
            count => Metric::Value(count),
        })
    }

    /// Total submissions per course.
    pub fn activity(&self) -> PerCourse<Metric<u64>> {
        PerCourse::from_fn(|course| match self.total_submissions(course) {
            0 => Metric::NotApplicable,
            total => Metric::Value(total),
        })
    }

    /// Average points per submission. Higher means easier.
    pub fn difficulty(&self) -> PerCourse<Metric<f64>> {
        PerCourse::from_fn(|course| match self.total_submissions(course) {
            0 => Metric::NotApplicable,
            submissions => Metric::Value(self.total_points(course) as f64 / submissions as f64),
        })
    }

    pub fn most_popular(&self) -> CourseSet {
        highest(&self.popularity())
    }

    pub fn least_popular(&self) -> CourseSet {
        let popularity = self.popularity();
        lowest(&popularity, &highest(&popularity))
    }

    pub fn highest_activity(&self) -> CourseSet {
        highest(&self.activity())
    }

    pub fn lowest_activity(&self) -> CourseSet {
        let activity = self.activity();
        lowest(&activity, &highest(&activity))
    }

    pub fn easiest(&self) -> CourseSet {
        highest(&self.difficulty())
    }

    pub fn hardest(&self) -> CourseSet {
        let difficulty = self.difficulty();
        lowest(&difficulty, &highest(&difficulty))
    }

    /// Enrolled students ordered by points descending, then id ascending.
    pub fn course_details(&self, course: Course) -> Vec<CourseStanding> {
        let mut standings: Vec<CourseStanding> = self
            .enrolled_students(course)
            .into_iter()
            .map(|student| CourseStanding {
                student_id: student.id,
                points: student.progress[course],
                completion: completion_percentage(course, student.progress[course]),
            })
            .collect();
        standings.sort_by(|a, b| b.points.cmp(&a.points).then(a.student_id.cmp(&b.student_id)));
        standings
    }

    pub fn summary(&self) -> StatisticsSummary {
        StatisticsSummary {
            popularity: self.popularity(),
            activity: self.activity(),
            difficulty: self.difficulty(),
            most_popular: self.most_popular(),
            least_popular: self.least_popular(),
            highest_activity: self.highest_activity(),
            lowest_activity: self.lowest_activity(),
            easiest: self.easiest(),
            hardest: self.hardest(),
        }
    }

    fn total_submissions(&self, course: Course) -> u64 {
        self.registry
            .all_students()
            .iter()
            .map(|student| student.submissions[course])
            .fold(0, u64::saturating_add)
    }

    /// Summed as `u128`: each student's progress may already sit at `u64::MAX`.
    fn total_points(&self, course: Course) -> u128 {
        self.registry
            .all_students()
            .iter()
            .map(|student| u128::from(student.progress[course]))
            .sum()
    }
}

pub fn completion_percentage(course: Course, points: u64) -> f64 {
    points as f64 / course.threshold() as f64 * 100.0
}

fn extreme<T: Copy + PartialOrd>(metrics: &PerCourse<Metric<T>>, wanted: Ordering) -> Option<T> {
    metrics
        .iter()
        .filter_map(|(_, metric)| metric.value())
        .reduce(|best, value| {
            if value.partial_cmp(&best) == Some(wanted) {
                value
            } else {
                best
            }
        })
}

fn highest<T: Copy + PartialOrd>(metrics: &PerCourse<Metric<T>>) -> CourseSet {
    select(metrics, Ordering::Greater, &CourseSet::default())
}

/// Courses at the minimum, minus any already ranked highest.
fn lowest<T: Copy + PartialOrd>(metrics: &PerCourse<Metric<T>>, highest: &CourseSet) -> CourseSet {
    select(metrics, Ordering::Less, highest)
}

fn select<T: Copy + PartialOrd>(
    metrics: &PerCourse<Metric<T>>,
    wanted: Ordering,
    excluded: &CourseSet,
) -> CourseSet {
    let Some(target) = extreme(metrics, wanted) else {
        return CourseSet::default();
    };
    CourseSet(
        metrics
            .iter()
            .filter(|(course, metric)| metric.value() == Some(target) && !excluded.contains(*course))
            .map(|(course, _)| course)
            .collect(),
    )
}
