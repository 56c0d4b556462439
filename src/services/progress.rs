use sqlx::SqlitePool;

use crate::db::{catalog, progress, topics};
use crate::error::AppError;
use crate::models::{ProgressReport, Subject, SubjectProgress};

/// Completion percentage, rounded half up. Zero topics means zero percent.
pub fn percentage(completed: i64, total: i64) -> u32 {
    if total <= 0 {
        return 0;
    }
    (100.0 * completed as f64 / total as f64).round() as u32
}

/// Builds the report from per-subject counts. The overall figure averages
/// the subject percentages, so every subject weighs the same regardless of
/// how many topics it has.
pub fn summarize(counts: Vec<(Subject, i64, i64)>) -> ProgressReport {
    let subjects: Vec<SubjectProgress> = counts
        .into_iter()
        .map(|(subject, total, completed)| SubjectProgress {
            subject_id: subject.id,
            name: subject.name,
            total_topics: total,
            completed_topics: completed,
            percentage: percentage(completed, total),
        })
        .collect();

    let overall_percentage = if subjects.is_empty() {
        0
    } else {
        let sum: u32 = subjects.iter().map(|s| s.percentage).sum();
        (sum as f64 / subjects.len() as f64).round() as u32
    };

    ProgressReport {
        subjects,
        overall_percentage,
    }
}

/// Fresh progress report for every subject of the student's course.
pub async fn compute_progress(db: &SqlitePool, student_id: &str) -> Result<ProgressReport, AppError> {
    let Some(course_id) = catalog::enrolled_course(db, student_id).await? else {
        return Ok(ProgressReport::default());
    };

    let mut counts = Vec::new();
    for subject in catalog::subjects_for_course(db, &course_id).await? {
        let total = topics::count_topics(db, &subject.id).await?;
        let completed = progress::count_completed(db, student_id, &subject.id).await?;
        counts.push((subject, total, completed));
    }

    Ok(summarize(counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, profiles::insert_profile};
    use crate::models::Role;
    use chrono::Utc;

    fn subject(id: &str) -> Subject {
        Subject {
            id: id.to_string(),
            name: id.to_uppercase(),
            icon: None,
        }
    }

    #[test]
    fn test_zero_topics_is_zero_percent() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(3, 0), 0);
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(1, 4), 25);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
    }

    #[test]
    fn test_overall_averages_percentages_not_counts() {
        let report = summarize(vec![(subject("s1"), 2, 2), (subject("s2"), 10, 0)]);
        assert_eq!(report.subjects[0].percentage, 100);
        assert_eq!(report.subjects[1].percentage, 0);
        assert_eq!(report.overall_percentage, 50);
    }

    #[test]
    fn test_empty_report() {
        let report = summarize(Vec::new());
        assert!(report.subjects.is_empty());
        assert_eq!(report.overall_percentage, 0);
    }

    #[tokio::test]
    async fn test_compute_progress_one_of_four() {
        let pool = memory_pool().await.expect("Failed to create test db");
        let tutor = insert_profile(&pool, "Carmen", None, Role::Tutor).await.unwrap();
        let student = insert_profile(&pool, "Hugo", None, Role::Student).await.unwrap();
        let s = catalog::insert_subject(&pool, "Lengua", None).await.unwrap();
        let course = catalog::insert_course(&pool, "5°A").await.unwrap();
        catalog::insert_class(&pool, &s.id, &tutor.id, &course).await.unwrap();
        catalog::enroll(&pool, &student.id, &course).await.unwrap();

        let mut ids = Vec::new();
        for unit in 1..=4 {
            ids.push(topics::insert_topic(&pool, &s.id, unit, &format!("Tema {}", unit)).await.unwrap().id);
        }
        progress::record_progress(&pool, &student.id, ids[0], &s.id, Utc::now()).await.unwrap();

        let report = compute_progress(&pool, &student.id).await.unwrap();
        assert_eq!(report.subjects.len(), 1);
        assert_eq!(report.subjects[0].total_topics, 4);
        assert_eq!(report.subjects[0].completed_topics, 1);
        assert_eq!(report.subjects[0].percentage, 25);
        assert_eq!(report.overall_percentage, 25);
    }

    #[tokio::test]
    async fn test_compute_progress_without_enrollment() {
        let pool = memory_pool().await.expect("Failed to create test db");
        let student = insert_profile(&pool, "Hugo", None, Role::Student).await.unwrap();

        let report = compute_progress(&pool, &student.id).await.unwrap();
        assert_eq!(report, ProgressReport::default());
    }
}
