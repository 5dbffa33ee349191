use std::collections::BTreeMap;

use uuid::Uuid;

/// Pure arithmetic for the OBE pipeline: grade-scale lookup, SGPA/CGPA
/// weighted averages, and CLO/PLO attainment roll-ups.
///
/// Nothing in this module touches the database; the repository layer fetches
/// flat rows and the handlers feed them through these folds. That keeps the
/// numeric behavior unit-testable without a live Postgres.

/// Grade scale: lower percentage bound (inclusive) -> letter grade and grade point.
/// Ordered from highest band to lowest; the first matching band wins.
pub const GRADE_SCALE: &[(f64, &str, f64)] = &[
    (85.0, "A+", 4.00),
    (80.0, "A", 3.66),
    (75.0, "B+", 3.33),
    (70.0, "B", 3.00),
    (65.0, "B-", 2.66),
    (61.0, "C+", 2.33),
    (58.0, "C", 2.00),
    (55.0, "C-", 1.66),
    (50.0, "D", 1.00),
];

/// Maps a final course percentage onto the grade scale.
/// Percentages are clamped to [0, 100] before lookup; anything below the
/// lowest band is an F with 0.00 grade points.
pub fn grade_for_percentage(percentage: f64) -> (&'static str, f64) {
    let pct = percentage.clamp(0.0, 100.0);
    for &(floor, grade, points) in GRADE_SCALE {
        if pct >= floor {
            return (grade, points);
        }
    }
    ("F", 0.00)
}

/// Rounds to two decimal places, the precision used on transcripts.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One finalized course result feeding into a GPA computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditedGrade {
    pub credit_hours: f64,
    pub grade_point: f64,
}

/// GPA = sum(credit_hours * grade_point) / sum(credit_hours).
///
/// SGPA passes one semester's courses; CGPA passes every course up to and
/// including the target semester. An empty input (or all-zero credit hours)
/// yields 0.0 rather than dividing by zero.
pub fn grade_point_average<I>(grades: I) -> f64
where
    I: IntoIterator<Item = CreditedGrade>,
{
    let mut weighted_sum = 0.0;
    let mut credit_sum = 0.0;
    for g in grades {
        weighted_sum += g.credit_hours * g.grade_point;
        credit_sum += g.credit_hours;
    }
    if credit_sum > 0.0 {
        round2(weighted_sum / credit_sum)
    } else {
        0.0
    }
}

/// Attainment percentage: obtained over possible, as a percentage.
/// A CLO with no assessed marks (max == 0) attains 0%, never NaN.
pub fn attainment_percentage(obtained: f64, possible: f64) -> f64 {
    if possible > 0.0 {
        round2(100.0 * obtained / possible)
    } else {
        0.0
    }
}

/// A CLO is achieved when the attainment percentage meets or exceeds the
/// target threshold (boundary inclusive).
pub fn is_achieved(percentage: f64, target: f64) -> bool {
    percentage >= target
}

/// One question-level mark joined to its CLO, as fetched by the repository
/// for a whole course offering.
#[derive(Debug, Clone, PartialEq)]
pub struct CloQuestionMark {
    pub student_id: Uuid,
    pub clo_id: Uuid,
    pub target_attainment: f64,
    pub marks_obtained: f64,
    pub max_marks: f64,
}

/// Per-student, per-CLO attainment derived from question marks.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentCloAttainment {
    pub student_id: Uuid,
    pub clo_id: Uuid,
    pub percentage: f64,
    pub is_achieved: bool,
}

/// Per-CLO class-wide roll-up of the student attainment rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CloAttainmentSummary {
    pub clo_id: Uuid,
    pub students_total: i64,
    pub students_achieved: i64,
    pub average_percentage: f64,
}

/// Folds raw question marks into per-student CLO attainment rows:
/// sum(marks_obtained) / sum(max_marks) over every question mapped to the CLO,
/// classified against the CLO's target.
///
/// Output ordering is deterministic (student then CLO) so recomputation is
/// stable across runs.
pub fn student_clo_attainment(marks: &[CloQuestionMark]) -> Vec<StudentCloAttainment> {
    // (student, clo) -> (obtained, possible, target)
    let mut groups: BTreeMap<(Uuid, Uuid), (f64, f64, f64)> = BTreeMap::new();
    for m in marks {
        let entry = groups
            .entry((m.student_id, m.clo_id))
            .or_insert((0.0, 0.0, m.target_attainment));
        entry.0 += m.marks_obtained;
        entry.1 += m.max_marks;
    }

    groups
        .into_iter()
        .map(|((student_id, clo_id), (obtained, possible, target))| {
            let percentage = attainment_percentage(obtained, possible);
            StudentCloAttainment {
                student_id,
                clo_id,
                percentage,
                is_achieved: is_achieved(percentage, target),
            }
        })
        .collect()
}

/// Rolls per-student rows up into one summary row per CLO.
pub fn clo_attainment_summary(rows: &[StudentCloAttainment]) -> Vec<CloAttainmentSummary> {
    let mut groups: BTreeMap<Uuid, (i64, i64, f64)> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(r.clo_id).or_insert((0, 0, 0.0));
        entry.0 += 1;
        if r.is_achieved {
            entry.1 += 1;
        }
        entry.2 += r.percentage;
    }

    groups
        .into_iter()
        .map(|(clo_id, (total, achieved, pct_sum))| CloAttainmentSummary {
            clo_id,
            students_total: total,
            students_achieved: achieved,
            average_percentage: if total > 0 {
                round2(pct_sum / total as f64)
            } else {
                0.0
            },
        })
        .collect()
}

/// PLO attainment: the plain average of the mapped CLOs' average attainment
/// percentages. An unmapped PLO averages to 0%.
pub fn plo_attainment(clo_average_percentages: &[f64]) -> f64 {
    if clo_average_percentages.is_empty() {
        return 0.0;
    }
    round2(clo_average_percentages.iter().sum::<f64>() / clo_average_percentages.len() as f64)
}
