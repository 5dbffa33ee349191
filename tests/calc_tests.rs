use obe_portal::calc::{
    self, CloQuestionMark, CreditedGrade, StudentCloAttainment, grade_for_percentage,
    grade_point_average,
};
use uuid::Uuid;

// --- Grade Scale ---

#[test]
fn test_grade_scale_band_boundaries() {
    // Each lower bound is inclusive.
    assert_eq!(grade_for_percentage(85.0), ("A+", 4.00));
    assert_eq!(grade_for_percentage(80.0), ("A", 3.66));
    assert_eq!(grade_for_percentage(75.0), ("B+", 3.33));
    assert_eq!(grade_for_percentage(70.0), ("B", 3.00));
    assert_eq!(grade_for_percentage(65.0), ("B-", 2.66));
    assert_eq!(grade_for_percentage(61.0), ("C+", 2.33));
    assert_eq!(grade_for_percentage(58.0), ("C", 2.00));
    assert_eq!(grade_for_percentage(55.0), ("C-", 1.66));
    assert_eq!(grade_for_percentage(50.0), ("D", 1.00));
}

#[test]
fn test_grade_scale_just_below_boundary() {
    assert_eq!(grade_for_percentage(84.99), ("A", 3.66));
    assert_eq!(grade_for_percentage(49.99), ("F", 0.00));
    assert_eq!(grade_for_percentage(0.0), ("F", 0.00));
}

#[test]
fn test_grade_scale_clamps_out_of_range_input() {
    // Data-entry glitches above 100 or below 0 must not escape the scale.
    assert_eq!(grade_for_percentage(150.0), ("A+", 4.00));
    assert_eq!(grade_for_percentage(-10.0), ("F", 0.00));
}

// --- SGPA / CGPA ---

#[test]
fn test_gpa_weighted_by_credit_hours() {
    // 3cr at 4.00 + 1cr at 2.00 -> (12 + 2) / 4 = 3.5
    let gpa = grade_point_average(vec![
        CreditedGrade {
            credit_hours: 3.0,
            grade_point: 4.00,
        },
        CreditedGrade {
            credit_hours: 1.0,
            grade_point: 2.00,
        },
    ]);
    assert_eq!(gpa, 3.5);
}

#[test]
fn test_gpa_rounds_to_two_decimals() {
    // (2*4.00 + 1*3.66) / 3 = 3.8866.. -> 3.89 after rounding
    let gpa = grade_point_average(vec![
        CreditedGrade {
            credit_hours: 2.0,
            grade_point: 4.00,
        },
        CreditedGrade {
            credit_hours: 1.0,
            grade_point: 3.66,
        },
    ]);
    assert_eq!(gpa, 3.89);
}

#[test]
fn test_gpa_empty_input_is_zero() {
    assert_eq!(grade_point_average(vec![]), 0.0);
}

#[test]
fn test_gpa_zero_credit_hours_is_zero() {
    // Degenerate transcript rows must not divide by zero.
    let gpa = grade_point_average(vec![CreditedGrade {
        credit_hours: 0.0,
        grade_point: 4.00,
    }]);
    assert_eq!(gpa, 0.0);
}

// --- Attainment ---

#[test]
fn test_attainment_percentage_basic() {
    assert_eq!(calc::attainment_percentage(15.0, 20.0), 75.0);
    assert_eq!(calc::attainment_percentage(0.0, 20.0), 0.0);
}

#[test]
fn test_attainment_percentage_zero_possible() {
    // A CLO with no assessed questions attains 0%, never NaN.
    assert_eq!(calc::attainment_percentage(5.0, 0.0), 0.0);
}

#[test]
fn test_is_achieved_boundary_inclusive() {
    assert!(calc::is_achieved(60.0, 60.0));
    assert!(calc::is_achieved(60.01, 60.0));
    assert!(!calc::is_achieved(59.99, 60.0));
}

fn mark(student: u128, clo: u128, target: f64, obtained: f64, max: f64) -> CloQuestionMark {
    CloQuestionMark {
        student_id: Uuid::from_u128(student),
        clo_id: Uuid::from_u128(clo),
        target_attainment: target,
        marks_obtained: obtained,
        max_marks: max,
    }
}

#[test]
fn test_student_clo_attainment_sums_across_questions() {
    // One student, one CLO assessed across two questions: 8/10 + 4/10 = 60%.
    let rows = calc::student_clo_attainment(&[
        mark(1, 10, 60.0, 8.0, 10.0),
        mark(1, 10, 60.0, 4.0, 10.0),
    ]);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].student_id, Uuid::from_u128(1));
    assert_eq!(rows[0].clo_id, Uuid::from_u128(10));
    assert_eq!(rows[0].percentage, 60.0);
    assert!(rows[0].is_achieved); // boundary inclusive
}

#[test]
fn test_student_clo_attainment_groups_by_student_and_clo() {
    let rows = calc::student_clo_attainment(&[
        mark(1, 10, 50.0, 9.0, 10.0),  // student 1, CLO 10: 90%
        mark(1, 11, 50.0, 2.0, 10.0),  // student 1, CLO 11: 20%
        mark(2, 10, 50.0, 5.0, 10.0),  // student 2, CLO 10: 50%
    ]);

    assert_eq!(rows.len(), 3);
    // Deterministic ordering: student then CLO.
    assert_eq!(rows[0].student_id, Uuid::from_u128(1));
    assert_eq!(rows[0].clo_id, Uuid::from_u128(10));
    assert!(rows[0].is_achieved);
    assert_eq!(rows[1].clo_id, Uuid::from_u128(11));
    assert!(!rows[1].is_achieved);
    assert_eq!(rows[2].student_id, Uuid::from_u128(2));
    assert!(rows[2].is_achieved);
}

#[test]
fn test_student_clo_attainment_empty_input() {
    assert!(calc::student_clo_attainment(&[]).is_empty());
}

#[test]
fn test_clo_attainment_summary_rollup() {
    let students = vec![
        StudentCloAttainment {
            student_id: Uuid::from_u128(1),
            clo_id: Uuid::from_u128(10),
            percentage: 80.0,
            is_achieved: true,
        },
        StudentCloAttainment {
            student_id: Uuid::from_u128(2),
            clo_id: Uuid::from_u128(10),
            percentage: 40.0,
            is_achieved: false,
        },
    ];

    let summary = calc::clo_attainment_summary(&students);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].clo_id, Uuid::from_u128(10));
    assert_eq!(summary[0].students_total, 2);
    assert_eq!(summary[0].students_achieved, 1);
    assert_eq!(summary[0].average_percentage, 60.0);
}

#[test]
fn test_plo_attainment_averages_clo_percentages() {
    assert_eq!(calc::plo_attainment(&[80.0, 60.0, 70.0]), 70.0);
    assert_eq!(calc::plo_attainment(&[33.33, 66.67]), 50.0);
}

#[test]
fn test_plo_attainment_unmapped_is_zero() {
    assert_eq!(calc::plo_attainment(&[]), 0.0);
}
