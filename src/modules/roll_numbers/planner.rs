//! Pure roll number planning.
//!
//! Students are partitioned by stream and numbered from 1 within each
//! stream. The plan is re-derived from scratch on every run.

use admitdesk_models::roll_numbers::{RollAssignment, RollNumberOrder};
use admitdesk_models::students::{Stream, Student};
use rand::Rng;
use rand::seq::SliceRandom;

/// Assignments for every student, PCM first, then PCB.
pub fn plan_roll_numbers<R: Rng + ?Sized>(
    students: &[Student],
    order: RollNumberOrder,
    rng: &mut R,
) -> Vec<RollAssignment> {
    let mut assignments = Vec::with_capacity(students.len());

    for &stream in Stream::ALL {
        let mut members: Vec<&Student> = students.iter().filter(|s| s.stream == stream).collect();

        match order {
            RollNumberOrder::Alphabetical => members.sort_by(|a, b| {
                a.student_name
                    .to_lowercase()
                    .cmp(&b.student_name.to_lowercase())
                    .then_with(|| a.student_id.sequence().cmp(&b.student_id.sequence()))
                    .then_with(|| a.student_id.as_str().cmp(b.student_id.as_str()))
            }),
            RollNumberOrder::Random => members.shuffle(rng),
        }

        assignments.extend(members.into_iter().zip(1..).map(|(s, roll_no)| RollAssignment {
            student_id: s.student_id.clone(),
            stream,
            roll_no,
        }));
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdesk_models::StudentId;
    use admitdesk_models::students::{ClassMoving, Gender, NewStudent, Target};
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn student(seq: i64, name: &str, stream: Stream) -> Student {
        NewStudent {
            student_name: name.to_string(),
            gender: Gender::Male,
            class_moving: ClassMoving::TenthToEleventh,
            date_of_birth: None,
            stream,
            target: Target::Jee,
            father_name: "F".to_string(),
            mother_name: "M".to_string(),
            email: None,
            permanent_address: "A".to_string(),
            present_address: "A".to_string(),
            parent_mobile: "9876543210".to_string(),
            student_mobile: None,
            whatsapp_mobile: None,
            previous_school: "S".to_string(),
            previous_result_percentage: 80.0,
            test_centre: "C".to_string(),
            scholarship_offered: false,
            scholarship_details: None,
            passport_photo_url: "p".to_string(),
            identity_photo_url: "i".to_string(),
        }
        .into_student(StudentId::from_sequence(seq), Utc::now())
    }

    fn roll_of<'a>(plan: &'a [RollAssignment], id: &str) -> &'a RollAssignment {
        plan.iter().find(|a| a.student_id == id).unwrap()
    }

    #[test]
    fn test_alphabetical_per_stream() {
        let students = vec![
            student(1, "Zara", Stream::Pcm),
            student(2, "amit", Stream::Pcm),
            student(3, "Bina", Stream::Pcb),
            student(4, "Aman", Stream::Pcb),
            student(5, "Mohan", Stream::Pcm),
        ];

        let plan = plan_roll_numbers(&students, RollNumberOrder::Alphabetical, &mut rand::thread_rng());

        assert_eq!(roll_of(&plan, "STU0002").roll_no, 1);
        assert_eq!(roll_of(&plan, "STU0005").roll_no, 2);
        assert_eq!(roll_of(&plan, "STU0001").roll_no, 3);
        assert_eq!(roll_of(&plan, "STU0004").roll_no, 1);
        assert_eq!(roll_of(&plan, "STU0003").roll_no, 2);
        assert_eq!(roll_of(&plan, "STU0004").stream, Stream::Pcb);
    }

    #[test]
    fn test_name_ties_break_by_id() {
        let students = vec![
            student(12, "Ravi", Stream::Pcm),
            student(3, "ravi", Stream::Pcm),
        ];
        let plan = plan_roll_numbers(&students, RollNumberOrder::Alphabetical, &mut rand::thread_rng());
        assert_eq!(roll_of(&plan, "STU0003").roll_no, 1);
        assert_eq!(roll_of(&plan, "STU0012").roll_no, 2);
    }

    #[test]
    fn test_alphabetical_is_idempotent() {
        let students: Vec<Student> = (1..=20)
            .map(|i| student(i, &format!("Name {}", 21 - i), if i % 2 == 0 { Stream::Pcm } else { Stream::Pcb }))
            .collect();
        let mut rng = rand::thread_rng();
        let first = plan_roll_numbers(&students, RollNumberOrder::Alphabetical, &mut rng);
        let second = plan_roll_numbers(&students, RollNumberOrder::Alphabetical, &mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_is_a_permutation_of_one_to_n() {
        let students: Vec<Student> = (1..=30)
            .map(|i| student(i, "Same", if i <= 18 { Stream::Pcm } else { Stream::Pcb }))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let plan = plan_roll_numbers(&students, RollNumberOrder::Random, &mut rng);

        assert_eq!(plan.len(), 30);
        for (stream, n) in [(Stream::Pcm, 18), (Stream::Pcb, 12)] {
            let rolls: HashSet<i32> = plan
                .iter()
                .filter(|a| a.stream == stream)
                .map(|a| a.roll_no)
                .collect();
            assert_eq!(rolls, (1..=n).collect::<HashSet<i32>>());
        }
    }

    #[test]
    fn test_empty_input() {
        let plan = plan_roll_numbers(&[], RollNumberOrder::Random, &mut rand::thread_rng());
        assert!(plan.is_empty());
    }
}
