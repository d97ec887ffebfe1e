//! Fake registrant generation.
//!
//! Registrants are generated in parallel with rayon and then inserted one
//! by one through the normal student repository, so every seeded row gets
//! its id from the same allocator as a real registration.

use std::time::Instant;

use admitdesk_db::{DbResult, StudentRepository};
use admitdesk_models::settings::DEFAULT_VENUE;
use admitdesk_models::students::{ClassMoving, Gender, NewStudent, Stream, Target};
use admitdesk_models::StudentId;
use chrono::NaiveDate;
use fake::Fake;
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;

const SCHOOLS: &[&str] = &[
    "DAV Public School",
    "Kendriya Vidyalaya",
    "St. Xavier's High School",
    "Delhi Public School",
    "Nazareth Academy",
];

fn pick<T: Copy>(items: &[T]) -> T {
    items[(0..items.len()).fake::<usize>()]
}

fn mobile() -> String {
    format!("{}{:09}", (6..10).fake::<u8>(), (0..1_000_000_000u64).fake::<u64>())
}

/// Generates one fake registrant.
pub fn generate_student(idx: usize) -> NewStudent {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let father: String = FirstName().fake();
    let mother: String = FirstName().fake();
    let street: String = StreetName().fake();
    let city: String = CityName().fake();

    let stream = pick(Stream::ALL);
    let target = match stream {
        Stream::Pcm => pick(&[Target::Jee, Target::CbseBoard]),
        Stream::Pcb => pick(&[Target::Neet, Target::CbseBoard]),
    };
    let scholarship_offered = (0..10).fake::<u8>() == 0;
    let address = format!("{} {}, {}", (1..400).fake::<u16>(), street, city);

    NewStudent {
        student_name: format!("{first_name} {last_name}"),
        gender: pick(Gender::ALL),
        class_moving: ClassMoving::TenthToEleventh,
        date_of_birth: NaiveDate::from_ymd_opt(
            (2008..2011).fake::<i32>(),
            (1..13).fake::<u32>(),
            (1..29).fake::<u32>(),
        ),
        stream,
        target,
        father_name: format!("{father} {last_name}"),
        mother_name: format!("{mother} {last_name}"),
        email: Some(format!(
            "{}.{}+{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            idx
        )),
        permanent_address: address.clone(),
        present_address: address,
        parent_mobile: mobile(),
        student_mobile: Some(mobile()),
        whatsapp_mobile: None,
        previous_school: pick(SCHOOLS).to_string(),
        previous_result_percentage: ((5500..9900).fake::<u32>() as f64) / 100.0,
        test_centre: DEFAULT_VENUE.to_string(),
        scholarship_offered,
        scholarship_details: scholarship_offered.then(|| "Merit scholarship".to_string()),
        passport_photo_url: format!("https://placehold.co/300x400?text=P{idx}"),
        identity_photo_url: format!("https://placehold.co/600x400?text=ID{idx}"),
    }
}

pub fn generate_students(count: usize) -> Vec<NewStudent> {
    (0..count).into_par_iter().map(generate_student).collect()
}

/// Seeds `count` fake registrants and returns their ids.
pub async fn seed_students(
    repo: &dyn StudentRepository,
    count: usize,
) -> DbResult<Vec<StudentId>> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} students...", count);

    let students = generate_students(count);
    let mut ids = Vec::with_capacity(students.len());
    for student in students {
        ids.push(repo.create(student).await?.student_id);
    }

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdesk_db::repos::memory::InMemoryStudentRepository;
    use admitdesk_models::students::is_valid_mobile;

    #[test]
    fn test_generated_students_are_valid() {
        let students = generate_students(50);
        assert_eq!(students.len(), 50);

        for s in &students {
            assert!(is_valid_mobile(&s.parent_mobile), "{}", s.parent_mobile);
            assert!((0.0..=100.0).contains(&s.previous_result_percentage));
            assert!(s.date_of_birth.is_some());
            assert_eq!(s.scholarship_offered, s.scholarship_details.is_some());
            match s.stream {
                Stream::Pcm => assert_ne!(s.target, Target::Neet),
                Stream::Pcb => assert_ne!(s.target, Target::Jee),
            }
        }
    }

    #[tokio::test]
    async fn test_seed_students_uses_allocator() {
        let repo = InMemoryStudentRepository::new();
        let ids = seed_students(&repo, 3).await.unwrap();

        let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["STU0001", "STU0002", "STU0003"]);
    }
}
