use chrono::{Days, NaiveTime, Utc};
use password_auth::generate_hash;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::json;

pub use entity::{
    appointment_status, appointments, daily_workouts, gender, request_status, requester_role,
    roles, student_trainer_requests, subscription_status, subscriptions, trainer_students, users,
    Id,
};
pub use query::{IntoQueryFilterMap, QueryFilterMap};

pub mod appointment;
pub mod daily_workout;
pub mod error;
pub mod mutate;
pub mod query;
pub mod subscription;
pub mod trainer_request;
pub mod trainer_student;
pub mod user;

/// Fills a development database with one trainer on the basic plan, two linked
/// students with a few weeks of appointments, a workout and a pending link request.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let now = Utc::now();
    let today = now.date_naive();

    let trainer = users::ActiveModel {
        id: Set(Id::new_v4()),
        email: Set("personal@pocket.com".to_owned()),
        full_name: Set("Carla Personal".to_owned()),
        password: Set(generate_hash("password")),
        role: Set(roles::Role::Teacher),
        cpf: Set(None),
        phone: Set(Some("+55 11 99999-0000".to_owned())),
        birth_date: Set(None),
        gender: Set(Some(gender::Gender::Female)),
        goal: Set(None),
        height_cm: Set(None),
        weight_kg: Set(None),
        body_fat_percent: Set(None),
        timezone: Set("America/Sao_Paulo".to_owned()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    let mut students = Vec::new();
    for (email, full_name, goal) in [
        ("joao@pocket.com", "João Aluno", "Emagrecimento"),
        ("maria@pocket.com", "Maria Aluna", "Hipertrofia"),
        ("pedro@pocket.com", "Pedro Sem Personal", "Condicionamento"),
    ] {
        let student = users::ActiveModel {
            id: Set(Id::new_v4()),
            email: Set(email.to_owned()),
            full_name: Set(full_name.to_owned()),
            password: Set(generate_hash("password")),
            role: Set(roles::Role::Student),
            cpf: Set(None),
            phone: Set(None),
            birth_date: Set(None),
            gender: Set(None),
            goal: Set(Some(goal.to_owned())),
            height_cm: Set(Some(175)),
            weight_kg: Set(Some(78.0)),
            body_fat_percent: Set(Some(18.5)),
            timezone: Set("America/Sao_Paulo".to_owned()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
        students.push(student);
    }

    subscription::create(db, trainer.id, "basic").await?;

    // João and Maria train with Carla; Pedro only has a pending invitation.
    for student in &students[..2] {
        trainer_student::create(db, trainer.id, student.id, trainer.id).await?;
    }
    trainer_request::create(
        db,
        trainer.id,
        students[2].id,
        requester_role::RequesterRole::Trainer,
    )
    .await?;

    let past_statuses = [
        appointment_status::AppointmentStatus::Completed,
        appointment_status::AppointmentStatus::Missed,
        appointment_status::AppointmentStatus::Completed,
        appointment_status::AppointmentStatus::Cancelled,
    ];
    for student in &students[..2] {
        for (week, status) in past_statuses.iter().enumerate() {
            let date = today
                .checked_sub_days(Days::new(7 * (week as u64 + 1)))
                .unwrap_or(today);
            appointments::ActiveModel {
                id: Set(Id::new_v4()),
                teacher_id: Set(trainer.id),
                student_id: Set(student.id),
                date: Set(date),
                time: Set(NaiveTime::from_hms_opt(7, 0, 0)),
                status: Set(*status),
                notes: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(db)
            .await?;
        }

        appointments::ActiveModel {
            id: Set(Id::new_v4()),
            teacher_id: Set(trainer.id),
            student_id: Set(student.id),
            date: Set(today),
            time: Set(NaiveTime::from_hms_opt(18, 30, 0)),
            status: Set(appointment_status::AppointmentStatus::Scheduled),
            notes: Set(Some("Treino de pernas".to_owned())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
    }

    daily_workouts::ActiveModel {
        id: Set(Id::new_v4()),
        student_id: Set(students[0].id),
        teacher_id: Set(trainer.id),
        date: Set(today),
        workout: Set(json!({
            "name": "Treino A - Inferiores",
            "description": "Foco em quadríceps e glúteos",
            "difficulty_level": "intermediate",
            "estimated_duration": 60,
            "exercises": [
                {
                    "exercise": {
                        "id": "agachamento-livre",
                        "name": "Agachamento livre",
                        "muscle_group": "Pernas",
                        "equipment": "Barra"
                    },
                    "sets": [
                        { "set_number": 1, "reps": 12, "weight": 40.0, "rest_time": 60 },
                        { "set_number": 2, "reps": 10, "weight": 50.0, "rest_time": 90 }
                    ]
                }
            ]
        })),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    Ok(())
}
