//! Daily workouts: the JSON document a trainer prescribes and its typed reading.
use crate::error::Error;
use crate::roster;
use crate::{daily_workouts, users, Id};
use chrono::NaiveDate;
use entity_api::daily_workout;
use log::*;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub use entity_api::daily_workout::{delete, find_by_id, find_by_student, find_by_student_and_date};

pub const DEFAULT_WORKOUT_NAME: &str = "Treino";
pub const UNREADABLE_WORKOUT_NAME: &str = "Treino (erro ao carregar)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub muscle_group: String,
    pub equipment: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExerciseSet {
    pub set_number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reps: u32,
    /// Zero for bodyweight exercises
    #[serde(default, deserialize_with = "null_as_default")]
    pub weight: f64,
    /// Seconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub rest_time: u32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkoutExercise {
    pub exercise: Exercise,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ParsedWorkout {
    pub id: String,
    #[schema(value_type = Uuid)]
    pub daily_workout_id: Id,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub name: String,
    pub description: Option<String>,
    pub exercises: Vec<WorkoutExercise>,
    /// Minutes
    pub estimated_duration: Option<u32>,
    pub difficulty_level: Option<String>,
    pub difficulty_label: String,
}

/// The stored document. Every field is optional so older or hand-written
/// documents still read.
#[derive(Debug, Deserialize)]
struct WorkoutDocument {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    exercises: Option<Vec<WorkoutExercise>>,
    estimated_duration: Option<u32>,
    difficulty_level: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn difficulty_label(difficulty_level: Option<&str>) -> &'static str {
    match difficulty_level {
        Some("beginner") => "Iniciante",
        Some("intermediate") => "Intermediário",
        Some("advanced") => "Avançado",
        _ => "Personalizado",
    }
}

fn read_document(workout: &Value) -> Result<WorkoutDocument, serde_json::Error> {
    match workout {
        // Some clients store the document as a JSON encoded string
        Value::String(encoded) => serde_json::from_str(encoded),
        other => WorkoutDocument::deserialize(other),
    }
}

/// Reads a stored workout. A document that cannot be read becomes a placeholder
/// with no exercises so one bad row never hides the others.
pub fn parse(daily_workout: &daily_workouts::Model) -> ParsedWorkout {
    match read_document(&daily_workout.workout) {
        Ok(document) => ParsedWorkout {
            id: document
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| daily_workout.id.to_string()),
            daily_workout_id: daily_workout.id,
            date: daily_workout.date,
            name: document
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_WORKOUT_NAME.to_string()),
            description: document.description,
            exercises: document.exercises.unwrap_or_default(),
            estimated_duration: document.estimated_duration,
            difficulty_label: difficulty_label(document.difficulty_level.as_deref()).to_string(),
            difficulty_level: document.difficulty_level,
        },
        Err(err) => {
            warn!("Daily workout {} could not be read: {err}", daily_workout.id);
            ParsedWorkout {
                id: daily_workout.id.to_string(),
                daily_workout_id: daily_workout.id,
                date: daily_workout.date,
                name: UNREADABLE_WORKOUT_NAME.to_string(),
                description: None,
                exercises: Vec::new(),
                estimated_duration: None,
                difficulty_level: None,
                difficulty_label: difficulty_label(None).to_string(),
            }
        }
    }
}

/// Prescribes a workout. The teacher must be linked to the student and the document
/// must be a JSON object, or a string holding one.
pub async fn create(
    db: &impl ConnectionTrait,
    teacher: &users::Model,
    daily_workout_model: daily_workouts::Model,
) -> Result<daily_workouts::Model, Error> {
    if !teacher.is_teacher() {
        return Err(Error::forbidden("only teachers can prescribe workouts"));
    }
    let is_document = match &daily_workout_model.workout {
        Value::Object(_) => true,
        Value::String(encoded) => matches!(
            serde_json::from_str::<Value>(encoded),
            Ok(Value::Object(_))
        ),
        _ => false,
    };
    if !is_document {
        return Err(Error::invalid_input("workout must be a JSON object"));
    }

    roster::ensure_linked(db, teacher.id, daily_workout_model.student_id).await?;
    Ok(daily_workout::create(db, teacher.id, daily_workout_model).await?)
}

pub async fn find_parsed(
    db: &impl ConnectionTrait,
    student_id: Id,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
) -> Result<Vec<ParsedWorkout>, Error> {
    if let (Some(from_date), Some(to_date)) = (from_date, to_date) {
        if from_date > to_date {
            return Err(Error::invalid_input("from_date must not be after to_date"));
        }
    }

    Ok(
        daily_workout::find_by_student(db, student_id, from_date, to_date)
            .await?
            .iter()
            .map(parse)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn daily_workout(workout: Value) -> daily_workouts::Model {
        let now = chrono::Utc::now();
        daily_workouts::Model {
            id: Id::new_v4(),
            student_id: Id::new_v4(),
            teacher_id: Id::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            workout,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn parse_reads_a_complete_document() {
        let row = daily_workout(json!({
            "id": "treino-a",
            "name": "Treino A",
            "description": "Inferiores",
            "estimated_duration": 50,
            "difficulty_level": "advanced",
            "exercises": [{
                "exercise": { "id": "leg-press", "name": "Leg press", "muscle_group": "Pernas" },
                "sets": [{ "set_number": 1, "reps": 12, "weight": 100.0, "rest_time": 60 }]
            }]
        }));

        let parsed = parse(&row);

        assert_eq!(parsed.id, "treino-a");
        assert_eq!(parsed.name, "Treino A");
        assert_eq!(parsed.estimated_duration, Some(50));
        assert_eq!(parsed.difficulty_label, "Avançado");
        assert_eq!(parsed.exercises.len(), 1);
        assert_eq!(parsed.exercises[0].sets[0].reps, 12);
        assert!(parsed.exercises[0].exercise.equipment.is_none());
    }

    #[test]
    fn parse_fills_in_missing_name_and_id() {
        let row = daily_workout(json!({ "exercises": [] }));

        let parsed = parse(&row);

        assert_eq!(parsed.name, DEFAULT_WORKOUT_NAME);
        assert_eq!(parsed.id, row.id.to_string());
        assert_eq!(parsed.difficulty_label, "Personalizado");
    }

    #[test]
    fn parse_accepts_a_json_encoded_string() {
        let row = daily_workout(Value::String(r#"{"name":"Treino B"}"#.to_string()));

        let parsed = parse(&row);

        assert_eq!(parsed.name, "Treino B");
        assert!(parsed.exercises.is_empty());
    }

    #[test]
    fn unreadable_documents_become_placeholders() {
        let row = daily_workout(Value::String("{not json".to_string()));

        let parsed = parse(&row);

        assert_eq!(parsed.name, UNREADABLE_WORKOUT_NAME);
        assert!(parsed.exercises.is_empty());
        assert_eq!(parsed.daily_workout_id, row.id);
    }

    #[test]
    fn missing_or_null_set_details_default_to_zero() {
        let row = daily_workout(json!({
            "name": "Treino D",
            "exercises": [{
                "exercise": { "id": "flexao", "name": "Flexão", "muscle_group": null },
                "sets": [
                    { "set_number": 1, "reps": 15, "weight": null, "rest_time": 45 },
                    { "set_number": 2 }
                ]
            }]
        }));

        let parsed = parse(&row);

        assert_eq!(parsed.name, "Treino D");
        let exercise = &parsed.exercises[0];
        assert_eq!(exercise.exercise.muscle_group, "");
        assert_eq!(exercise.sets[0].weight, 0.0);
        assert_eq!(exercise.sets[0].reps, 15);
        assert_eq!(exercise.sets[1].reps, 0);
        assert_eq!(exercise.sets[1].rest_time, 0);
    }

    #[test]
    fn malformed_exercises_make_the_document_unreadable() {
        let row = daily_workout(json!({ "name": "Treino C", "exercises": [{ "sets": "três" }] }));

        assert_eq!(parse(&row).name, UNREADABLE_WORKOUT_NAME);
    }
}
