use std::env;

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use trivia_backend::models::answer::SubmittedAnswer;
use trivia_backend::models::participation::Participation;
use trivia_backend::services::participation_service::ParticipationService;
use trivia_backend::services::scoring_service::ScoringService;
use uuid::Uuid;

async fn setup_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping db-backed test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Some(pool)
}

async fn seed_group(pool: &PgPool) -> i32 {
    let now = Utc::now();
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO quiz_groups (name, starts_at, ends_at, max_attempts, cooldown_seconds)
        VALUES ($1, $2, $3, 5, 0)
        RETURNING id
        "#,
    )
    .bind(format!("scoring-{}", Uuid::new_v4()))
    .bind(now - Duration::hours(1))
    .bind(now + Duration::hours(1))
    .fetch_one(pool)
    .await
    .expect("seed group")
}

async fn seed_question(pool: &PgPool, correct_option: Option<i32>) -> i32 {
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO questions (prompt, correct_option) VALUES ($1, $2) RETURNING id"#,
    )
    .bind(format!("prompt-{}", Uuid::new_v4()))
    .bind(correct_option)
    .fetch_one(pool)
    .await
    .expect("seed question")
}

fn unique_external_id() -> String {
    Uuid::new_v4().as_u128().to_string()[..12].to_string()
}

async fn start_pending(pool: &PgPool, group_id: i32) -> Participation {
    let service = ParticipationService::new(pool.clone());
    let decision = service
        .orchestrate("Scorer", &unique_external_id(), group_id)
        .await
        .expect("orchestrate");
    decision.participation().clone()
}

#[tokio::test]
async fn finalize_with_zero_answers_stores_zero_accuracy() {
    let Some(pool) = setup_pool().await else {
        return;
    };

    let group_id = seed_group(&pool).await;
    let participation = start_pending(&pool, group_id).await;

    let service = ParticipationService::new(pool.clone());
    let (_, result) = service
        .finalize(participation.id, &[], 60)
        .await
        .expect("finalize");

    assert_eq!(result.total_questions, 0);
    assert_eq!(result.correct_count, 0);
    assert_eq!(result.accuracy_percentage, rust_decimal::Decimal::ZERO);
    assert_eq!(result.total_time_seconds, 60);
}

#[tokio::test]
async fn repeated_aggregation_replaces_result_in_place() {
    let Some(pool) = setup_pool().await else {
        return;
    };

    let group_id = seed_group(&pool).await;
    let q1 = seed_question(&pool, Some(2)).await;
    let participation = start_pending(&pool, group_id).await;

    let service = ParticipationService::new(pool.clone());
    let answers = vec![SubmittedAnswer {
        question_id: q1,
        selected_option: 2,
    }];
    let (finalized, first) = service
        .finalize(participation.id, &answers, 90)
        .await
        .expect("finalize");

    // Running the aggregator again must overwrite, not duplicate.
    let mut tx = pool.begin().await.expect("tx");
    let second = ScoringService::aggregate(&mut tx, &finalized)
        .await
        .expect("re-aggregate");
    tx.commit().await.expect("commit");

    assert_eq!(second.participation_id, first.participation_id);
    assert_eq!(second.total_questions, first.total_questions);
    assert_eq!(second.correct_count, first.correct_count);
    assert_eq!(second.accuracy_percentage, first.accuracy_percentage);

    let result_rows: i64 =
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM results WHERE participation_id = $1"#)
            .bind(finalized.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(result_rows, 1);

    let record_rows: i64 =
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM answer_records WHERE participation_id = $1"#)
            .bind(finalized.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(record_rows, 1);
}

#[tokio::test]
async fn resubmitted_question_overwrites_its_record() {
    let Some(pool) = setup_pool().await else {
        return;
    };

    let group_id = seed_group(&pool).await;
    let q1 = seed_question(&pool, Some(1)).await;
    let q2 = seed_question(&pool, Some(4)).await;
    let participation = start_pending(&pool, group_id).await;

    let service = ParticipationService::new(pool.clone());

    // The pending payload holds a wrong pick for q1; the finalize payload
    // corrects it. Records must reflect the final set only.
    service
        .update_answers(
            participation.id,
            &[SubmittedAnswer {
                question_id: q1,
                selected_option: 3,
            }],
        )
        .await
        .expect("update answers");

    let answers = vec![
        SubmittedAnswer {
            question_id: q1,
            selected_option: 1,
        },
        SubmittedAnswer {
            question_id: q2,
            selected_option: 2,
        },
    ];
    let (_, result) = service
        .finalize(participation.id, &answers, 120)
        .await
        .expect("finalize");

    assert_eq!(result.total_questions, 2);
    assert_eq!(result.correct_count, 1);

    let records = service
        .list_answer_records(participation.id)
        .await
        .expect("list records");
    let q1_record = records
        .iter()
        .find(|r| r.question_id == q1)
        .expect("record for q1");
    assert_eq!(q1_record.selected_option, 1);
}

#[tokio::test]
async fn updating_answers_after_finalize_is_rejected() {
    let Some(pool) = setup_pool().await else {
        return;
    };

    let group_id = seed_group(&pool).await;
    let participation = start_pending(&pool, group_id).await;

    let service = ParticipationService::new(pool.clone());
    service
        .finalize(participation.id, &[], 30)
        .await
        .expect("finalize");

    let err = service
        .update_answers(
            participation.id,
            &[SubmittedAnswer {
                question_id: 1,
                selected_option: 1,
            }],
        )
        .await;
    assert!(err.is_err());
}
