use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use jobboard_backend::{
    dto::application_dto::ApplyPayload,
    dto::auth_dto::RegisterPayload,
    dto::posting_dto::{CreatePostingPayload, UpdatePostingPayload},
    dto::profile_dto::SaveProfilePayload,
    error::Error,
    middleware::auth,
    models::account::Account,
    models::job_posting::PinState,
    routes,
    services::admission_service::AdmissionDecision,
    services::closure_service::PostingState,
    services::posting_service::PostingResult,
    AppState,
};

async fn setup_pool() -> Option<sqlx::PgPool> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    if env::var("JWT_SECRET").is_err() {
        env::set_var("JWT_SECRET", "test_secret_key");
    }
    let _ = jobboard_backend::config::init_config();

    let pool = jobboard_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    Some(pool)
}

async fn register(state: &AppState, role: &str) -> Account {
    state
        .account_service
        .register(RegisterPayload {
            username: format!("{}_{}", role, Uuid::new_v4()),
            password: "correct-horse".into(),
            role: role.into(),
        })
        .await
        .expect("register account")
}

fn employer_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/employer/profile",
            axum::routing::put(routes::profile::save_profile),
        )
        .route("/api/employer/capacity", get(routes::profile::capacity_status))
        .route("/api/employer/postings", post(routes::posting::create_posting))
        .route_layer(from_fn(auth::require_employer))
        .with_state(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::empty()).unwrap()
        }
    };
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn profile_payload(capacity: i32, staff: i32) -> JsonValue {
    json!({
        "company_name": "Harbor Traders",
        "vacancy_capacity": capacity,
        "staff_count": staff,
        "location": "Dockside",
        "contact_info": "jobs@harbor.example"
    })
}

#[tokio::test]
async fn capacity_scenario_over_the_api() {
    let Some(pool) = setup_pool().await else { return };
    let state = AppState::new(pool);
    let employer = register(&state, "employer").await;
    let token = jobboard_backend::utils::token::issue_token(
        &employer,
        &jobboard_backend::config::get_config().jwt_secret,
    )
    .expect("token");
    let app = employer_router(state);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/employer/profile",
        &token,
        Some(profile_payload(10, 12)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 7 of 10 committed
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/employer/postings",
        &token,
        Some(json!({"title": "Deckhand", "headcount": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_vacant"], json!(true));

    // 7 + 3 = 10 fills the limit exactly and is still admitted
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/employer/postings",
        &token,
        Some(json!({"title": "Cook", "headcount": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_vacant"], json!(true));

    // one more is rejected with the precise numbers
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/employer/postings",
        &token,
        Some(json!({"title": "Lookout", "headcount": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["committed"], json!(10));
    assert_eq!(body["limit"], json!(10));

    let (status, body) = send(&app, Method::GET, "/api/employer/capacity", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], json!(10));
    assert_eq!(body["committed"], json!(10));
    assert_eq!(body["remaining"], json!(0));
    assert_eq!(body["can_post"], json!(false));

    // zero headcount consumes nothing and the posting starts closed
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/employer/postings",
        &token,
        Some(json!({"title": "Waitlist", "headcount": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_vacant"], json!(false));

    // malformed input never reaches the ledger
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/employer/postings",
        &token,
        Some(json!({"title": "Ghost", "headcount": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn edit_path_excludes_the_target_posting() {
    let Some(pool) = setup_pool().await else { return };
    let state = AppState::new(pool);
    let employer = register(&state, "employer").await;

    state
        .profile_service
        .save(
            employer.id,
            SaveProfilePayload {
                company_name: "Mill Works".into(),
                vacancy_capacity: 10,
                staff_count: 10,
                location: None,
                contact_info: None,
            },
        )
        .await
        .expect("profile");

    let PostingResult::Saved(_first) = state
        .posting_service
        .create(
            employer.id,
            CreatePostingPayload {
                title: "Miller".into(),
                description: None,
                skills_required: None,
                headcount: 7,
            },
        )
        .await
        .expect("create first")
    else {
        panic!("first posting should be admitted");
    };

    let PostingResult::Saved(second) = state
        .posting_service
        .create(
            employer.id,
            CreatePostingPayload {
                title: "Clerk".into(),
                description: None,
                skills_required: None,
                headcount: 3,
            },
        )
        .await
        .expect("create second")
    else {
        panic!("second posting should be admitted");
    };

    // a bare admission check is a pure read: asking twice changes nothing
    for _ in 0..2 {
        let decision = state
            .admission
            .admit(employer.id, 1, None)
            .await
            .expect("admission check");
        assert_eq!(
            decision,
            AdmissionDecision::Rejected {
                committed: 10,
                limit: 10
            }
        );
    }

    // keeping the same headcount re-admits: 7 (others) + 3 <= 10
    let result = state
        .posting_service
        .update(
            employer.id,
            second.id,
            UpdatePostingPayload {
                title: None,
                description: None,
                skills_required: None,
                headcount: 3,
            },
            Utc::now(),
        )
        .await
        .expect("update same");
    assert!(matches!(result, PostingResult::Saved(_)));

    // growing it past the limit is rejected against the sum of the others
    let result = state
        .posting_service
        .update(
            employer.id,
            second.id,
            UpdatePostingPayload {
                title: None,
                description: None,
                skills_required: None,
                headcount: 4,
            },
            Utc::now(),
        )
        .await
        .expect("update over");
    let PostingResult::Rejected { committed, limit } = result else {
        panic!("over-limit edit should be rejected");
    };
    assert_eq!(committed, 7);
    assert_eq!(limit, 10);

    // the rejected edit wrote nothing
    let unchanged = state
        .posting_service
        .get_by_id(second.id)
        .await
        .expect("reload");
    assert_eq!(unchanged.headcount, 3);
    assert!(unchanged.is_vacant);

    // shrinking to zero closes the posting via the recomputed flag
    let result = state
        .posting_service
        .update(
            employer.id,
            second.id,
            UpdatePostingPayload {
                title: None,
                description: None,
                skills_required: None,
                headcount: 0,
            },
            Utc::now(),
        )
        .await
        .expect("update to zero");
    let PostingResult::Saved(closed) = result else {
        panic!("shrink should be admitted");
    };
    assert_eq!(closed.headcount, 0);
    assert!(!closed.is_vacant);
}

#[tokio::test]
async fn closure_needs_saturation_and_expiry() {
    let Some(pool) = setup_pool().await else { return };
    let state = AppState::new(pool.clone());
    let employer = register(&state, "employer").await;

    state
        .profile_service
        .save(
            employer.id,
            SaveProfilePayload {
                company_name: "Forge & Sons".into(),
                vacancy_capacity: 10,
                staff_count: 10,
                location: None,
                contact_info: None,
            },
        )
        .await
        .expect("profile");

    let PostingResult::Saved(posting) = state
        .posting_service
        .create(
            employer.id,
            CreatePostingPayload {
                title: "Smith".into(),
                description: None,
                skills_required: None,
                headcount: 5,
            },
        )
        .await
        .expect("create")
    else {
        panic!("posting should be admitted");
    };

    for _ in 0..6 {
        let seeker = register(&state, "seeker").await;
        state
            .application_service
            .submit(
                posting.id,
                seeker.id,
                ApplyPayload {
                    full_name: "Applicant".into(),
                    email: None,
                    phone: None,
                    experience: None,
                    preferred_location: None,
                },
            )
            .await
            .expect("apply");
    }

    // saturated (6 > 5) but fresh: stays open
    let outcome = state
        .closure_policy
        .evaluate(posting.id, Utc::now())
        .await
        .expect("evaluate fresh");
    assert_eq!(outcome.state, PostingState::Open);
    assert!(!outcome.changed);

    // age the posting past the 30-day window
    sqlx::query("UPDATE job_postings SET created_at = NOW() - INTERVAL '45 days' WHERE id = $1")
        .bind(posting.id)
        .execute(&pool)
        .await
        .expect("backdate");

    let outcome = state
        .closure_policy
        .evaluate(posting.id, Utc::now())
        .await
        .expect("evaluate aged");
    assert_eq!(outcome.state, PostingState::Closed);
    assert!(outcome.changed);

    // drop to exactly headcount: equality is not saturation, reopens
    sqlx::query(
        "DELETE FROM applications WHERE id = (SELECT id FROM applications WHERE posting_id = $1 LIMIT 1)",
    )
    .bind(posting.id)
    .execute(&pool)
    .await
    .expect("remove one application");

    let outcome = state
        .closure_policy
        .evaluate(posting.id, Utc::now())
        .await
        .expect("evaluate at boundary");
    assert_eq!(outcome.state, PostingState::Open);
    assert!(outcome.changed);

    // a pinned flag is left alone by automatic evaluation
    state
        .posting_service
        .set_pin(employer.id, posting.id, PinState::PinnedClosed)
        .await
        .expect("pin closed");
    let outcome = state
        .closure_policy
        .evaluate(posting.id, Utc::now())
        .await
        .expect("evaluate pinned");
    assert_eq!(outcome.state, PostingState::Closed);
    assert!(!outcome.changed);

    state
        .posting_service
        .set_pin(employer.id, posting.id, PinState::Unpinned)
        .await
        .expect("unpin");
    let outcome = state
        .closure_policy
        .evaluate(posting.id, Utc::now())
        .await
        .expect("evaluate unpinned");
    assert_eq!(outcome.state, PostingState::Open);

    let missing = state.closure_policy.evaluate(Uuid::new_v4(), Utc::now()).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn double_submit_stores_exactly_one_application() {
    let Some(pool) = setup_pool().await else { return };
    let state = AppState::new(pool);
    let employer = register(&state, "employer").await;
    let seeker = register(&state, "seeker").await;

    state
        .profile_service
        .save(
            employer.id,
            SaveProfilePayload {
                company_name: "North Depot".into(),
                vacancy_capacity: 4,
                staff_count: 6,
                location: None,
                contact_info: None,
            },
        )
        .await
        .expect("profile");

    let PostingResult::Saved(posting) = state
        .posting_service
        .create(
            employer.id,
            CreatePostingPayload {
                title: "Loader".into(),
                description: None,
                skills_required: None,
                headcount: 4,
            },
        )
        .await
        .expect("create")
    else {
        panic!("posting should be admitted");
    };

    let payload = ApplyPayload {
        full_name: "Pat Doe".into(),
        email: Some("pat@example.com".into()),
        phone: None,
        experience: None,
        preferred_location: None,
    };

    let (first, second) = tokio::join!(
        state
            .application_service
            .submit(posting.id, seeker.id, payload.clone()),
        state
            .application_service
            .submit(posting.id, seeker.id, payload.clone()),
    );
    let stored = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(stored, 1, "exactly one of the two submits may store a row");
    for result in [first, second] {
        if let Err(err) = result {
            assert!(matches!(err, Error::Conflict(_)));
        }
    }

    let count = state
        .application_service
        .count_for_posting(posting.id)
        .await
        .expect("count");
    assert_eq!(count, 1);

    // a later resubmission is rejected the same way
    let again = state
        .application_service
        .submit(posting.id, seeker.id, payload)
        .await;
    assert!(matches!(again, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn deleting_a_posting_removes_its_applications() {
    let Some(pool) = setup_pool().await else { return };
    let state = AppState::new(pool.clone());
    let employer = register(&state, "employer").await;

    state
        .profile_service
        .save(
            employer.id,
            SaveProfilePayload {
                company_name: "Quarry Co".into(),
                vacancy_capacity: 3,
                staff_count: 5,
                location: None,
                contact_info: None,
            },
        )
        .await
        .expect("profile");

    let PostingResult::Saved(posting) = state
        .posting_service
        .create(
            employer.id,
            CreatePostingPayload {
                title: "Mason".into(),
                description: None,
                skills_required: None,
                headcount: 3,
            },
        )
        .await
        .expect("create")
    else {
        panic!("posting should be admitted");
    };

    for _ in 0..2 {
        let seeker = register(&state, "seeker").await;
        state
            .application_service
            .submit(
                posting.id,
                seeker.id,
                ApplyPayload {
                    full_name: "Applicant".into(),
                    email: None,
                    phone: None,
                    experience: None,
                    preferred_location: None,
                },
            )
            .await
            .expect("apply");
    }

    state
        .posting_service
        .delete(employer.id, posting.id)
        .await
        .expect("delete");

    let leftover: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE posting_id = $1")
            .bind(posting.id)
            .fetch_one(&pool)
            .await
            .expect("count leftovers");
    assert_eq!(leftover, 0);

    let gone = state.posting_service.get_by_id(posting.id).await;
    assert!(matches!(gone, Err(Error::NotFound(_))));

    // another employer cannot delete what it does not own
    let intruder = register(&state, "employer").await;
    let denied = state.posting_service.delete(intruder.id, posting.id).await;
    assert!(matches!(denied, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn profile_invariant_checked_on_replace_only() {
    let Some(pool) = setup_pool().await else { return };
    let state = AppState::new(pool);
    let employer = register(&state, "employer").await;

    // first save goes through even with capacity above staff
    let profile = state
        .profile_service
        .save(
            employer.id,
            SaveProfilePayload {
                company_name: "Corner Shop".into(),
                vacancy_capacity: 8,
                staff_count: 5,
                location: None,
                contact_info: None,
            },
        )
        .await
        .expect("initial save");
    assert_eq!(profile.vacancy_capacity, 8);

    // replacing it re-checks the invariant
    let rejected = state
        .profile_service
        .save(
            employer.id,
            SaveProfilePayload {
                company_name: "Corner Shop".into(),
                vacancy_capacity: 9,
                staff_count: 5,
                location: None,
                contact_info: None,
            },
        )
        .await;
    assert!(matches!(rejected, Err(Error::BadRequest(_))));

    let ok = state
        .profile_service
        .save(
            employer.id,
            SaveProfilePayload {
                company_name: "Corner Shop".into(),
                vacancy_capacity: 4,
                staff_count: 5,
                location: Some("High Street".into()),
                contact_info: None,
            },
        )
        .await
        .expect("lowered save");
    assert_eq!(ok.vacancy_capacity, 4);
    assert_eq!(ok.location.as_deref(), Some("High Street"));
}
