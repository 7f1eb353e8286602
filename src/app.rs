use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, custom_foods, foods, meals, reports, weights};

pub fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::router())
        .merge(meals::router())
        .merge(custom_foods::router())
        .merge(weights::router())
        .merge(foods::router())
        .merge(reports::router())
        .route("/health", get(|| async { "ok" }));

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri(),
                        status = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::repo_types::NewFood;
    use crate::nutrition::MacrosPerUnit;
    use crate::store::{memory::MemoryStore, Store};
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use time::OffsetDateTime;
    use tower::ServiceExt;

    const ALICE: &str = "valid:user_alice";
    const BOB: &str = "valid:user_bob";

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        experience: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header("x-whop-user-token", t);
        }
        if let Some(e) = experience {
            req = req.header("x-whop-experience-id", e);
        }
        let req = match body {
            Some(b) => req
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn now_rfc3339() -> String {
        OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap()
    }

    fn quick_add_meal() -> Value {
        json!({
            "name": "Lunch",
            "loggedAt": now_rfc3339(),
            "foods": [{
                "source": "QUICK_ADD",
                "name": "Shake",
                "quantity": 1,
                "quickAddMacros": { "protein": 30, "carbs": 40, "fats": 10 }
            }]
        })
    }

    #[tokio::test]
    async fn health_needs_no_session() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn routes_require_a_token() {
        let app = build_app(AppState::fake());
        for uri in ["/api/meals", "/api/weights", "/api/custom-foods", "/api/foods", "/api/me"] {
            let (status, body) = call(&app, Method::GET, uri, None, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"], "Missing Whop user token header.");
        }
        let (status, body) = call(&app, Method::GET, "/api/meals", Some("bogus"), None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid Whop user token.");
    }

    #[tokio::test]
    async fn me_returns_default_targets() {
        let app = build_app(AppState::fake());
        let (status, body) =
            call(&app, Method::GET, "/api/me", Some(ALICE), Some("exp_1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["externalId"], "user_alice");
        assert_eq!(body["data"]["experienceId"], "exp_1");
        assert_eq!(body["data"]["macroTarget"]["protein"], 185.0);
    }

    #[tokio::test]
    async fn meal_lifecycle() {
        let app = build_app(AppState::fake());

        let (status, body) =
            call(&app, Method::POST, "/api/meals", Some(ALICE), None, Some(quick_add_meal())).await;
        assert_eq!(status, StatusCode::CREATED);
        let meal = &body["data"];
        assert_eq!(meal["protein"], 30.0);
        assert_eq!(meal["carbs"], 40.0);
        assert_eq!(meal["fats"], 10.0);
        assert_eq!(meal["foods"][0]["source"], "QUICK_ADD");
        let id = meal["id"].as_str().unwrap().to_string();

        let (status, body) = call(&app, Method::GET, "/api/meals", Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let uri = format!("/api/meals/{id}");
        let (status, body) = call(&app, Method::GET, &uri, Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Lunch");

        let (status, body) = call(&app, Method::DELETE, &uri, Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = call(&app, Method::GET, &uri, Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Meal not found.");
    }

    #[tokio::test]
    async fn delete_cascades_line_items() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut state = AppState::fake();
        state.store = store.clone() as std::sync::Arc<dyn Store>;
        let app = build_app(state);

        let (_, body) =
            call(&app, Method::POST, "/api/meals", Some(ALICE), None, Some(quick_add_meal())).await;
        assert_eq!(store.meal_food_count().await, 1);
        let uri = format!("/api/meals/{}", body["data"]["id"].as_str().unwrap());
        call(&app, Method::DELETE, &uri, Some(ALICE), None, None).await;
        assert_eq!(store.meal_food_count().await, 0);
    }

    #[tokio::test]
    async fn patch_without_foods_keeps_items() {
        let app = build_app(AppState::fake());
        let (_, body) =
            call(&app, Method::POST, "/api/meals", Some(ALICE), None, Some(quick_add_meal())).await;
        let uri = format!("/api/meals/{}", body["data"]["id"].as_str().unwrap());

        let (status, body) = call(
            &app,
            Method::PATCH,
            &uri,
            Some(ALICE),
            None,
            Some(json!({ "name": "Late lunch", "notes": "post workout" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Late lunch");
        assert_eq!(body["data"]["notes"], "post workout");
        assert_eq!(body["data"]["protein"], 30.0);
        assert_eq!(body["data"]["foods"].as_array().unwrap().len(), 1);

        let (status, body) = call(
            &app,
            Method::PATCH,
            &uri,
            Some(ALICE),
            None,
            Some(json!({ "foods": [{
                "source": "QUICK_ADD",
                "name": "Eggs",
                "quantity": 2,
                "macros": { "protein": 6, "carbs": 0.5, "fats": 5, "calories": 70 }
            }] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["protein"], 12.0);
        assert_eq!(body["data"]["fats"], 10.0);
        assert_eq!(body["data"]["foods"][0]["calories"], 140.0);
        assert_eq!(body["data"]["name"], "Late lunch");
        assert_eq!(body["data"]["notes"], "post workout");

        let (status, body) = call(
            &app,
            Method::PATCH,
            &uri,
            Some(ALICE),
            None,
            Some(json!({ "notes": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["notes"].is_null());
        assert_eq!(body["data"]["name"], "Late lunch");
    }

    #[tokio::test]
    async fn quick_add_with_both_macro_keys_is_created() {
        let app = build_app(AppState::fake());
        let meal = json!({
            "name": "Lunch",
            "loggedAt": now_rfc3339(),
            "foods": [{
                "source": "QUICK_ADD",
                "name": "Shake",
                "quantity": 1,
                "macrosPerUnit": { "protein": 30, "carbs": 40, "fats": 10 },
                "quickAddMacros": { "protein": 30, "carbs": 40, "fats": 10 }
            }]
        });
        let (status, body) =
            call(&app, Method::POST, "/api/meals", Some(ALICE), None, Some(meal)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["protein"], 30.0);
        assert_eq!(body["data"]["foods"][0]["name"], "Shake");
    }

    #[tokio::test]
    async fn calendar_edge_dates_are_rejected_or_ignored() {
        let app = build_app(AppState::fake());
        for date in ["9999-12-31", "-9999-01-01"] {
            let uri = format!("/api/meals?date={date}");
            let (status, body) = call(&app, Method::GET, &uri, Some(ALICE), None, None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{date}");
            assert!(body["details"]["fieldErrors"]["date"].is_array(), "{date}");

            let uri = format!("/api/dashboard?date={date}");
            let (status, body) = call(&app, Method::GET, &uri, Some(ALICE), None, None).await;
            assert_eq!(status, StatusCode::OK, "{date}");
            assert_eq!(body["data"]["status"], "ready");
            assert_ne!(body["data"]["selectedDate"], date);
            assert_eq!(body["data"]["weekDays"].as_array().unwrap().len(), 7);
        }
    }

    #[tokio::test]
    async fn validation_errors_are_422() {
        let app = build_app(AppState::fake());
        let mut bad = quick_add_meal();
        bad["foods"][0]["quantity"] = json!(50);
        let (status, body) =
            call(&app, Method::POST, "/api/meals", Some(ALICE), None, Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Invalid request payload.");
        assert!(body["details"]["fieldErrors"]["foods[0].quantity"].is_array());

        let mut no_macros = quick_add_meal();
        no_macros["foods"][0]
            .as_object_mut()
            .unwrap()
            .remove("quickAddMacros");
        let (status, _) =
            call(&app, Method::POST, "/api/meals", Some(ALICE), None, Some(no_macros)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/weights",
            Some(ALICE),
            None,
            Some(json!({ "weightLbs": "heavy", "recordedFor": now_rfc3339() })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body["details"]["formErrors"].as_array().unwrap().is_empty());

        let (status, _) =
            call(&app, Method::GET, "/api/meals?date=not-a-date", Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) =
            call(&app, Method::GET, "/api/meals/not-a-uuid", Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tenants_and_users_are_isolated() {
        let app = build_app(AppState::fake());
        let (_, body) = call(
            &app,
            Method::POST,
            "/api/weights",
            Some(ALICE),
            Some("exp_1"),
            Some(json!({ "weightLbs": 180.5, "recordedFor": now_rfc3339(), "note": "morning" })),
        )
        .await;
        let uri = format!("/api/weights/{}", body["data"]["id"].as_str().unwrap());

        let (_, body) =
            call(&app, Method::GET, "/api/weights", Some(ALICE), Some("exp_1"), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        // same user, no experience: a separate scope
        let (_, body) = call(&app, Method::GET, "/api/weights", Some(ALICE), None, None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
        let (_, body) =
            call(&app, Method::GET, "/api/weights", Some(ALICE), Some("exp_2"), None).await;
        assert!(body["data"].as_array().unwrap().is_empty());

        let (status, _) = call(
            &app,
            Method::PATCH,
            &uri,
            Some(BOB),
            Some("exp_1"),
            Some(json!({ "weightLbs": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::DELETE, &uri, Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            &app,
            Method::PATCH,
            &uri,
            Some(ALICE),
            Some("exp_1"),
            Some(json!({ "weightLbs": 179 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["weightLbs"], 179.0);
        assert_eq!(body["data"]["note"], "morning");
    }

    #[tokio::test]
    async fn food_search_splits_catalog_and_custom() {
        let state = AppState::fake();
        crate::foods::services::ensure_staples(state.store.as_ref()).await.unwrap();
        let app = build_app(state);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/custom-foods",
            Some(ALICE),
            None,
            Some(json!({
                "name": "Rice Cakes",
                "brand": "Quaker",
                "servingSize": 1,
                "servingUnit": "cake",
                "proteinPerUnit": 0.7,
                "carbsPerUnit": 7.3,
                "fatsPerUnit": 0.3
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            call(&app, Method::GET, "/api/foods?q=rice", Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["catalog"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["catalog"][0]["name"], "White Rice (Cooked)");
        assert_eq!(body["data"]["custom"][0]["name"], "Rice Cakes");

        let (_, body) = call(&app, Method::GET, "/api/foods?q=rice", Some(BOB), None, None).await;
        assert!(body["data"]["custom"].as_array().unwrap().is_empty());

        let (_, body) =
            call(&app, Method::GET, "/api/foods?limit=1", Some(ALICE), None, None).await;
        assert_eq!(body["data"]["catalog"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn snapshots_survive_catalog_changes() {
        let state = AppState::fake();
        let store = state.store.clone();
        let oats = NewFood {
            external_id: "fdc-1".into(),
            name: "Rolled Oats".into(),
            brand: None,
            serving_size: 40.0,
            serving_unit: "g".into(),
            macros: MacrosPerUnit {
                protein: 5.0,
                carbs: 27.0,
                fats: 3.0,
                calories: Some(150.0),
            },
        };
        let food = store.upsert_food(oats.clone()).await.unwrap();
        let app = build_app(state);

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/meals",
            Some(ALICE),
            None,
            Some(json!({
                "name": "Breakfast",
                "loggedAt": now_rfc3339(),
                "foods": [{ "source": "USDA", "foodId": food.id, "quantity": 2 }]
            })),
        )
        .await;
        let uri = format!("/api/meals/{}", body["data"]["id"].as_str().unwrap());

        store
            .upsert_food(NewFood {
                macros: MacrosPerUnit {
                    protein: 50.0,
                    ..oats.macros
                },
                ..oats
            })
            .await
            .unwrap();

        let (_, body) = call(&app, Method::GET, &uri, Some(ALICE), None, None).await;
        assert_eq!(body["data"]["protein"], 10.0);
        assert_eq!(body["data"]["foods"][0]["protein"], 10.0);
        assert_eq!(body["data"]["foods"][0]["foodId"], food.id.to_string());
        assert_eq!(body["data"]["foods"][0]["calories"], 300.0);
    }

    #[tokio::test]
    async fn dashboard_guest_and_scenario() {
        let app = build_app(AppState::fake());

        let (status, body) =
            call(&app, Method::GET, "/api/dashboard", None, Some("exp_9"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "guest");
        assert_eq!(body["data"]["experienceId"], "exp_9");

        // 150/200/50 targets, one quick add of 30/40/10
        let app = build_app(AppState::fake().with_config(|c| {
            c.default_targets.protein = 150.0;
            c.default_targets.carbs = 200.0;
            c.default_targets.fats = 50.0;
        }));
        call(&app, Method::POST, "/api/meals", Some(ALICE), None, Some(quick_add_meal())).await;

        let (status, body) =
            call(&app, Method::GET, "/api/dashboard", Some(ALICE), None, None).await;
        assert_eq!(status, StatusCode::OK);
        let d = &body["data"];
        assert_eq!(d["status"], "ready");
        assert_eq!(d["consumed"]["protein"], 30.0);
        assert_eq!(d["consumedCalories"], 370.0);
        assert_eq!(d["complianceScore"], 20);
        assert_eq!(d["streakDays"], 1);
        assert_eq!(d["meals"][0]["calories"], 370.0);
        assert_eq!(d["weekDays"].as_array().unwrap().len(), 7);
        let selected: Vec<&Value> = d["weekDays"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|day| day["isSelected"] == true)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["compliance"], 20);
        assert!(d["weeklyChange"].is_null());
        assert!(d["latestWeight"].is_null());

        let (_, body) = call(
            &app,
            Method::GET,
            "/api/dashboard?date=1999-01-01",
            Some(ALICE),
            None,
            None,
        )
        .await;
        assert_eq!(body["data"]["selectedDate"], "1999-01-01");
        assert_eq!(body["data"]["complianceScore"], 0);
        assert_eq!(body["data"]["streakDays"], 0);
    }
}
