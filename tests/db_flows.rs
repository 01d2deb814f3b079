//! End-to-end flows against PostgreSQL. Set `TEST_DATABASE_URL` to run them.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

mod common;

use common::{db_app, login, send, unique_email};

/// Money and stats come back as decimal strings.
fn money(value: &Value) -> f64 {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a decimal string: {value}"))
}

#[tokio::test]
async fn first_login_creates_a_regular_user() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let email = unique_email("new");

    let (token, user) = login(&app, &format!("g-{email}"), &email, "New Farmer").await;
    assert_eq!(user["email"], email.as_str());
    assert_eq!(user["is_admin"], false);

    let (status, body) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user["id"]);
    assert_eq!(body["user"]["email"], email.as_str());
}

#[tokio::test]
async fn repeated_login_reuses_the_same_row() {
    require_db!();
    let (app, state) = db_app(&unique_email("admin")).await;
    let email = unique_email("repeat");
    let google_id = format!("g-{email}");

    let (_, first) = login(&app, &google_id, &email, "Before").await;
    let (_, second) = login(&app, &google_id, &email, "After").await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["name"], "After");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE google_id = $1")
        .bind(&google_id)
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn admin_reads_everyone_but_writes_only_own_rows() {
    require_db!();
    let admin_email = unique_email("admin");
    let (app, _) = db_app(&admin_email).await;

    let farmer_email = unique_email("farmer");
    let (farmer, _) = login(&app, &format!("g-{farmer_email}"), &farmer_email, "Farmer").await;
    let (admin, admin_user) = login(&app, &format!("g-{admin_email}"), &admin_email, "Admin").await;
    assert_eq!(admin_user["is_admin"], true);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/fields",
        Some(&farmer),
        Some(json!({ "name": "River plot", "area": 3.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let field_id = created["field"]["id"].as_i64().unwrap();
    assert_eq!(created["field"]["area_unit"], "acres");

    let (status, listed) = send(&app, Method::GET, "/api/fields", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let row = listed["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["id"].as_i64() == Some(field_id))
        .expect("admin sees the farmer's field");
    assert_eq!(row["user_email"], farmer_email.as_str());

    let uri = format!("/api/fields/{field_id}");
    let (status, _) = send(&app, Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_users_rows_are_invisible() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let owner_email = unique_email("owner");
    let other_email = unique_email("other");
    let (owner, _) = login(&app, &format!("g-{owner_email}"), &owner_email, "Owner").await;
    let (other, _) = login(&app, &format!("g-{other_email}"), &other_email, "Other").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/fields",
        Some(&owner),
        Some(json!({ "name": "Hill plot" })),
    )
    .await;
    let uri = format!("/api/fields/{}", created["field"]["id"]);

    let (status, body) = send(&app, Method::GET, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Field not found");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&other),
        Some(json!({ "name": "Stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["field"]["name"], "Hill plot");
}

#[tokio::test]
async fn field_with_crops_cannot_be_deleted() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let email = unique_email("grower");
    let (token, _) = login(&app, &format!("g-{email}"), &email, "Grower").await;

    let (_, field) = send(
        &app,
        Method::POST,
        "/api/fields",
        Some(&token),
        Some(json!({ "name": "South" })),
    )
    .await;
    let field_id = field["field"]["id"].as_i64().unwrap();

    let (status, crop) = send(
        &app,
        Method::POST,
        "/api/crops",
        Some(&token),
        Some(json!({ "name": "Maize", "planted_date": "2024-04-01", "field_id": field_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(crop["crop"]["status"], "Planted");
    assert_eq!(crop["crop"]["progress"], 0);

    let uri = format!("/api/fields/{field_id}");
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("associated crops"));

    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn crop_records_follow_crop_ownership() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let owner_email = unique_email("owner");
    let other_email = unique_email("other");
    let (owner, _) = login(&app, &format!("g-{owner_email}"), &owner_email, "Owner").await;
    let (other, _) = login(&app, &format!("g-{other_email}"), &other_email, "Other").await;

    let (_, crop) = send(
        &app,
        Method::POST,
        "/api/crops",
        Some(&owner),
        Some(json!({ "name": "Rice", "planted_date": "2024-06-15" })),
    )
    .await;
    let crop_id = crop["crop"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/crops/{crop_id}/schedules"),
        Some(&other),
        Some(json!({ "date": "2024-06-20", "task": "Weed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, created) = send(
        &app,
        Method::POST,
        &format!("/api/crops/{crop_id}/schedules"),
        Some(&owner),
        Some(json!({ "date": "2024-06-20", "task": "Weed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let schedule_id = created["schedule"]["id"].as_i64().unwrap();
    let schedule_uri = format!("/api/crops/schedules/{schedule_id}");

    let (status, _) = send(
        &app,
        Method::PUT,
        &schedule_uri,
        Some(&other),
        Some(json!({ "done": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &schedule_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        &schedule_uri,
        Some(&owner),
        Some(json!({ "done": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schedule"]["done"], true);

    let (status, details) =
        send(&app, Method::GET, &format!("/api/crops/{crop_id}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["crop"]["schedule"].as_array().unwrap().len(), 1);
    assert!(details["crop"]["sprays"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn expenses_resolve_crop_names_and_reject_foreign_ids() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let owner_email = unique_email("owner");
    let other_email = unique_email("other");
    let (owner, _) = login(&app, &format!("g-{owner_email}"), &owner_email, "Owner").await;
    let (other, _) = login(&app, &format!("g-{other_email}"), &other_email, "Other").await;

    let (_, crop) = send(
        &app,
        Method::POST,
        "/api/crops",
        Some(&owner),
        Some(json!({ "name": "Cotton", "planted_date": "2024-05-01" })),
    )
    .await;
    let crop_id = crop["crop"]["id"].as_i64().unwrap();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/expenses",
        Some(&owner),
        Some(json!({
            "category": "Seeds",
            "description": "Cotton seed",
            "amount": 1500,
            "date": "2024-05-01",
            "crop_id": "Cotton"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["expense"]["crop_id"], crop_id);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/expenses",
        Some(&other),
        Some(json!({
            "category": "Seeds",
            "description": "Not mine",
            "amount": 10,
            "date": "2024-05-01",
            "crop_id": crop_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid crop_id");

    let (status, stats) = send(&app, Method::GET, "/api/expenses/stats", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["stats"][0]["category"], "Seeds");
    assert_eq!(stats["stats"][0]["count"], 1);
}

#[tokio::test]
async fn allow_listed_email_is_promoted_and_later_demoted() {
    require_db!();
    let email = unique_email("promoted");
    let google_id = format!("g-{email}");

    let (plain_app, _) = db_app(&unique_email("admin")).await;
    let (_, before) = login(&plain_app, &google_id, &email, "Grower").await;
    assert_eq!(before["is_admin"], false);

    let (admin_app, _) = db_app(&email).await;
    let (admin_token, promoted) = login(&admin_app, &google_id, &email, "Grower").await;
    assert_eq!(promoted["id"], before["id"]);
    assert_eq!(promoted["is_admin"], true);

    let other_email = unique_email("other");
    let (other, _) = login(&plain_app, &format!("g-{other_email}"), &other_email, "Other").await;
    let (_, field) = send(
        &plain_app,
        Method::POST,
        "/api/fields",
        Some(&other),
        Some(json!({ "name": "Far plot" })),
    )
    .await;
    let uri = format!("/api/fields/{}", field["field"]["id"]);
    let (status, _) = send(&admin_app, Method::GET, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Off the allow-list again: the stored flag drops and the old token loses read-all.
    let (_, demoted) = login(&plain_app, &google_id, &email, "Grower").await;
    assert_eq!(demoted["id"], before["id"]);
    assert_eq!(demoted["is_admin"], false);
    let (status, _) = send(&plain_app, Method::GET, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn revenue_lifecycle_with_stats() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let email = unique_email("seller");
    let (token, _) = login(&app, &format!("g-{email}"), &email, "Seller").await;

    let (_, crop) = send(
        &app,
        Method::POST,
        "/api/crops",
        Some(&token),
        Some(json!({ "name": "Onion", "planted_date": "2024-01-10" })),
    )
    .await;
    let crop_id = crop["crop"]["id"].as_i64().unwrap();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/revenue",
        Some(&token),
        Some(json!({
            "source": "Market",
            "product": "Onions",
            "quantity": "200 kg",
            "amount": 4000,
            "date": "2024-04-02",
            "crop_id": crop_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["revenue"]["crop_id"], crop_id);
    assert_eq!(created["revenue"]["payment_received"], false);
    let revenue_id = created["revenue"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/revenue",
        Some(&token),
        Some(json!({ "source": "Wholesale", "product": "Onions", "amount": 1000, "date": "2024-04-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, listed) = send(&app, Method::GET, "/api/revenue", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = listed["revenue"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // Newest date first.
    assert_eq!(rows[0]["source"], "Wholesale");
    assert_eq!(rows[1]["crop_name"], "Onion");

    let uri = format!("/api/revenue/{revenue_id}");
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({
            "source": "Market",
            "product": "Red onions",
            "amount": 4500.5,
            "date": "2024-04-02",
            "payment_received": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["revenue"]["product"], "Red onions");
    assert_eq!(updated["revenue"]["payment_received"], true);
    // Full replace: omitted optional columns are cleared.
    assert_eq!(updated["revenue"]["quantity"], Value::Null);
    assert_eq!(updated["revenue"]["crop_id"], Value::Null);

    let (status, stats) = send(&app, Method::GET, "/api/revenue/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["stats"][0]["source"], "Market");
    assert_eq!(stats["stats"][0]["count"], 1);
    assert_eq!(stats["stats"][1]["source"], "Wholesale");
    assert_eq!(money(&stats["total"]), 5500.5);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Revenue deleted successfully");
    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expense_replace_and_admin_wide_stats() {
    require_db!();
    let admin_email = unique_email("admin");
    let (app, _) = db_app(&admin_email).await;
    let (admin, _) = login(&app, &format!("g-{admin_email}"), &admin_email, "Admin").await;
    let email = unique_email("spender");
    let (token, _) = login(&app, &format!("g-{email}"), &email, "Spender").await;
    let category = format!("Fuel {email}");

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/expenses",
        Some(&token),
        Some(json!({
            "category": "Labour",
            "description": "Weeding",
            "amount": 300,
            "date": "2024-03-01",
            "payment_method": "Cash"
        })),
    )
    .await;
    let uri = format!("/api/expenses/{}", created["expense"]["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "category": "Labour", "description": "Weeding" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount is required");

    let (status, replaced) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({
            "category": category,
            "description": "Diesel",
            "amount": 120.25,
            "date": "2024-03-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["expense"]["category"], category.as_str());
    assert_eq!(replaced["expense"]["payment_method"], Value::Null);
    assert_eq!(money(&replaced["expense"]["amount"]), 120.25);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&admin),
        Some(json!({ "category": "Taken", "description": "x", "amount": 1, "date": "2024-03-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, own) = send(&app, Method::GET, "/api/expenses/stats", Some(&token), None).await;
    assert_eq!(own["stats"].as_array().unwrap().len(), 1);
    assert_eq!(money(&own["total"]), 120.25);

    let (status, all) = send(&app, Method::GET, "/api/expenses/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let row = all["stats"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["category"] == category.as_str())
        .expect("admin stats include other users' rows");
    assert_eq!(row["count"], 1);
    assert!(money(&all["total"]) >= 120.25);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Expense deleted successfully");
}

#[tokio::test]
async fn crop_update_checks_field_ownership() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let owner_email = unique_email("owner");
    let other_email = unique_email("other");
    let (owner, _) = login(&app, &format!("g-{owner_email}"), &owner_email, "Owner").await;
    let (other, _) = login(&app, &format!("g-{other_email}"), &other_email, "Other").await;

    let (_, own_field) = send(
        &app,
        Method::POST,
        "/api/fields",
        Some(&owner),
        Some(json!({ "name": "Home" })),
    )
    .await;
    let own_field_id = own_field["field"]["id"].as_i64().unwrap();
    let (_, foreign_field) = send(
        &app,
        Method::POST,
        "/api/fields",
        Some(&other),
        Some(json!({ "name": "Neighbour" })),
    )
    .await;
    let foreign_field_id = foreign_field["field"]["id"].as_i64().unwrap();

    let (_, crop) = send(
        &app,
        Method::POST,
        "/api/crops",
        Some(&owner),
        Some(json!({ "name": "Barley", "planted_date": "2024-02-20" })),
    )
    .await;
    let uri = format!("/api/crops/{}", crop["crop"]["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&owner),
        Some(json!({ "field_id": foreign_field_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid field_id");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&owner),
        Some(json!({ "field_id": own_field_id, "progress": 40, "status": "Growing" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["crop"]["field_id"], own_field_id);
    assert_eq!(body["crop"]["progress"], 40);
    assert_eq!(body["crop"]["status"], "Growing");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&owner),
        Some(json!({ "field_id": 0, "status": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["crop"]["field_id"], Value::Null);
    assert_eq!(body["crop"]["status"], "Growing");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&owner),
        Some(json!({ "image": "this-is-long-image-url" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Image must be at most 10 characters");
}

#[tokio::test]
async fn treatments_and_sprays_are_added_and_removed_through_the_crop() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let owner_email = unique_email("owner");
    let other_email = unique_email("other");
    let (owner, _) = login(&app, &format!("g-{owner_email}"), &owner_email, "Owner").await;
    let (other, _) = login(&app, &format!("g-{other_email}"), &other_email, "Other").await;

    let (_, crop) = send(
        &app,
        Method::POST,
        "/api/crops",
        Some(&owner),
        Some(json!({ "name": "Chilli", "planted_date": "2024-05-05" })),
    )
    .await;
    let crop_id = crop["crop"]["id"].as_i64().unwrap();

    let (status, fertilizer) = send(
        &app,
        Method::POST,
        &format!("/api/crops/{crop_id}/fertilizers"),
        Some(&owner),
        Some(json!({ "date": "2024-05-20", "type": "NPK", "quantity": "25 kg" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fertilizer["fertilizer"]["type"], "NPK");

    let (status, pesticide) = send(
        &app,
        Method::POST,
        &format!("/api/crops/{crop_id}/pesticides"),
        Some(&owner),
        Some(json!({ "date": "2024-06-01", "type": "Neem", "quantity": "2 L", "notes": "evening" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pesticide["pesticide"]["notes"], "evening");

    let (status, spray) = send(
        &app,
        Method::POST,
        &format!("/api/crops/{crop_id}/sprays"),
        Some(&owner),
        Some(json!({ "date": "2024-06-03", "time": "06:30", "name": "Copper", "quantity": "1 L" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(spray["spray"]["time"], "06:30");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/crops/{crop_id}/sprays"),
        Some(&other),
        Some(json!({ "date": "2024-06-03", "name": "Copper", "quantity": "1 L" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, details) =
        send(&app, Method::GET, &format!("/api/crops/{crop_id}"), Some(&owner), None).await;
    assert_eq!(details["crop"]["fertilizers"].as_array().unwrap().len(), 1);
    assert_eq!(details["crop"]["pesticides"].as_array().unwrap().len(), 1);
    assert_eq!(details["crop"]["sprays"].as_array().unwrap().len(), 1);

    let removals = [
        ("fertilizers", fertilizer["fertilizer"]["id"].clone(), "Fertilizer"),
        ("pesticides", pesticide["pesticide"]["id"].clone(), "Pesticide"),
        ("sprays", spray["spray"]["id"].clone(), "Spray"),
    ];
    for (path, id, label) in removals {
        let uri = format!("/api/crops/{path}/{id}");
        let (status, body) = send(&app, Method::DELETE, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], format!("{label} not found"));

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["message"], format!("{label} deleted successfully"));
    }

    let (_, details) =
        send(&app, Method::GET, &format!("/api/crops/{crop_id}"), Some(&owner), None).await;
    assert!(details["crop"]["fertilizers"].as_array().unwrap().is_empty());
    assert!(details["crop"]["pesticides"].as_array().unwrap().is_empty());
    assert!(details["crop"]["sprays"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_input_is_a_bad_request() {
    require_db!();
    let (app, _) = db_app(&unique_email("admin")).await;
    let email = unique_email("bulk");
    let (token, _) = login(&app, &format!("g-{email}"), &email, "Bulk").await;

    let cases = [
        (
            "/api/expenses",
            json!({ "category": "Seeds", "description": "x", "amount": 99999999999.0, "date": "2024-01-01" }),
        ),
        ("/api/fields", json!({ "name": "Big", "area": 123456789012_i64 })),
        ("/api/fields", json!({ "name": "Far", "location": "x".repeat(300) })),
        (
            "/api/crops",
            json!({ "name": "Corn", "planted_date": "2024-01-01", "image": "this-is-long-image-url" }),
        ),
    ];
    for (uri, body) in cases {
        let (status, response) = send(&app, Method::POST, uri, Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {response}");
    }
}
