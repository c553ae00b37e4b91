// Tests HTTP de bout en bout sur une base SQLite en mémoire

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::models::{content_progress, enrolled_course, payment};
use crate::utils::jwt::JwtKeys;
use crate::{db, routes};

const PASSWORD: &str = "correct-horse-battery";

async fn setup() -> (web::Data<DatabaseConnection>, web::Data<AppConfig>) {
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        jwt: JwtKeys::new("test-secret-that-is-long-enough-for-hs256", 1),
        password_iterations: 1000,
        host: "127.0.0.1".to_string(),
        port: 0,
    };

    let conn = db::establish_connection(&config.database_url, config.database_max_connections)
        .await
        .expect("in-memory database");

    (web::Data::new(conn), web::Data::new(config))
}

macro_rules! test_app {
    ($db:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data($db.clone())
                .app_data($config.clone())
                .app_data(crate::json_config())
                .app_data(crate::query_config())
                .configure(routes::configure_routes),
        )
        .await
    };
}

/// Envoie la requête et retourne (status, corps JSON ou Null)
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = test::read_body(resp).await;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }};
}

/// Crée un compte et retourne son token
macro_rules! signup {
    ($app:expr, $email:expr, $role:expr) => {{
        let (status, _) = send!(
            $app,
            test::TestRequest::post().uri("/api/users").set_json(json!({
                "first_name": "Test",
                "last_name": "User",
                "email": $email,
                "password": PASSWORD,
                "role": $role
            }))
        );
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/login")
                .set_json(json!({ "email": $email, "password": PASSWORD }))
        );
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token").to_string()
    }};
}

macro_rules! authed {
    ($req:expr, $token:expr) => {
        $req.insert_header(("Authorization", format!("Bearer {}", $token)))
    };
}

/// Un cours (1 chapitre, 1 contenu) vendu par un produit ; retourne (course_id, product_id, content_id)
macro_rules! seed_catalog {
    ($app:expr, $token:expr) => {{
        let (status, body) = send!(
            $app,
            authed!(test::TestRequest::post().uri("/api/courses"), $token).set_json(json!({
                "title": "Rust for Traders",
                "slug": "rust-for-traders",
                "description": "Ownership, async and sea-orm",
                "type": "programming"
            }))
        );
        assert_eq!(status, StatusCode::CREATED);
        let course_id = body["course"]["id"].as_i64().expect("course id");

        let (status, body) = send!(
            $app,
            authed!(
                test::TestRequest::post().uri(&format!("/api/courses/{}/chapters", course_id)),
                $token
            )
            .set_json(json!({ "title": "Getting started" }))
        );
        assert_eq!(status, StatusCode::CREATED);
        let chapter_id = body["chapter"]["id"].as_i64().expect("chapter id");

        let (status, body) = send!(
            $app,
            authed!(
                test::TestRequest::post().uri(&format!("/api/chapters/{}/contents", chapter_id)),
                $token
            )
            .set_json(json!({ "title": "Welcome", "type": "VIDEO", "path": "/videos/welcome.mp4" }))
        );
        assert_eq!(status, StatusCode::CREATED);
        let content_id = body["content"]["id"].as_i64().expect("content id");

        let (status, body) = send!(
            $app,
            authed!(test::TestRequest::post().uri("/api/products"), $token).set_json(json!({
                "title": "Rust for Traders",
                "price": 4900,
                "type": "course"
            }))
        );
        assert_eq!(status, StatusCode::CREATED);
        let product_id = body["product"]["id"].as_i64().expect("product id");

        let (status, _) = send!(
            $app,
            authed!(test::TestRequest::post().uri("/api/product-details"), $token)
                .set_json(json!({ "product_id": product_id, "course_id": course_id }))
        );
        assert_eq!(status, StatusCode::CREATED);

        (course_id, product_id, content_id)
    }};
}

/// Panier d'une ligne puis paiement réussi ; retourne (order_id, corps de la réponse)
macro_rules! buy {
    ($app:expr, $token:expr, $product_id:expr, $key:expr) => {{
        let (status, line) = send!(
            $app,
            authed!(test::TestRequest::post().uri("/api/order-lines"), $token)
                .set_json(json!({ "product_id": $product_id }))
        );
        assert!(status == StatusCode::CREATED || status == StatusCode::OK);
        let order_id = line["order_id"].as_i64().expect("order id");

        let (status, body) = send!(
            $app,
            authed!(test::TestRequest::post().uri("/api/payments"), $token).set_json(json!({
                "order_id": order_id,
                "method": "card",
                "idempotency_key": $key
            }))
        );
        assert_eq!(status, StatusCode::CREATED);
        (order_id, body)
    }};
}

#[actix_web::test]
async fn test_health() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[actix_web::test]
async fn test_duplicate_email_is_conflict() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    signup!(app, "ada@example.com", "student");

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/users").set_json(json!({
            "first_name": "Ada",
            "last_name": "Again",
            "email": "  ADA@example.com ",
            "password": PASSWORD,
            "role": "instructor"
        }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}

#[actix_web::test]
async fn test_register_validation() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/users").set_json(json!({
            "first_name": "Bob",
            "last_name": "Short",
            "email": "not-an-email",
            "password": "short",
            "role": "student"
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email is invalid, password must contain at least 8 characters");

    // JSON invalide : même format d'erreur
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/users")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_login_failures_are_uniform() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    signup!(app, "carol@example.com", "student");

    let (wrong_status, wrong_body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "carol@example.com", "password": "wrong-password" }))
    );
    let (unknown_status, unknown_body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "nobody@example.com", "password": PASSWORD }))
    );

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid email or password");
}

#[actix_web::test]
async fn test_me_and_change_password() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let token = signup!(app, "dan@example.com", "instructor");

    let (status, body) = send!(app, authed!(test::TestRequest::get().uri("/api/me"), token));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "dan@example.com");
    assert_eq!(body["role"], "instructor");
    assert!(body.get("password_hash").is_none());

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::put().uri("/api/me/password"), token)
            .set_json(json!({ "current_password": "wrong-password", "new_password": "another-password" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::put().uri("/api/me/password"), token)
            .set_json(json!({ "current_password": PASSWORD, "new_password": "another-password" }))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "dan@example.com", "password": "another-password" }))
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_enrolled_requires_token_and_student_role() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let (status, _) = send!(app, test::TestRequest::get().uri("/api/enrolled"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/enrolled")
            .insert_header(("Authorization", "Bearer not.a.jwt"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let instructor = signup!(app, "erin@example.com", "instructor");
    let (status, body) = send!(app, authed!(test::TestRequest::get().uri("/api/enrolled"), instructor));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_only_owner_edits_course() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let owner = signup!(app, "owner@example.com", "instructor");
    let other = signup!(app, "other@example.com", "instructor");
    let student = signup!(app, "stu@example.com", "student");
    let (course_id, _, _) = seed_catalog!(app, owner);

    let update = json!({ "title": "Hijacked", "slug": "hijacked", "type": "programming" });

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::put().uri(&format!("/api/courses/{}", course_id)), other).set_json(&update)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/courses"), student).set_json(&update)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/courses/slug/rust-for-traders"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Rust for Traders");
    assert_eq!(body["chapters"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["chapters"][0]["contents"][0]["type"], "VIDEO");
}

#[actix_web::test]
async fn test_only_owner_edits_products_and_chapters() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let owner = signup!(app, "uma@example.com", "instructor");
    let other = signup!(app, "vic@example.com", "instructor");
    let student = signup!(app, "wes@example.com", "student");
    let (course_id, product_id, content_id) = seed_catalog!(app, owner);

    let product = json!({ "title": "Hijacked", "price": 1, "type": "bundle" });

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/products"), student).set_json(&product)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::put().uri(&format!("/api/products/{}", product_id)), other).set_json(&product)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::delete().uri(&format!("/api/products/{}", product_id)), other)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Un autre instructeur ne peut pas revendre le cours dans son propre produit
    let (status, body) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/products"), other).set_json(&product)
    );
    assert_eq!(status, StatusCode::CREATED);
    let own_product_id = body["product"]["id"].as_i64().expect("product id");

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/product-details"), other)
            .set_json(json!({ "product_id": own_product_id, "course_id": course_id }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/product-details"), other)
            .set_json(json!({ "product_id": product_id, "course_id": course_id }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, details) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/product-details?product_id={}", product_id))
    );
    let detail_id = details[0]["id"].as_i64().expect("detail id");

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::delete().uri(&format!("/api/product-details/{}", detail_id)), other)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, chapters) = send!(app, test::TestRequest::get().uri(&format!("/api/courses/{}/chapters", course_id)));
    let chapter_id = chapters[0]["id"].as_i64().expect("chapter id");

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::put().uri(&format!("/api/chapters/{}", chapter_id)), other)
            .set_json(json!({ "title": "Renamed" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri(&format!("/api/chapters/{}/contents", chapter_id)), other)
            .set_json(json!({ "title": "Spam", "type": "PDF", "path": "/spam.pdf" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::delete().uri(&format!("/api/contents/{}", content_id)), other)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Rien n'a changé
    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/products/{}", product_id)));
    assert_eq!(body["title"], "Rust for Traders");
    assert_eq!(body["courses"].as_array().map(Vec::len), Some(1));

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/courses/slug/rust-for-traders"));
    assert_eq!(body["chapters"][0]["title"], "Getting started");
    assert_eq!(body["chapters"][0]["contents"].as_array().map(Vec::len), Some(1));

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/products/{}", own_product_id)));
    assert_eq!(body["courses"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_course_in_cart_cannot_be_deleted() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let instructor = signup!(app, "xan@example.com", "instructor");
    let student = signup!(app, "yara@example.com", "student");
    let (course_id, product_id, _) = seed_catalog!(app, instructor);

    let (status, line) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/order-lines"), student)
            .set_json(json!({ "product_id": product_id, "course_id": course_id }))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send!(
        app,
        authed!(test::TestRequest::delete().uri(&format!("/api/courses/{}", course_id)), instructor)
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Course is referenced by orders");

    let (status, body) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/payments"), student)
            .set_json(json!({ "order_id": line["order_id"], "method": "card" }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["enrollments"][0]["course_id"].as_i64(), Some(course_id));
}

#[actix_web::test]
async fn test_unlinked_course_blocks_checkout() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let instructor = signup!(app, "zed@example.com", "instructor");
    let student = signup!(app, "abe@example.com", "student");
    let (course_id, product_id, _) = seed_catalog!(app, instructor);

    let (_, line) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/order-lines"), student)
            .set_json(json!({ "product_id": product_id, "course_id": course_id }))
    );

    // Le cours est retiré du produit après l'ajout au panier
    let (_, details) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/product-details?product_id={}", product_id))
    );
    let (status, _) = send!(
        app,
        authed!(
            test::TestRequest::delete().uri(&format!("/api/product-details/{}", details[0]["id"])),
            instructor
        )
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/payments"), student)
            .set_json(json!({ "order_id": line["order_id"], "method": "card" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("no longer includes"));

    assert_eq!(payment::Entity::find().count(db.get_ref()).await.unwrap(), 0);
    assert_eq!(enrolled_course::Entity::find().count(db.get_ref()).await.unwrap(), 0);

    // Le panier reste utilisable : on retire la ligne
    let (status, _) = send!(
        app,
        authed!(test::TestRequest::delete().uri(&format!("/api/order-lines/{}", line["id"])), student)
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, cart) = send!(app, authed!(test::TestRequest::get().uri("/api/order-lines"), student));
    assert_eq!(cart["order"]["status"], "pending");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_duplicate_product_detail_is_conflict() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let instructor = signup!(app, "fay@example.com", "instructor");
    let (course_id, product_id, _) = seed_catalog!(app, instructor);

    let (status, body) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/product-details"), instructor)
            .set_json(json!({ "product_id": product_id, "course_id": course_id }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/product-details?product_id={}", product_id))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["price"], 4900);
}

#[actix_web::test]
async fn test_affiliate_registration_once() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let affiliate = signup!(app, "gus@example.com", "affiliate");
    let student = signup!(app, "hal@example.com", "student");

    let (status, _) = send!(app, authed!(test::TestRequest::post().uri("/api/affiliates"), student));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(app, authed!(test::TestRequest::post().uri("/api/affiliates"), affiliate));
    assert_eq!(status, StatusCode::CREATED);
    let code = body["affiliate"]["unique_code"].as_str().expect("code").to_string();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert_eq!(body["affiliate"]["status"], "active");

    let (status, body) = send!(app, authed!(test::TestRequest::post().uri("/api/affiliates"), affiliate));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User is already an affiliate");
}

#[actix_web::test]
async fn test_affiliate_course_link_and_referrals() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let instructor = signup!(app, "ivy@example.com", "instructor");
    let affiliate = signup!(app, "jay@example.com", "affiliate");
    let student = signup!(app, "kim@example.com", "student");
    let (course_id, product_id, _) = seed_catalog!(app, instructor);

    let (_, body) = send!(app, authed!(test::TestRequest::post().uri("/api/affiliates"), affiliate));
    let code = body["affiliate"]["unique_code"].as_str().expect("code").to_string();

    let link = json!({ "course_id": course_id });
    let (status, body) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/affiliates/courses"), affiliate).set_json(&link)
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["course"]["slug"], "rust-for-traders");

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/affiliates/courses"), affiliate).set_json(&link)
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send!(app, authed!(test::TestRequest::get().uri("/api/affiliates/courses"), affiliate));
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    // Achat avec le code de l'affilié (en minuscules)
    let (status, line) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/order-lines"), student)
            .set_json(json!({ "product_id": product_id, "affiliate_code": code.to_lowercase() }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/payments"), student)
            .set_json(json!({ "order_id": line["order_id"], "method": "card" }))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send!(app, authed!(test::TestRequest::get().uri("/api/affiliates/referrals"), affiliate));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paid_orders"], 1);
    assert_eq!(body["total_amount"], 4900);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/order-lines"), student)
            .set_json(json!({ "product_id": product_id, "affiliate_code": "FFFFFFFF" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_purchase_enrolls_student() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let instructor = signup!(app, "lea@example.com", "instructor");
    let student = signup!(app, "max@example.com", "student");
    let (course_id, product_id, _) = seed_catalog!(app, instructor);

    let (status, body) = send!(app, authed!(test::TestRequest::get().uri("/api/enrolled"), student));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "enrolled": [] }));

    // Un instructeur ne remplit pas de panier
    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/order-lines"), instructor)
            .set_json(json!({ "product_id": product_id }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Ajouter deux fois le même produit ne crée qu'une ligne
    let (status, first) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/order-lines"), student)
            .set_json(json!({ "product_id": product_id }))
    );
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/order-lines"), student)
            .set_json(json!({ "product_id": product_id }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);

    let (_, cart) = send!(app, authed!(test::TestRequest::get().uri("/api/order-lines"), student));
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["total"], 4900);

    let (_, payment) = buy!(app, student, product_id, "checkout-1");
    assert_eq!(payment["payment"]["amount"], 4900);
    assert_eq!(payment["enrollments"].as_array().map(Vec::len), Some(1));

    let (status, body) = send!(app, authed!(test::TestRequest::get().uri("/api/enrolled"), student));
    assert_eq!(status, StatusCode::OK);
    let enrolled = body["enrolled"].as_array().expect("enrolled");
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0]["course"]["title"], "Rust for Traders");
    assert_eq!(enrolled[0]["order"]["status"], "paid");

    // Panier vidé, commande payée
    let (_, cart) = send!(app, authed!(test::TestRequest::get().uri("/api/order-lines"), student));
    assert_eq!(cart["order"], Value::Null);
    assert_eq!(cart["total"], 0);

    let (_, orders) = send!(app, authed!(test::TestRequest::get().uri("/api/orders"), student));
    assert_eq!(orders[0]["status"], "paid");

    // Un cours avec inscrits ne se supprime pas
    let (status, _) = send!(
        app,
        authed!(test::TestRequest::delete().uri(&format!("/api/courses/{}", course_id)), instructor)
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::delete().uri(&format!("/api/products/{}", product_id)), instructor)
    );
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_payment_replay_is_idempotent() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let instructor = signup!(app, "ned@example.com", "instructor");
    let student = signup!(app, "oli@example.com", "student");
    let other = signup!(app, "pat@example.com", "student");
    let (_, product_id, _) = seed_catalog!(app, instructor);

    let (order_id, first) = buy!(app, student, product_id, "same-key");
    assert_eq!(first["replayed"], false);

    let (status, replay) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/payments"), student).set_json(json!({
            "order_id": order_id,
            "method": "card",
            "idempotency_key": "same-key"
        }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["replayed"], true);
    assert_eq!(replay["payment"]["id"], first["payment"]["id"]);

    // Sans clé, une commande payée est refusée
    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/payments"), student)
            .set_json(json!({ "order_id": order_id, "method": "card" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    // La commande d'un autre est invisible
    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/payments"), other)
            .set_json(json!({ "order_id": order_id, "method": "card" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(payment::Entity::find().count(db.get_ref()).await.unwrap(), 1);
    assert_eq!(enrolled_course::Entity::find().count(db.get_ref()).await.unwrap(), 1);

    let (_, payments) = send!(app, authed!(test::TestRequest::get().uri("/api/payments"), student));
    assert_eq!(payments.as_array().map(Vec::len), Some(1));
    let (_, payments) = send!(app, authed!(test::TestRequest::get().uri("/api/payments"), other));
    assert_eq!(payments.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_failed_payment_does_not_enroll() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let instructor = signup!(app, "quinn@example.com", "instructor");
    let student = signup!(app, "ray@example.com", "student");
    let (_, product_id, _) = seed_catalog!(app, instructor);

    let (_, line) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/order-lines"), student)
            .set_json(json!({ "product_id": product_id }))
    );

    // Une méthode faite d'espaces est refusée
    let (status, body) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/payments"), student)
            .set_json(json!({ "order_id": line["order_id"], "method": "   " }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "method is required");

    let (status, body) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/payments"), student)
            .set_json(json!({ "order_id": line["order_id"], "method": " card ", "status": "failed" }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payment"]["status"], "failed");
    assert_eq!(body["payment"]["method"], "card");

    let (_, body) = send!(app, authed!(test::TestRequest::get().uri("/api/enrolled"), student));
    assert_eq!(body["enrolled"].as_array().map(Vec::len), Some(0));

    // Le panier reste ouvert
    let (_, cart) = send!(app, authed!(test::TestRequest::get().uri("/api/order-lines"), student));
    assert_eq!(cart["order"]["status"], "pending");
}

#[actix_web::test]
async fn test_content_completion_upsert() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let instructor = signup!(app, "sam@example.com", "instructor");
    let student = signup!(app, "tia@example.com", "student");
    let (course_id, product_id, content_id) = seed_catalog!(app, instructor);

    let mark = |completed: bool| json!({ "content_id": content_id, "completed": completed });

    let (status, _) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/content/completion"), student).set_json(mark(true))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    buy!(app, student, product_id, "progress-key");

    let (status, first) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/content/completion"), student).set_json(mark(true))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["completed"], true);

    let (status, second) = send!(
        app,
        authed!(test::TestRequest::post().uri("/api/content/completion"), student).set_json(mark(false))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["completed"], false);

    assert_eq!(content_progress::Entity::find().count(db.get_ref()).await.unwrap(), 1);

    let (status, body) = send!(
        app,
        authed!(
            test::TestRequest::get().uri(&format!("/api/content/completion?course_id={}", course_id)),
            student
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["completed"], 0);
}
