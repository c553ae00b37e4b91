use actix_web::{get, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest};
use crate::models::users::{ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users, PublicUser};
use crate::utils::password;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// POST /api/users - Créer un compte (PUBLIC)
#[post("/users")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ApiResult<HttpResponse> {
    let mut body = body.into_inner();
    body.email = normalize_email(&body.email);
    body.first_name = body.first_name.trim().to_string();
    body.last_name = body.last_name.trim().to_string();
    body.validate()?;

    // 1. Vérifier si l'email existe déjà (l'index unique couvre les requêtes concurrentes)
    let existing_user = Users::find()
        .filter(UserColumn::Email.eq(body.email.as_str()))
        .one(db.get_ref())
        .await?;

    if existing_user.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    // 2. Hash le mot de passe
    let password_hash = password::hash_password(&body.password, config.password_iterations)
        .map_err(ApiError::Internal)?;

    // 3. Créer l'utilisateur
    let user = UserActiveModel {
        first_name: Set(body.first_name),
        last_name: Set(body.last_name),
        email: Set(body.email),
        password_hash: Set(password_hash),
        role: Set(body.role),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    info!("Registered user {} as {}", user.id, user.role.as_str());

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "User registered successfully",
        "user": PublicUser::from(user)
    })))
}

/// POST /api/login - Se connecter (PUBLIC)
/// Email inconnu et mauvais mot de passe donnent exactement la même réponse
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ApiResult<HttpResponse> {
    let email = normalize_email(&body.email);

    // 1. Trouver l'utilisateur
    let user = Users::find()
        .filter(UserColumn::Email.eq(email.as_str()))
        .one(db.get_ref())
        .await?;

    // 2. Vérifier le mot de passe (email inconnu : même calcul sur un hash factice)
    let stored_hash = match &user {
        Some(user) => user.password_hash.clone(),
        None => password::dummy_hash(config.password_iterations),
    };
    let is_valid = password::verify_password(&body.password, &stored_hash)
        .map_err(ApiError::Internal)?;

    let user = match user {
        Some(user) if is_valid => user,
        _ => return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())),
    };

    // 3. Générer le JWT
    let token = config
        .jwt
        .generate_token(user.id, &user.email, user.role)
        .map_err(ApiError::Internal)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: PublicUser::from(user),
    }))
}

/// GET /api/me - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let user = Users::find_by_id(auth_user.user_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

/// PUT /api/me/password - Changer son mot de passe (PROTÉGÉE)
#[put("/me/password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    // 1. Récupérer l'utilisateur
    let user = Users::find_by_id(auth_user.user_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    // 2. Vérifier l'ancien mot de passe
    let is_valid = password::verify_password(&body.current_password, &user.password_hash)
        .map_err(ApiError::Internal)?;

    if !is_valid {
        return Err(ApiError::Unauthorized("Current password is incorrect".to_string()));
    }

    // 3. Hasher le nouveau mot de passe et mettre à jour
    let new_password_hash = password::hash_password(&body.new_password, config.password_iterations)
        .map_err(ApiError::Internal)?;

    let mut active_model: UserActiveModel = user.into();
    active_model.password_hash = Set(new_password_hash);
    active_model.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Password changed successfully"
    })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(me)
        .service(change_password);
}
