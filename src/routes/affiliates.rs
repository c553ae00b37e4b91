use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::dto::AffiliateCourseRequest;
use crate::models::users::UserRole;
use crate::services::affiliate_service::AffiliateService;

/// POST /api/affiliates - Devenir affilié (compte AFFILIÉ)
#[post("")]
pub async fn register_affiliate(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    auth_user.require_role(UserRole::Affiliate)?;

    let affiliate = AffiliateService::register(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Affiliate registered successfully",
        "affiliate": affiliate
    })))
}

/// GET /api/affiliates/me
#[get("/me")]
pub async fn get_my_affiliate(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let affiliate = AffiliateService::require(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(affiliate))
}

/// POST /api/affiliates/courses - Promouvoir un cours
#[post("/courses")]
pub async fn link_course(
    auth_user: AuthUser,
    body: web::Json<AffiliateCourseRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let affiliate = AffiliateService::require(db.get_ref(), auth_user.user_id).await?;
    let link = AffiliateService::link_course(db.get_ref(), &affiliate, body.course_id).await?;

    Ok(HttpResponse::Created().json(link))
}

/// GET /api/affiliates/courses
#[get("/courses")]
pub async fn list_linked_courses(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let affiliate = AffiliateService::require(db.get_ref(), auth_user.user_id).await?;
    let courses = AffiliateService::courses(db.get_ref(), &affiliate).await?;

    Ok(HttpResponse::Ok().json(courses))
}

/// GET /api/affiliates/referrals - Commandes payées avec le code de l'affilié
#[get("/referrals")]
pub async fn list_referrals(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let affiliate = AffiliateService::require(db.get_ref(), auth_user.user_id).await?;
    let summary = AffiliateService::referrals(db.get_ref(), affiliate).await?;

    Ok(HttpResponse::Ok().json(summary))
}

pub fn affiliates_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/affiliates")
            .service(register_affiliate)
            .service(get_my_affiliate)
            .service(link_course)
            .service(list_linked_courses)
            .service(list_referrals)
    );
}
