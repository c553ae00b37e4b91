use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::course::{self, Entity as Course};
use crate::models::dto::CourseRequest;
use crate::models::{enrolled_course, order_line};
use crate::models::users::UserRole;
use crate::services::catalog_service::CatalogService;

/// GET /api/courses - Liste publique, plus récents d'abord
#[get("")]
pub async fn list_courses(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let courses = Course::find()
        .order_by_desc(course::Column::CreatedAt)
        .order_by_desc(course::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(courses))
}

/// GET /api/courses/slug/{slug} - Cours complet (chapitres + contenus)
#[get("/slug/{slug}")]
pub async fn get_course_by_slug(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();

    let course = Course::find()
        .filter(course::Column::Slug.eq(slug.as_str()))
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Course"))?;

    let detail = CatalogService::course_detail(db.get_ref(), course).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /api/courses/{id}
#[get("/{id}")]
pub async fn get_course(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let course = Course::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Course"))?;

    Ok(HttpResponse::Ok().json(course))
}

/// POST /api/courses - Créer un cours (INSTRUCTEUR)
#[post("")]
pub async fn create_course(
    auth_user: AuthUser,
    body: web::Json<CourseRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    auth_user.require_role(UserRole::Instructor)?;
    body.validate()?;
    CatalogService::validate_slug(&body.slug)?;

    let body = body.into_inner();

    let existing = Course::find()
        .filter(course::Column::Slug.eq(body.slug.as_str()))
        .one(db.get_ref())
        .await?;

    if existing.is_some() {
        return Err(ApiError::Conflict("Slug already used".to_string()));
    }

    let course = course::ActiveModel {
        title: Set(body.title),
        slug: Set(body.slug),
        description: Set(body.description),
        cover: Set(body.cover),
        course_type: Set(body.course_type),
        instructor_id: Set(Some(auth_user.user_id)),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    info!("Instructor {} created course {} ({})", auth_user.user_id, course.id, course.slug);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Course created successfully",
        "course": course
    })))
}

/// PUT /api/courses/{id} - Modifier un cours (PROPRIÉTAIRE)
#[put("/{id}")]
pub async fn update_course(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CourseRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    CatalogService::validate_slug(&body.slug)?;

    let current = CatalogService::owned_course(db.get_ref(), path.into_inner(), &auth_user).await?;
    let body = body.into_inner();

    if body.slug != current.slug {
        let taken = Course::find()
            .filter(course::Column::Slug.eq(body.slug.as_str()))
            .count(db.get_ref())
            .await?;
        if taken > 0 {
            return Err(ApiError::Conflict("Slug already used".to_string()));
        }
    }

    let mut active: course::ActiveModel = current.into();
    active.title = Set(body.title);
    active.slug = Set(body.slug);
    active.description = Set(body.description);
    active.cover = Set(body.cover);
    active.course_type = Set(body.course_type);

    let course = active.update(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(course))
}

/// DELETE /api/courses/{id} - Supprimer un cours sans inscrits ni commandes (PROPRIÉTAIRE)
#[delete("/{id}")]
pub async fn delete_course(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let course = CatalogService::owned_course(db.get_ref(), path.into_inner(), &auth_user).await?;

    let enrolled = enrolled_course::Entity::find()
        .filter(enrolled_course::Column::CourseId.eq(course.id))
        .count(db.get_ref())
        .await?;

    if enrolled > 0 {
        return Err(ApiError::Conflict("Course has enrolled students".to_string()));
    }

    // Une ligne de commande (même en panier) garde une référence vers le cours
    let ordered = order_line::Entity::find()
        .filter(order_line::Column::CourseId.eq(course.id))
        .count(db.get_ref())
        .await?;

    if ordered > 0 {
        return Err(ApiError::Conflict("Course is referenced by orders".to_string()));
    }

    Course::delete_by_id(course.id).exec(db.get_ref()).await?;
    info!("Course {} deleted by instructor {}", course.id, auth_user.user_id);

    Ok(HttpResponse::NoContent().finish())
}

pub fn courses_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/courses")
            .service(list_courses)
            .service(create_course)
            .service(get_course_by_slug)
            .service(get_course)
            .service(update_course)
            .service(delete_course)
            .configure(super::chapters::course_chapter_routes)
    );
}
