use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::{ChapterRequest, ContentRequest};
use crate::models::{chapter, content, course};
use crate::services::catalog_service::CatalogService;

/// GET /api/courses/{course_id}/chapters - Chapitres ordonnés (PUBLIC)
#[get("/{course_id}/chapters")]
pub async fn list_chapters(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let course_id = path.into_inner();

    course::Entity::find_by_id(course_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Course"))?;

    let chapters = CatalogService::chapters_of(db.get_ref(), course_id).await?;
    Ok(HttpResponse::Ok().json(chapters))
}

/// POST /api/courses/{course_id}/chapters - Ajouter un chapitre (PROPRIÉTAIRE)
#[post("/{course_id}/chapters")]
pub async fn create_chapter(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ChapterRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let course = CatalogService::owned_course(db.get_ref(), path.into_inner(), &auth_user).await?;

    let sort_order = match body.sort_order {
        Some(order) => order,
        None => CatalogService::next_chapter_order(db.get_ref(), course.id).await?,
    };

    let chapter = chapter::ActiveModel {
        course_id: Set(course.id),
        title: Set(body.into_inner().title),
        sort_order: Set(sort_order),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Chapter created successfully",
        "chapter": chapter
    })))
}

/// PUT /api/chapters/{id} - Renommer / réordonner (PROPRIÉTAIRE)
#[put("/{id}")]
pub async fn update_chapter(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ChapterRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let current = CatalogService::owned_chapter(db.get_ref(), path.into_inner(), &auth_user).await?;
    let body = body.into_inner();

    let mut active: chapter::ActiveModel = current.into();
    active.title = Set(body.title);
    if let Some(order) = body.sort_order {
        active.sort_order = Set(order);
    }

    let chapter = active.update(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(chapter))
}

/// DELETE /api/chapters/{id} - Supprime le chapitre et ses contenus (PROPRIÉTAIRE)
#[delete("/{id}")]
pub async fn delete_chapter(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let chapter = CatalogService::owned_chapter(db.get_ref(), path.into_inner(), &auth_user).await?;
    chapter::Entity::delete_by_id(chapter.id).exec(db.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/chapters/{chapter_id}/contents - Contenus ordonnés (PUBLIC)
#[get("/{chapter_id}/contents")]
pub async fn list_contents(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let chapter_id = path.into_inner();

    chapter::Entity::find_by_id(chapter_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Chapter"))?;

    let contents = CatalogService::contents_of(db.get_ref(), chapter_id).await?;
    Ok(HttpResponse::Ok().json(contents))
}

/// POST /api/chapters/{chapter_id}/contents - Ajouter un contenu (PROPRIÉTAIRE)
#[post("/{chapter_id}/contents")]
pub async fn create_content(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ContentRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let chapter = CatalogService::owned_chapter(db.get_ref(), path.into_inner(), &auth_user).await?;
    let body = body.into_inner();

    let sort_order = match body.sort_order {
        Some(order) => order,
        None => CatalogService::next_content_order(db.get_ref(), chapter.id).await?,
    };

    let content = content::ActiveModel {
        chapter_id: Set(chapter.id),
        title: Set(body.title),
        content_type: Set(body.content_type),
        path: Set(body.path),
        sort_order: Set(sort_order),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Content created successfully",
        "content": content
    })))
}

/// DELETE /api/contents/{id} (PROPRIÉTAIRE)
#[delete("/{id}")]
pub async fn delete_content(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let content = content::Entity::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Content"))?;

    CatalogService::owned_chapter(db.get_ref(), content.chapter_id, &auth_user).await?;
    content::Entity::delete_by_id(content.id).exec(db.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Routes montées sous /courses
pub fn course_chapter_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_chapters).service(create_chapter);
}

pub fn chapters_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chapters")
            .service(update_chapter)
            .service(delete_chapter)
            .service(list_contents)
            .service(create_content)
    )
    .service(web::scope("/contents").service(delete_content));
}
