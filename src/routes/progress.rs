use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::{CompletionQuery, CompletionRequest, CourseProgressResponse};
use crate::models::{chapter, content, content_progress, enrolled_course};

async fn is_enrolled(db: &DatabaseConnection, user_id: i32, course_id: i32) -> ApiResult<bool> {
    let count = enrolled_course::Entity::find()
        .filter(enrolled_course::Column::UserId.eq(user_id))
        .filter(enrolled_course::Column::CourseId.eq(course_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// POST /api/content/completion - Marquer un contenu (inscription requise)
#[post("/completion")]
pub async fn mark_completion(
    auth_user: AuthUser,
    body: web::Json<CompletionRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    // 1. Contenu -> chapitre -> cours
    let (content, chapter) = content::Entity::find_by_id(body.content_id)
        .find_also_related(chapter::Entity)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Content"))?;

    let chapter = chapter.ok_or_else(|| ApiError::not_found("Chapter"))?;

    // 2. Vérifier l'inscription
    if !is_enrolled(db.get_ref(), auth_user.user_id, chapter.course_id).await? {
        return Err(ApiError::Forbidden("You are not enrolled in this course".to_string()));
    }

    // 3. Upsert sur (user_id, content_id)
    let existing = content_progress::Entity::find()
        .filter(content_progress::Column::UserId.eq(auth_user.user_id))
        .filter(content_progress::Column::ContentId.eq(content.id))
        .one(db.get_ref())
        .await?;

    let now = Utc::now().naive_utc();
    let progress = match existing {
        Some(row) => {
            let mut active: content_progress::ActiveModel = row.into();
            active.completed = Set(body.completed);
            active.updated_at = Set(now);
            active.update(db.get_ref()).await?
        }
        None => {
            content_progress::ActiveModel {
                user_id: Set(auth_user.user_id),
                content_id: Set(content.id),
                completed: Set(body.completed),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(progress))
}

/// GET /api/content/completion?course_id= - Progression de l'utilisateur sur un cours
#[get("/completion")]
pub async fn course_progress(
    auth_user: AuthUser,
    query: web::Query<CompletionQuery>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let course_id = query.course_id;

    let content_ids: Vec<i32> = content::Entity::find()
        .inner_join(chapter::Entity)
        .filter(chapter::Column::CourseId.eq(course_id))
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    let total = content_ids.len();

    let progress = content_progress::Entity::find()
        .filter(content_progress::Column::UserId.eq(auth_user.user_id))
        .filter(content_progress::Column::ContentId.is_in(content_ids))
        .order_by_asc(content_progress::Column::ContentId)
        .all(db.get_ref())
        .await?;

    let completed = progress.iter().filter(|p| p.completed).count();

    Ok(HttpResponse::Ok().json(CourseProgressResponse {
        course_id,
        progress,
        completed,
        total,
    }))
}

pub fn progress_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/content")
            .service(mark_completion)
            .service(course_progress)
    );
}
