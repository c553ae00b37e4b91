use std::collections::HashMap;

use sea_orm::*;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::{ChapterWithContents, CourseDetail};
use crate::models::users::UserRole;
use crate::models::{chapter, content, course, product};

pub struct CatalogService;

impl CatalogService {
    /// Vérifie qu'un slug ne contient que [a-z0-9-]
    pub fn validate_slug(slug: &str) -> ApiResult<()> {
        let valid = !slug.is_empty()
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if valid {
            Ok(())
        } else {
            Err(ApiError::Validation(
                "slug must contain only lowercase letters, digits and dashes".to_string(),
            ))
        }
    }

    /// Cours appartenant à l'instructeur authentifié (404 si absent, 403 sinon)
    pub async fn owned_course<C: ConnectionTrait>(
        db: &C,
        course_id: i32,
        auth_user: &AuthUser,
    ) -> ApiResult<course::Model> {
        auth_user.require_role(UserRole::Instructor)?;

        let course = course::Entity::find_by_id(course_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Course"))?;

        if course.instructor_id != Some(auth_user.user_id) {
            return Err(ApiError::Forbidden("You do not own this course".to_string()));
        }

        Ok(course)
    }

    pub async fn owned_chapter<C: ConnectionTrait>(
        db: &C,
        chapter_id: i32,
        auth_user: &AuthUser,
    ) -> ApiResult<chapter::Model> {
        let chapter = chapter::Entity::find_by_id(chapter_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Chapter"))?;

        Self::owned_course(db, chapter.course_id, auth_user).await?;
        Ok(chapter)
    }

    /// Produit appartenant à l'instructeur authentifié (contrôle côté serveur)
    pub async fn owned_product<C: ConnectionTrait>(
        db: &C,
        product_id: i32,
        auth_user: &AuthUser,
    ) -> ApiResult<product::Model> {
        auth_user.require_role(UserRole::Instructor)?;

        let product = product::Entity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Product"))?;

        if product.instructor_id != Some(auth_user.user_id) {
            return Err(ApiError::Forbidden("You do not own this product".to_string()));
        }

        Ok(product)
    }

    /// Prochain sort_order d'un chapitre (max + 1), les doublons restent permis
    pub async fn next_chapter_order<C: ConnectionTrait>(db: &C, course_id: i32) -> ApiResult<i32> {
        let last = chapter::Entity::find()
            .filter(chapter::Column::CourseId.eq(course_id))
            .order_by_desc(chapter::Column::SortOrder)
            .one(db)
            .await?;

        Ok(last.map(|c| c.sort_order + 1).unwrap_or(1))
    }

    pub async fn next_content_order<C: ConnectionTrait>(db: &C, chapter_id: i32) -> ApiResult<i32> {
        let last = content::Entity::find()
            .filter(content::Column::ChapterId.eq(chapter_id))
            .order_by_desc(content::Column::SortOrder)
            .one(db)
            .await?;

        Ok(last.map(|c| c.sort_order + 1).unwrap_or(1))
    }

    pub async fn chapters_of<C: ConnectionTrait>(db: &C, course_id: i32) -> ApiResult<Vec<chapter::Model>> {
        Ok(chapter::Entity::find()
            .filter(chapter::Column::CourseId.eq(course_id))
            .order_by_asc(chapter::Column::SortOrder)
            .order_by_asc(chapter::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn contents_of<C: ConnectionTrait>(db: &C, chapter_id: i32) -> ApiResult<Vec<content::Model>> {
        Ok(content::Entity::find()
            .filter(content::Column::ChapterId.eq(chapter_id))
            .order_by_asc(content::Column::SortOrder)
            .order_by_asc(content::Column::Id)
            .all(db)
            .await?)
    }

    /// Cours complet : chapitres ordonnés, chacun avec ses contenus ordonnés
    pub async fn course_detail<C: ConnectionTrait>(db: &C, course: course::Model) -> ApiResult<CourseDetail> {
        let chapters = Self::chapters_of(db, course.id).await?;
        let chapter_ids: Vec<i32> = chapters.iter().map(|c| c.id).collect();

        // Tous les contenus en une seule requête, regroupés par chapitre
        let contents = content::Entity::find()
            .filter(content::Column::ChapterId.is_in(chapter_ids))
            .order_by_asc(content::Column::SortOrder)
            .order_by_asc(content::Column::Id)
            .all(db)
            .await?;

        let mut by_chapter: HashMap<i32, Vec<content::Model>> = HashMap::new();
        for item in contents {
            by_chapter.entry(item.chapter_id).or_default().push(item);
        }

        let chapters = chapters
            .into_iter()
            .map(|chapter| ChapterWithContents {
                contents: by_chapter.remove(&chapter.id).unwrap_or_default(),
                chapter,
            })
            .collect();

        Ok(CourseDetail { course, chapters })
    }

    /// Identifiants des cours accordés par un produit
    pub async fn course_ids_of_product<C: ConnectionTrait>(db: &C, product_id: i32) -> ApiResult<Vec<i32>> {
        use crate::models::product_detail;

        let details = product_detail::Entity::find()
            .filter(product_detail::Column::ProductId.eq(product_id))
            .order_by_asc(product_detail::Column::Id)
            .all(db)
            .await?;

        Ok(details.into_iter().map(|d| d.course_id).collect())
    }
}
