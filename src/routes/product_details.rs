use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::{ProductDetailQuery, ProductDetailRequest};
use crate::models::product_detail::{self, Entity as ProductDetail};
use crate::services::catalog_service::CatalogService;

/// GET /api/product-details?product_id=
#[get("")]
pub async fn list_product_details(
    query: web::Query<ProductDetailQuery>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let mut select = ProductDetail::find();
    if let Some(product_id) = query.product_id {
        select = select.filter(product_detail::Column::ProductId.eq(product_id));
    }

    let details = select
        .order_by_asc(product_detail::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(details))
}

/// POST /api/product-details - Lier un cours à un produit (PROPRIÉTAIRE du produit et du cours)
/// Une paire déjà liée est refusée (409), l'index unique couvre les requêtes concurrentes
#[post("")]
pub async fn create_product_detail(
    auth_user: AuthUser,
    body: web::Json<ProductDetailRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    // Produit et cours doivent tous deux appartenir à l'instructeur
    let product = CatalogService::owned_product(db.get_ref(), body.product_id, &auth_user).await?;
    let course = CatalogService::owned_course(db.get_ref(), body.course_id, &auth_user).await?;

    let existing = ProductDetail::find()
        .filter(product_detail::Column::ProductId.eq(product.id))
        .filter(product_detail::Column::CourseId.eq(course.id))
        .one(db.get_ref())
        .await?;

    if existing.is_some() {
        return Err(ApiError::Conflict("Course is already linked to this product".to_string()));
    }

    let detail = product_detail::ActiveModel {
        product_id: Set(product.id),
        course_id: Set(course.id),
        price: Set(body.price.unwrap_or(product.price)),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Course linked to product",
        "product_detail": detail
    })))
}

/// DELETE /api/product-details/{id} (PROPRIÉTAIRE du produit)
#[delete("/{id}")]
pub async fn delete_product_detail(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let detail = ProductDetail::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Product detail"))?;

    CatalogService::owned_product(db.get_ref(), detail.product_id, &auth_user).await?;
    ProductDetail::delete_by_id(detail.id).exec(db.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub fn product_details_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/product-details")
            .service(list_product_details)
            .service(create_product_detail)
            .service(delete_product_detail)
    );
}
