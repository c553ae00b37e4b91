use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::course;
use crate::models::dto::{ProductQuery, ProductRequest, ProductWithCourses};
use crate::models::order_line;
use crate::models::product::{self, Entity as Product};
use crate::models::users::UserRole;
use crate::services::catalog_service::CatalogService;

/// GET /api/products?type= - Catalogue public
#[get("")]
pub async fn list_products(
    query: web::Query<ProductQuery>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let mut select = Product::find();
    if let Some(product_type) = query.product_type {
        select = select.filter(product::Column::ProductType.eq(product_type));
    }

    let products = select
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(products))
}

/// GET /api/products/{id} - Produit et cours accordés
#[get("/{id}")]
pub async fn get_product(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let product = Product::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))?;

    let courses = product
        .find_related(course::Entity)
        .order_by_asc(course::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(ProductWithCourses { product, courses }))
}

/// POST /api/products - Créer un produit (INSTRUCTEUR)
#[post("")]
pub async fn create_product(
    auth_user: AuthUser,
    body: web::Json<ProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    auth_user.require_role(UserRole::Instructor)?;
    body.validate()?;
    let body = body.into_inner();

    let product = product::ActiveModel {
        title: Set(body.title),
        description: Set(body.description),
        price: Set(body.price),
        product_type: Set(body.product_type),
        cover: Set(body.cover),
        instructor_id: Set(Some(auth_user.user_id)),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    info!("Instructor {} created product {}", auth_user.user_id, product.id);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Product created successfully",
        "product": product
    })))
}

/// PUT /api/products/{id} (PROPRIÉTAIRE)
#[put("/{id}")]
pub async fn update_product(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ProductRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let current = CatalogService::owned_product(db.get_ref(), path.into_inner(), &auth_user).await?;
    let body = body.into_inner();

    let mut active: product::ActiveModel = current.into();
    active.title = Set(body.title);
    active.description = Set(body.description);
    active.price = Set(body.price);
    active.product_type = Set(body.product_type);
    active.cover = Set(body.cover);

    let product = active.update(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /api/products/{id} - Refusé si des commandes y font référence (PROPRIÉTAIRE)
#[delete("/{id}")]
pub async fn delete_product(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let product = CatalogService::owned_product(db.get_ref(), path.into_inner(), &auth_user).await?;

    let ordered = order_line::Entity::find()
        .filter(order_line::Column::ProductId.eq(product.id))
        .count(db.get_ref())
        .await?;

    if ordered > 0 {
        return Err(ApiError::Conflict("Product is referenced by orders".to_string()));
    }

    Product::delete_by_id(product.id).exec(db.get_ref()).await?;
    info!("Product {} deleted by instructor {}", product.id, auth_user.user_id);

    Ok(HttpResponse::NoContent().finish())
}

pub fn products_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .service(list_products)
            .service(create_product)
            .service(get_product)
            .service(update_product)
            .service(delete_product)
    );
}
