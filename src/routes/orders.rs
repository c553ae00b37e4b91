use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder};

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::{AddOrderLineRequest, OrderWithLines};
use crate::models::order::{self, Entity as Order};
use crate::models::order_line;
use crate::models::users::UserRole;
use crate::services::cart_service::CartService;

/// POST /api/order-lines - Ajouter au panier (ÉTUDIANT)
#[post("")]
pub async fn add_order_line(
    auth_user: AuthUser,
    body: web::Json<AddOrderLineRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    auth_user.require_role(UserRole::Student)?;

    let (line, created) = CartService::add_line(db.get_ref(), auth_user.user_id, body.into_inner()).await?;

    if created {
        Ok(HttpResponse::Created().json(line))
    } else {
        Ok(HttpResponse::Ok().json(line))
    }
}

/// GET /api/order-lines - Panier courant
#[get("")]
pub async fn get_cart(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let cart = CartService::cart(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

/// DELETE /api/order-lines/{id}
#[delete("/{id}")]
pub async fn remove_order_line(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    CartService::remove_line(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/orders - Commandes de l'utilisateur, plus récentes d'abord
#[get("")]
pub async fn list_orders(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let orders = Order::find()
        .filter(order::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(orders))
}

/// GET /api/orders/{id} - Commande et ses lignes (404 pour celle d'un autre)
#[get("/{id}")]
pub async fn get_order(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let order = Order::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .filter(|o| o.user_id == auth_user.user_id)
        .ok_or_else(|| ApiError::not_found("Order"))?;

    let lines = order
        .find_related(order_line::Entity)
        .order_by_asc(order_line::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(OrderWithLines { order, lines }))
}

pub fn orders_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/order-lines")
            .service(add_order_line)
            .service(get_cart)
            .service(remove_order_line)
    )
    .service(
        web::scope("/orders")
            .service(list_orders)
            .service(get_order)
    );
}
