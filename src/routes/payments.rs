use actix_web::{get, post, web, HttpResponse};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use validator::Validate;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::dto::PaymentRequest;
use crate::models::{order, payment};
use crate::services::checkout_service::CheckoutService;

/// POST /api/payments - Payer une commande ; un paiement réussi crée les inscriptions
#[post("")]
pub async fn create_payment(
    auth_user: AuthUser,
    body: web::Json<PaymentRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let mut body = body.into_inner();
    body.method = body.method.trim().to_string();
    body.reference_number = body.reference_number.map(|r| r.trim().to_string());
    body.validate()?;

    let response = CheckoutService::pay(db.get_ref(), auth_user.user_id, body).await?;

    if response.replayed {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::Created().json(response))
    }
}

/// GET /api/payments - Paiements de l'utilisateur, plus récents d'abord
#[get("")]
pub async fn list_payments(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let payments = payment::Entity::find()
        .inner_join(order::Entity)
        .filter(order::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(payment::Column::CreatedAt)
        .order_by_desc(payment::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(payments))
}

pub fn payments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .service(create_payment)
            .service(list_payments)
    );
}
