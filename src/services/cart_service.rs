use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::affiliate::{self, AffiliateStatus};
use crate::models::dto::{AddOrderLineRequest, CartLine, CartResponse};
use crate::models::order::{self, OrderStatus};
use crate::models::{order_line, product, product_detail};

pub struct CartService;

impl CartService {
    /// Commande "panier" (status pending) de l'utilisateur, s'il en a une
    pub async fn pending_order<C: ConnectionTrait>(db: &C, user_id: i32) -> ApiResult<Option<order::Model>> {
        Ok(order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .order_by_asc(order::Column::Id)
            .one(db)
            .await?)
    }

    /// Ajoute un produit au panier.
    /// Retourne la ligne et `true` si elle vient d'être créée (une ligne identique est réutilisée)
    pub async fn add_line(
        db: &DatabaseConnection,
        user_id: i32,
        request: AddOrderLineRequest,
    ) -> ApiResult<(order_line::Model, bool)> {
        // 1. Le produit doit exister
        product::Entity::find_by_id(request.product_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Product"))?;

        // 2. Un cours précis doit faire partie du produit
        if let Some(course_id) = request.course_id {
            let linked = product_detail::Entity::find()
                .filter(product_detail::Column::ProductId.eq(request.product_id))
                .filter(product_detail::Column::CourseId.eq(course_id))
                .one(db)
                .await?;

            if linked.is_none() {
                return Err(ApiError::Validation(
                    "course_id is not part of this product".to_string(),
                ));
            }
        }

        // 3. Code affilié optionnel, doit être actif
        let affiliate_id = match request.affiliate_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                let affiliate = affiliate::Entity::find()
                    .filter(affiliate::Column::UniqueCode.eq(code.to_uppercase()))
                    .filter(affiliate::Column::Status.eq(AffiliateStatus::Active))
                    .one(db)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Affiliate code"))?;
                Some(affiliate.id)
            }
            _ => None,
        };

        let txn = db.begin().await?;

        // 4. Panier existant ou nouveau
        let order = match Self::pending_order(&txn, user_id).await? {
            Some(order) => {
                if order.affiliate_id.is_none() && affiliate_id.is_some() {
                    let mut active: order::ActiveModel = order.into();
                    active.affiliate_id = Set(affiliate_id);
                    active.update(&txn).await?
                } else {
                    order
                }
            }
            None => {
                let created = order::ActiveModel {
                    user_id: Set(user_id),
                    status: Set(OrderStatus::Pending),
                    affiliate_id: Set(affiliate_id),
                    created_at: Set(Utc::now().naive_utc()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                info!("Created cart order {} for user {}", created.id, user_id);
                created
            }
        };

        // 5. Pas de doublon : même (produit, cours) dans le même panier
        let existing = order_line::Entity::find()
            .filter(order_line::Column::OrderId.eq(order.id))
            .filter(order_line::Column::ProductId.eq(request.product_id))
            .filter(match request.course_id {
                Some(course_id) => order_line::Column::CourseId.eq(course_id),
                None => order_line::Column::CourseId.is_null(),
            })
            .one(&txn)
            .await?;

        if let Some(line) = existing {
            txn.commit().await?;
            return Ok((line, false));
        }

        let line = order_line::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(request.product_id),
            course_id: Set(request.course_id),
            status: Set(OrderStatus::Pending),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok((line, true))
    }

    /// Contenu du panier avec le produit de chaque ligne et le total
    pub async fn cart(db: &DatabaseConnection, user_id: i32) -> ApiResult<CartResponse> {
        let Some(order) = Self::pending_order(db, user_id).await? else {
            return Ok(CartResponse { order: None, lines: Vec::new(), total: 0 });
        };

        let lines = order_line::Entity::find()
            .filter(order_line::Column::OrderId.eq(order.id))
            .order_by_asc(order_line::Column::Id)
            .find_also_related(product::Entity)
            .all(db)
            .await?;

        let lines: Vec<CartLine> = lines
            .into_iter()
            .filter_map(|(line, product)| product.map(|product| CartLine { line, product }))
            .collect();

        let total = lines.iter().map(|l| l.product.price).sum();

        Ok(CartResponse { order: Some(order), lines, total })
    }

    /// Supprime une ligne du panier de l'utilisateur (404 pour la ligne d'un autre)
    pub async fn remove_line(db: &DatabaseConnection, user_id: i32, line_id: i32) -> ApiResult<()> {
        let line = order_line::Entity::find_by_id(line_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Order line"))?;

        let order = order::Entity::find_by_id(line.order_id)
            .one(db)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| ApiError::not_found("Order line"))?;

        if order.status != OrderStatus::Pending {
            return Err(ApiError::Conflict("Order is already paid".to_string()));
        }

        order_line::Entity::delete_by_id(line.id).exec(db).await?;
        Ok(())
    }
}
