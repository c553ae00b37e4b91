use std::collections::HashSet;

use chrono::Utc;
use sea_orm::*;
use sea_orm::sea_query::Expr;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::models::dto::{PaymentRequest, PaymentResponse};
use crate::models::order::{self, OrderStatus};
use crate::models::payment::{self, PaymentStatus};
use crate::models::{enrolled_course, order_line, product, product_detail};
use crate::services::catalog_service::CatalogService;
use crate::utils::codes;

pub struct CheckoutService;

impl CheckoutService {
    /// Enregistre un paiement pour une commande de l'utilisateur.
    /// Un paiement "success" marque la commande payée et crée les inscriptions,
    /// le tout dans une seule transaction : aucun état "payé mais pas inscrit".
    pub async fn pay(
        db: &DatabaseConnection,
        user_id: i32,
        request: PaymentRequest,
    ) -> ApiResult<PaymentResponse> {
        // 1. Rejouer une requête déjà traitée (même clé d'idempotence)
        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(replayed) = Self::replay(db, user_id, key).await? {
                return Ok(replayed);
            }
        }

        let txn = db.begin().await?;

        // 2. La commande doit appartenir à l'utilisateur et être encore en attente
        let order = order::Entity::find_by_id(request.order_id)
            .one(&txn)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| ApiError::not_found("Order"))?;

        if order.status == OrderStatus::Paid {
            return Err(ApiError::Conflict("Order is already paid".to_string()));
        }

        let lines = order_line::Entity::find()
            .filter(order_line::Column::OrderId.eq(order.id))
            .order_by_asc(order_line::Column::Id)
            .find_also_related(product::Entity)
            .all(&txn)
            .await?;

        if lines.is_empty() {
            return Err(ApiError::Validation("Order has no lines".to_string()));
        }

        // Un cours choisi doit toujours faire partie du produit de sa ligne
        for (line, _) in &lines {
            let Some(course_id) = line.course_id else { continue };
            let linked = product_detail::Entity::find()
                .filter(product_detail::Column::ProductId.eq(line.product_id))
                .filter(product_detail::Column::CourseId.eq(course_id))
                .count(&txn)
                .await?;

            if linked == 0 {
                return Err(ApiError::Conflict(format!(
                    "Order line {} refers to a course its product no longer includes",
                    line.id
                )));
            }
        }

        let amount: i64 = lines
            .iter()
            .filter_map(|(_, product)| product.as_ref().map(|p| p.price))
            .sum();

        // 3. Paiement
        let payment = payment::ActiveModel {
            order_id: Set(order.id),
            method: Set(request.method.clone()),
            status: Set(request.status),
            reference_number: Set(request
                .reference_number
                .clone()
                .unwrap_or_else(codes::payment_reference)),
            amount: Set(amount),
            idempotency_key: Set(request.idempotency_key.clone()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if payment.status != PaymentStatus::Success {
            txn.commit().await?;
            info!("Recorded {:?} payment {} for order {}", payment.status, payment.id, order.id);
            return Ok(PaymentResponse {
                message: "Payment recorded".to_string(),
                payment,
                enrollments: Vec::new(),
                replayed: false,
            });
        }

        // 4. Commande et lignes payées
        let order_id = order.id;
        let mut active_order: order::ActiveModel = order.into();
        active_order.status = Set(OrderStatus::Paid);
        active_order.update(&txn).await?;

        order_line::Entity::update_many()
            .col_expr(order_line::Column::Status, Expr::value(OrderStatus::Paid.to_value()))
            .filter(order_line::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;

        // 5. Un cours par ligne (ou tous les cours du produit), sans doublon
        let mut course_ids: Vec<i32> = Vec::new();
        for (line, _) in &lines {
            match line.course_id {
                Some(course_id) => course_ids.push(course_id),
                None => course_ids.extend(CatalogService::course_ids_of_product(&txn, line.product_id).await?),
            }
        }

        let mut seen = HashSet::new();
        course_ids.retain(|id| seen.insert(*id));

        let enrollments = Self::enroll(&txn, user_id, order_id, &course_ids).await?;

        txn.commit().await?;

        info!(
            "Order {} paid by user {}: {} enrollment(s) created",
            order_id,
            user_id,
            enrollments.len()
        );

        Ok(PaymentResponse {
            message: "Payment successful".to_string(),
            payment,
            enrollments,
            replayed: false,
        })
    }

    /// Crée les inscriptions manquantes pour les cours donnés
    async fn enroll<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        order_id: i32,
        course_ids: &[i32],
    ) -> ApiResult<Vec<enrolled_course::Model>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let already: HashSet<i32> = enrolled_course::Entity::find()
            .filter(enrolled_course::Column::UserId.eq(user_id))
            .filter(enrolled_course::Column::CourseId.is_in(course_ids.to_vec()))
            .all(db)
            .await?
            .into_iter()
            .map(|e| e.course_id)
            .collect();

        let now = Utc::now().naive_utc();
        let mut created = Vec::new();

        for &course_id in course_ids {
            if already.contains(&course_id) {
                continue;
            }

            let enrollment = enrolled_course::ActiveModel {
                user_id: Set(user_id),
                course_id: Set(course_id),
                order_id: Set(order_id),
                enrolled_date: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;

            created.push(enrollment);
        }

        Ok(created)
    }

    async fn replay(db: &DatabaseConnection, user_id: i32, key: &str) -> ApiResult<Option<PaymentResponse>> {
        let Some(payment) = payment::Entity::find()
            .filter(payment::Column::IdempotencyKey.eq(key))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let owner = order::Entity::find_by_id(payment.order_id).one(db).await?;
        if owner.map(|o| o.user_id) != Some(user_id) {
            warn!("Idempotency key reused by another user ({})", user_id);
            return Err(ApiError::Conflict("Idempotency key already used".to_string()));
        }

        let enrollments = enrolled_course::Entity::find()
            .filter(enrolled_course::Column::OrderId.eq(payment.order_id))
            .order_by_asc(enrolled_course::Column::Id)
            .all(db)
            .await?;

        Ok(Some(PaymentResponse {
            message: "Payment already processed".to_string(),
            payment,
            enrollments,
            replayed: true,
        }))
    }
}
