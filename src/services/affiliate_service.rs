use chrono::Utc;
use sea_orm::*;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::models::affiliate::{self, AffiliateStatus};
use crate::models::dto::{AffiliateCourseResponse, ReferralSummary};
use crate::models::order::{self, OrderStatus};
use crate::models::{affiliate_course, course, payment};
use crate::models::payment::PaymentStatus;
use crate::utils::codes;

const MAX_CODE_ATTEMPTS: usize = 5;

pub struct AffiliateService;

impl AffiliateService {
    pub async fn by_user(db: &DatabaseConnection, user_id: i32) -> ApiResult<Option<affiliate::Model>> {
        Ok(affiliate::Entity::find()
            .filter(affiliate::Column::UserId.eq(user_id))
            .one(db)
            .await?)
    }

    /// Profil affilié de l'utilisateur, 404 s'il ne s'est pas encore inscrit
    pub async fn require(db: &DatabaseConnection, user_id: i32) -> ApiResult<affiliate::Model> {
        Self::by_user(db, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Affiliate profile"))
    }

    /// Inscription : un seul profil par utilisateur, code unique de 8 caractères
    pub async fn register(db: &DatabaseConnection, user_id: i32) -> ApiResult<affiliate::Model> {
        if Self::by_user(db, user_id).await?.is_some() {
            return Err(ApiError::AlreadyAffiliate);
        }

        let code = Self::free_code(db).await?;

        let created = affiliate::ActiveModel {
            user_id: Set(user_id),
            unique_code: Set(code),
            status: Set(AffiliateStatus::Active),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| match ApiError::from(e) {
            // requête concurrente pour le même utilisateur
            ApiError::Conflict(_) => ApiError::AlreadyAffiliate,
            other => other,
        })?;

        info!("User {} registered as affiliate {}", user_id, created.unique_code);
        Ok(created)
    }

    async fn free_code(db: &DatabaseConnection) -> ApiResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = codes::affiliate_code();
            let taken = affiliate::Entity::find()
                .filter(affiliate::Column::UniqueCode.eq(code.as_str()))
                .count(db)
                .await?;

            if taken == 0 {
                return Ok(code);
            }
            warn!("Affiliate code collision on {}, retrying", code);
        }

        Err(ApiError::Internal("Could not generate a unique affiliate code".to_string()))
    }

    /// Lie un cours à l'affilié (refuse un doublon)
    pub async fn link_course(
        db: &DatabaseConnection,
        affiliate: &affiliate::Model,
        course_id: i32,
    ) -> ApiResult<AffiliateCourseResponse> {
        let course = course::Entity::find_by_id(course_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Course"))?;

        let existing = affiliate_course::Entity::find()
            .filter(affiliate_course::Column::AffiliateId.eq(affiliate.id))
            .filter(affiliate_course::Column::CourseId.eq(course_id))
            .one(db)
            .await?;

        if existing.is_some() {
            return Err(ApiError::Conflict("Course is already linked to this affiliate".to_string()));
        }

        let link = affiliate_course::ActiveModel {
            affiliate_id: Set(affiliate.id),
            course_id: Set(course_id),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(AffiliateCourseResponse {
            id: link.id,
            affiliate_id: link.affiliate_id,
            course,
            created_at: link.created_at,
        })
    }

    pub async fn courses(
        db: &DatabaseConnection,
        affiliate: &affiliate::Model,
    ) -> ApiResult<Vec<AffiliateCourseResponse>> {
        let links = affiliate_course::Entity::find()
            .filter(affiliate_course::Column::AffiliateId.eq(affiliate.id))
            .order_by_asc(affiliate_course::Column::Id)
            .find_also_related(course::Entity)
            .all(db)
            .await?;

        Ok(links
            .into_iter()
            .filter_map(|(link, course)| {
                course.map(|course| AffiliateCourseResponse {
                    id: link.id,
                    affiliate_id: link.affiliate_id,
                    course,
                    created_at: link.created_at,
                })
            })
            .collect())
    }

    /// Commandes payées portant le code de l'affilié, et montant total encaissé
    pub async fn referrals(db: &DatabaseConnection, affiliate: affiliate::Model) -> ApiResult<ReferralSummary> {
        let orders = order::Entity::find()
            .filter(order::Column::AffiliateId.eq(affiliate.id))
            .filter(order::Column::Status.eq(OrderStatus::Paid))
            .order_by_desc(order::Column::CreatedAt)
            .all(db)
            .await?;

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();

        let total_amount: i64 = payment::Entity::find()
            .filter(payment::Column::OrderId.is_in(order_ids))
            .filter(payment::Column::Status.eq(PaymentStatus::Success))
            .all(db)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();

        Ok(ReferralSummary {
            paid_orders: orders.len(),
            affiliate,
            orders,
            total_amount,
        })
    }
}
