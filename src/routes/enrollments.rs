use std::collections::HashMap;

use actix_web::{get, web, HttpResponse};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::dto::{EnrolledCourseResponse, EnrolledListResponse};
use crate::models::users::UserRole;
use crate::models::{course, enrolled_course, order};

/// GET /api/enrolled - Cours auxquels l'étudiant est inscrit (ÉTUDIANT)
#[get("/enrolled")]
pub async fn list_enrolled(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    auth_user.require_role(UserRole::Student)?;

    let rows = enrolled_course::Entity::find()
        .filter(enrolled_course::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(enrolled_course::Column::EnrolledDate)
        .order_by_desc(enrolled_course::Column::Id)
        .find_also_related(course::Entity)
        .all(db.get_ref())
        .await?;

    let order_ids: Vec<i32> = rows.iter().map(|(e, _)| e.order_id).collect();
    let orders: HashMap<i32, order::Model> = order::Entity::find()
        .filter(order::Column::Id.is_in(order_ids))
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(|o| (o.id, o))
        .collect();

    let enrolled = rows
        .into_iter()
        .filter_map(|(enrollment, course)| {
            course.map(|course| EnrolledCourseResponse {
                id: enrollment.id,
                enrolled_date: enrollment.enrolled_date,
                course,
                order: orders.get(&enrollment.order_id).cloned(),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(EnrolledListResponse { enrolled }))
}

pub fn enrollments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_enrolled);
}
