// Requêtes / réponses structurées de l'API
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    affiliate, chapter, content::{self, ContentType}, course, enrolled_course, order, order_line,
    payment::{self, PaymentStatus}, product::{self, ProductType}, users::{PublicUser, UserRole},
};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name is required"))]
    pub last_name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must contain at least 8 characters"))]
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "new_password must contain at least 8 characters"))]
    pub new_password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CourseRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "slug is required"))]
    pub slug: String,
    pub description: Option<String>,
    pub cover: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "type is required"))]
    pub course_type: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChapterRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContentRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ChapterWithContents {
    #[serde(flatten)]
    pub chapter: chapter::Model,
    pub contents: Vec<content::Model>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: course::Model,
    pub chapters: Vec<ChapterWithContents>,
}

// ---------------------------------------------------------------------------
// Produits
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "price must be positive"))]
    pub price: i64,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    #[serde(rename = "type")]
    pub product_type: Option<ProductType>,
}

#[derive(Debug, Serialize)]
pub struct ProductWithCourses {
    #[serde(flatten)]
    pub product: product::Model,
    pub courses: Vec<course::Model>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductDetailRequest {
    pub product_id: i32,
    pub course_id: i32,
    #[validate(range(min = 0, message = "price must be positive"))]
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProductDetailQuery {
    pub product_id: Option<i32>,
}

// ---------------------------------------------------------------------------
// Commandes / paiements / inscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AddOrderLineRequest {
    pub product_id: i32,
    pub course_id: Option<i32>,
    pub affiliate_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub line: order_line::Model,
    pub product: product::Model,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub order: Option<order::Model>,
    pub lines: Vec<CartLine>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: order::Model,
    pub lines: Vec<order_line::Model>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    pub order_id: i32,
    #[validate(length(min = 1, max = 50, message = "method is required"))]
    pub method: String,
    #[serde(default = "default_payment_status")]
    pub status: PaymentStatus,
    #[validate(length(min = 1, max = 100, message = "reference_number must not be empty"))]
    pub reference_number: Option<String>,
    #[validate(length(min = 1, max = 100, message = "idempotency_key must not be empty"))]
    pub idempotency_key: Option<String>,
}

fn default_payment_status() -> PaymentStatus {
    PaymentStatus::Success
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub message: String,
    pub payment: payment::Model,
    pub enrollments: Vec<enrolled_course::Model>,
    pub replayed: bool,
}

#[derive(Debug, Serialize)]
pub struct EnrolledCourseResponse {
    pub id: i32,
    pub enrolled_date: sea_orm::prelude::DateTime,
    pub course: course::Model,
    pub order: Option<order::Model>,
}

#[derive(Debug, Serialize)]
pub struct EnrolledListResponse {
    pub enrolled: Vec<EnrolledCourseResponse>,
}

// ---------------------------------------------------------------------------
// Affiliation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AffiliateCourseRequest {
    pub course_id: i32,
}

#[derive(Debug, Serialize)]
pub struct AffiliateCourseResponse {
    pub id: i32,
    pub affiliate_id: i32,
    pub course: course::Model,
    pub created_at: sea_orm::prelude::DateTime,
}

#[derive(Debug, Serialize)]
pub struct ReferralSummary {
    pub affiliate: affiliate::Model,
    pub orders: Vec<order::Model>,
    pub paid_orders: usize,
    pub total_amount: i64,
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub content_id: i32,
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompletionQuery {
    pub course_id: i32,
}

#[derive(Debug, Serialize)]
pub struct CourseProgressResponse {
    pub course_id: i32,
    pub progress: Vec<super::content_progress::Model>,
    pub completed: usize,
    pub total: usize,
}
