// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table avec SeaORM (voir src/migration).
//
// Liste des modules:
//   - users : Utilisateurs (student / instructor / affiliate)
//   - course, chapter, content : Catalogue pédagogique
//   - product, product_detail : Produits vendables et leurs cours
//   - order, order_line : Commandes et lignes de panier
//   - payment : Paiements (déclenchent les inscriptions)
//   - enrolled_course : Inscriptions
//   - affiliate, affiliate_course : Affiliation
//   - content_progress : Progression par contenu
//   - dto : Requêtes et réponses de l'API
//   - health : Health check API
//
// Points d'attention:
//   - Les prix sont des entiers en centimes
//   - Les paires uniques (product/course, user/course, ...) sont des index uniques
//
// ============================================================================

pub mod affiliate;
pub mod affiliate_course;
pub mod chapter;
pub mod content;
pub mod content_progress;
pub mod course;
pub mod dto;
pub mod enrolled_course;
pub mod health;
pub mod order;
pub mod order_line;
pub mod payment;
pub mod product;
pub mod product_detail;
pub mod users;
