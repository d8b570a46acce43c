// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs (login par email unique)
//   - dashboard_preference : Widgets du dashboard (1 ligne par utilisateur)
//   - event : Événements calendrier (plages start/end en UTC)
//   - crop : Fiches de cultures (growth_stages stocké en texte délimité)
//   - plot : Parcelles de jardin avec géométrie JSON
//   - crop_media : Photos attachées aux parcelles
//   - dto : Data Transfer Objects partagés entre services et routes
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les relations entre tables sont définies dans chaque modèle
//   - La suppression d'un utilisateur cascade sur ses lignes (FK en base)
//
// ============================================================================

pub mod health;
pub mod users;
pub mod dashboard_preference;
pub mod event;
pub mod crop;
pub mod plot;
pub mod crop_media;
pub mod dto;
