//! Core business logic modules.
//!
//! Each module owns the validation, transactions and queries of one
//! resource; the HTTP layer stays a thin translation on top of these
//! functions.

/// Food item catalog and nutritional data
pub mod alimento;
/// Deletion audit trail
pub mod historial;
/// Stock movements and inventory reports
pub mod inventario;
/// Lunchbox composition and derived totals
pub mod lonchera;
/// Orders and their state machine
pub mod pedido;
/// User profile management
pub mod perfil;
/// Sellable product catalog
pub mod producto;
/// Users and lunchbox CSV export
pub mod reporte;
/// Dietary restrictions and food associations
pub mod restriccion;
/// User accounts and lifecycle
pub mod usuario;
