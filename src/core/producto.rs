//! Producto business logic - Handles the sellable product catalog.
//!
//! Productos are what pedidos are made of. Their stock is a plain counter
//! adjusted by signed deltas, with the compare-then-apply guard keeping it
//! non-negative; the decrement on order confirmation lives in the pedido
//! module.

use crate::{
    entities::{
        Pedido, PedidoProducto, Producto, pedido, pedido_producto, producto,
    },
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, ExprTrait},
};
use serde::{Deserialize, Serialize};

/// Stock at or below this count as low in listings and statistics.
const STOCK_BAJO_UMBRAL: i32 = 10;

/// Payload for creating a producto.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductoCreate {
    /// Display name
    pub nombre: String,
    /// Optional description
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Price per unit
    pub precio: f64,
    /// Starting stock
    #[serde(default)]
    pub stock_actual: i32,
}

/// Partial update payload for a producto.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductoUpdate {
    /// New display name
    pub nombre: Option<String>,
    /// New description
    pub descripcion: Option<String>,
    /// New price per unit
    pub precio: Option<f64>,
    /// New absolute stock
    pub stock_actual: Option<i32>,
}

impl ProductoUpdate {
    /// True when no field was provided.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.descripcion.is_none()
            && self.precio.is_none()
            && self.stock_actual.is_none()
    }
}

/// Catalog-wide product statistics.
#[derive(Debug, Clone, Serialize)]
pub struct EstadisticasProductos {
    /// Active productos
    pub total_productos_activos: usize,
    /// Stock valued at the unit prices, two decimals
    pub valor_total_inventario: f64,
    /// Active productos with zero stock
    pub productos_sin_stock: usize,
    /// Active productos with stock above zero but at or below the threshold
    pub productos_stock_bajo: usize,
    /// Mean unit price over the active productos, zero when there are none
    pub precio_promedio: f64,
}

fn round2(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

fn validate_precio(precio: f64) -> Result<()> {
    if precio < 0.0 || !precio.is_finite() {
        return Err(Error::invalid_input("El precio no puede ser negativo"));
    }
    Ok(())
}

/// Creates a producto.
pub async fn create_producto(
    db: &DatabaseConnection,
    payload: ProductoCreate,
) -> Result<producto::Model> {
    let nombre = payload.nombre.trim().to_string();
    if nombre.is_empty() {
        return Err(Error::invalid_input("El nombre no puede estar vacío"));
    }
    validate_precio(payload.precio)?;
    if payload.stock_actual < 0 {
        return Err(Error::invalid_input("El stock no puede ser negativo"));
    }

    let nuevo = producto::ActiveModel {
        nombre: Set(nombre),
        descripcion: Set(payload.descripcion),
        precio: Set(payload.precio),
        stock_actual: Set(payload.stock_actual),
        is_active: Set(true),
        fecha_creacion: Set(chrono::Utc::now()),
        ..Default::default()
    };
    nuevo.insert(db).await.map_err(Into::into)
}

/// Retrieves an active producto by id.
///
/// # Errors
/// Returns `NotFound` when the producto does not exist or is soft-deleted.
pub async fn get_producto(db: &DatabaseConnection, producto_id: i64) -> Result<producto::Model> {
    let producto = Producto::find_by_id(producto_id).one(db).await?;
    match producto {
        Some(p) if p.is_active => Ok(p),
        _ => Err(Error::not_found("Producto no encontrado")),
    }
}

/// Lists productos, newest first, with low-stock and inactive visibility
/// filters.
pub async fn list_productos(
    db: &DatabaseConnection,
    incluir_inactivos: bool,
    stock_bajo: bool,
    limite_stock: i32,
) -> Result<Vec<producto::Model>> {
    let mut query = Producto::find();
    if !incluir_inactivos {
        query = query.filter(producto::Column::IsActive.eq(true));
    }
    if stock_bajo {
        query = query.filter(producto::Column::StockActual.lte(limite_stock));
    }
    query
        .order_by_desc(producto::Column::FechaCreacion)
        .order_by_desc(producto::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to an active producto.
pub async fn update_producto(
    db: &DatabaseConnection,
    producto_id: i64,
    payload: ProductoUpdate,
) -> Result<producto::Model> {
    if payload.is_empty() {
        return Err(Error::invalid_input(
            "No se proporcionaron datos para actualizar",
        ));
    }
    if let Some(precio) = payload.precio {
        validate_precio(precio)?;
    }
    if let Some(stock) = payload.stock_actual {
        if stock < 0 {
            return Err(Error::invalid_input("El stock no puede ser negativo"));
        }
    }

    let producto = get_producto(db, producto_id).await?;

    let mut activo: producto::ActiveModel = producto.into();
    if let Some(nombre) = payload.nombre {
        let nombre = nombre.trim().to_string();
        if nombre.is_empty() {
            return Err(Error::invalid_input("El nombre no puede estar vacío"));
        }
        activo.nombre = Set(nombre);
    }
    if let Some(descripcion) = payload.descripcion {
        activo.descripcion = Set(Some(descripcion));
    }
    if let Some(precio) = payload.precio {
        activo.precio = Set(precio);
    }
    if let Some(stock) = payload.stock_actual {
        activo.stock_actual = Set(stock);
    }
    activo.update(db).await.map_err(Into::into)
}

/// Applies a signed stock delta to an active producto. The stock is read,
/// the result checked against zero, and the delta applied as a column
/// expression so concurrent adjustments compose.
///
/// # Errors
/// Returns `InvalidInput` for a zero delta and `InsufficientStock` when the
/// result would be negative.
pub async fn adjust_stock(
    db: &DatabaseConnection,
    producto_id: i64,
    delta: i32,
) -> Result<producto::Model> {
    if delta == 0 {
        return Err(Error::invalid_input("El ajuste no puede ser cero"));
    }

    let producto = get_producto(db, producto_id).await?;
    if delta < 0 {
        let magnitud = delta.unsigned_abs();
        if magnitud > producto.stock_actual.unsigned_abs() {
            return Err(Error::InsufficientStock {
                disponible: producto.stock_actual,
                solicitado: i32::try_from(magnitud).unwrap_or(i32::MAX),
            });
        }
    }

    Producto::update_many()
        .col_expr(
            producto::Column::StockActual,
            Expr::col(producto::Column::StockActual).add(delta),
        )
        .filter(producto::Column::Id.eq(producto_id))
        .exec(db)
        .await?;

    get_producto(db, producto_id).await
}

/// Soft-deletes a producto by clearing its active flag.
pub async fn soft_delete_producto(
    db: &DatabaseConnection,
    producto_id: i64,
) -> Result<producto::Model> {
    let producto = Producto::find_by_id(producto_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Producto no encontrado"))?;

    let mut activo: producto::ActiveModel = producto.into();
    activo.is_active = Set(false);
    activo.update(db).await.map_err(Into::into)
}

/// Reactivates a soft-deleted producto.
///
/// # Errors
/// Returns `InvalidInput` when the producto is already active.
pub async fn reactivate_producto(
    db: &DatabaseConnection,
    producto_id: i64,
) -> Result<producto::Model> {
    let producto = Producto::find_by_id(producto_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Producto no encontrado"))?;
    if producto.is_active {
        return Err(Error::invalid_input("El producto ya está activo"));
    }

    let mut activo: producto::ActiveModel = producto.into();
    activo.is_active = Set(true);
    activo.update(db).await.map_err(Into::into)
}

/// Permanently deletes a producto, writing the audit snapshot first.
///
/// # Errors
/// Returns `Conflict` while order lines reference the producto.
pub async fn hard_delete_producto(
    db: &DatabaseConnection,
    producto_id: i64,
    motivo: Option<String>,
    usuario_eliminador_id: Option<i64>,
) -> Result<()> {
    let txn = db.begin().await?;

    let producto = Producto::find_by_id(producto_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Producto no encontrado"))?;

    let pedidos = PedidoProducto::find()
        .filter(pedido_producto::Column::ProductoId.eq(producto_id))
        .count(&txn)
        .await?;
    if pedidos > 0 {
        return Err(Error::conflict(format!(
            "No se puede eliminar. El producto tiene {pedidos} pedidos asociados. Use soft delete."
        )));
    }

    let datos_json = serde_json::to_string(&producto)?;
    crate::core::historial::record_eliminacion(
        &txn,
        "productos",
        producto_id,
        datos_json,
        motivo,
        usuario_eliminador_id,
    )
    .await?;

    producto.delete(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Lists the pedidos containing an active producto, newest first.
pub async fn get_pedidos_for_producto(
    db: &DatabaseConnection,
    producto_id: i64,
) -> Result<Vec<pedido::Model>> {
    get_producto(db, producto_id).await?;

    let pares = PedidoProducto::find()
        .filter(pedido_producto::Column::ProductoId.eq(producto_id))
        .find_also_related(Pedido)
        .all(db)
        .await?;
    let mut pedidos: Vec<pedido::Model> = pares.into_iter().filter_map(|(_, p)| p).collect();
    pedidos.sort_by(|a, b| b.fecha.cmp(&a.fecha).then(b.id.cmp(&a.id)));
    Ok(pedidos)
}

/// Builds catalog-wide product statistics over the active productos.
pub async fn generate_estadisticas(db: &DatabaseConnection) -> Result<EstadisticasProductos> {
    let productos = Producto::find()
        .filter(producto::Column::IsActive.eq(true))
        .all(db)
        .await?;

    let mut valor_total = 0.0_f64;
    let mut sin_stock = 0;
    let mut stock_bajo = 0;
    let mut suma_precios = 0.0_f64;
    for producto in &productos {
        valor_total += f64::from(producto.stock_actual) * producto.precio;
        suma_precios += producto.precio;
        if producto.stock_actual == 0 {
            sin_stock += 1;
        } else if producto.stock_actual <= STOCK_BAJO_UMBRAL {
            stock_bajo += 1;
        }
    }
    let precio_promedio = if productos.is_empty() {
        0.0
    } else {
        // Catalog sizes stay far below the precision limit of f64.
        #[allow(clippy::cast_precision_loss)]
        {
            round2(suma_precios / productos.len() as f64)
        }
    };

    Ok(EstadisticasProductos {
        total_productos_activos: productos.len(),
        valor_total_inventario: round2(valor_total),
        productos_sin_stock: sin_stock,
        productos_stock_bajo: stock_bajo,
        precio_promedio,
    })
}
