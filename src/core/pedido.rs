//! Pedido business logic - Handles orders and their state machine.
//!
//! A pedido moves Pendiente -> Confirmado -> Entregado, with cancellation
//! allowed from the first two states. Lines capture the product price at the
//! moment they are added, so later price changes never alter an existing
//! order. Stock is untouched until confirmation, which validates every line
//! before decrementing any of them; cancellation never restocks.

use crate::{
    entities::{
        Pedido, PedidoProducto, Producto, Usuario, pedido, pedido::EstadoPedido, pedido_producto,
        producto, usuario,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ActiveEnum, QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, ExprTrait},
};
use serde::{Deserialize, Serialize};

/// Payload for creating a pedido.
#[derive(Debug, Clone, Deserialize)]
pub struct PedidoCreate {
    /// Usuario placing the order
    pub usuario_id: i64,
}

/// A product line to add to a pedido.
#[derive(Debug, Clone, Deserialize)]
pub struct LineaPedido {
    /// Producto to order
    pub producto_id: i64,
    /// Units of it, at least one
    pub cantidad: i32,
}

/// One line of a pedido with its product name.
#[derive(Debug, Clone, Serialize)]
pub struct LineaDetalle {
    /// Producto id
    pub producto_id: i64,
    /// Producto name
    pub nombre: String,
    /// Units ordered
    pub cantidad: i32,
    /// Unit price captured when the line was added
    pub precio_unitario: f64,
    /// Line subtotal
    pub subtotal: f64,
}

/// A pedido together with its owner's name and lines.
#[derive(Debug, Clone, Serialize)]
pub struct PedidoDetalle {
    /// The pedido itself
    pub pedido: pedido::Model,
    /// Full name of the ordering usuario
    pub usuario_nombre: String,
    /// The order lines
    pub lineas: Vec<LineaDetalle>,
}

fn round2(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

async fn recompute_total<C: ConnectionTrait>(db: &C, pedido_id: i64) -> Result<pedido::Model> {
    let lineas = PedidoProducto::find()
        .filter(pedido_producto::Column::PedidoId.eq(pedido_id))
        .all(db)
        .await?;
    let total: f64 = lineas.iter().map(|l| l.subtotal).sum();

    let pedido = Pedido::find_by_id(pedido_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Pedido no encontrado"))?;
    let mut activo: pedido::ActiveModel = pedido.into();
    activo.total = Set(round2(total));
    activo.update(db).await.map_err(Into::into)
}

async fn get_pedido_pendiente<C: ConnectionTrait>(db: &C, pedido_id: i64) -> Result<pedido::Model> {
    let pedido = Pedido::find_by_id(pedido_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Pedido no encontrado"))?;
    if pedido.estado != EstadoPedido::Pendiente {
        return Err(Error::invalid_input(format!(
            "Solo se pueden modificar pedidos pendientes. Estado actual: {}",
            pedido.estado.to_value()
        )));
    }
    Ok(pedido)
}

/// Creates an empty pedido in `Pendiente` state for an active usuario.
///
/// # Errors
/// Returns `NotFound` when the usuario does not exist or is inactive.
pub async fn create_pedido(
    db: &DatabaseConnection,
    payload: PedidoCreate,
) -> Result<pedido::Model> {
    let usuario = Usuario::find_by_id(payload.usuario_id)
        .filter(usuario::Column::IsActive.eq(true))
        .one(db)
        .await?;
    if usuario.is_none() {
        return Err(Error::not_found("Usuario no encontrado o inactivo"));
    }

    let nuevo = pedido::ActiveModel {
        fecha: Set(chrono::Utc::now()),
        usuario_id: Set(payload.usuario_id),
        total: Set(0.0),
        estado: Set(EstadoPedido::Pendiente),
        ..Default::default()
    };
    nuevo.insert(db).await.map_err(Into::into)
}

/// Retrieves a pedido by id, whatever its state.
pub async fn get_pedido(db: &DatabaseConnection, pedido_id: i64) -> Result<pedido::Model> {
    Pedido::find_by_id(pedido_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Pedido no encontrado"))
}

/// Lists pedidos, newest first, optionally scoped to a usuario or a state.
pub async fn list_pedidos(
    db: &DatabaseConnection,
    usuario_id: Option<i64>,
    estado: Option<EstadoPedido>,
) -> Result<Vec<pedido::Model>> {
    let mut query = Pedido::find();
    if let Some(usuario_id) = usuario_id {
        query = query.filter(pedido::Column::UsuarioId.eq(usuario_id));
    }
    if let Some(estado) = estado {
        query = query.filter(pedido::Column::Estado.eq(estado));
    }
    query
        .order_by_desc(pedido::Column::Fecha)
        .order_by_desc(pedido::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a product to a pending pedido, or accumulates the quantity when the
/// line already exists. The unit price is captured on first add and never
/// rewritten; the order total is recomputed in the same transaction.
///
/// # Errors
/// Returns `InvalidInput` for a non-positive quantity or a non-pending
/// pedido, `NotFound` for a missing producto, and `InsufficientStock` when
/// the combined quantity exceeds the available stock.
pub async fn add_producto_to_pedido(
    db: &DatabaseConnection,
    pedido_id: i64,
    linea: LineaPedido,
) -> Result<pedido::Model> {
    if linea.cantidad < 1 {
        return Err(Error::invalid_input("La cantidad debe ser mayor a 0"));
    }

    let txn = db.begin().await?;

    get_pedido_pendiente(&txn, pedido_id).await?;

    let producto = Producto::find_by_id(linea.producto_id).one(&txn).await?;
    let producto = match producto {
        Some(p) if p.is_active => p,
        _ => return Err(Error::not_found("Producto no encontrado")),
    };

    let existente = PedidoProducto::find_by_id((pedido_id, linea.producto_id))
        .one(&txn)
        .await?;
    match existente {
        Some(fila) => {
            let cantidad_total = fila.cantidad.saturating_add(linea.cantidad);
            if producto.stock_actual < cantidad_total {
                return Err(Error::InsufficientStock {
                    disponible: producto.stock_actual,
                    solicitado: cantidad_total,
                });
            }
            let precio_capturado = fila.precio_unitario;
            let mut activa: pedido_producto::ActiveModel = fila.into();
            activa.cantidad = Set(cantidad_total);
            activa.subtotal = Set(round2(f64::from(cantidad_total) * precio_capturado));
            activa.update(&txn).await?;
        }
        None => {
            if producto.stock_actual < linea.cantidad {
                return Err(Error::InsufficientStock {
                    disponible: producto.stock_actual,
                    solicitado: linea.cantidad,
                });
            }
            let nueva = pedido_producto::ActiveModel {
                pedido_id: Set(pedido_id),
                producto_id: Set(linea.producto_id),
                cantidad: Set(linea.cantidad),
                precio_unitario: Set(producto.precio),
                subtotal: Set(round2(f64::from(linea.cantidad) * producto.precio)),
            };
            nueva.insert(&txn).await?;
        }
    }

    let pedido = recompute_total(&txn, pedido_id).await?;
    txn.commit().await?;
    Ok(pedido)
}

/// Removes a product line from a pending pedido and recomputes the total.
///
/// # Errors
/// Returns `NotFound` when the producto is not in the pedido.
pub async fn remove_producto_from_pedido(
    db: &DatabaseConnection,
    pedido_id: i64,
    producto_id: i64,
) -> Result<pedido::Model> {
    let txn = db.begin().await?;

    get_pedido_pendiente(&txn, pedido_id).await?;

    let fila = PedidoProducto::find_by_id((pedido_id, producto_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("El producto no está en el pedido"))?;
    fila.delete(&txn).await?;

    let pedido = recompute_total(&txn, pedido_id).await?;
    txn.commit().await?;
    Ok(pedido)
}

/// Confirms a pending pedido: every line is validated against the current
/// stock before any stock is decremented, so a failing line leaves the order
/// and the whole inventory untouched.
///
/// # Errors
/// Returns `InvalidInput` for a non-pending or empty pedido and
/// `InsufficientStock` when any line exceeds the available stock.
pub async fn confirm_pedido(db: &DatabaseConnection, pedido_id: i64) -> Result<pedido::Model> {
    let txn = db.begin().await?;

    let pedido = Pedido::find_by_id(pedido_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Pedido no encontrado"))?;
    if pedido.estado != EstadoPedido::Pendiente {
        return Err(Error::invalid_input(format!(
            "Solo se pueden confirmar pedidos pendientes. Estado actual: {}",
            pedido.estado.to_value()
        )));
    }

    let lineas = PedidoProducto::find()
        .filter(pedido_producto::Column::PedidoId.eq(pedido_id))
        .all(&txn)
        .await?;
    if lineas.is_empty() {
        return Err(Error::invalid_input("El pedido no tiene productos"));
    }

    for fila in &lineas {
        let producto = Producto::find_by_id(fila.producto_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("Producto no encontrado"))?;
        if producto.stock_actual < fila.cantidad {
            return Err(Error::InsufficientStock {
                disponible: producto.stock_actual,
                solicitado: fila.cantidad,
            });
        }
    }

    for fila in &lineas {
        Producto::update_many()
            .col_expr(
                producto::Column::StockActual,
                Expr::col(producto::Column::StockActual).sub(fila.cantidad),
            )
            .filter(producto::Column::Id.eq(fila.producto_id))
            .exec(&txn)
            .await?;
    }

    let mut activo: pedido::ActiveModel = pedido.into();
    activo.estado = Set(EstadoPedido::Confirmado);
    let confirmado = activo.update(&txn).await?;

    txn.commit().await?;
    Ok(confirmado)
}

/// Cancels a pedido from `Pendiente` or `Confirmado`. Stock that was already
/// decremented by a confirmation stays decremented.
///
/// # Errors
/// Returns `InvalidInput` for delivered or already cancelled pedidos.
pub async fn cancel_pedido(db: &DatabaseConnection, pedido_id: i64) -> Result<pedido::Model> {
    let pedido = get_pedido(db, pedido_id).await?;
    match pedido.estado {
        EstadoPedido::Entregado => {
            return Err(Error::invalid_input(
                "No se puede cancelar un pedido ya entregado",
            ));
        }
        EstadoPedido::Cancelado => {
            return Err(Error::invalid_input("El pedido ya está cancelado"));
        }
        EstadoPedido::Pendiente | EstadoPedido::Confirmado => {}
    }

    let mut activo: pedido::ActiveModel = pedido.into();
    activo.estado = Set(EstadoPedido::Cancelado);
    activo.update(db).await.map_err(Into::into)
}

/// Moves a pedido to a new state following the order state machine. The
/// transition into `Confirmado` runs the full confirmation, including the
/// stock decrement.
///
/// # Errors
/// Returns `InvalidInput` for any transition the state machine does not
/// allow.
pub async fn update_estado(
    db: &DatabaseConnection,
    pedido_id: i64,
    nuevo_estado: EstadoPedido,
) -> Result<pedido::Model> {
    let pedido = get_pedido(db, pedido_id).await?;

    match (pedido.estado, nuevo_estado) {
        (EstadoPedido::Pendiente, EstadoPedido::Confirmado) => confirm_pedido(db, pedido_id).await,
        (EstadoPedido::Confirmado, EstadoPedido::Entregado) => {
            let mut activo: pedido::ActiveModel = pedido.into();
            activo.estado = Set(EstadoPedido::Entregado);
            activo.update(db).await.map_err(Into::into)
        }
        (EstadoPedido::Pendiente | EstadoPedido::Confirmado, EstadoPedido::Cancelado) => {
            let mut activo: pedido::ActiveModel = pedido.into();
            activo.estado = Set(EstadoPedido::Cancelado);
            activo.update(db).await.map_err(Into::into)
        }
        (actual, nuevo) => Err(Error::invalid_input(format!(
            "Transición de estado no permitida: {} → {}",
            actual.to_value(),
            nuevo.to_value()
        ))),
    }
}

/// Returns a pedido with its owner's full name and product lines.
pub async fn get_pedido_detalle(db: &DatabaseConnection, pedido_id: i64) -> Result<PedidoDetalle> {
    let pedido = get_pedido(db, pedido_id).await?;
    let usuario = Usuario::find_by_id(pedido.usuario_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;

    let pares = PedidoProducto::find()
        .filter(pedido_producto::Column::PedidoId.eq(pedido_id))
        .find_also_related(Producto)
        .all(db)
        .await?;
    let lineas = pares
        .into_iter()
        .filter_map(|(fila, producto)| {
            producto.map(|p| LineaDetalle {
                producto_id: fila.producto_id,
                nombre: p.nombre,
                cantidad: fila.cantidad,
                precio_unitario: fila.precio_unitario,
                subtotal: fila.subtotal,
            })
        })
        .collect();

    Ok(PedidoDetalle {
        pedido,
        usuario_nombre: format!("{} {}", usuario.nombre, usuario.apellido),
        lineas,
    })
}
