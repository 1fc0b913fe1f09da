//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod alimento;
pub mod historial_eliminacion;
pub mod lonchera;
pub mod lonchera_alimento;
pub mod movimiento_inventario;
pub mod pedido;
pub mod pedido_producto;
pub mod perfil;
pub mod producto;
pub mod restriccion;
pub mod restriccion_alimento;
pub mod usuario;

// Re-export specific types to avoid conflicts
pub use alimento::{Column as AlimentoColumn, Entity as Alimento, Model as AlimentoModel};
pub use historial_eliminacion::{
    Column as HistorialColumn, Entity as Historial, Model as HistorialModel,
};
pub use lonchera::{Column as LoncheraColumn, Entity as Lonchera, Model as LoncheraModel};
pub use lonchera_alimento::{
    Column as LoncheraAlimentoColumn, Entity as LoncheraAlimento, Model as LoncheraAlimentoModel,
};
pub use movimiento_inventario::{
    Column as MovimientoColumn, Entity as Movimiento, Model as MovimientoModel,
};
pub use pedido::{Column as PedidoColumn, Entity as Pedido, Model as PedidoModel};
pub use pedido_producto::{
    Column as PedidoProductoColumn, Entity as PedidoProducto, Model as PedidoProductoModel,
};
pub use perfil::{Column as PerfilColumn, Entity as Perfil, Model as PerfilModel};
pub use producto::{Column as ProductoColumn, Entity as Producto, Model as ProductoModel};
pub use restriccion::{
    Column as RestriccionColumn, Entity as Restriccion, Model as RestriccionModel,
};
pub use restriccion_alimento::{
    Column as RestriccionAlimentoColumn, Entity as RestriccionAlimento,
    Model as RestriccionAlimentoModel,
};
pub use usuario::{Column as UsuarioColumn, Entity as Usuario, Model as UsuarioModel};
