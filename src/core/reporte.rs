//! Reporte business logic - Builds the users and lunchboxes CSV export.

use crate::{
    entities::{Lonchera, Usuario, usuario},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};

const ENCABEZADO: [&str; 9] = [
    "usuario_id",
    "nombre_usuario",
    "cedula",
    "lonchera_id",
    "lonchera_nombre",
    "lonchera_descripcion",
    "lonchera_precio",
    "lonchera_calorias",
    "fecha_creacion",
];

/// Renders the active usuarios joined with their active loncheras as CSV
/// bytes: one row per pair, and one row with empty lunchbox columns for
/// usuarios without any active lonchera.
pub async fn generate_usuarios_loncheras_csv(db: &DatabaseConnection) -> Result<Vec<u8>> {
    let usuarios = Usuario::find()
        .filter(usuario::Column::IsActive.eq(true))
        .order_by_asc(usuario::Column::Id)
        .find_with_related(Lonchera)
        .all(db)
        .await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ENCABEZADO)?;

    for (usuario, loncheras) in usuarios {
        let nombre_usuario = format!("{} {}", usuario.nombre, usuario.apellido);
        let activas: Vec<_> = loncheras.into_iter().filter(|l| l.is_active).collect();
        if activas.is_empty() {
            writer.write_record([
                usuario.id.to_string(),
                nombre_usuario,
                usuario.cedula.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ])?;
            continue;
        }
        for lonchera in activas {
            writer.write_record([
                usuario.id.to_string(),
                nombre_usuario.clone(),
                usuario.cedula.clone(),
                lonchera.id.to_string(),
                lonchera.nombre,
                lonchera.descripcion.unwrap_or_default(),
                format!("{:.2}", lonchera.precio),
                lonchera.calorias.to_string(),
                lonchera.fecha_creacion.to_rfc3339(),
            ])?;
        }
    }

    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::lonchera::soft_delete_lonchera;
    use crate::core::usuario::soft_delete_usuario;
    use crate::errors::Result;
    use crate::test_utils::*;

    fn parse(filas: &[u8]) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(filas);
        reader
            .records()
            .map(|r| r.unwrap().iter().map(ToString::to_string).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_csv_one_row_per_active_pair() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_usuario(&db, "111").await?;
        let luis = create_test_usuario(&db, "222").await?;

        create_test_lonchera(&db, ana.id, "Escolar").await?;
        let vieja = create_test_lonchera(&db, ana.id, "Vieja").await?;
        soft_delete_lonchera(&db, vieja.id).await?;

        let bytes = generate_usuarios_loncheras_csv(&db).await?;
        let filas = parse(&bytes);

        // Header, Ana with her active lonchera, Luis without any
        assert_eq!(filas.len(), 3);
        assert_eq!(filas[0], ENCABEZADO);

        assert_eq!(filas[1][0], ana.id.to_string());
        assert_eq!(filas[1][1], format!("{} {}", ana.nombre, ana.apellido));
        assert_eq!(filas[1][2], "111");
        assert_eq!(filas[1][4], "Escolar");
        assert_eq!(filas[1][6], "0.00");

        assert_eq!(filas[2][0], luis.id.to_string());
        assert_eq!(filas[2][3], "");
        assert_eq!(filas[2][4], "");

        Ok(())
    }

    #[tokio::test]
    async fn test_csv_excludes_inactive_usuarios() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_usuario(&db, "111").await?;
        create_test_lonchera(&db, ana.id, "Escolar").await?;
        soft_delete_usuario(&db, ana.id).await?;

        let bytes = generate_usuarios_loncheras_csv(&db).await?;
        let filas = parse(&bytes);
        assert_eq!(filas.len(), 1, "only the header remains");

        Ok(())
    }
}
