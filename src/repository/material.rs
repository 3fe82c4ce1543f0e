use diesel::prelude::*;

use crate::{
    domain::material::{Material as DomainMaterial, MaterialDraft, MaterialListQuery},
    models::material::{Material as DbMaterial, MaterialChanges},
    models::supplier::Supplier as DbSupplier,
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DieselRepository, MaterialReader, MaterialWriter},
};

fn with_supplier((material, supplier): (DbMaterial, DbSupplier)) -> DomainMaterial {
    material.into_domain(Some(supplier.into()))
}

/// Reload a material together with its supplier.
fn load_material(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<DomainMaterial> {
    use crate::schema::{materials, suppliers};

    let row = materials::table
        .inner_join(suppliers::table)
        .filter(materials::id.eq(id))
        .select((DbMaterial::as_select(), DbSupplier::as_select()))
        .first::<(DbMaterial, DbSupplier)>(conn)?;

    Ok(with_supplier(row))
}

impl MaterialReader for DieselRepository {
    fn get_material_by_id(&self, id: i32) -> RepositoryResult<Option<DomainMaterial>> {
        let mut conn = self.conn()?;

        match load_material(&mut conn, id) {
            Ok(material) => Ok(Some(material)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn list_materials(
        &self,
        query: MaterialListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainMaterial>)> {
        use crate::schema::{materials, suppliers};

        let mut conn = self.conn()?;

        let MaterialListQuery {
            search,
            supplier_id,
            low_stock_only,
            pagination,
        } = query;
        let search_pattern = search.as_ref().map(|term| format!("%{term}%"));

        let mut count_query = materials::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref pattern) = search_pattern {
            count_query = count_query.filter(
                materials::name
                    .like(pattern.clone())
                    .or(materials::material_type.like(pattern.clone())),
            );
        }
        if let Some(supplier_id) = supplier_id {
            count_query = count_query.filter(materials::supplier_id.eq(supplier_id));
        }
        if low_stock_only {
            count_query = count_query.filter(materials::current_stock.le(materials::reorder_level));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = materials::table
            .inner_join(suppliers::table)
            .select((DbMaterial::as_select(), DbSupplier::as_select()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref pattern) = search_pattern {
            items = items.filter(
                materials::name
                    .like(pattern.clone())
                    .or(materials::material_type.like(pattern.clone())),
            );
        }
        if let Some(supplier_id) = supplier_id {
            items = items.filter(materials::supplier_id.eq(supplier_id));
        }
        if low_stock_only {
            items = items.filter(materials::current_stock.le(materials::reorder_level));
        }

        items = items.order((materials::name.asc(), materials::id.asc()));

        if let Some(pagination) = pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let materials = items
            .load::<(DbMaterial, DbSupplier)>(&mut conn)?
            .into_iter()
            .map(with_supplier)
            .collect();

        Ok((total, materials))
    }
}

impl MaterialWriter for DieselRepository {
    fn create_material(&self, draft: &MaterialDraft) -> RepositoryResult<DomainMaterial> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        conn.transaction::<DomainMaterial, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(materials::table)
                .values(&MaterialChanges::from(draft))
                .get_result::<DbMaterial>(conn)?;

            load_material(conn, created.id)
        })
    }

    fn create_materials(&self, drafts: &[MaterialDraft]) -> RepositoryResult<usize> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let payload: Vec<MaterialChanges> = drafts.iter().map(MaterialChanges::from).collect();
            let inserted = diesel::insert_into(materials::table)
                .values(&payload)
                .execute(conn)?;
            Ok(inserted)
        })
    }

    fn update_material(
        &self,
        material_id: i32,
        draft: &MaterialDraft,
    ) -> RepositoryResult<DomainMaterial> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        conn.transaction::<DomainMaterial, RepositoryError, _>(|conn| {
            let affected = diesel::update(materials::table.filter(materials::id.eq(material_id)))
                .set(&MaterialChanges::from(draft))
                .execute(conn)?;

            if affected == 0 {
                return Err(RepositoryError::NotFound);
            }

            load_material(conn, material_id)
        })
    }

    fn delete_material(&self, material_id: i32) -> RepositoryResult<()> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        let affected = diesel::delete(materials::table.filter(materials::id.eq(material_id)))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
