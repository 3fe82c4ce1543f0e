use diesel::prelude::*;

use crate::{
    domain::supplier::{NewSupplier as DomainNewSupplier, Supplier as DomainSupplier},
    models::supplier::{NewSupplier as DbNewSupplier, Supplier as DbSupplier},
    repository::errors::RepositoryResult,
    repository::{DieselRepository, SupplierReader, SupplierWriter},
};

impl SupplierReader for DieselRepository {
    fn get_supplier_by_id(&self, id: i32) -> RepositoryResult<Option<DomainSupplier>> {
        use crate::schema::suppliers;

        let mut conn = self.conn()?;
        let supplier = suppliers::table
            .filter(suppliers::id.eq(id))
            .first::<DbSupplier>(&mut conn)
            .optional()?;

        Ok(supplier.map(Into::into))
    }

    fn list_suppliers(&self) -> RepositoryResult<Vec<DomainSupplier>> {
        use crate::schema::suppliers;

        let mut conn = self.conn()?;
        let suppliers = suppliers::table
            .order(suppliers::name.asc())
            .load::<DbSupplier>(&mut conn)?;

        Ok(suppliers.into_iter().map(Into::into).collect())
    }
}

impl SupplierWriter for DieselRepository {
    fn create_supplier(&self, new_supplier: &DomainNewSupplier) -> RepositoryResult<DomainSupplier> {
        use crate::schema::suppliers;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(suppliers::table)
            .values(&DbNewSupplier::from(new_supplier))
            .get_result::<DbSupplier>(&mut conn)?;

        Ok(created.into())
    }
}
