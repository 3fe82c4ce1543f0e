use serde::Deserialize;

use crate::domain::material::{Material, MaterialDraft, MaterialListQuery};
use crate::domain::supplier::Supplier;
use crate::forms::{FieldError, empty_string_as_none};
use crate::forms::materials::{MaterialForm, UploadMaterialsForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::errors::RepositoryError;
use crate::repository::{MaterialReader, MaterialWriter, SupplierReader};
use crate::services::{Mutation, ServiceError, ServiceResult};

/// Query parameters accepted by the materials page.
#[derive(Debug, Default, Deserialize)]
pub struct MaterialsQuery {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub supplier_id: Option<i32>,
    /// Show only materials at or below their reorder level.
    #[serde(default)]
    pub low_stock: bool,
    pub page: Option<usize>,
}

/// Data required to render the materials template.
pub struct MaterialsPageData {
    pub materials: Paginated<Material>,
    /// All suppliers, used by the filter and the upload hint.
    pub suppliers: Vec<Supplier>,
    pub search: Option<String>,
    pub supplier_id: Option<i32>,
    pub low_stock: bool,
}

/// Data for the new/edit material form.
pub struct MaterialFormData {
    pub material: Option<Material>,
    pub suppliers: Vec<Supplier>,
}

fn materials_paths(material_id: Option<i32>) -> Vec<String> {
    let mut paths = vec!["/materials".to_string(), "/".to_string()];
    if let Some(id) = material_id {
        paths.push(format!("/materials/{id}"));
    }
    paths
}

pub fn load_materials_page<R>(repo: &R, query: MaterialsQuery) -> ServiceResult<MaterialsPageData>
where
    R: MaterialReader + SupplierReader + ?Sized,
{
    let MaterialsQuery {
        search,
        supplier_id,
        low_stock,
        page,
    } = query;

    let search = search.filter(|term| !term.trim().is_empty());
    let page = page.unwrap_or(1);

    let mut list_query = MaterialListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = search.as_ref() {
        list_query = list_query.search(term);
    }
    if let Some(id) = supplier_id {
        list_query = list_query.supplier_id(id);
    }
    if low_stock {
        list_query = list_query.low_stock_only();
    }

    let (total, items) = repo.list_materials(list_query)?;
    let suppliers = repo.list_suppliers()?;

    Ok(MaterialsPageData {
        materials: Paginated::from_total(items, page, total, DEFAULT_ITEMS_PER_PAGE),
        suppliers,
        search,
        supplier_id,
        low_stock,
    })
}

/// All materials with their supplier, ordered by name.
pub fn list_materials<R>(repo: &R) -> ServiceResult<Vec<Material>>
where
    R: MaterialReader + ?Sized,
{
    let (_, materials) = repo.list_materials(MaterialListQuery::new())?;
    Ok(materials)
}

pub fn get_material<R>(repo: &R, material_id: i32) -> ServiceResult<Material>
where
    R: MaterialReader + ?Sized,
{
    repo.get_material_by_id(material_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_suppliers<R>(repo: &R) -> ServiceResult<Vec<Supplier>>
where
    R: SupplierReader + ?Sized,
{
    Ok(repo.list_suppliers()?)
}

/// Loads the material editor; `material_id` of `None` means a new material.
pub fn load_material_form<R>(repo: &R, material_id: Option<i32>) -> ServiceResult<MaterialFormData>
where
    R: MaterialReader + SupplierReader + ?Sized,
{
    let material = match material_id {
        Some(id) => Some(get_material(repo, id)?),
        None => None,
    };

    Ok(MaterialFormData {
        material,
        suppliers: repo.list_suppliers()?,
    })
}

fn ensure_supplier_exists<R>(repo: &R, draft: &MaterialDraft) -> ServiceResult<()>
where
    R: SupplierReader + ?Sized,
{
    match repo.get_supplier_by_id(draft.supplier_id)? {
        Some(_) => Ok(()),
        None => Err(ServiceError::Validation(vec![FieldError::new(
            "supplier_id",
            "supplier does not exist",
        )])),
    }
}

pub fn create_material<R>(repo: &R, form: MaterialForm) -> ServiceResult<Mutation<Material>>
where
    R: MaterialWriter + SupplierReader + ?Sized,
{
    let draft = form.into_draft()?;
    ensure_supplier_exists(repo, &draft)?;

    match repo.create_material(&draft) {
        Ok(material) => {
            let paths = materials_paths(None);
            Ok(Mutation::new(material, paths))
        }
        Err(err) => {
            log::error!("Failed to create material {}: {err}", draft.name);
            Err(err.into())
        }
    }
}

/// Replaces every writable attribute of a material.
pub fn update_material<R>(
    repo: &R,
    material_id: i32,
    form: MaterialForm,
) -> ServiceResult<Mutation<Material>>
where
    R: MaterialWriter + SupplierReader + ?Sized,
{
    let draft = form.into_draft()?;
    ensure_supplier_exists(repo, &draft)?;

    match repo.update_material(material_id, &draft) {
        Ok(material) => Ok(Mutation::new(material, materials_paths(Some(material_id)))),
        Err(err) => {
            log::error!("Failed to update material {material_id}: {err}");
            Err(err.into())
        }
    }
}

/// Deletes a material that no work order references.
pub fn delete_material<R>(repo: &R, material_id: i32) -> ServiceResult<Mutation<()>>
where
    R: MaterialWriter + ?Sized,
{
    match repo.delete_material(material_id) {
        Ok(()) => Ok(Mutation::new((), materials_paths(Some(material_id)))),
        Err(RepositoryError::ConstraintViolation(_)) => Err(ServiceError::Conflict(
            "material is used by a work order and cannot be deleted".to_string(),
        )),
        Err(err) => {
            log::error!("Failed to delete material {material_id}: {err}");
            Err(err.into())
        }
    }
}

/// Imports every row of a CSV upload, or none of them.
///
/// Returns the number of created materials.
pub fn import_materials<R>(repo: &R, form: UploadMaterialsForm) -> ServiceResult<Mutation<usize>>
where
    R: MaterialWriter + SupplierReader + ?Sized,
{
    let drafts = form.into_drafts()?;
    import_material_drafts(repo, &drafts)
}

pub(crate) fn import_material_drafts<R>(
    repo: &R,
    drafts: &[MaterialDraft],
) -> ServiceResult<Mutation<usize>>
where
    R: MaterialWriter + SupplierReader + ?Sized,
{
    let known: Vec<i32> = repo
        .list_suppliers()?
        .into_iter()
        .map(|supplier| supplier.id)
        .collect();

    if let Some((index, draft)) = drafts
        .iter()
        .enumerate()
        .find(|(_, draft)| !known.contains(&draft.supplier_id))
    {
        return Err(ServiceError::Form(format!(
            "row {}: supplier {} does not exist",
            index + 2,
            draft.supplier_id
        )));
    }

    match repo.create_materials(drafts) {
        Ok(created) => Ok(Mutation::new(created, materials_paths(None))),
        Err(err) => {
            log::error!("Failed to import {} materials: {err}", drafts.len());
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::fixtures;

    fn form(price: f64) -> MaterialForm {
        MaterialForm {
            name: "Combed cotton".to_string(),
            material_type: "Yarn".to_string(),
            unit: "kg".to_string(),
            current_stock: 120.0,
            reorder_level: 50.0,
            price,
            supplier_id: 1,
            description: None,
        }
    }

    fn repo_with_supplier() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_supplier_by_id()
            .returning(|id| Ok((id == 1).then(|| fixtures::supplier(1, "Northern Mills"))));
        repo
    }

    #[test]
    fn price_of_one_cent_is_accepted() {
        let mut repo = repo_with_supplier();
        repo.expect_create_material()
            .withf(|draft| draft.price_cents == 1)
            .times(1)
            .returning(|draft| {
                let mut material = fixtures::material(1, &draft.name, 120.0, 50.0);
                material.price_cents = draft.price_cents;
                Ok(material)
            });

        let mutation = create_material(&repo, form(0.01)).unwrap();

        assert_eq!(mutation.value.price_cents, 1);
        assert!(mutation.revalidate.contains(&"/materials".to_string()));
    }

    #[test]
    fn zero_price_fails_validation() {
        let repo = MockRepository::new();

        match create_material(&repo, form(0.0)) {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors[0].field, "price"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_supplier_is_a_field_error() {
        let repo = repo_with_supplier();
        let mut payload = form(4.5);
        payload.supplier_id = 9;

        match create_material(&repo, payload) {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors[0].field, "supplier_id"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn update_invalidates_detail_page() {
        let mut repo = repo_with_supplier();
        repo.expect_update_material()
            .withf(|id, draft| *id == 3 && draft.name == "Combed cotton")
            .returning(|id, draft| Ok(fixtures::material(id, &draft.name, 1.0, 2.0)));

        let mutation = update_material(&repo, 3, form(4.5)).unwrap();

        assert!(mutation.revalidate.contains(&"/materials/3".to_string()));
    }

    #[test]
    fn referenced_material_cannot_be_deleted() {
        let mut repo = MockRepository::new();
        repo.expect_delete_material().returning(|_| {
            Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".to_string(),
            ))
        });

        assert!(matches!(
            delete_material(&repo, 1),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn deleting_missing_material_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_delete_material()
            .returning(|_| Err(RepositoryError::NotFound));

        assert!(matches!(delete_material(&repo, 1), Err(ServiceError::NotFound)));
    }

    #[test]
    fn import_rejects_rows_with_unknown_suppliers() {
        let mut repo = MockRepository::new();
        repo.expect_list_suppliers()
            .returning(|| Ok(vec![fixtures::supplier(1, "Northern Mills")]));
        repo.expect_create_materials().never();

        let drafts = vec![
            MaterialDraft::new("Cotton", "Yarn", "kg", 450, 1),
            MaterialDraft::new("Linen", "Yarn", "kg", 900, 4),
        ];

        match import_material_drafts(&repo, &drafts) {
            Err(ServiceError::Form(message)) => assert!(message.starts_with("row 3")),
            other => panic!("expected form error, got {other:?}"),
        }
    }

    #[test]
    fn import_creates_all_rows() {
        let mut repo = MockRepository::new();
        repo.expect_list_suppliers()
            .returning(|| Ok(vec![fixtures::supplier(1, "Northern Mills")]));
        repo.expect_create_materials()
            .times(1)
            .returning(|drafts| Ok(drafts.len()));

        let drafts = vec![
            MaterialDraft::new("Cotton", "Yarn", "kg", 450, 1),
            MaterialDraft::new("Linen", "Yarn", "kg", 900, 1),
        ];

        let mutation = import_material_drafts(&repo, &drafts).unwrap();
        assert_eq!(mutation.value, 2);
    }

    #[test]
    fn low_stock_filter_reaches_the_repository() {
        let mut repo = MockRepository::new();
        repo.expect_list_materials()
            .withf(|query| query.low_stock_only && query.supplier_id == Some(1))
            .returning(|_| Ok((1, vec![fixtures::material(1, "Cotton", 10.0, 50.0)])));
        repo.expect_list_suppliers().returning(|| Ok(Vec::new()));

        let data = load_materials_page(
            &repo,
            MaterialsQuery {
                supplier_id: Some(1),
                low_stock: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert!(data.materials.items[0].needs_reorder());
        assert_eq!(data.materials.total_pages, 1);
    }
}
