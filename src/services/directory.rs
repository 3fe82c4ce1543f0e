use crate::domain::customer::Customer;
use crate::domain::supplier::Supplier;
use crate::domain::user::User;
use crate::forms::directory::{AddSupplierForm, AddUserForm};
use crate::repository::errors::RepositoryError;
use crate::repository::{CustomerReader, SupplierReader, SupplierWriter, UserReader, UserWriter};
use crate::services::{Mutation, ServiceError, ServiceResult};

/// Staff, suppliers and customers listed on the directory page.
pub struct DirectoryPageData {
    pub users: Vec<User>,
    pub suppliers: Vec<Supplier>,
    pub customers: Vec<Customer>,
}

pub fn load_directory_page<R>(repo: &R) -> ServiceResult<DirectoryPageData>
where
    R: UserReader + SupplierReader + CustomerReader + ?Sized,
{
    Ok(DirectoryPageData {
        users: repo.list_users()?,
        suppliers: repo.list_suppliers()?,
        customers: repo.list_customers()?,
    })
}

pub fn list_users<R>(repo: &R) -> ServiceResult<Vec<User>>
where
    R: UserReader + ?Sized,
{
    Ok(repo.list_users()?)
}

/// Adds a staff member. Emails are unique.
pub fn create_user<R>(repo: &R, form: AddUserForm) -> ServiceResult<Mutation<User>>
where
    R: UserWriter + ?Sized,
{
    let new_user = form.into_new_user()?;

    match repo.create_user(&new_user) {
        Ok(user) => Ok(Mutation::new(
            user,
            ["/directory", "/sales/new", "/production/new"],
        )),
        Err(RepositoryError::Duplicate(_)) => Err(ServiceError::Conflict(format!(
            "a user with email {} already exists",
            new_user.email
        ))),
        Err(err) => {
            log::error!("Failed to create user {}: {err}", new_user.email);
            Err(err.into())
        }
    }
}

pub fn create_supplier<R>(repo: &R, form: AddSupplierForm) -> ServiceResult<Mutation<Supplier>>
where
    R: SupplierWriter + ?Sized,
{
    let new_supplier = form.into_new_supplier()?;

    match repo.create_supplier(&new_supplier) {
        Ok(supplier) => Ok(Mutation::new(
            supplier,
            ["/directory", "/materials", "/materials/new"],
        )),
        Err(err) => {
            log::error!("Failed to create supplier {}: {err}", new_supplier.name);
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::fixtures;

    #[test]
    fn duplicate_email_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_create_user()
            .returning(|_| Err(RepositoryError::Duplicate("users.email".to_string())));

        let result = create_user(
            &repo,
            AddUserForm {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn invalid_email_is_a_field_error() {
        let repo = MockRepository::new();

        let result = create_user(
            &repo,
            AddUserForm {
                name: "Alice".to_string(),
                email: "not-an-email".to_string(),
            },
        );

        match result {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors[0].field, "email"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn new_supplier_refreshes_material_pages() {
        let mut repo = MockRepository::new();
        repo.expect_create_supplier()
            .withf(|supplier| supplier.name == "Northern Mills")
            .returning(|supplier| Ok(fixtures::supplier(1, &supplier.name)));

        let mutation = create_supplier(
            &repo,
            AddSupplierForm {
                name: " Northern  Mills ".to_string(),
                contact_name: None,
                email: None,
                phone: None,
            },
        )
        .unwrap();

        assert_eq!(mutation.value.id, 1);
        assert!(mutation.revalidate.contains(&"/materials/new".to_string()));
    }

    #[test]
    fn directory_lists_everyone() {
        let mut repo = MockRepository::new();
        repo.expect_list_users()
            .returning(|| Ok(vec![fixtures::user(1, "Alice")]));
        repo.expect_list_suppliers().returning(|| Ok(Vec::new()));
        repo.expect_list_customers()
            .returning(|| Ok(vec![fixtures::customer(1, "Linen House")]));

        let data = load_directory_page(&repo).unwrap();

        assert_eq!(data.users.len(), 1);
        assert!(data.suppliers.is_empty());
        assert_eq!(data.customers[0].name, "Linen House");
    }
}
