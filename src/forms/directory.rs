use serde::Deserialize;
use validator::Validate;

use crate::domain::supplier::NewSupplier;
use crate::domain::user::NewUser;
use crate::forms::{FormResult, empty_string_as_none, optional_text, required_text};

const NAME_MAX_LEN: u64 = 128;

/// Form payload for adding a staff member.
#[derive(Debug, Deserialize, Validate)]
pub struct AddUserForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

impl AddUserForm {
    pub fn into_new_user(self) -> FormResult<NewUser> {
        self.validate()?;
        let name = required_text(&self.name, "name")?;
        Ok(NewUser::new(name, self.email.trim()))
    }
}

/// Form payload for adding a material supplier.
#[derive(Debug, Deserialize, Validate)]
pub struct AddSupplierForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
}

impl AddSupplierForm {
    pub fn into_new_supplier(self) -> FormResult<NewSupplier> {
        self.validate()?;

        let mut supplier = NewSupplier::new(required_text(&self.name, "name")?);

        if let Some(contact_name) = optional_text(self.contact_name.as_deref()) {
            supplier = supplier.with_contact_name(contact_name);
        }
        if let Some(email) = optional_text(self.email.as_deref()) {
            supplier = supplier.with_email(email);
        }
        if let Some(phone) = optional_text(self.phone.as_deref()) {
            supplier = supplier.with_phone(phone);
        }

        Ok(supplier)
    }
}
