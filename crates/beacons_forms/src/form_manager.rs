#![forbid(unsafe_code)]

use beacons_kernel_contracts::{ContractViolation, ErrorSummaryItem, FieldJson, FormJson};

use crate::control::{
    Control, ControlId, ControlRef, ControlTree, ControlValue, ErrorSummaryEntry,
    FormGroupControl,
};

pub const ROOT_CONTROL_NAME: &str = "form";

/// Root form group plus serialisation to [`FormJson`].
///
/// Built fresh for every request; never persisted.
#[derive(Debug)]
pub struct FormManager {
    tree: ControlTree,
}

impl FormManager {
    pub fn new(fields: Vec<(String, Control)>) -> Result<Self, ContractViolation> {
        Self::from_group(FormGroupControl::new(fields)?)
    }

    pub fn from_group(group: FormGroupControl) -> Result<Self, ContractViolation> {
        Ok(Self {
            tree: ControlTree::new(ROOT_CONTROL_NAME, Control::Group(group))?,
        })
    }

    pub fn root(&self) -> ControlRef<'_> {
        self.tree.root()
    }

    pub fn field(&self, name: &str) -> Option<ControlRef<'_>> {
        self.tree.find(name).filter(|control| control.id() != ControlId::ROOT)
    }

    pub fn value(&self) -> ControlValue {
        self.root().value()
    }

    pub fn is_pristine(&self) -> bool {
        self.root().is_pristine()
    }

    pub fn mark_as_dirty(&mut self) {
        self.tree.mark_as_dirty(ControlId::ROOT);
    }

    pub fn as_dirty(mut self) -> Self {
        self.mark_as_dirty();
        self
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_errors()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.root().error_messages()
    }

    pub fn error_summary(&self) -> Vec<ErrorSummaryEntry> {
        self.root().error_summary()
    }

    /// Pure function of the current tree state.
    pub fn serialise(&self) -> FormJson {
        let fields = self
            .root()
            .leaves()
            .into_iter()
            .map(|leaf| {
                (
                    leaf.name().to_string(),
                    FieldJson {
                        value: leaf.as_str().to_string(),
                        error_messages: leaf.error_messages(),
                    },
                )
            })
            .collect();
        let error_summary = self
            .error_summary()
            .into_iter()
            .map(|entry| ErrorSummaryItem::for_field(&entry.field_id, entry.message))
            .collect();
        FormJson {
            fields,
            error_summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::FieldManager;
    use crate::validators;
    use beacons_kernel_contracts::Validate;

    fn owner_form(full_name: Option<&str>, email: Option<&str>) -> FormManager {
        FormManager::new(vec![
            (
                "beaconOwnerFullName".to_string(),
                FieldManager::new(full_name.map(str::to_string))
                    .validators(vec![validators::required("Full name is a required field")])
                    .into(),
            ),
            (
                "beaconOwnerTelephoneNumber".to_string(),
                FieldManager::new(None).into(),
            ),
            (
                "beaconOwnerEmail".to_string(),
                FieldManager::new(email.map(str::to_string))
                    .validators(vec![validators::email("Email address must be valid")])
                    .into(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn at_form_manager_01_pristine_serialise_has_values_and_no_errors() {
        let form = owner_form(None, Some("not-an-email"));
        let json = form.serialise();
        assert_eq!(json.fields.len(), 3);
        assert!(json.fields.values().all(|f| f.error_messages.is_empty()));
        assert_eq!(json.fields["beaconOwnerFullName"].value, "");
        assert_eq!(json.fields["beaconOwnerEmail"].value, "not-an-email");
        assert!(json.error_summary.is_empty());
        assert!(form.is_valid());
    }

    #[test]
    fn at_form_manager_02_dirty_serialise_carries_messages_and_summary() {
        let form = owner_form(Some(""), Some("not-an-email")).as_dirty();
        let json = form.serialise();
        assert_eq!(
            json.fields["beaconOwnerFullName"].error_messages,
            vec!["Full name is a required field"]
        );
        assert_eq!(
            json.error_summary,
            vec![
                ErrorSummaryItem::for_field(
                    "beaconOwnerFullName",
                    "Full name is a required field"
                ),
                ErrorSummaryItem::for_field("beaconOwnerEmail", "Email address must be valid"),
            ]
        );
        assert!(json.validate().is_ok());
        assert!(!form.is_valid());
    }

    #[test]
    fn at_form_manager_03_serialise_is_idempotent() {
        let form = owner_form(Some(""), None).as_dirty();
        assert_eq!(form.serialise(), form.serialise());
    }

    #[test]
    fn at_form_manager_04_field_lookup_skips_root() {
        let form = owner_form(Some("A Person"), None);
        assert_eq!(
            form.field("beaconOwnerFullName").map(|f| f.as_str()),
            Some("A Person")
        );
        assert!(form.field(ROOT_CONTROL_NAME).is_none());
        assert!(form.field("missing").is_none());
    }

    #[test]
    fn at_form_manager_05_mark_as_dirty_is_idempotent() {
        let mut form = owner_form(Some(""), None);
        assert!(form.is_pristine());
        form.mark_as_dirty();
        let first = form.serialise();
        form.mark_as_dirty();
        assert_eq!(form.serialise(), first);
        assert!(!form.is_pristine());
    }
}
