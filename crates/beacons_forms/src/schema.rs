#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use beacons_kernel_contracts::{ContractViolation, FormRecord, Validate};

use crate::control::{Control, FieldManager, FormGroupControl};
use crate::form_manager::FormManager;
use crate::validation::{ValidationCondition, ValidationRule};

#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    validators: Vec<ValidationRule>,
    conditions: Vec<ValidationCondition>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validator(mut self, rule: ValidationRule) -> Self {
        self.validators.push(rule);
        self
    }

    pub fn condition(mut self, condition: ValidationCondition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[derive(Debug, Clone)]
pub enum SchemaEntry {
    Field(FieldSchema),
    Group(FormSchema),
}

/// Declared field layout of one page: names in order, their rules, nested groups.
///
/// Binding a record produces a fresh [`FormManager`]; values missing from the record
/// become `""`.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    entries: Vec<(String, SchemaEntry)>,
    validators: Vec<ValidationRule>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.entries.push((name.into(), SchemaEntry::Field(field)));
        self
    }

    pub fn group(mut self, name: impl Into<String>, group: FormSchema) -> Self {
        self.entries.push((name.into(), SchemaEntry::Group(group)));
        self
    }

    pub fn group_validator(mut self, rule: ValidationRule) -> Self {
        self.validators.push(rule);
        self
    }

    /// Leaf field names, depth-first in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_field_names(&mut out);
        out
    }

    fn collect_field_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        for (name, entry) in &self.entries {
            match entry {
                SchemaEntry::Field(_) => out.push(name.as_str()),
                SchemaEntry::Group(group) => group.collect_field_names(out),
            }
        }
    }

    pub fn bind(&self, record: &FormRecord) -> Result<FormManager, ContractViolation> {
        self.validate()?;
        FormManager::from_group(self.build_group(record)?)
    }

    fn build_group(&self, record: &FormRecord) -> Result<FormGroupControl, ContractViolation> {
        let mut fields = Vec::with_capacity(self.entries.len());
        for (name, entry) in &self.entries {
            let control = match entry {
                SchemaEntry::Field(field) => Control::Field(
                    FieldManager::new(record.get(name).map(str::to_string))
                        .validators(field.validators.clone())
                        .conditions(field.conditions.clone()),
                ),
                SchemaEntry::Group(group) => Control::Group(group.build_group(record)?),
            };
            fields.push((name.clone(), control));
        }
        Ok(FormGroupControl::new(fields)?.validators(self.validators.clone()))
    }
}

impl Validate for FormSchema {
    fn validate(&self) -> Result<(), ContractViolation> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&FormSchema> = vec![self];
        while let Some(schema) = stack.pop() {
            for (name, entry) in &schema.entries {
                if name.trim().is_empty() {
                    return Err(ContractViolation::InvalidValue {
                        field: "form_schema.entries",
                        reason: "names must not be empty",
                    });
                }
                if !seen.insert(name.as_str()) {
                    return Err(ContractViolation::DuplicateName {
                        field: "form_schema.entries",
                        name: name.clone(),
                    });
                }
                if let SchemaEntry::Group(group) = entry {
                    stack.push(group);
                }
            }
        }
        Ok(())
    }
}
