#![forbid(unsafe_code)]

//! Form-state tree.
//!
//! Controls are declared as an owned tree of [`FieldManager`] / [`FormGroupControl`] values and
//! then flattened into a [`ControlTree`] arena. Each node records its owning group by
//! [`ControlId`]; that link is only ever used for sibling lookups from rule predicates.
//! Lifecycle (dirtying, traversal) always goes downwards through the group's own child list.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use beacons_kernel_contracts::ContractViolation;

use crate::validation::{ValidationCondition, ValidationRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(usize);

impl ControlId {
    pub const ROOT: ControlId = ControlId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum ControlValue {
    Scalar(String),
    Group(BTreeMap<String, ControlValue>),
}

impl ControlValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ControlValue::Scalar(v) => Some(v.as_str()),
            ControlValue::Group(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummaryEntry {
    pub field_id: String,
    pub message: String,
}

/// Leaf control declaration holding a single scalar value.
#[derive(Debug, Clone, Default)]
pub struct FieldManager {
    value: String,
    validators: Vec<ValidationRule>,
    conditions: Vec<ValidationCondition>,
}

impl FieldManager {
    /// Absent values are stored as `""`, so "required" only has to test for length zero.
    pub fn new(value: Option<String>) -> Self {
        Self {
            value: value.unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self::new(Some(value.into()))
    }

    pub fn validators(mut self, validators: Vec<ValidationRule>) -> Self {
        self.validators = validators;
        self
    }

    pub fn conditions(mut self, conditions: Vec<ValidationCondition>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Composite control declaration. Field order is declaration order and drives summary order.
#[derive(Debug, Clone, Default)]
pub struct FormGroupControl {
    fields: Vec<(String, Control)>,
    validators: Vec<ValidationRule>,
}

impl FormGroupControl {
    pub fn new(fields: Vec<(String, Control)>) -> Result<Self, ContractViolation> {
        let mut seen = BTreeSet::new();
        for (name, _) in &fields {
            if name.trim().is_empty() {
                return Err(ContractViolation::InvalidValue {
                    field: "form_group.fields",
                    reason: "field names must not be empty",
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ContractViolation::DuplicateName {
                    field: "form_group.fields",
                    name: name.clone(),
                });
            }
        }
        Ok(Self {
            fields,
            validators: Vec::new(),
        })
    }

    pub fn validators(mut self, validators: Vec<ValidationRule>) -> Self {
        self.validators = validators;
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Control {
    Field(FieldManager),
    Group(FormGroupControl),
}

impl From<FieldManager> for Control {
    fn from(field: FieldManager) -> Self {
        Control::Field(field)
    }
}

impl From<FormGroupControl> for Control {
    fn from(group: FormGroupControl) -> Self {
        Control::Group(group)
    }
}

#[derive(Debug)]
struct ControlNode {
    name: String,
    parent: Option<ControlId>,
    pristine: bool,
    validators: Vec<ValidationRule>,
    kind: NodeKind,
}

#[derive(Debug)]
enum NodeKind {
    Field {
        value: String,
        conditions: Vec<ValidationCondition>,
    },
    Group {
        fields: Vec<ControlId>,
    },
}

#[derive(Debug)]
pub struct ControlTree {
    nodes: Vec<ControlNode>,
}

impl ControlTree {
    pub fn new(name: impl Into<String>, root: Control) -> Result<Self, ContractViolation> {
        let mut tree = Self { nodes: Vec::new() };
        tree.insert(name.into(), root)?;
        tree.check_references()?;
        Ok(tree)
    }

    fn insert(&mut self, name: String, control: Control) -> Result<ControlId, ContractViolation> {
        let id = ControlId(self.nodes.len());
        match control {
            Control::Field(field) => self.nodes.push(ControlNode {
                name,
                parent: None,
                pristine: true,
                validators: field.validators,
                kind: NodeKind::Field {
                    value: field.value,
                    conditions: field.conditions,
                },
            }),
            Control::Group(group) => {
                self.nodes.push(ControlNode {
                    name,
                    parent: None,
                    pristine: true,
                    validators: group.validators,
                    kind: NodeKind::Group { fields: Vec::new() },
                });
                let mut children = Vec::with_capacity(group.fields.len());
                for (child_name, child) in group.fields {
                    let child_id = self.insert(child_name, child)?;
                    self.set_parent(child_id, id)?;
                    children.push(child_id);
                }
                if let NodeKind::Group { fields } = &mut self.nodes[id.0].kind {
                    *fields = children;
                }
            }
        }
        Ok(id)
    }

    fn set_parent(&mut self, child: ControlId, parent: ControlId) -> Result<(), ContractViolation> {
        if child == parent {
            return Err(ContractViolation::InvalidValue {
                field: "control.parent",
                reason: "a control cannot be its own parent",
            });
        }
        let node = &mut self.nodes[child.0];
        if node.parent.is_some() {
            return Err(ContractViolation::InvalidValue {
                field: "control.parent",
                reason: "is set exactly once by the owning group",
            });
        }
        node.parent = Some(parent);
        Ok(())
    }

    // Names form a flat namespace in FormJson, and conditions must name real siblings.
    fn check_references(&self) -> Result<(), ContractViolation> {
        let mut seen = BTreeSet::new();
        for node in &self.nodes {
            if !seen.insert(node.name.as_str()) {
                return Err(ContractViolation::DuplicateName {
                    field: "control_tree.names",
                    name: node.name.clone(),
                });
            }
        }
        for (index, node) in self.nodes.iter().enumerate() {
            let NodeKind::Field { conditions, .. } = &node.kind else {
                continue;
            };
            let control = ControlRef {
                tree: self,
                id: ControlId(index),
            };
            for condition in conditions {
                for name in condition.depends_on() {
                    if control.sibling(name).is_none() {
                        return Err(ContractViolation::UnknownReference {
                            field: "validation_condition.depends_on",
                            name: name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn root(&self) -> ControlRef<'_> {
        ControlRef {
            tree: self,
            id: ControlId::ROOT,
        }
    }

    pub fn get(&self, id: ControlId) -> Option<ControlRef<'_>> {
        (id.0 < self.nodes.len()).then_some(ControlRef { tree: self, id })
    }

    pub fn find(&self, name: &str) -> Option<ControlRef<'_>> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(|index| ControlRef {
                tree: self,
                id: ControlId(index),
            })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dirties `id` and its whole subtree. Values are left untouched; repeat calls are no-ops.
    pub fn mark_as_dirty(&mut self, id: ControlId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes.get_mut(next.0) else {
                continue;
            };
            node.pristine = false;
            if let NodeKind::Group { fields } = &node.kind {
                stack.extend(fields.iter().copied());
            }
        }
    }
}

/// Read handle onto one node of a [`ControlTree`].
#[derive(Clone, Copy)]
pub struct ControlRef<'a> {
    tree: &'a ControlTree,
    id: ControlId,
}

impl<'a> ControlRef<'a> {
    fn node(&self) -> &'a ControlNode {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    pub fn is_pristine(&self) -> bool {
        self.node().pristine
    }

    pub fn is_group(&self) -> bool {
        matches!(self.node().kind, NodeKind::Group { .. })
    }

    /// Scalar value of a field; groups read as `""`.
    pub fn as_str(&self) -> &'a str {
        let node = self.node();
        match &node.kind {
            NodeKind::Field { value, .. } => value.as_str(),
            NodeKind::Group { .. } => "",
        }
    }

    pub fn value(&self) -> ControlValue {
        let node = self.node();
        match &node.kind {
            NodeKind::Field { value, .. } => ControlValue::Scalar(value.clone()),
            NodeKind::Group { .. } => ControlValue::Group(
                self.children()
                    .map(|child| (child.name().to_string(), child.value()))
                    .collect(),
            ),
        }
    }

    pub fn parent(&self) -> Option<ControlRef<'a>> {
        let tree = self.tree;
        self.node().parent.map(|id| ControlRef { tree, id })
    }

    pub fn children(&self) -> impl Iterator<Item = ControlRef<'a>> + 'a {
        let tree = self.tree;
        let node = self.node();
        let ids: &'a [ControlId] = match &node.kind {
            NodeKind::Group { fields } => fields.as_slice(),
            NodeKind::Field { .. } => &[],
        };
        ids.iter().map(move |&id| ControlRef { tree, id })
    }

    pub fn child(&self, name: &str) -> Option<ControlRef<'a>> {
        self.children().find(|child| child.name() == name)
    }

    pub fn sibling(&self, name: &str) -> Option<ControlRef<'a>> {
        let me = self.id;
        self.parent()?
            .children()
            .find(|child| child.id != me && child.name() == name)
    }

    fn own_error_messages(&self) -> Vec<String> {
        let node = self.node();
        if node.pristine {
            return Vec::new();
        }
        if let NodeKind::Field { conditions, .. } = &node.kind {
            if !conditions.iter().all(|condition| condition.is_met(self)) {
                return Vec::new();
            }
        }
        node.validators
            .iter()
            .filter(|rule| rule.has_error(self))
            .map(|rule| rule.error_message().to_string())
            .collect()
    }

    /// Empty while pristine. Fields report their own rules in declaration order; groups
    /// report every message of [`Self::error_summary`].
    pub fn error_messages(&self) -> Vec<String> {
        if self.is_group() {
            self.error_summary()
                .into_iter()
                .map(|entry| entry.message)
                .collect()
        } else {
            self.own_error_messages()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.own_error_messages().is_empty() || self.children().any(|child| child.has_errors())
    }

    /// Depth-first, declaration order. A group's own messages precede its children's.
    pub fn error_summary(&self) -> Vec<ErrorSummaryEntry> {
        let mut out = Vec::new();
        self.collect_summary(&mut out);
        out
    }

    fn collect_summary(&self, out: &mut Vec<ErrorSummaryEntry>) {
        let field_id = self.name();
        out.extend(
            self.own_error_messages()
                .into_iter()
                .map(|message| ErrorSummaryEntry {
                    field_id: field_id.to_string(),
                    message,
                }),
        );
        for child in self.children() {
            child.collect_summary(out);
        }
    }

    /// Leaf fields under this control, depth-first in declaration order.
    pub fn leaves(&self) -> Vec<ControlRef<'a>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<ControlRef<'a>>) {
        if self.is_group() {
            for child in self.children() {
                child.collect_leaves(out);
            }
        } else {
            out.push(*self);
        }
    }
}

impl fmt::Debug for ControlRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("pristine", &self.is_pristine())
            .finish()
    }
}
