//! In-memory copy of one company's categories.
//!
//! Handlers validate against a [`CategorySnapshot`] instead of querying the
//! store for every check. The snapshot only ever holds categories of its own
//! company.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::{Category, EngineError, ResultEngine, util::name_key};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySnapshot {
    company_id: String,
    categories: Vec<Category>,
}

/// Outcome of a name lookup: the first match in snapshot order and how many
/// categories carry the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameResolution<'a> {
    pub category: &'a Category,
    pub matches: usize,
}

impl NameResolution<'_> {
    pub fn is_ambiguous(&self) -> bool {
        self.matches > 1
    }
}

/// A category with its sub-tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategorySnapshot {
    /// Build a snapshot for `company_id`, dropping categories that belong to
    /// any other company.
    pub fn new(company_id: impl Into<String>, categories: impl IntoIterator<Item = Category>) -> Self {
        let company_id = company_id.into();
        let categories = categories
            .into_iter()
            .filter(|category| category.company_id == company_id)
            .collect();
        Self {
            company_id,
            categories,
        }
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// First match wins; ties are reported through `matches`.
    pub fn resolve(&self, name: &str) -> Option<NameResolution<'_>> {
        let key = name_key(name);
        let mut found = self.categories.iter().filter(|category| category.name == key);
        let category = found.next()?;
        Some(NameResolution {
            category,
            matches: 1 + found.count(),
        })
    }

    /// Like [`resolve`](Self::resolve), but a missing name is an error.
    pub fn require(&self, name: &str) -> ResultEngine<&Category> {
        let resolution = self
            .resolve(name)
            .ok_or_else(|| EngineError::KeyNotFound(format!("category '{}'", name_key(name))))?;
        if resolution.is_ambiguous() {
            tracing::warn!(
                company_id = %self.company_id,
                name = %resolution.category.name,
                matches = resolution.matches,
                category_id = %resolution.category.id,
                "ambiguous category name, using first match"
            );
        }
        Ok(resolution.category)
    }

    pub fn children(&self, id: Uuid) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |category| category.parent_id == Some(id))
    }

    /// Whether making `parent_id` the parent of `child_id` would close a
    /// loop: walks parent pointers from the proposed parent upward looking
    /// for the child. A loop already present in the data counts as one.
    pub fn would_create_cycle(&self, child_id: Uuid, parent_id: Uuid) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(parent_id);
        while let Some(id) = current {
            if id == child_id || !visited.insert(id) {
                return true;
            }
            current = self.get(id).and_then(|category| category.parent_id);
        }
        false
    }

    /// The forest in snapshot order. A category whose parent is not in the
    /// snapshot is shown as a root.
    pub fn tree(&self) -> Vec<CategoryNode> {
        let ids: HashSet<Uuid> = self.categories.iter().map(|category| category.id).collect();
        let mut visited = HashSet::new();
        self.categories
            .iter()
            .filter(|category| category.parent_id.is_none_or(|parent_id| !ids.contains(&parent_id)))
            .filter_map(|root| self.build_node(root, &mut visited))
            .collect()
    }

    fn build_node(&self, category: &Category, visited: &mut HashSet<Uuid>) -> Option<CategoryNode> {
        if !visited.insert(category.id) {
            return None;
        }
        let children = self
            .children(category.id)
            .filter_map(|child| self.build_node(child, visited))
            .collect();
        Some(CategoryNode {
            category: category.clone(),
            children,
        })
    }

    /// Insert `category`, or replace the entry with the same id.
    pub(crate) fn upsert(&mut self, category: Category) {
        if category.company_id != self.company_id {
            return;
        }
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CategoryType;

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        Category {
            id: Uuid::new_v4(),
            company_id: "acme".to_string(),
            name: name.to_string(),
            category_type: CategoryType::Expense,
            parent_id,
        }
    }

    #[test]
    fn drops_categories_of_other_companies() {
        let mut foreign = category("Rent", None);
        foreign.company_id = "globex".to_string();
        let snapshot = CategorySnapshot::new("acme", vec![category("Rent", None), foreign]);

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.categories().iter().all(|c| c.company_id == "acme"));
    }

    #[test]
    fn resolve_reports_ties_and_keeps_first_match() {
        let first = category("Travel", None);
        let second = category("Travel", None);
        let snapshot = CategorySnapshot::new("acme", vec![first.clone(), second]);

        let resolution = snapshot.resolve("  Travel ").unwrap();
        assert_eq!(resolution.category.id, first.id);
        assert_eq!(resolution.matches, 2);
        assert!(resolution.is_ambiguous());
        assert_eq!(snapshot.require("Travel").unwrap().id, first.id);
    }

    #[test]
    fn require_missing_name_is_not_found() {
        let snapshot = CategorySnapshot::new("acme", vec![category("Rent", None)]);
        let err = snapshot.require("Payroll").unwrap_err();
        assert_eq!(err, EngineError::KeyNotFound("category 'Payroll'".to_string()));
    }

    #[test]
    fn detects_cycles_through_descendants() {
        let root = category("Expenses", None);
        let mid = category("Travel", Some(root.id));
        let leaf = category("Flights", Some(mid.id));
        let other = category("Rent", None);
        let snapshot = CategorySnapshot::new(
            "acme",
            vec![root.clone(), mid.clone(), leaf.clone(), other.clone()],
        );

        assert!(snapshot.would_create_cycle(root.id, leaf.id));
        assert!(snapshot.would_create_cycle(mid.id, leaf.id));
        assert!(snapshot.would_create_cycle(root.id, root.id));
        assert!(!snapshot.would_create_cycle(leaf.id, other.id));
        assert!(!snapshot.would_create_cycle(other.id, leaf.id));
    }

    #[test]
    fn corrupt_loop_does_not_hang() {
        let mut a = category("A", None);
        let mut b = category("B", None);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let c = category("C", None);
        let snapshot = CategorySnapshot::new("acme", vec![a.clone(), b.clone(), c.clone()]);

        assert!(snapshot.would_create_cycle(c.id, a.id));
        assert!(!snapshot.tree().is_empty());
    }

    #[test]
    fn tree_nests_children_and_promotes_orphans() {
        let root = category("Expenses", None);
        let child = category("Travel", Some(root.id));
        let orphan = category("Lost", Some(Uuid::new_v4()));
        let snapshot =
            CategorySnapshot::new("acme", vec![root.clone(), child.clone(), orphan.clone()]);

        let tree = snapshot.tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.id, root.id);
        assert_eq!(tree[0].children[0].category.id, child.id);
        assert_eq!(tree[1].category.id, orphan.id);
        assert_eq!(snapshot.children(root.id).count(), 1);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let rent = category("Rent", None);
        let mut snapshot = CategorySnapshot::new("acme", vec![rent.clone()]);
        snapshot.upsert(Category {
            name: "Office Rent".to_string(),
            ..rent.clone()
        });

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(rent.id).unwrap().name, "Office Rent");
    }
}
