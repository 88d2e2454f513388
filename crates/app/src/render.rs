//! Plain-text and CSV views of categories.

use std::{collections::HashMap, io::Write};

use engine::{Category, CategoryNode, Company};
use uuid::Uuid;

pub fn write_companies(out: &mut impl Write, companies: &[Company]) -> std::io::Result<()> {
    for company in companies {
        writeln!(out, "{}\t{}", company.id, company.name)?;
    }
    Ok(())
}

pub fn write_category(out: &mut impl Write, category: &Category) -> std::io::Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}",
        category.id, category.category_type, category.name
    )
}

/// One line per category, in the given order, with the parent's name.
pub fn write_categories(out: &mut impl Write, categories: &[Category]) -> std::io::Result<()> {
    let names: HashMap<Uuid, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_str()))
        .collect();
    for category in categories {
        let parent = category
            .parent_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or("-");
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            category.id, category.category_type, category.name, parent
        )?;
    }
    Ok(())
}

pub fn write_tree(out: &mut impl Write, nodes: &[CategoryNode]) -> std::io::Result<()> {
    for node in nodes {
        write_node(out, node, 0)?;
    }
    Ok(())
}

fn write_node(out: &mut impl Write, node: &CategoryNode, depth: usize) -> std::io::Result<()> {
    writeln!(
        out,
        "{:indent$}{} ({})",
        "",
        node.category.name,
        node.category.category_type,
        indent = depth * 2
    )?;
    for child in &node.children {
        write_node(out, child, depth + 1)?;
    }
    Ok(())
}

pub fn write_csv(out: impl Write, categories: &[Category]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["id", "name", "type", "parent_id"])?;
    for category in categories {
        let parent = category
            .parent_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        writer.write_record([
            category.id.to_string().as_str(),
            category.name.as_str(),
            category.category_type.as_str(),
            parent.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
