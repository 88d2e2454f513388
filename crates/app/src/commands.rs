use std::{
    error::Error,
    fs::File,
    io::{self, BufWriter, Write},
};

use engine::{Engine, OperationRequest};

use crate::{
    cli::{BatchArgs, CategoryCommand, Command, CompanyCommand},
    render,
};

type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

pub async fn run(engine: &Engine, command: Command) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Command::Company(company) => match company.command {
            CompanyCommand::Create { name } => {
                let id = engine.create_company(&name).await?;
                writeln!(out, "{id}")?;
            }
            CompanyCommand::List => {
                render::write_companies(&mut out, &engine.list_companies().await?)?;
            }
        },
        Command::Category(category) => run_category(engine, category.command, &mut out).await?,
        Command::Batch(args) => run_batch(engine, args, &mut out).await?,
    }
    out.flush()?;
    Ok(())
}

async fn run_category(engine: &Engine, command: CategoryCommand, out: &mut impl Write) -> Result<()> {
    match command {
        CategoryCommand::List(scope) => {
            let categories = engine.list_categories(&scope.company).await?;
            render::write_categories(out, &categories)?;
        }
        CategoryCommand::Tree(scope) => {
            render::write_tree(out, &engine.category_tree(&scope.company).await?)?;
        }
        CategoryCommand::Export { scope, output } => {
            let categories = engine.list_categories(&scope.company).await?;
            match output {
                Some(path) => {
                    render::write_csv(BufWriter::new(File::create(&path)?), &categories)?;
                    tracing::info!(path = %path.display(), rows = categories.len(), "categories exported");
                }
                None => render::write_csv(&mut *out, &categories)?,
            }
        }
        CategoryCommand::Create {
            scope,
            name,
            category_type,
        } => {
            let category = engine
                .create_category(&scope.company, &name, &category_type)
                .await?;
            render::write_category(out, &category)?;
        }
        CategoryCommand::Rename {
            scope,
            name,
            new_name,
        } => {
            let mut snapshot = engine.category_snapshot(&scope.company).await?;
            let category = engine
                .rename_category(&mut snapshot, &name, &new_name)
                .await?;
            render::write_category(out, &category)?;
        }
        CategoryCommand::Retype {
            scope,
            name,
            category_type,
        } => {
            let mut snapshot = engine.category_snapshot(&scope.company).await?;
            let category = engine
                .change_category_type(&mut snapshot, &name, &category_type)
                .await?;
            render::write_category(out, &category)?;
        }
        CategoryCommand::Delete { scope, name } => {
            let mut snapshot = engine.category_snapshot(&scope.company).await?;
            let remaining = engine.delete_category(&mut snapshot, &name).await?;
            render::write_categories(out, &remaining)?;
        }
        CategoryCommand::Move {
            scope,
            name,
            parent,
            detach: _,
        } => {
            let mut snapshot = engine.category_snapshot(&scope.company).await?;
            let category = engine
                .reassign_parent(&mut snapshot, &name, parent.as_deref())
                .await?;
            render::write_category(out, &category)?;
        }
    }
    Ok(())
}

/// Malformed input is a process error; failing steps are not.
async fn run_batch(engine: &Engine, args: BatchArgs, out: &mut impl Write) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.file).await?;
    let requests: Vec<OperationRequest> = serde_json::from_str(&raw)?;

    let snapshot = engine.category_snapshot(&args.company).await?;
    let steps = engine.run_batch(&args.company, snapshot, requests).await;

    let failed = steps.iter().filter(|step| !step.result.success).count();
    tracing::info!(
        company_id = %args.company,
        steps = steps.len(),
        failed,
        "batch finished"
    );

    serde_json::to_writer_pretty(&mut *out, &steps)?;
    writeln!(out)?;
    Ok(())
}
