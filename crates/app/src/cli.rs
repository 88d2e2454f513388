use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Maintain a company's chart of accounts")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database connection string, overrides the configured database.
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Company(Company),
    Category(Category),
    /// Run a JSON array of category operations in order.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct Company {
    #[command(subcommand)]
    pub command: CompanyCommand,
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommand {
    Create {
        #[arg(long)]
        name: String,
    },
    List,
}

#[derive(Args, Debug)]
pub struct Category {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Args, Debug)]
pub struct Scope {
    /// Company id.
    #[arg(long)]
    pub company: String,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List(Scope),
    Tree(Scope),
    /// Write the categories as CSV (`id,name,type,parent_id`).
    Export {
        #[command(flatten)]
        scope: Scope,
        /// Output file, stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Create {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        category_type: String,
    },
    Rename {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        name: String,
        #[arg(long)]
        new_name: String,
    },
    Retype {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        category_type: String,
    },
    Delete {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        name: String,
    },
    /// Attach a category to a parent, or detach it.
    Move {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        name: String,
        #[arg(long, conflicts_with = "detach", required_unless_present = "detach")]
        parent: Option<String>,
        #[arg(long)]
        detach: bool,
    },
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    #[arg(long)]
    pub company: String,
    /// JSON file holding the operation list.
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn move_needs_parent_or_detach() {
        let err = Cli::try_parse_from(["tally", "category", "move", "--company", "c", "--name", "A"]);
        assert!(err.is_err());

        let err = Cli::try_parse_from([
            "tally", "category", "move", "--company", "c", "--name", "A", "--parent", "B",
            "--detach",
        ]);
        assert!(err.is_err());

        let cli = Cli::try_parse_from([
            "tally", "category", "move", "--company", "c", "--name", "A", "--detach",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Category(Category {
                command: CategoryCommand::Move {
                    parent: None,
                    detach: true,
                    ..
                }
            })
        ));
    }

    #[test]
    fn batch_takes_company_and_file() {
        let cli = Cli::try_parse_from(["tally", "batch", "--company", "acme", "ops.json"]).unwrap();
        match cli.command {
            Command::Batch(args) => {
                assert_eq!(args.company, "acme");
                assert_eq!(args.file, PathBuf::from("ops.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
