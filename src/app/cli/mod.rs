//! CLI Adapter.

mod completion;
mod destroy;
mod logging;

use std::path::{Path, PathBuf};

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::env::CompleteEnv;

use crate::app::api::{self, EditOutcome};
use crate::domain::AppError;

#[derive(Parser)]
#[command(name = "drone-deploy")]
#[command(version)]
#[command(
    about = "Build and deploy Drone CI servers on AWS with Packer and Terraform",
    long_about = None
)]
struct Cli {
    /// Project root holding deployments/ (defaults to the current directory)
    #[arg(long, global = true, env = "DRONE_DEPLOY_ROOT", value_name = "DIR")]
    root: Option<PathBuf>,
    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new deployment from the bundled templates
    New { name: String },
    /// Open a deployment's config.yaml in $EDITOR
    Edit {
        #[arg(add = completion::deployment_names())]
        name: String,
    },
    /// Run terraform init for a deployment
    Init {
        #[arg(add = completion::deployment_names())]
        name: String,
    },
    /// Create the IAM resources the AMI build needs
    Prepare {
        #[arg(add = completion::deployment_names())]
        name: String,
    },
    /// Run terraform plan and save the plan for deploy
    Plan {
        #[arg(add = completion::deployment_names())]
        name: String,
        /// Limit the plan to a resource address (repeatable)
        #[arg(long = "target", value_name = "RESOURCE")]
        targets: Vec<String>,
    },
    /// Apply the saved plan, or run terraform apply
    Deploy {
        #[arg(add = completion::deployment_names())]
        name: String,
        /// Limit the apply to a resource address (repeatable)
        #[arg(long = "target", value_name = "RESOURCE")]
        targets: Vec<String>,
    },
    /// Build the Drone server AMI with packer
    BuildAmi {
        #[arg(add = completion::deployment_names())]
        name: String,
    },
    /// Destroy a deployment's resources
    Destroy {
        #[arg(add = completion::deployment_names())]
        name: String,
        /// Limit the destroy to a resource address (repeatable)
        #[arg(long = "target", value_name = "RESOURCE", conflicts_with = "rm")]
        targets: Vec<String>,
        /// Delete the deployment directory after a successful destroy
        #[arg(long)]
        rm: bool,
        /// Skip the confirmation prompt for --rm
        #[arg(short, long, requires = "rm")]
        yes: bool,
    },
    /// Print a deployment's resolved config and status
    Show {
        #[arg(add = completion::deployment_names())]
        name: String,
    },
    /// List deployments
    #[clap(visible_alias = "ls")]
    List,
    /// Print the docker command that starts a build agent
    ShowAgentCommand {
        #[arg(add = completion::deployment_names())]
        name: String,
    },
}

/// Entry point for the CLI.
pub fn run() {
    CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = resolve_root(cli.root).and_then(|root| dispatch(&root, cli.command));
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf, AppError> {
    match root {
        Some(root) => Ok(root),
        None => Ok(std::env::current_dir()?),
    }
}

fn dispatch(root: &Path, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::New { name } => run_new(root, &name),
        Commands::Edit { name } => run_edit(root, &name),
        Commands::Init { name } => {
            api::init_at(root, &name)?.into_result("terraform")?;
            println!("✅ Initialized terraform for '{}'", name);
            Ok(())
        }
        Commands::Prepare { name } => {
            api::prepare_at(root, &name)?.into_result("terraform")?;
            println!("✅ Created builder IAM resources for '{}'", name);
            println!("   Build the server image with 'drone-deploy build-ami {}'", name);
            Ok(())
        }
        Commands::Plan { name, targets } => {
            api::plan_at(root, &name, &targets)?.into_result("terraform")?;
            println!("✅ Saved plan for '{}'", name);
            println!("   Apply it with 'drone-deploy deploy {}'", name);
            Ok(())
        }
        Commands::Deploy { name, targets } => {
            api::deploy_at(root, &name, &targets)?.into_result("terraform")?;
            println!("✅ Deployed '{}'", name);
            Ok(())
        }
        Commands::BuildAmi { name } => run_build_ami(root, &name),
        Commands::Destroy { name, targets, rm, yes } => {
            destroy::run_destroy(root, &name, &targets, rm, yes)
        }
        Commands::Show { name } => run_show(root, &name),
        Commands::List => {
            for name in api::list_at(root)? {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::ShowAgentCommand { name } => {
            print!("{}", api::show_agent_command_at(root, &name)?);
            Ok(())
        }
    }
}

fn run_new(root: &Path, name: &str) -> Result<(), AppError> {
    let outcome = api::new_deployment_at(root, name)?;
    println!("✅ Created deployment '{}' at {}/", outcome.name, outcome.dir.display());
    println!("   Review its settings with 'drone-deploy edit {}'", outcome.name);
    Ok(())
}

fn run_edit(root: &Path, name: &str) -> Result<(), AppError> {
    match api::edit_at(root, name)? {
        EditOutcome::Edited(path) => println!("✅ Edited {}", path.display()),
        EditOutcome::NoEditor(path) => {
            println!("EDITOR is not set. Edit the config file directly:");
            println!("  {}", path.display());
        }
    }
    Ok(())
}

fn run_build_ami(root: &Path, name: &str) -> Result<(), AppError> {
    let result = api::build_ami_at(root, name)?;
    result.outcome.into_result("packer")?;
    if result.artifacts.new_build {
        println!("⚠️  Build finished but no AMI was recorded in the packer manifest");
    } else {
        println!("✅ Built AMI {} for '{}'", result.artifacts.server_ami, name);
    }
    Ok(())
}

fn run_show(root: &Path, name: &str) -> Result<(), AppError> {
    let output = api::show_at(root, name)?;
    println!("DEPLOYMENT CONFIG FILE: {}", output.config_path.display());
    println!();
    print!("{}", output.config);
    if !output.config.ends_with('\n') {
        println!();
    }
    println!();
    print!("{}", output.status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deployment_arguments_complete_names() {
        let cli = Cli::command();
        for subcommand in ["show", "deploy", "destroy", "show-agent-command"] {
            let name = cli
                .find_subcommand(subcommand)
                .and_then(|sub| sub.get_arguments().find(|arg| arg.get_id() == "name"))
                .unwrap();
            assert!(name.get::<clap_complete::engine::ArgValueCandidates>().is_some());
        }
    }
}
