//! Command-line surface.
//!
//! Every invocation except `script ...` is first handed to the command
//! recorder, so an active recording session captures it before it runs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;

use crate::bootstrap::OperatorEnv;
use crate::config::Config;
use crate::credentials::{ClientConfigFactory, CredentialManager};
use crate::recorder::CommandRecorder;
use crate::setup::{ResetOptions, SetupOrchestrator, SetupReport};
use crate::state::{AccountResolver, StateStore};

#[derive(Parser, Debug)]
#[command(name = "hedera", version, about = "Manage Hedera CLI credentials, accounts, and scripts")]
pub struct Cli {
    /// State document location.
    #[arg(long, env = "HEDERA_STATE_PATH", global = true)]
    pub state_path: Option<PathBuf>,

    /// Operator credential file.
    #[arg(long, env = "HEDERA_ENV_PATH", global = true)]
    pub env_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Setup Hedera CLI
    #[command(subcommand)]
    Setup(SetupCommand),

    /// Select and inspect the active network
    #[command(subcommand)]
    Network(NetworkCommand),

    /// Look up locally known accounts
    #[command(subcommand)]
    Account(AccountCommand),

    /// Record command scripts
    #[command(subcommand)]
    Script(ScriptCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SetupCommand {
    /// Setup the CLI with operator key and ID
    Init,

    /// Reset the CLI to default settings
    Reset {
        /// Skip resetting accounts
        #[arg(short = 'a', long)]
        skip_accounts: bool,

        /// Skip resetting tokens
        #[arg(short = 't', long)]
        skip_tokens: bool,

        /// Skip resetting scripts
        #[arg(short = 's', long)]
        skip_scripts: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum NetworkCommand {
    /// Switch to mainnet or testnet
    Use { name: String },

    /// Show the active network, operator, and mirror node
    Show,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AccountCommand {
    /// Show an account by ID (shard.realm.num) or alias
    View { account: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Start recording commands into a script
    Start { name: String },

    /// Stop the active recording
    Stop,

    /// List recorded scripts
    List,
}

impl Command {
    /// Whether the invocation is appended to an active recording.
    pub fn is_recorded(&self) -> bool {
        !matches!(self, Command::Script(_))
    }
}

/// Run a parsed invocation. `args` are the raw arguments after the binary name.
pub fn run(cli: Cli, args: &[String]) -> anyhow::Result<()> {
    let config = Config::resolve(cli.state_path, cli.env_path)?;
    let store = StateStore::open(&config.state_path);

    if cli.command.is_recorded() {
        match CommandRecorder::new(&store).record_command(args) {
            Ok(_) => {}
            // setup rewrites the document, so a broken one must not block it
            Err(e) if matches!(cli.command, Command::Setup(_)) => {
                tracing::warn!("Could not record command: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    match cli.command {
        Command::Setup(command) => run_setup(&store, &config, command),
        Command::Network(command) => run_network(&store, command),
        Command::Account(command) => run_account(&store, command),
        Command::Script(command) => run_script(&store, command),
    }
}

fn run_setup(store: &StateStore, config: &Config, command: SetupCommand) -> anyhow::Result<()> {
    let env = OperatorEnv::from_path(&config.env_path)?;
    let orchestrator = SetupOrchestrator::new(store);

    let report = match command {
        SetupCommand::Init => orchestrator.init(&env)?,
        SetupCommand::Reset {
            skip_accounts,
            skip_tokens,
            skip_scripts,
        } => {
            let options = ResetOptions {
                skip_accounts,
                skip_tokens,
                skip_scripts,
            };
            if options.is_full() {
                println!("Resetting CLI to default settings...");
            }
            orchestrator.reset(&env, options)?
        }
    };

    print_setup_report(&report);
    Ok(())
}

fn print_setup_report(report: &SetupReport) {
    if let Some(name) = &report.ended_recording {
        eprintln!("Warning: recording for script '{name}' was stopped by setup");
    }
    if !report.cleared.is_empty() {
        println!("Cleared: {}", report.cleared.join(", "));
    }
    println!("Setup complete. Active network: {}", report.network);
}

fn run_network(store: &StateStore, command: NetworkCommand) -> anyhow::Result<()> {
    let manager = CredentialManager::new(store);
    match command {
        NetworkCommand::Use { name } => {
            let network = manager.switch_network(&name)?;
            println!("Switched to {network}");
        }
        NetworkCommand::Show => {
            println!("Network:     {}", manager.active_network()?);
            println!("Mirror node: {}", manager.mirror_node_url()?);
            let client = manager.resolve_client(&ClientConfigFactory)?;
            println!("Operator:    {}", client.operator.account_id);
            println!(
                "Key:         {}",
                mask_secret(client.operator.private_key.expose_secret())
            );
        }
    }
    Ok(())
}

fn run_account(store: &StateStore, command: AccountCommand) -> anyhow::Result<()> {
    match command {
        AccountCommand::View { account } => {
            let account = AccountResolver::new(store).resolve_by_id_or_alias(&account)?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
    }
    Ok(())
}

fn run_script(store: &StateStore, command: ScriptCommand) -> anyhow::Result<()> {
    let recorder = CommandRecorder::new(store);
    match command {
        ScriptCommand::Start { name } => {
            recorder.start_recording(&name)?;
            println!("Recording into script '{name}'");
        }
        ScriptCommand::Stop => {
            let name = recorder.stop_recording()?;
            println!("Stopped recording script '{name}'");
        }
        ScriptCommand::List => {
            let state = store.get_all()?;
            if state.scripts.is_empty() {
                println!("No scripts recorded");
            }
            for (name, script) in &state.scripts {
                let marker = if state.active_script() == Some(name.as_str()) {
                    " (recording)"
                } else {
                    ""
                };
                println!("{name}{marker}: {} command(s)", script.commands.len());
                for command in &script.commands {
                    println!("  {command}");
                }
            }
        }
    }
    Ok(())
}

/// Show only the edges of a secret value.
fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let prefix: String = chars.iter().take(6).collect();
    let suffix: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{prefix}...{suffix}")
}
