use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use uuid::Uuid;

use shadow_agent_policy::cli::{Console, ConsoleDialog};
use shadow_agent_policy::core::CancelSignal;
use shadow_agent_policy::logging;
use shadow_agent_policy::permissions::{
    AutoApproveDialog, CheckResult, Dialog, PermissionConfig, PermissionManager, PermissionMode,
};
use shadow_agent_policy::settings::Settings;
use shadow_agent_policy::tools::{NamedTool, ToolAnnotations, ToolCall};

#[derive(Parser, Debug)]
#[command(
    name = "shadow-policy",
    about = "Check a tool call against project permission settings"
)]
struct Args {
    /// Project directory containing .shadow/settings.json
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Override the permission mode
    #[arg(long)]
    mode: Option<PermissionMode>,

    /// Extra permission config (JSON) appended after the settings rules
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat the tool as read-only (allowed in plan mode)
    #[arg(long)]
    read_only: bool,

    /// Treat the tool as a file edit (allowed in acceptEdits mode)
    #[arg(long)]
    edit: bool,

    /// Approve any confirmation prompt
    #[arg(long, short)]
    yes: bool,

    /// Print the decision without prompting
    #[arg(long)]
    check: bool,

    /// Tool name
    tool: String,

    /// Tool input as JSON
    #[arg(default_value = "{}")]
    input: String,
}

fn load_config(args: &Args) -> anyhow::Result<PermissionConfig> {
    let settings = Settings::load(&args.dir)?;
    if let Some(source) = &settings.source {
        tracing::info!("Using settings from {}", source.display());
    }

    let mut config = settings.to_config()?;
    if let Some(path) = &args.config {
        let extra = PermissionConfig::load(path)?;
        config.rules.extend(extra.rules);
        config.specifier_fields.extend(extra.specifier_fields);
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging_to_stderr()?;

    let console = Console::new();
    let config = load_config(&args)?;
    console.print_mode(config.mode);

    let dialog: Arc<dyn Dialog> = if args.yes {
        Arc::new(AutoApproveDialog)
    } else {
        Arc::new(ConsoleDialog::new())
    };
    let manager = PermissionManager::new(config, Some(dialog));

    let tool = NamedTool::new(&args.tool).with_annotations(ToolAnnotations {
        read_only: args.read_only,
        edit: args.edit,
        ..Default::default()
    });
    let call = ToolCall::new(Uuid::new_v4().to_string(), &args.tool, args.input.as_str());
    if call.decode_input().is_none() {
        console.print_error("Tool input is not valid JSON; input-based rules will not match");
    }

    if args.check {
        let result = manager.check(&tool, &call);
        console.print_check(&args.tool, &result);
        if matches!(result, CheckResult::Denied(_)) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let cancel = CancelSignal::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel("interrupted");
            }
        });
    }

    let result = manager.evaluate_tool_use(&cancel, &tool, &call).await;
    console.print_decision(&args.tool, &result);

    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
