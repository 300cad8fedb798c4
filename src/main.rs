use std::process::ExitCode;

use anyhow::Context;
use blue::cli::{ChatArgs, ChatMode, Cli, Commands};
use blue::{
    interrupt, logging, AppConfig, ChatApiTransport, ConversationSession, ExternalEditor,
    InterruptState, StdoutSink, TerminalInput,
};
use chat_api::ChatApiClient;
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat(args) => run_chat(cli.config_file.as_deref(), &args),
    }
}

fn run_chat(config_file: Option<&std::path::Path>, args: &ChatArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::load(config_file).context("failed to load configuration")?;
    args.apply(&mut config);
    tracing::debug!(model = %config.model, max_tokens = config.max_tokens, base_url = %config.base_url, "starting chat");

    let client = ChatApiClient::new(config.chat_api_config())
        .context("failed to build chat client")?;
    let transport = ChatApiTransport::new(client, config.model.clone(), config.max_tokens);

    let interrupts = InterruptState::new();
    let _interrupt_guard =
        interrupt::install(interrupts.clone()).context("failed to install interrupt handler")?;
    let editor = ExternalEditor::from_env().with_cancellation(interrupts.cancellation());

    let mut session =
        ConversationSession::new(TerminalInput::stdin(), editor, transport, StdoutSink::stdout())
            .with_interrupts(interrupts);

    match args.mode() {
        ChatMode::Interactive => session.run()?,
        ChatMode::Prompt(prompt) => {
            session.process_turn(&prompt)?;
        }
        ChatMode::Editor => {
            let prompt = session.compose().context("failed to compose prompt")?;
            if !prompt.trim().is_empty() {
                session.process_turn(&prompt)?;
            }
        }
    }

    Ok(())
}
