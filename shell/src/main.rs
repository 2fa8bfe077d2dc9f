use anyhow::Result;
use argh::FromArgs;
use shellex::{BackgroundPolicy, Interpreter, LineSource, ReaderSource, ReadlineSource, SignalManager};
use std::io::{self, IsTerminal};

const DEFAULT_PROMPT: &str = "shellex> ";

#[derive(FromArgs)]
/// A small interactive command interpreter.
struct Args {
    #[argh(option, short = 'p')]
    /// text shown before each line, followed by "> ".
    prompt: Option<String>,

    #[argh(switch)]
    /// reap finished background programs instead of leaving them detached.
    reap_background: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Args = argh::from_env();

    let prompt = match &args.prompt {
        Some(token) => format!("{}> ", token),
        None => DEFAULT_PROMPT.to_string(),
    };
    let policy = if args.reap_background {
        BackgroundPolicy::Reap
    } else {
        BackgroundPolicy::Detach
    };

    let signals = SignalManager::install()?;
    let mut sh = Interpreter::default()
        .with_signals(signals)
        .with_background_policy(policy);

    println!("shellex: launched!");

    let mut source: Box<dyn LineSource> = if io::stdin().is_terminal() {
        Box::new(ReadlineSource::new()?)
    } else {
        Box::new(ReaderSource::new(io::stdin().lock()))
    };
    sh.run(source.as_mut(), &prompt, &mut io::stdout())
}
