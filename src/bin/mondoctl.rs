use std::{
    error::Error,
    fmt::Display,
    io::{self, IsTerminal},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use mondo::{
    Authenticator, ClientConfig, Credentials,
    cli::{
        args::MondoctlArgs,
        commands::{Command, ReplState},
        history::{History, default_history_path},
        prompt::{CommandCompleter, prompt_password, read_password_from},
    },
    logging::setup_logging,
};
use rustyline::{Editor, error::ReadlineError, history::DefaultHistory};

const BANNER: &str = r#"
███╗   ███╗ ██████╗ ███╗   ██╗██████╗  ██████╗
████╗ ████║██╔═══██╗████╗  ██║██╔══██╗██╔═══██╗
██╔████╔██║██║   ██║██╔██╗ ██║██║  ██║██║   ██║
██║╚██╔╝██║██║   ██║██║╚██╗██║██║  ██║██║   ██║
██║ ╚═╝ ██║╚██████╔╝██║ ╚████║██████╔╝╚██████╔╝
╚═╝     ╚═╝ ╚═════╝ ╚═╝  ╚═══╝╚═════╝  ╚═════╝
"#;

const PROMPT: &str = "mondoctl: ";

type Input = Editor<CommandCompleter, DefaultHistory>;

fn read_line(input: &mut Input, message: &str) -> Result<String, ReadlineError> {
    tokio::task::block_in_place(|| input.readline(message))
}

fn read_password(message: &str) -> io::Result<String> {
    tokio::task::block_in_place(|| {
        if io::stdin().is_terminal() {
            prompt_password(message)
        } else {
            read_password_from(&mut io::stdin().lock())
        }
    })
}

async fn login(
    state: &mut ReplState,
    authenticator: &Authenticator,
    args: &MondoctlArgs,
    input: &mut Input,
) -> Result<(), Box<dyn Error>> {
    if state.is_logged_in() {
        return Ok(());
    }

    let username = match &args.username {
        Some(username) => username.clone(),
        None => read_line(input, "please enter the email you use for mondo: ")?
            .trim()
            .to_string(),
    };
    let password = match &args.password {
        Some(password) => password.clone(),
        None => read_password("please enter your mondo password: ")?,
    };

    println!("thanks! logging in...");

    let credentials = Credentials::new(
        &args.common.client_id,
        &args.common.client_secret,
        username,
        password,
    );
    state.login(authenticator, &credentials).await?;
    Ok(())
}

fn print_error(err: &dyn Display) {
    println!("\x1b[1m\x1b[91mERROR: {}\x1b[0m", err);
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = MondoctlArgs::parse();

    setup_logging(
        args.common.log_dir.as_deref(),
        "mondoctl.log",
        args.common.verbose,
    );

    let config = match ClientConfig::new(&args.common.base_url) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    let authenticator = Authenticator::new(config);

    let history_path = args
        .history_file
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(default_history_path);
    let mut history = History::load(&history_path).unwrap_or_else(|err| {
        print_error(&format!("Error reading history: {}", err));
        History::new(&history_path)
    });

    println!("{}", BANNER);

    let mut input = match Input::new() {
        Ok(input) => input,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    input.set_helper(Some(CommandCompleter));
    for entry in history.entries() {
        if let Err(err) = input.add_history_entry(entry.as_str()) {
            tracing::warn!("Error adding history entry: {}", err);
        }
    }

    let mut state = ReplState::new();

    if let Err(err) = login(&mut state, &authenticator, &args, &mut input).await {
        println!("error logging in: {}", err);
        return ExitCode::FAILURE;
    }

    loop {
        let line = match read_line(&mut input, PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("bye!");
                break;
            }
            Err(err) => {
                print_error(&err);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        history.push(line);
        if let Err(err) = input.add_history_entry(line) {
            tracing::warn!("Error adding history entry: {}", err);
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                print_error(&err);
                continue;
            }
        };

        match command {
            Command::Quit => {
                println!("bye!");
                break;
            }
            Command::Login => {
                if let Err(err) = login(&mut state, &authenticator, &args, &mut input).await {
                    print_error(&err);
                }
            }
            Command::History => {
                for (i, entry) in history.entries().iter().enumerate() {
                    println!("{:>4}  {}", i + 1, entry);
                }
            }
            command => match state.execute(&command).await {
                Ok(Some(output)) => println!("{}", output),
                Ok(None) => {}
                Err(err) => print_error(&err),
            },
        }
    }

    if let Err(err) = history.save() {
        print_error(&format!(
            "Error writing history file {}: {}",
            history.path().display(),
            err
        ));
    }

    ExitCode::SUCCESS
}
