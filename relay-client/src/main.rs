use std::{io, process::ExitCode};

use relay_client::{USAGE, ask, question_from_args, relay_url};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = std::env::args_os().map(|arg| arg.to_string_lossy().into_owned());
    let Some(question) = question_from_args(args) else {
        println!("{USAGE}");
        return Ok(ExitCode::from(1));
    };

    let base_url = relay_url(|name| std::env::var(name).ok());
    let http = reqwest::Client::new();

    let outcome = ask(&http, &base_url, &question).await;
    outcome.render(&mut io::stdout().lock(), &mut io::stderr().lock())?;

    Ok(ExitCode::SUCCESS)
}
