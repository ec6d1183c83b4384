//! Command-line companion of the relay: sends one question to a running
//! server and prints the answer.

use std::io::{self, Write};

use colored::Colorize;

/// Base URL used when `RELAY_URL` is not set.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";

pub const USAGE: &str = "Usage: invoke \"your question\"";

/// The question is the first argument after the program name. An empty
/// argument counts as missing; extra arguments are ignored.
pub fn question_from_args<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().nth(1).filter(|q| !q.is_empty())
}

/// `RELAY_URL` from `lookup`, without a trailing slash.
pub fn relay_url<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("RELAY_URL")
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string())
}

/// What one invocation ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx; the body as received.
    Answer(String),
    /// Any other status, with whatever body came back.
    Rejected { status: u16, body: String },
    /// The request never completed.
    Unreachable(String),
}

impl Outcome {
    /// Answers go to `stdout`; everything else to `stderr`.
    pub fn render(&self, stdout: &mut impl Write, stderr: &mut impl Write) -> io::Result<()> {
        match self {
            Outcome::Answer(body) => writeln!(stdout, "{body}"),
            Outcome::Rejected { status, body } => {
                writeln!(
                    stderr,
                    "{} Server responded with status code {status}",
                    "Error:".red().bold()
                )?;
                writeln!(stderr, "{body}")
            }
            Outcome::Unreachable(message) => {
                writeln!(stderr, "{} {message}", "Error:".red().bold())
            }
        }
    }
}

/// Issues exactly one `GET <base_url>/ask?q=<question>`.
pub async fn ask(http: &reqwest::Client, base_url: &str, question: &str) -> Outcome {
    let url = format!("{}/ask", base_url.trim_end_matches('/'));

    let response = match http.get(&url).query(&[("q", question)]).send().await {
        Ok(response) => response,
        Err(e) => return Outcome::Unreachable(e.to_string()),
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return Outcome::Unreachable(e.to_string()),
    };

    if status.is_success() {
        Outcome::Answer(body)
    } else {
        Outcome::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn question_is_first_argument() {
        assert_eq!(
            question_from_args(args(&["invoke", "fizzbuzz in java", "extra"])),
            Some("fizzbuzz in java".to_string())
        );
    }

    #[test]
    fn missing_or_empty_argument_means_usage() {
        assert_eq!(question_from_args(args(&["invoke"])), None);
        assert_eq!(question_from_args(args(&["invoke", ""])), None);
    }

    #[test]
    fn relay_url_defaults_and_trims() {
        assert_eq!(relay_url(|_| None), DEFAULT_RELAY_URL);
        assert_eq!(
            relay_url(|_| Some("http://relay:8080/".into())),
            "http://relay:8080"
        );
        assert_eq!(relay_url(|_| Some("  ".into())), DEFAULT_RELAY_URL);
    }

    #[test]
    fn render_splits_streams() {
        colored::control::set_override(false);

        let (mut out, mut err) = (Vec::new(), Vec::new());
        Outcome::Answer("42".into()).render(&mut out, &mut err).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "42\n");
        assert!(err.is_empty());

        let (mut out, mut err) = (Vec::new(), Vec::new());
        Outcome::Rejected {
            status: 429,
            body: "Error: API quota exceeded or rate limit".into(),
        }
        .render(&mut out, &mut err)
        .unwrap();
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Error: Server responded with status code 429\nError: API quota exceeded or rate limit\n"
        );

        let (mut out, mut err) = (Vec::new(), Vec::new());
        Outcome::Unreachable("connection refused".into())
            .render(&mut out, &mut err)
            .unwrap();
        assert_eq!(String::from_utf8(err).unwrap(), "Error: connection refused\n");
    }
}
