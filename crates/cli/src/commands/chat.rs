//! `enamai chat` — Interactive or single-message chat mode.
//!
//! Uses the same chat service as the HTTP gateway, so fallback answers and
//! session history behave identically.

use enamai_config::AppConfig;
use enamai_core::message::ChatRequest;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    config: AppConfig,
    message: Option<String>,
    session: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let persona = config.clinic.persona.clone();
    let clinic = config.clinic.name.clone();

    let state = enamai_gateway::build_state(config);
    if let Some(reason) = state.provider_status.reason() {
        eprintln!();
        eprintln!("  ⚠️  Prediction provider unavailable: {reason}");
        eprintln!("     Answers will come from the fallback rules.");
        eprintln!("     Set ENAMAI_ACCESS_TOKEN (e.g. from `gcloud auth print-access-token`).");
        eprintln!();
    }

    if let Some(msg) = message {
        // Single message mode
        let request = with_session(ChatRequest::new(msg), session.as_deref());
        request.validate()?;

        eprint!("  Thinking...");
        let response = state.chat.handle(&request).await;
        eprint!("\r              \r");
        println!("{}", response.response);
        eprintln!("  (session {})", response.session_id);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  {persona} — {clinic}");
    println!("  Model:  {}", state.provider_status.model());
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut session_id = session;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let request = with_session(ChatRequest::new(line), session_id.as_deref());
        if let Err(e) = request.validate() {
            eprintln!("  [Error] {e}");
            continue;
        }

        eprint!("  ...");
        let response = state.chat.handle(&request).await;
        eprint!("\r     \r");
        println!();
        for text in response.response.lines() {
            println!("  {persona} > {text}");
        }
        println!();

        session_id = Some(response.session_id);
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

fn with_session(request: ChatRequest, session_id: Option<&str>) -> ChatRequest {
    match session_id {
        Some(id) => request.with_session(id),
        None => request,
    }
}
