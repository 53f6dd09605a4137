//! One-shot vibe commands: show, reveal, ask

use crate::api::{VibesApi, VibesClient};
use crate::core::config::Config;
use crate::core::countdown::Countdown;
use crate::core::sequence;
use crate::core::session::{now_millis, VibeSession};
use crate::error::Result;

/// Handle `vibes show`
pub async fn handle_show(config: &Config) -> Result<()> {
    let client = VibesClient::from_config(config)?;
    let session = sequence::load_initial(&client).await?;
    print!("{}", describe(&session, now_millis()));
    Ok(())
}

/// Handle `vibes reveal`
pub async fn handle_reveal(config: &Config) -> Result<()> {
    let client = VibesClient::from_config(config)?;
    let session = run_reveal(&client, now_millis()).await?;

    println!("{}", session.fortune);
    println!();
    println!(
        "Ask for clarity with: vibes ask <question>   (next fortune in {})",
        Countdown::at(session.time_to_next_oracle, now_millis()).display()
    );
    Ok(())
}

/// Handle `vibes ask`
pub async fn handle_ask(config: &Config, question: &str) -> Result<()> {
    let client = VibesClient::from_config(config)?;
    let session = run_ask(&client, question).await?;

    println!("{}", session.answer);
    Ok(())
}

async fn run_reveal<A: VibesApi + ?Sized>(api: &A, now_ms: i64) -> Result<VibeSession> {
    let mut session = sequence::load_initial(api).await?;
    sequence::reveal(api, &mut session, now_ms)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "error getting fortune"))?;
    Ok(session)
}

async fn run_ask<A: VibesApi + ?Sized>(api: &A, question: &str) -> Result<VibeSession> {
    let mut session = sequence::load_initial(api).await?;
    sequence::clarify(api, &mut session, question)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "error gaining clarity"))?;
    Ok(session)
}

/// Human-readable summary of a session
fn describe(session: &VibeSession, now_ms: i64) -> String {
    let mut out = String::new();
    out.push_str(&format!("Stage:    {}\n", session.stage().label()));

    if !session.fortune.is_empty() {
        out.push_str(&format!("Fortune:  {}\n", session.fortune));
    }
    if !session.question.is_empty() {
        out.push_str(&format!("Question: {}\n", session.question));
    }
    if !session.answer.is_empty() {
        out.push_str(&format!("Answer:   {}\n", session.answer));
    }

    let countdown = Countdown::at(session.time_to_next_oracle, now_ms);
    if let Some(at) = session.next_oracle_at() {
        out.push_str(&format!(
            "Next:     {} ({})\n",
            countdown.display(),
            at.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    out
}
