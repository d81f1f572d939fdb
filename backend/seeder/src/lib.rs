//! # Seeder
//!
//! Fills a running dashboard with demo interns through its own HTTP API.
//!
//! 1. `POST /auth/signup` for every intern, every one shares [`models::DEMO_PASSWORD`]
//!
//! 2. Email already registered (409) means an earlier seed run, log in to recover the id instead.
//!
//! 3. `PUT /user/{id}/stats` with the demo total and referral count.
//!
//! The seeder never talks to Redis directly.
use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use serde_json::json;
use uuid::Uuid;

pub mod models;

use models::{AccountEnvelope, DEMO_PASSWORD, DemoIntern, demo_interns};

pub async fn seed(base_url: &str, extra: u32) -> Result<()> {
    let base_url = base_url.trim_end_matches('/');
    let client = Client::new();
    let interns = demo_interns(extra);

    println!("Seeding {} interns into {base_url}\n", interns.len());

    let pb = ProgressBar::new(interns.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut created = 0;
    let mut existing = 0;

    for intern in &interns {
        pb.set_message(intern.email.clone());

        let (id, is_new) = ensure_account(&client, base_url, intern).await?;
        if is_new {
            created += 1;
        } else {
            existing += 1;
        }

        set_stats(&client, base_url, &id, intern).await?;

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    println!("\nCreated: {created}");
    println!("Already present: {existing}");
    println!("\nLogin with any seeded email and password {DEMO_PASSWORD}");

    Ok(())
}

async fn ensure_account(client: &Client, base_url: &str, intern: &DemoIntern) -> Result<(Uuid, bool)> {
    let res = client
        .post(format!("{base_url}/auth/signup"))
        .json(&json!({
            "name": intern.name,
            "email": intern.email,
            "password": DEMO_PASSWORD,
        }))
        .send()
        .await
        .with_context(|| format!("signup for {}", intern.email))?;

    #[cfg(feature = "verbose")]
    println!("Signup {}: {}", intern.email, res.status());

    match res.status() {
        status if status.is_success() => {
            let envelope: AccountEnvelope = res.json().await?;
            Ok((envelope.user.id, true))
        }
        StatusCode::CONFLICT => Ok((login(client, base_url, intern).await?, false)),
        status => bail!("signup for {} failed with {status}: {}", intern.email, res.text().await?),
    }
}

async fn login(client: &Client, base_url: &str, intern: &DemoIntern) -> Result<Uuid> {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": intern.email, "password": DEMO_PASSWORD }))
        .send()
        .await
        .with_context(|| format!("login for {}", intern.email))?;

    if !res.status().is_success() {
        bail!(
            "{} already exists with a different password ({})",
            intern.email,
            res.status()
        );
    }

    let envelope: AccountEnvelope = res.json().await?;

    Ok(envelope.user.id)
}

async fn set_stats(client: &Client, base_url: &str, id: &Uuid, intern: &DemoIntern) -> Result<()> {
    let res = client
        .put(format!("{base_url}/user/{id}/stats"))
        .json(&json!({
            "totalRaised": intern.total_raised,
            "referrals": intern.referrals,
        }))
        .send()
        .await
        .with_context(|| format!("stats for {}", intern.email))?;

    if !res.status().is_success() {
        bail!("stats for {} failed with {}", intern.email, res.status());
    }

    Ok(())
}
