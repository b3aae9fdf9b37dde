//! Chat command: the assistant conversation loop
//!
//! A chart widget spec returned by the assistant is applied
//! automatically (purely presentational). An installment proposal is
//! only ever applied after the user confirms it here; declining leaves
//! state untouched.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use purse_core::ai::{ChatMode, InlineImage};
use purse_core::models::{ChatMessage, ChatRole};
use purse_core::store::Action;
use purse_core::{accept_proposal, Assistant};

use super::{confirm, open_store, today};

fn load_image(path: &Path) -> Result<InlineImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        other => anyhow::bail!("Unsupported image type: {:?}", other),
    };
    Ok(InlineImage::from_bytes(&bytes, mime))
}

pub async fn cmd_chat(
    data_file: Option<&Path>,
    message: &str,
    architect: bool,
    image: Option<&Path>,
) -> Result<()> {
    let assistant = Assistant::from_env()
        .context("AI assistant is not configured (set GEMINI_API_KEY, or PURSE_AI_BACKEND=mock)")?;

    let mut store = open_store(data_file)?;
    let mode = if architect {
        ChatMode::Architect
    } else {
        ChatMode::Standard
    };
    if architect && !store.state().is_pro {
        println!("ℹ️  Architect chat runs with standard capabilities without the pro tier");
    }

    let image = image.map(load_image).transpose()?;

    store.dispatch(Action::AddChatMessage {
        message: ChatMessage {
            role: ChatRole::User,
            text: message.to_string(),
            timestamp: Utc::now(),
        },
        pro: mode.is_pro_transcript(),
    })?;

    let reply = assistant
        .send_message(store.state(), message, mode, image)
        .await;

    println!("{}", reply.text);

    store.dispatch(Action::AddChatMessage {
        message: ChatMessage {
            role: ChatRole::Model,
            text: reply.text.clone(),
            timestamp: Utc::now(),
        },
        pro: mode.is_pro_transcript(),
    })?;

    // Chart widgets are low-risk and applied without asking.
    if let Some(spec) = reply.chart_widget {
        let title = spec.title.clone();
        store.dispatch(Action::AddCustomWidget(spec))?;
        println!("📈 Added chart widget \"{}\" to the dashboard", title);
    }

    // Installment proposals require explicit confirmation.
    if let Some(proposal) = reply.installment_proposal {
        println!();
        println!("📋 Proposed installment plan:");
        println!("   Title:    {}", proposal.title);
        println!("   Total:    {:.2}", proposal.total_amount);
        println!("   Interest: {:.1}%", proposal.interest_rate);
        println!("   Months:   {}", proposal.installment_count);
        if let Some(start) = proposal.start_date {
            println!("   Start:    {}", start);
        }
        if confirm("Add this installment plan?")? {
            store.dispatch(accept_proposal(proposal, today()))?;
            if let Some(inst) = store.state().installments.last() {
                println!(
                    "✅ Added plan {} ({:.2}/mo for {} months)",
                    inst.id, inst.monthly_amount, inst.installment_count
                );
            }
        } else {
            println!("Proposal discarded");
        }
    }

    Ok(())
}
