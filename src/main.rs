// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GoNotes client harness
//!
//! Small command-line front end over the client library, mainly for
//! exercising the API and the session machinery during development.

use gonotes_client::{
    config::Config,
    services::{NoteDraft, NoteSearch},
    GoNotesClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(base_url = %config.base_url, "Starting GoNotes client");

    let client = GoNotesClient::new(config)
        .await
        .expect("Failed to open session store");
    client
        .start()
        .await
        .expect("Failed to start session coordinator");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run_command(&client, &args).await;

    client.shutdown().await;
    result
}

async fn run_command(
    client: &GoNotesClient,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    match args.first().map(String::as_str) {
        Some("register") if args.len() == 4 => {
            let user = client.auth.register(&args[1], &args[2], &args[3]).await?;
            println!("registered {} <{}>", user.full_name, user.email);
        }
        Some("login") if args.len() == 3 => {
            let session = client.login(&args[1], &args[2]).await?;
            println!(
                "signed in as {} <{}>",
                session.user.full_name, session.user.email
            );
        }
        Some("logout") => {
            client.logout().await?;
            println!("signed out");
        }
        Some("whoami") => match client.store.get_current_user().await {
            Some(user) => println!("{} <{}> (id {})", user.full_name, user.email, user.id),
            None => println!("not signed in"),
        },
        Some("profile") => {
            let user = client.users.get_profile().await?;
            println!("{} <{}> (since {})", user.full_name, user.email, user.created_at);
        }
        Some("rename") if args.len() == 2 => {
            let user = client.users.update_profile(&args[1]).await?;
            println!("profile updated: {}", user.full_name);
        }
        Some("notes") => {
            let page = args.get(1).and_then(|v| v.parse().ok()).unwrap_or(1);
            let limit = args.get(2).and_then(|v| v.parse().ok()).unwrap_or(10);
            print_page(&client.notes.list_notes(page, limit).await?);
        }
        Some("note") if args.len() == 2 => {
            let note = client.notes.get_note(&args[1]).await?;
            println!("# {}\n{}", note.title, note.content);
        }
        Some("add") if args.len() >= 3 => {
            let note = client
                .notes
                .create_note(&NoteDraft {
                    title: args[1].clone(),
                    content: args[2].clone(),
                    tags: args[3..].to_vec(),
                    is_public: false,
                })
                .await?;
            println!("created note {}", note.id);
        }
        Some("edit") if args.len() == 4 => {
            let note = client
                .notes
                .update_note(
                    &args[1],
                    &NoteDraft {
                        title: args[2].clone(),
                        content: args[3].clone(),
                        tags: Vec::new(),
                        is_public: false,
                    },
                )
                .await?;
            println!("updated note {}", note.id);
        }
        Some("rm") if args.len() == 2 => {
            client.notes.delete_note(&args[1]).await?;
            println!("deleted note {}", args[1]);
        }
        Some("search") if args.len() == 2 => {
            let page = client
                .notes
                .search_notes(&NoteSearch {
                    query: Some(args[1].clone()),
                    ..NoteSearch::default()
                })
                .await?;
            print_page(&page);
        }
        Some("public") => {
            let page = args.get(1).and_then(|v| v.parse().ok()).unwrap_or(1);
            let limit = args.get(2).and_then(|v| v.parse().ok()).unwrap_or(10);
            print_page(&client.notes.list_public_notes(page, limit).await?);
        }
        Some("watch") => {
            // Stream login-signal transitions until interrupted
            let mut signal = client.coordinator.subscribe();
            println!("logged_in = {}", *signal.borrow());
            while signal.changed().await.is_ok() {
                println!("logged_in = {}", *signal.borrow());
            }
        }
        _ => print_usage(),
    }
    Ok(())
}

fn print_page(page: &gonotes_client::models::NotesPage) {
    for note in &page.notes {
        let visibility = if note.is_public { "public" } else { "private" };
        println!("{}  [{}] {}", note.id, visibility, note.title);
    }
    println!(
        "page {}/{} ({} total)",
        page.pagination.page, page.pagination.total_pages, page.pagination.total
    );
}

fn print_usage() {
    eprintln!("usage: gonotes-client <command> [args]");
    eprintln!();
    eprintln!("  register <name> <email> <password>");
    eprintln!("  login <email> <password>");
    eprintln!("  logout");
    eprintln!("  whoami");
    eprintln!("  profile");
    eprintln!("  rename <new-name>");
    eprintln!("  notes [page] [limit]");
    eprintln!("  note <id>");
    eprintln!("  add <title> <content> [tags...]");
    eprintln!("  edit <id> <title> <content>");
    eprintln!("  rm <id>");
    eprintln!("  search <query>");
    eprintln!("  public [page] [limit]");
    eprintln!("  watch");
}

/// Initialize structured logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gonotes_client=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
