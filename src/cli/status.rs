use anyhow::Result;

use crate::auth::token_store;
use crate::cli::{output, Env};
use crate::state::{Scope, State};

pub fn run(env: &Env, state: &State) -> Result<()> {
    let ctx = state.current()?;
    let scope = state.scope();

    println!(
        "Context: {} (collection: {}, folder: {})",
        ctx.name, ctx.collection, ctx.folder
    );
    println!("Scope: {}", scope);

    match scope {
        Scope::Note => {
            let note = state.current_note()?;
            println!("Note: {}", note.label());
            println!("Available commands: notes update, note exit, notes list, status");
        }
        Scope::Folder => {
            println!("Note: <none>");
            println!(
                "Available commands: notes create, notes list, note switch, context switch, status"
            );
        }
    }

    print_login(env)
}

fn print_login(env: &Env) -> Result<()> {
    let cfg = env.config()?;
    match token_store::load(&cfg.token_path)? {
        Some(credential) if credential.is_expired(chrono::Utc::now()) => {
            output::warning(&format!(
                "Login expired at {}; run `codestash login` again",
                credential.expires_at
            ));
        }
        Some(credential) => {
            println!("Login: active until {}", credential.expires_at);
        }
        None => println!("Login: <none>"),
    }
    Ok(())
}
